use bytes::BytesMut;
use criterion::{criterion_group, criterion_main, Criterion};
use tokio_util::codec::{Decoder, Encoder};

use hl7_lab_analyzer::MllpCodec;

const SAMPLE_ORDER: &str = "MSH|^~\\&|CPOE|WESTCLINIC|LAB_ANALYZER|LAB|20250811120000||ORM^O01|MSG0042|P|2.5\rPID|1||PAT123||SMITH^JANE||19840221|F\rORC|NW|PLACER9|FILLER3\rOBR|1|PLACER9|FILLER3|BMP^Basic metabolic panel";

fn bench_encode(c: &mut Criterion) {
    c.bench_function("mllp_encode_order", |b| {
        b.iter(|| {
            let mut codec = MllpCodec::new();
            let mut out = BytesMut::with_capacity(SAMPLE_ORDER.len() + 3);
            codec
                .encode(BytesMut::from(SAMPLE_ORDER), &mut out)
                .unwrap();
            out
        })
    });
}

fn bench_decode(c: &mut Criterion) {
    let framed = format!("\x0B{}\x1C\x0D", SAMPLE_ORDER);
    c.bench_function("mllp_decode_order", |b| {
        b.iter(|| {
            let mut codec = MllpCodec::new();
            let mut data = BytesMut::from(framed.as_str());
            codec.decode(&mut data).unwrap()
        })
    });
}

criterion_group!(benches, bench_encode, bench_decode);
criterion_main!(benches);
