//! MLLP framing: a start-of-block byte before the HL7 text and a two byte
//! end-of-block marker after it, over a plain TCP stream.
//!
//! Two layers are provided:
//! - [`wrap`]/[`unwrap`] for code that works on whole buffers (the inbound
//!   listener reads one message per connection and unwraps it in place);
//! - [`MllpCodec`], an [`Encoder`]/[`Decoder`] pair for use with a tokio
//!   [`Framed`](tokio_util::codec::Framed) transport, which handles frames
//!   split across multiple reads (the outbound sender uses this).

use bytes::buf::{Buf, BufMut};
use bytes::BytesMut;
use log::{debug, trace};
use tokio_util::codec::{Decoder, Encoder};

/// Vertical-tab char, marks the start of a message.
const BLOCK_HEADER: u8 = 0x0B;
/// File-separator char + CR, marks the end of a message.
const BLOCK_FOOTER: [u8; 2] = [0x1C, 0x0D];

/// Wraps `payload` in MLLP framing bytes. Total overhead is 3 bytes.
pub fn wrap(payload: &[u8]) -> BytesMut {
    let mut framed = BytesMut::with_capacity(payload.len() + 3);
    framed.put_u8(BLOCK_HEADER);
    framed.put_slice(payload);
    framed.put_slice(&BLOCK_FOOTER);
    framed
}

/// Strips MLLP framing from `frame` if both markers are present, otherwise
/// returns the input unchanged. Permissive on purpose: peers that forget the
/// framing still get their payload through, and empty or malformed payloads
/// are left for the HL7 layer to reject.
pub fn unwrap(frame: &[u8]) -> &[u8] {
    if frame.len() >= 3 && frame[0] == BLOCK_HEADER && frame[frame.len() - 2..] == BLOCK_FOOTER {
        &frame[1..frame.len() - 2]
    } else {
        frame
    }
}

/// A tokio codec for MLLP frames.
///
/// Decoding ignores any bytes before the start-of-block marker and buffers
/// partial frames internally, so a message split over several TCP reads is
/// reassembled before being handed to the caller.
#[derive(Default)]
pub struct MllpCodec {
    // Holds frame data received without its footer, to be completed by later reads.
    buffer: BytesMut,
}

impl MllpCodec {
    pub fn new() -> Self {
        MllpCodec {
            buffer: BytesMut::new(),
        }
    }

    /// Pulls the first complete frame out of `buf`, consuming it (and any
    /// noise bytes around it) from the buffer. `None` if no full frame yet.
    fn extract_frame(buf: &mut BytesMut) -> Option<BytesMut> {
        let start = buf.iter().position(|b| *b == BLOCK_HEADER)?;

        // MLLP is synchronous (one message outstanding until its ACK), so the
        // footer is expected right at the end; search from there.
        let end = buf.as_ref().windows(2).rposition(|w| w == BLOCK_FOOTER)?;
        if end < start {
            trace!("MLLP: footer bytes found only before the header, waiting for more data");
            return None;
        }

        let mut frame = buf.split_to(end + 2); // consume through the footer
        frame.truncate(end); // drop the footer
        frame.advance(start + 1); // drop pre-header noise and the header byte
        Some(frame)
    }
}

// Encodes an outgoing payload (primary message or ACK) as one MLLP frame.
impl Encoder<BytesMut> for MllpCodec {
    type Error = std::io::Error;

    fn encode(&mut self, item: BytesMut, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.reserve(item.len() + 3);
        dst.put_u8(BLOCK_HEADER);
        dst.put_slice(&item);
        dst.put_slice(&BLOCK_FOOTER);

        debug!("MLLP: encoded {} byte frame for send", dst.len());
        Ok(())
    }
}

impl Decoder for MllpCodec {
    type Item = BytesMut; // raw payload bytes, HL7 parsing happens elsewhere
    type Error = std::io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let result = if self.buffer.is_empty() {
            trace!("MLLP: decoding from the read buffer directly");
            Self::extract_frame(src)
        } else {
            // A previous call left a partial frame behind; append the new
            // bytes and retry against the combined buffer.
            self.buffer.reserve(src.len());
            self.buffer.put_slice(src);
            src.advance(src.len());

            trace!("MLLP: decoding from carried-over + new bytes");
            Self::extract_frame(&mut self.buffer)
        };

        if result.is_none() && self.buffer.is_empty() {
            // No full frame and nothing carried over yet: stash what we have
            // so the next read can complete it. Consuming src keeps tokio's
            // framing loop happy.
            self.buffer.reserve(src.len());
            self.buffer.put_slice(src);
            src.advance(src.len());
        }

        Ok(result)
    }
}
