//! Order extraction: HL7 order text in, structured [`OrderFields`] out.
//!
//! Every field except the ordered test has a documented fallback, so a
//! sloppy sender still produces a reviewable order. OBR-4 is the exception:
//! without a test code there is nothing a result could be composed for, so
//! extraction fails and the message is never stored.

use thiserror::Error;

use crate::hl7::{Message, Segment};
use crate::ids::IdGenerator;
use crate::store::OrderFields;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("OBR segment missing or without test information in field 4")]
    MissingTestField,
    #[error("test code (OBR-4.1) is required but empty")]
    EmptyTestCode,
}

/// Returns the field, or `fallback` when the segment or field is absent or
/// empty.
fn field_or(segment: Option<&Segment>, n: usize, fallback: &str) -> String {
    match segment.map(|s| s.field(n)) {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => fallback.to_string(),
    }
}

/// Reads field `n` from the first of two candidate segments that has it
/// non-empty. The order segments overlap: ORC is preferred, OBR covers for
/// senders that only emit order detail.
fn field_or_else(
    primary: Option<&Segment>,
    n: usize,
    secondary: Option<&Segment>,
    m: usize,
) -> Option<String> {
    for (segment, idx) in [(primary, n), (secondary, m)] {
        if let Some(s) = segment {
            let value = s.field(idx);
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }
    None
}

/// Extracts the order fields this analyzer works with from `text`.
///
/// Deterministic apart from the generated fallbacks for a missing control id
/// and filler order number, which come from `ids`.
pub fn extract_order(text: &str, ids: &dyn IdGenerator) -> Result<OrderFields, ExtractError> {
    let message = Message::parse(text);
    let msh = message.segment("MSH");
    let pid = message.segment("PID");
    let pv1 = message.segment("PV1");
    let orc = message.segment("ORC");
    let obr = message.segment("OBR");

    // The ordered test is the one thing with no fallback.
    let obr_4 = obr.map(|s| s.field(4)).unwrap_or("");
    if obr_4.is_empty() {
        return Err(ExtractError::MissingTestField);
    }
    let mut components = obr_4.split('^');
    let test_code = components.next().unwrap_or("");
    if test_code.is_empty() {
        return Err(ExtractError::EmptyTestCode);
    }
    let test_name = components.next().unwrap_or("");
    let test_coding_system = components.next().unwrap_or("");

    Ok(OrderFields {
        sending_application: field_or(msh, 3, "ORDER_SYSTEM"),
        sending_facility: field_or(msh, 4, "HOSPITAL"),
        message_control_id: field_or(msh, 10, &ids.generate("MSG")),
        patient_id: field_or(pid, 3, "UNKNOWN"),
        patient_name: field_or(pid, 5, "DOE^JOHN"),
        patient_dob: field_or(pid, 7, ""),
        patient_sex: field_or(pid, 8, "U"),
        patient_address: field_or(pid, 11, ""),
        patient_phone: field_or(pid, 13, ""),
        encounter_id: field_or(pv1, 19, ""),
        placer_order_number: field_or_else(orc, 2, obr, 2)
            .unwrap_or_else(|| "ORDER123".to_string()),
        filler_order_number: field_or_else(orc, 3, obr, 3)
            .unwrap_or_else(|| ids.generate("FILLER")),
        ordering_provider: field_or_else(orc, 12, obr, 16).unwrap_or_default(),
        test_code: test_code.to_string(),
        test_name: test_name.to_string(),
        test_coding_system: test_coding_system.to_string(),
    })
}
