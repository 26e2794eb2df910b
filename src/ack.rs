//! Transport-level acknowledgments. An ACK only confirms that a frame was
//! received and read; it says nothing about whether the order inside it was
//! usable, and this analyzer never sends a negative acknowledgment.

use chrono::Utc;

use crate::hl7::Message;
use crate::ids::IdGenerator;

/// Message type used when the inbound MSH-9 is absent or unreadable.
const DEFAULT_BASE_TYPE: &str = "O01";

/// Builds the two-segment `ACK^<base>` response for `text`.
///
/// Header parsing here is independent of full order extraction: when MSH-9 or
/// MSH-10 cannot be read we fall back to a default type and a generated
/// control id rather than withhold the acknowledgment.
pub fn compose_ack(text: &str, ids: &dyn IdGenerator) -> String {
    let message = Message::parse(text);
    let msh = message.segment("MSH");

    let message_type = msh.map(|s| s.field(9)).unwrap_or("");
    let base_type = match message_type.split_once('^') {
        Some((_, rest)) => rest
            .split('^')
            .next()
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_BASE_TYPE),
        None if !message_type.is_empty() => message_type,
        None => DEFAULT_BASE_TYPE,
    };

    let control_id = match msh.map(|s| s.field(10)) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => ids.generate("MSG"),
    };

    let timestamp = Utc::now().format("%Y%m%d%H%M%S");
    format!(
        "MSH|^~\\&|LAB_ANALYZER|DUMMY_LAB|ORDER_SYSTEM|HOSPITAL|{}||ACK^{}|{}|P|2.5\rMSA|AA|{}",
        timestamp,
        base_type,
        ids.generate("ACK"),
        control_id
    )
}
