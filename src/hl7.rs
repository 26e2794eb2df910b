//! Just enough HL7v2 structure to read the handful of fields this analyzer
//! cares about: segments split on carriage returns, fields on `|`,
//! components on `^`. No schema validation, no escape-sequence handling.

/// One parsed HL7 message, borrowing from the source text.
pub struct Message<'a> {
    segments: Vec<Segment<'a>>,
}

/// One segment (line) of an HL7 message.
pub struct Segment<'a> {
    fields: Vec<&'a str>,
}

impl<'a> Message<'a> {
    /// Splits `text` into segments. Segments are CR-separated on the wire;
    /// LF is tolerated for hand-typed test traffic. Empty lines are skipped.
    pub fn parse(text: &'a str) -> Message<'a> {
        let segments = text
            .split(['\r', '\n'])
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| Segment {
                fields: line.split('|').collect(),
            })
            .collect();
        Message { segments }
    }

    /// The first segment with the given id (e.g. `"PID"`), if any.
    pub fn segment(&self, name: &str) -> Option<&Segment<'a>> {
        self.segments.iter().find(|s| s.name() == name)
    }
}

impl<'a> Segment<'a> {
    /// The segment id, e.g. `"MSH"`.
    pub fn name(&self) -> &'a str {
        self.fields.first().copied().unwrap_or("")
    }

    /// The 1-based HL7 field `n`, or `""` when absent.
    ///
    /// MSH numbers its fields around the separators themselves: MSH-1 is the
    /// field separator, MSH-2 the encoding characters, so MSH-n for n >= 2
    /// sits one split-index earlier than in every other segment.
    pub fn field(&self, n: usize) -> &'a str {
        let index = match (self.name(), n) {
            (_, 0) => return self.name(),
            ("MSH", 1) => return "|",
            ("MSH", n) => n - 1,
            (_, n) => n,
        };
        self.fields.get(index).copied().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORDER: &str = "MSH|^~\\&|CPOE|WESTCLINIC|LAB_ANALYZER|LAB|20250811120000||ORM^O01|MSG0042|P|2.5\r\
                         PID|1||PAT123||SMITH^JANE||19840221|F|||12 ELM ST^^SPRINGFIELD||555-0100\r\
                         PV1|1|O|||||||||||||||||ENC77\r\
                         ORC|NW|PLACER9|FILLER3||||||20250811|||DR^WHO\r\
                         OBR|1|PLACER9|FILLER3|BMP^Basic metabolic panel^L";

    #[test]
    fn msh_fields_use_the_separator_offset() {
        let msg = Message::parse(ORDER);
        let msh = msg.segment("MSH").unwrap();
        assert_eq!(msh.field(1), "|");
        assert_eq!(msh.field(2), "^~\\&");
        assert_eq!(msh.field(3), "CPOE");
        assert_eq!(msh.field(4), "WESTCLINIC");
        assert_eq!(msh.field(9), "ORM^O01");
        assert_eq!(msh.field(10), "MSG0042");
    }

    #[test]
    fn other_segments_index_directly() {
        let msg = Message::parse(ORDER);
        let pid = msg.segment("PID").unwrap();
        assert_eq!(pid.field(3), "PAT123");
        assert_eq!(pid.field(5), "SMITH^JANE");
        assert_eq!(pid.field(8), "F");

        let pv1 = msg.segment("PV1").unwrap();
        assert_eq!(pv1.field(19), "ENC77");

        let obr = msg.segment("OBR").unwrap();
        assert_eq!(obr.field(4), "BMP^Basic metabolic panel^L");
    }

    #[test]
    fn absent_fields_and_segments_read_as_empty() {
        let msg = Message::parse(ORDER);
        assert!(msg.segment("OBX").is_none());

        let orc = msg.segment("ORC").unwrap();
        assert_eq!(orc.field(30), "");
    }

    #[test]
    fn newline_separated_input_is_tolerated() {
        let msg = Message::parse("MSH|^~\\&|A|B\nPID|1||P9\n\n");
        assert_eq!(msg.segment("PID").unwrap().field(3), "P9");
    }
}
