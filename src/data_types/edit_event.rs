
use serde_json::Value;
use std::str::FromStr;

#[derive(thiserror::Error, Debug)]
pub enum EditScriptError {
    #[error("event must be a non-empty array, got {value}")]
    NotAnArray { value: String },
    #[error("unknown event kind {kind:?}")]
    UnknownKind { kind: String },
    #[error("{kind} event is missing field #{index}")]
    MissingField { kind: &'static str, index: usize },
    #[error("{kind} event field #{index} must be a string, got {value}")]
    ExpectedString { kind: &'static str, index: usize, value: String },
    #[error("{kind} event field #{index} must be a non-negative integer, got {value}")]
    ExpectedInteger { kind: &'static str, index: usize, value: String },
    #[error("{kind} event field #{index} must be an array, got {value}")]
    ExpectedArray { kind: &'static str, index: usize, value: String },
    #[error("indel type must be \"i\" or \"d\", got {value:?}")]
    IndelType { value: String },
    #[error("orientation must be 0 (forward) or 1 (reversed), got {value}")]
    Orientation { value: String }
}

/// Orientation of one copy produced by a copy-number event
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Orientation {
    /// Copy keeps the reference orientation
    Forward,
    /// Copy is reverse-complemented
    Reverse
}

/// Whether an indel adds or removes bases
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, strum_macros::EnumString)]
pub enum IndelType {
    #[strum(serialize = "i")]
    Insertion,
    #[strum(serialize = "d")]
    Deletion
}

/// The event-specific payload
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum EventKind {
    /// Single base substitution
    Snv {
        position: u64,
        reference: Vec<u8>,
        alternate: Vec<u8>
    },
    /// Small insertion or deletion anchored at `position`
    Indel {
        position: u64,
        length: u64,
        reference: Vec<u8>,
        alternate: Vec<u8>,
        indel_type: IndelType
    },
    /// Duplication, deletion or inversion of `[start, start+length-1]`
    Cnv {
        start: u64,
        length: u64,
        copies: u32,
        orientations: Vec<Orientation>
    },
    /// Whole chromosome gain or loss; handled by which haplotypes exist
    Aneuploidy
}

/// One entry in the edit script for a clone
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EditEvent {
    /// The chromosome the event applies to
    chrom: String,
    /// The haplotype lineage that carries the event
    lineage: String,
    /// The event details
    kind: EventKind
}

impl EditEvent {
    /// General constructor
    pub fn new(chrom: String, lineage: String, kind: EventKind) -> Self {
        Self {
            chrom, lineage, kind
        }
    }

    /// Returns true if this event is inherited by the haplotype with the given label.
    /// Haplotype labels extend their ancestor lineage, so any label containing the lineage descends from it.
    pub fn applies_to(&self, chrom: &str, haplotype_label: &str) -> bool {
        self.chrom == chrom && haplotype_label.contains(self.lineage.as_str())
    }

    // getters
    pub fn chrom(&self) -> &str {
        &self.chrom
    }

    pub fn kind(&self) -> &EventKind {
        &self.kind
    }
}

impl TryFrom<&Value> for EditEvent {
    type Error = EditScriptError;

    /// Parses one event tuple, e.g. `["snv", "chr1", "A", 50, "A", "T"]`
    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        let fields = match value.as_array() {
            Some(f) if !f.is_empty() => f,
            _ => return Err(EditScriptError::NotAnArray { value: value.to_string() })
        };
        let kind_label = fields[0].as_str()
            .ok_or(EditScriptError::NotAnArray { value: value.to_string() })?;

        let (kind_name, kind): (&'static str, fn(&[Value]) -> Result<EventKind, EditScriptError>) = match kind_label {
            "snv" => ("snv", parse_snv),
            "indel" => ("indel", parse_indel),
            "cnv" => ("cnv", parse_cnv),
            "aneu" => ("aneu", |_| Ok(EventKind::Aneuploidy)),
            other => return Err(EditScriptError::UnknownKind { kind: other.to_string() })
        };

        let chrom = string_field(fields, kind_name, 1)?;
        let lineage = string_field(fields, kind_name, 2)?;
        let kind = kind(fields)?;
        Ok(EditEvent::new(chrom, lineage, kind))
    }
}

fn parse_snv(fields: &[Value]) -> Result<EventKind, EditScriptError> {
    Ok(EventKind::Snv {
        position: integer_field(fields, "snv", 3)?,
        reference: string_field(fields, "snv", 4)?.into_bytes(),
        alternate: string_field(fields, "snv", 5)?.into_bytes()
    })
}

fn parse_indel(fields: &[Value]) -> Result<EventKind, EditScriptError> {
    let raw_type = string_field(fields, "indel", 7)?;
    let indel_type = IndelType::from_str(&raw_type)
        .map_err(|_| EditScriptError::IndelType { value: raw_type })?;
    Ok(EventKind::Indel {
        position: integer_field(fields, "indel", 3)?,
        length: integer_field(fields, "indel", 4)?,
        reference: string_field(fields, "indel", 5)?.into_bytes(),
        alternate: string_field(fields, "indel", 6)?.into_bytes(),
        indel_type
    })
}

fn parse_cnv(fields: &[Value]) -> Result<EventKind, EditScriptError> {
    let copies = integer_field(fields, "cnv", 5)?;
    let raw_orientations = fields.get(6)
        .ok_or(EditScriptError::MissingField { kind: "cnv", index: 6 })?;
    let orientations = raw_orientations.as_array()
        .ok_or(EditScriptError::ExpectedArray { kind: "cnv", index: 6, value: raw_orientations.to_string() })?
        .iter()
        .map(|o| match as_integer(o) {
            Some(0) => Ok(Orientation::Forward),
            Some(1) => Ok(Orientation::Reverse),
            _ => Err(EditScriptError::Orientation { value: o.to_string() })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(EventKind::Cnv {
        start: integer_field(fields, "cnv", 3)?,
        length: integer_field(fields, "cnv", 4)?,
        copies: u32::try_from(copies)
            .map_err(|_| EditScriptError::ExpectedInteger { kind: "cnv", index: 5, value: copies.to_string() })?,
        orientations
    })
}

fn string_field(fields: &[Value], kind: &'static str, index: usize) -> Result<String, EditScriptError> {
    let value = fields.get(index)
        .ok_or(EditScriptError::MissingField { kind, index })?;
    value.as_str()
        .map(|s| s.to_string())
        .ok_or(EditScriptError::ExpectedString { kind, index, value: value.to_string() })
}

fn integer_field(fields: &[Value], kind: &'static str, index: usize) -> Result<u64, EditScriptError> {
    let value = fields.get(index)
        .ok_or(EditScriptError::MissingField { kind, index })?;
    as_integer(value)
        .ok_or(EditScriptError::ExpectedInteger { kind, index, value: value.to_string() })
}

/// Accepts integers, and floats with no fractional part (upstream sometimes writes `12.0`)
fn as_integer(value: &Value) -> Option<u64> {
    if let Some(i) = value.as_u64() {
        return Some(i);
    }
    value.as_f64()
        .filter(|f| *f >= 0.0 && f.fract() == 0.0)
        .map(|f| f as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_snv() {
        let event = EditEvent::try_from(&json!(["snv", "chr1", "A", 50, "A", "T"])).unwrap();
        assert_eq!(event.chrom(), "chr1");
        assert!(event.applies_to("chr1", "A"));
        assert!(!event.applies_to("chr1", "B"));
        assert_eq!(event.kind(), &EventKind::Snv {
            position: 50, reference: b"A".to_vec(), alternate: b"T".to_vec()
        });
    }

    #[test]
    fn test_parse_indel() {
        let event = EditEvent::try_from(&json!(["indel", "chr2", "B1", 10, 3, "A", "ACGT", "i"])).unwrap();
        assert_eq!(event.kind(), &EventKind::Indel {
            position: 10, length: 3,
            reference: b"A".to_vec(), alternate: b"ACGT".to_vec(),
            indel_type: IndelType::Insertion
        });

        let event = EditEvent::try_from(&json!(["indel", "chr2", "B1", 10.0, 2, "ACG", "A", "d"])).unwrap();
        assert!(matches!(event.kind(), EventKind::Indel { position: 10, length: 2, indel_type: IndelType::Deletion, .. }));

        let result = EditEvent::try_from(&json!(["indel", "chr2", "B1", 10, 2, "ACG", "A", "x"]));
        assert!(matches!(result, Err(EditScriptError::IndelType { .. })));
    }

    #[test]
    fn test_parse_cnv() {
        let event = EditEvent::try_from(&json!(["cnv", "chr1", "A", 10, 11, 2, [0, 1]])).unwrap();
        assert_eq!(event.kind(), &EventKind::Cnv {
            start: 10, length: 11, copies: 2,
            orientations: vec![Orientation::Forward, Orientation::Reverse]
        });

        let result = EditEvent::try_from(&json!(["cnv", "chr1", "A", 10, 11, 2, [0, 2]]));
        assert!(matches!(result, Err(EditScriptError::Orientation { .. })));
        let result = EditEvent::try_from(&json!(["cnv", "chr1", "A", 10, 11, 2]));
        assert!(matches!(result, Err(EditScriptError::MissingField { kind: "cnv", index: 6 })));
    }

    #[test]
    fn test_parse_aneuploidy() {
        let event = EditEvent::try_from(&json!(["aneu", "chr3", "B", 1])).unwrap();
        assert_eq!(event.kind(), &EventKind::Aneuploidy);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(EditEvent::try_from(&json!([])), Err(EditScriptError::NotAnArray { .. })));
        assert!(matches!(EditEvent::try_from(&json!({"a": 1})), Err(EditScriptError::NotAnArray { .. })));
        assert!(matches!(EditEvent::try_from(&json!(["sv", "chr1", "A"])), Err(EditScriptError::UnknownKind { .. })));
        assert!(matches!(
            EditEvent::try_from(&json!(["snv", "chr1", "A", -5, "A", "T"])),
            Err(EditScriptError::ExpectedInteger { index: 3, .. })
        ));
        assert!(matches!(
            EditEvent::try_from(&json!(["snv", "chr1", 7, 5, "A", "T"])),
            Err(EditScriptError::ExpectedString { index: 2, .. })
        ));
    }

    #[test]
    fn test_applies_to() {
        let event = EditEvent::new("chr1".to_string(), "A".to_string(), EventKind::Aneuploidy);
        assert!(event.applies_to("chr1", "A"));
        assert!(event.applies_to("chr1", "A1"));
        assert!(event.applies_to("chr1", "AA2"));
        assert!(!event.applies_to("chr1", "B1"));
        assert!(!event.applies_to("chr2", "A1"));

        let event = EditEvent::new("chr1".to_string(), "A1".to_string(), EventKind::Aneuploidy);
        assert!(event.applies_to("chr1", "A1"));
        assert!(event.applies_to("chr1", "A12"));
        assert!(!event.applies_to("chr1", "A2"));
    }
}
