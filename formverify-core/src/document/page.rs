use serde::Serialize;

use crate::analysis::bbox::Quad;

/// One recognized piece of text and the region it was read from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextSpan {
    pub text: String,
    pub bounding_box: Quad,
}

/// The label side of a key/value record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum RecordKey {
    /// A regular key, drawn and printed.
    Field(TextSpan),
    /// A key whose text only groups its values; its region is never read.
    Marker { text: String },
}

impl RecordKey {
    pub fn text(&self) -> &str {
        match self {
            RecordKey::Field(span) => &span.text,
            RecordKey::Marker { text } => text,
        }
    }
}

/// One entry of a record's values.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ValueSpan {
    Text(TextSpan),
    /// Recognizer artifact; never drawn or printed.
    Watermark { text: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyValueRecord {
    pub key: RecordKey,
    pub value: Vec<ValueSpan>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    pub page_no: usize,
    pub key_value_pairs: Vec<KeyValueRecord>,
}
