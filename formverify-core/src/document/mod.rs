pub mod page;

use std::path::Path;

use serde_json::Value;
use snafu::{OptionExt, ResultExt, ensure};
use tracing::*;

pub use page::{KeyValueRecord, Page, RecordKey, TextSpan, ValueSpan};

use crate::{analysis::bbox::Quad, consts::*, error::*};

/// A recognizer result, parsed but not yet projected.
///
/// Only the `pages` array is checked up front. A page is validated and
/// turned into typed records by [`ResultDocument::page`], before anything
/// is drawn from it.
#[derive(Debug)]
pub struct ResultDocument {
    file: String,
    pages: Vec<Value>,
}

impl ResultDocument {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, FormVerifyError> {
        let file = path.as_ref().to_string_lossy().to_string();
        let json = std::fs::read_to_string(path.as_ref()).context(ReadFileSnafu { path: &file })?;

        Self::parse(&json, file)
    }

    /// Parses `json`; `file` names the source in error messages.
    pub fn parse(json: &str, file: impl Into<String>) -> Result<Self, FormVerifyError> {
        let file = file.into();
        let root: Value = serde_json::from_str(json).context(JsonParseSnafu { path: &file })?;

        let Value::Object(mut root) = root else {
            return UnexpectedTypeSnafu {
                file,
                field: "(root)",
                expected: "an object",
            }
            .fail();
        };
        let pages = match root.remove("pages") {
            Some(Value::Array(pages)) => pages,
            Some(_) => {
                return UnexpectedTypeSnafu {
                    file,
                    field: "pages",
                    expected: "an array",
                }
                .fail();
            }
            None => {
                return MissingFieldSnafu {
                    file,
                    field: "pages",
                }
                .fail();
            }
        };

        debug!("parsed `{}` with {} pages", file, pages.len());
        Ok(Self { file, pages })
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Projects `pages[page_no]` into typed key/value records.
    pub fn page(&self, page_no: usize) -> Result<Page, FormVerifyError> {
        let path = format!("pages[{page_no}]");
        let page = self.pages.get(page_no).context(MissingFieldSnafu {
            file: &self.file,
            field: &path,
        })?;

        let projector = Projector { file: &self.file };
        let key_value_pairs = projector
            .array(page, "keyValuePairs", &path)?
            .iter()
            .enumerate()
            .map(|(idx, record)| projector.record(record, &format!("{path}.keyValuePairs[{idx}]")))
            .collect::<Result<Vec<_>, _>>()?;

        info!(
            "projected page {} of `{}`: {} key/value records",
            page_no,
            self.file,
            key_value_pairs.len()
        );
        Ok(Page {
            page_no,
            key_value_pairs,
        })
    }
}

struct Projector<'a> {
    file: &'a str,
}

impl Projector<'_> {
    fn array<'v>(
        &self,
        value: &'v Value,
        name: &str,
        path: &str,
    ) -> Result<&'v [Value], FormVerifyError> {
        let field = join(path, name);

        value
            .get(name)
            .context(MissingFieldSnafu {
                file: self.file,
                field: &field,
            })?
            .as_array()
            .map(Vec::as_slice)
            .context(UnexpectedTypeSnafu {
                file: self.file,
                field: &field,
                expected: "an array",
            })
    }

    fn text(&self, span: &Value, path: &str) -> Result<String, FormVerifyError> {
        let field = join(path, "text");

        match span.get("text") {
            Some(Value::String(text)) => Ok(text.clone()),
            Some(Value::Number(number)) => Ok(number.to_string()),
            Some(_) => UnexpectedTypeSnafu {
                file: self.file,
                field,
                expected: "a string",
            }
            .fail(),
            None => MissingFieldSnafu {
                file: self.file,
                field,
            }
            .fail(),
        }
    }

    fn bounding_box(&self, span: &Value, path: &str) -> Result<Quad, FormVerifyError> {
        let entries = self.array(span, "boundingBox", path)?;
        let field = join(path, "boundingBox");
        ensure!(
            entries.len() == BOUNDING_BOX_LEN,
            BoundingBoxLengthSnafu {
                file: self.file,
                field: &field,
                len: entries.len(),
            }
        );

        let mut flat = [0f32; BOUNDING_BOX_LEN];
        for (idx, (slot, entry)) in flat.iter_mut().zip(entries).enumerate() {
            *slot = self.number(entry, &format!("{field}[{idx}]"))?;
        }

        Ok(Quad::from_flat(flat))
    }

    /// Accepts JSON numbers and strings holding a float literal.
    ///
    /// Any finite double is valid; values beyond the `f32` range saturate to
    /// its bounds and are clipped when drawn.
    fn number(&self, entry: &Value, field: &str) -> Result<f32, FormVerifyError> {
        let parsed = match entry {
            Value::Number(number) => number.as_f64(),
            Value::String(literal) => literal.trim().parse::<f64>().ok(),
            _ => None,
        };

        parsed
            .filter(|value| value.is_finite())
            .map(|value| value.clamp(f32::MIN as f64, f32::MAX as f64) as f32)
            .with_context(|| NumberFormatSnafu {
                file: self.file,
                field,
                value: entry
                    .as_str()
                    .map(str::to_string)
                    .unwrap_or_else(|| entry.to_string()),
            })
    }

    fn record(&self, record: &Value, path: &str) -> Result<KeyValueRecord, FormVerifyError> {
        let key_path = format!("{path}.key[0]");
        let key_span = self
            .array(record, "key", path)?
            .first()
            .context(MissingFieldSnafu {
                file: self.file,
                field: &key_path,
            })?;

        let key_text = self.text(key_span, &key_path)?;
        let key = if key_text.contains(MARKER_KEY) {
            RecordKey::Marker { text: key_text }
        } else {
            let bounding_box = self.bounding_box(key_span, &key_path)?;
            RecordKey::Field(TextSpan {
                text: key_text,
                bounding_box,
            })
        };

        let value = self
            .array(record, "value", path)?
            .iter()
            .enumerate()
            .map(|(idx, span)| -> Result<ValueSpan, FormVerifyError> {
                let span_path = format!("{path}.value[{idx}]");
                let text = self.text(span, &span_path)?;
                if text.contains(WATERMARK) {
                    return Ok(ValueSpan::Watermark { text });
                }
                let bounding_box = self.bounding_box(span, &span_path)?;
                Ok(ValueSpan::Text(TextSpan { text, bounding_box }))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(KeyValueRecord { key, value })
    }
}

fn join(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{path}.{name}")
    }
}
