pub mod analysis;
pub mod annotate;
pub mod consts;
pub mod document;
pub mod error;
pub mod verify;

// Re-export commonly used types
pub use annotate::{AnnotationSummary, Annotator, Canvas, ImageCanvas};
pub use document::{KeyValueRecord, Page, RecordKey, ResultDocument, TextSpan, ValueSpan};
pub use error::FormVerifyError;
pub use verify::{AnnotateConfig, VerifyOutcome, verify};
