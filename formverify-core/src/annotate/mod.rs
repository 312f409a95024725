pub mod canvas;

use std::io::Write;

use glam::Vec2;
use serde::Serialize;
use snafu::ResultExt;
use tracing::*;

pub use canvas::{Canvas, ImageCanvas, load_font};

use crate::{
    analysis::{
        bbox::{Bbox, BoxMode},
        roles::Role,
    },
    document::{Page, RecordKey, TextSpan, ValueSpan},
    error::*,
};

/// One box as it was drawn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawnBox {
    pub text: String,
    pub role: Role,
    pub color: String,
    pub rect: Bbox,
    pub anchor: Vec2,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnnotationSummary {
    pub records: usize,
    pub marker_keys: usize,
    pub watermarks_skipped: usize,
    pub boxes: Vec<DrawnBox>,
}

/// Walks key/value records in document order, drawing each box and
/// printing each text as it goes.
#[derive(Debug, Clone, Copy, Default)]
pub struct Annotator {
    box_mode: BoxMode,
}

impl Annotator {
    pub fn new(box_mode: BoxMode) -> Self {
        Self { box_mode }
    }

    /// Draws every record of `page` on `canvas` and writes the texts to `out`,
    /// one per line.
    ///
    /// A regular key is drawn and printed in the key color, then its values
    /// in the value color. A marker key is neither drawn nor printed and its
    /// values use the marker color. Watermark values are skipped entirely.
    pub fn annotate<C: Canvas, W: Write>(
        &self,
        page: &Page,
        canvas: &mut C,
        out: &mut W,
    ) -> Result<AnnotationSummary, FormVerifyError> {
        let height = canvas.height() as f32;
        let mut summary = AnnotationSummary::default();

        for record in &page.key_value_pairs {
            summary.records += 1;
            trace!(
                "record `{}` with {} values",
                record.key.text(),
                record.value.len()
            );

            let value_role = match &record.key {
                RecordKey::Field(span) => {
                    summary
                        .boxes
                        .push(self.draw_span(canvas, height, span, Role::Key));
                    print_line(out, &span.text)?;
                    Role::Value
                }
                RecordKey::Marker { .. } => {
                    debug!("marker key, key box skipped");
                    summary.marker_keys += 1;
                    Role::MarkerValue
                }
            };

            for value in &record.value {
                match value {
                    ValueSpan::Text(span) => {
                        summary
                            .boxes
                            .push(self.draw_span(canvas, height, span, value_role));
                        print_line(out, &span.text)?;
                    }
                    ValueSpan::Watermark { .. } => summary.watermarks_skipped += 1,
                }
            }
        }

        info!(
            "annotated page {}: {} records, {} boxes, {} marker keys, {} watermarks skipped",
            page.page_no,
            summary.records,
            summary.boxes.len(),
            summary.marker_keys,
            summary.watermarks_skipped
        );
        Ok(summary)
    }

    fn draw_span<C: Canvas>(
        &self,
        canvas: &mut C,
        height: f32,
        span: &TextSpan,
        role: Role,
    ) -> DrawnBox {
        let image_box = span.bounding_box.project(height, self.box_mode);
        debug!(
            "draw {} `{}` at {:?} ({}x{})",
            role.name(),
            span.text,
            image_box.rect.min,
            image_box.rect.width(),
            image_box.rect.height()
        );
        canvas.draw_labeled_box(&image_box, &span.text, role);

        DrawnBox {
            text: span.text.clone(),
            role,
            color: role.color_name().to_string(),
            rect: image_box.rect,
            anchor: image_box.anchor,
        }
    }
}

fn print_line<W: Write>(out: &mut W, text: &str) -> Result<(), FormVerifyError> {
    writeln!(out, "{text}").context(ConsoleSnafu { stage: "print" })
}
