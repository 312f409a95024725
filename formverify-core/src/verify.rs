use std::{
    ffi::OsString,
    io::Write,
    path::{Path, PathBuf},
    time::Instant,
};

use image::{DynamicImage, ImageDecoder, ImageReader};
use serde::Serialize;
use snafu::{OptionExt, ResultExt};
use tracing::*;

use crate::{
    analysis::bbox::BoxMode,
    annotate::{AnnotationSummary, Annotator, ImageCanvas, load_font},
    consts::*,
    document::ResultDocument,
    error::*,
};

#[derive(Debug, Clone)]
pub struct AnnotateConfig {
    /// Index into `pages` of the result document.
    pub page: usize,
    pub box_mode: BoxMode,
    /// Directory receiving `out-<image name>`.
    pub output_dir: PathBuf,
    /// Label font; a system font is looked up when unset.
    pub font: Option<PathBuf>,
    pub font_size: f32,
    /// Where to write the JSON report, if anywhere.
    pub report: Option<PathBuf>,
}

impl Default for AnnotateConfig {
    fn default() -> Self {
        Self {
            page: 0,
            box_mode: BoxMode::default(),
            output_dir: PathBuf::from("."),
            font: None,
            font_size: DEFAULT_FONT_SIZE,
            report: None,
        }
    }
}

pub struct VerifyOutcome {
    pub output: PathBuf,
    pub summary: AnnotationSummary,
}

#[derive(Serialize)]
struct VerifyReport<'a> {
    image: String,
    json: String,
    output: String,
    page: usize,
    box_mode: BoxMode,
    #[serde(flatten)]
    summary: &'a AnnotationSummary,
}

/// `out-` followed by the file name of `image`, placed in `output_dir`.
///
/// ```
/// use std::path::{Path, PathBuf};
/// use formverify_core::verify::output_path;
/// let output = output_path(Path::new("scans/2019/form.jpg"), Path::new(".")).unwrap();
/// assert_eq!(output, PathBuf::from("./out-form.jpg"));
/// ```
pub fn output_path(image: &Path, output_dir: &Path) -> Result<PathBuf, FormVerifyError> {
    let name = image.file_name().context(OutputNameSnafu {
        path: image.to_string_lossy(),
    })?;

    let mut file = OsString::from(OUTPUT_PREFIX);
    file.push(name);
    Ok(output_dir.join(file))
}

/// Decodes `path` and applies its EXIF orientation.
///
/// Returns the image together with its height before orientation, which is
/// the height recognizer coordinates are given against.
pub fn open_image(path: &Path) -> Result<(DynamicImage, u32), FormVerifyError> {
    let file = path.to_string_lossy().to_string();

    let mut decoder = ImageReader::open(path)
        .context(ReadFileSnafu { path: &file })?
        .with_guessed_format()
        .context(ReadFileSnafu { path: &file })?
        .into_decoder()
        .context(ImageOpenSnafu { path: &file })?;
    let orientation = decoder
        .orientation()
        .context(ImageOpenSnafu { path: &file })?;

    let mut image = DynamicImage::from_decoder(decoder).context(ImageOpenSnafu { path: &file })?;
    let source_height = image.height();
    image.apply_orientation(orientation);

    info!(
        "loaded image {} ({}x{}, {:?})",
        file,
        image.width(),
        image.height(),
        orientation
    );
    Ok((image, source_height))
}

/// Annotates `image_path` with the records of `json_path` and saves the copy.
///
/// Detected texts go to `out` in document order. The page is fully validated
/// before the first box is drawn; the source image is never modified.
pub fn verify<W: Write>(
    image_path: &Path,
    json_path: &Path,
    config: &AnnotateConfig,
    out: &mut W,
) -> Result<VerifyOutcome, FormVerifyError> {
    let start = Instant::now();
    let output = output_path(image_path, &config.output_dir)?;

    let (image, source_height) = open_image(image_path)?;
    let document = ResultDocument::load(json_path)?;
    info!(
        "{} holds {} pages, drawing page {}",
        document.file(),
        document.page_count(),
        config.page
    );
    let page = document.page(config.page)?;

    let font = load_font(config.font.as_deref())?;
    let mut canvas = ImageCanvas::new(image, source_height, font, config.font_size);

    let summary = Annotator::new(config.box_mode).annotate(&page, &mut canvas, out)?;

    canvas.save(&output)?;
    info!(
        "saved {} in {}ms",
        output.display(),
        start.elapsed().as_millis()
    );

    if let Some(report_path) = &config.report {
        write_report(report_path, image_path, json_path, &output, config, &summary)?;
    }

    Ok(VerifyOutcome { output, summary })
}

fn write_report(
    report_path: &Path,
    image_path: &Path,
    json_path: &Path,
    output: &Path,
    config: &AnnotateConfig,
    summary: &AnnotationSummary,
) -> Result<(), FormVerifyError> {
    let report = VerifyReport {
        image: image_path.to_string_lossy().to_string(),
        json: json_path.to_string_lossy().to_string(),
        output: output.to_string_lossy().to_string(),
        page: config.page,
        box_mode: config.box_mode,
        summary,
    };

    let json = serde_json::to_string_pretty(&report).context(ReportSnafu {})?;
    std::fs::write(report_path, json).context(WriteFileSnafu {
        path: report_path.to_string_lossy(),
    })?;

    info!("report written to {}", report_path.display());
    Ok(())
}
