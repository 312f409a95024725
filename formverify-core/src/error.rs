use snafu::prelude::*;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum FormVerifyError {
    #[snafu(display("Open image `{}` error: {}", path, source))]
    ImageOpen {
        source: image::ImageError,
        path: String,
    },
    #[snafu(display("Image Write `{}` error: {}", path, source))]
    ImageWrite {
        source: image::ImageError,
        path: String,
    },
    #[snafu(display("Read `{}` error: {}", path, source))]
    ReadFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Write `{}` error: {}", path, source))]
    WriteFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Parse json `{}` error: {}", path, source))]
    JsonParse {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Missing field `{}` in `{}`", field, file))]
    MissingField { file: String, field: String },
    #[snafu(display("Field `{}` in `{}` is not {}", field, file, expected))]
    UnexpectedType {
        file: String,
        field: String,
        expected: String,
    },
    #[snafu(display("Invalid number `{}` at `{}` in `{}`", value, field, file))]
    NumberFormat {
        file: String,
        field: String,
        value: String,
    },
    #[snafu(display(
        "Bounding box `{}` in `{}` has {} entries, expected 8",
        field,
        file,
        len
    ))]
    BoundingBoxLength {
        file: String,
        field: String,
        len: usize,
    },
    #[snafu(display("Read font `{}` error: {}", path, source))]
    FontRead {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Load Font error: {}", source))]
    Font { source: ab_glyph::InvalidFont },
    #[snafu(display("Can not derive output name from `{}`", path))]
    OutputName { path: String },
    #[snafu(display("Serialize report error: {}", source))]
    Report { source: serde_json::Error },
    #[snafu(display("Console `{}` error: {}", stage, source))]
    Console {
        source: std::io::Error,
        stage: String,
    },
}
