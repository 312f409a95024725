/// Key text marking a record whose key is only a grouping marker.
///
/// Records with such a key get no key box; their values are drawn with the
/// marker color instead.
pub const MARKER_KEY: &str = "_Tokens_";

/// Value text emitted by the recognizer that is never rendered or printed.
pub const WATERMARK: &str = "thisisawatermark";

/// Prefix of the annotated output file name.
pub const OUTPUT_PREFIX: &str = "out-";

/// Number of values in a bounding box: 4 (x, y) corners.
pub const BOUNDING_BOX_LEN: usize = 8;

/// Fill applied inside every box, blended over the scan (50% alpha).
pub const FILL_COLOR: [u8; 4] = [50, 50, 50, 128];

/// Outline width in pixels.
pub const STROKE_WIDTH: u32 = 1;

/// Pixel scale of label text when none is configured.
pub const DEFAULT_FONT_SIZE: f32 = 16.0;

/// Fonts tried in order when no font path is given on the command line.
pub const FONT_SEARCH_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/Library/Fonts/Arial.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];
