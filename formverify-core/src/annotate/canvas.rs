use std::path::{Path, PathBuf};

use ab_glyph::{FontArc, PxScale};
use image::{DynamicImage, Rgba, RgbaImage};
use imageproc::drawing::{Blend, draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;
use snafu::ResultExt;
use tracing::*;

use crate::{
    analysis::{bbox::ImageBox, roles::Role},
    consts::*,
    error::*,
};

// keeps glyph offsets inside i32 for anchors far off the image
const TEXT_COORD_LIMIT: f32 = 1_000_000.0;

/// Surface the annotator draws on.
pub trait Canvas {
    /// Height used to flip Cartesian coordinates into image space.
    fn height(&self) -> u32;

    /// Fills `image_box` with the translucent overlay, outlines it and writes
    /// `label` at its anchor, all in the color of `role`.
    fn draw_labeled_box(&mut self, image_box: &ImageBox, label: &str, role: Role);
}

/// In-memory RGBA copy of the scan; every draw is alpha blended onto it.
pub struct ImageCanvas {
    image: Blend<RgbaImage>,
    source_height: u32,
    has_alpha: bool,
    font: Option<FontArc>,
    font_scale: PxScale,
}

impl ImageCanvas {
    /// Wraps `image` for drawing.
    ///
    /// `source_height` is the height the coordinates refer to; it differs from
    /// the buffer height when the scan was rotated by its EXIF orientation.
    /// Without a font, boxes are still drawn but labels are left out.
    pub fn new(
        image: DynamicImage,
        source_height: u32,
        font: Option<FontArc>,
        font_size: f32,
    ) -> Self {
        let has_alpha = image.color().has_alpha();

        Self {
            image: Blend(image.to_rgba8()),
            source_height,
            has_alpha,
            font,
            font_scale: PxScale::from(font_size),
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.0.dimensions()
    }

    /// Returns the annotated image, dropping the alpha channel if the scan had none.
    pub fn into_image(self) -> DynamicImage {
        let image = DynamicImage::ImageRgba8(self.image.0);
        if self.has_alpha {
            image
        } else {
            DynamicImage::ImageRgb8(image.to_rgb8())
        }
    }

    /// Encodes the annotated image; the format follows the extension of `output`.
    pub fn save<P: AsRef<Path>>(self, output: P) -> Result<(), FormVerifyError> {
        self.into_image()
            .save(output.as_ref())
            .context(ImageWriteSnafu {
                path: output.as_ref().to_string_lossy(),
            })
    }
}

impl Canvas for ImageCanvas {
    fn height(&self) -> u32 {
        self.source_height
    }

    fn draw_labeled_box(&mut self, image_box: &ImageBox, label: &str, role: Role) {
        let (width, height) = self.dimensions();
        let color = Rgba(role.rgba());

        match image_box.rect.clip_rect(width, height) {
            Some(rect) => {
                draw_filled_rect_mut(&mut self.image, rect, Rgba(FILL_COLOR));

                // Draw nested rectangles for strokes wider than one pixel
                for offset in 0..STROKE_WIDTH as i32 {
                    let stroke = Rect::at(rect.left() - offset, rect.top() - offset).of_size(
                        rect.width() + (offset * 2) as u32,
                        rect.height() + (offset * 2) as u32,
                    );
                    draw_hollow_rect_mut(&mut self.image, stroke, color);
                }
            }
            None => debug!("box of `{}` lies outside the {}x{} image", label, width, height),
        }

        if let Some(font) = &self.font {
            // the anchor is the text baseline, so the label sits on top of the box
            let text_x = image_box.anchor.x.round().clamp(-TEXT_COORD_LIMIT, TEXT_COORD_LIMIT);
            let text_y = (image_box.anchor.y - self.font_scale.y)
                .round()
                .clamp(-TEXT_COORD_LIMIT, TEXT_COORD_LIMIT);
            draw_text_mut(
                &mut self.image,
                color,
                text_x as i32,
                text_y as i32,
                self.font_scale,
                font,
                label,
            );
        }
    }
}

/// Loads the label font from `path`, or from the first usable system font.
///
/// An explicit path must load. Without one, `Ok(None)` means no system font
/// was found and labels will be skipped.
pub fn load_font(path: Option<&Path>) -> Result<Option<FontArc>, FormVerifyError> {
    if let Some(path) = path {
        return read_font(path).map(Some);
    }

    for candidate in FONT_SEARCH_PATHS.iter().map(PathBuf::from) {
        if !candidate.is_file() {
            continue;
        }
        match read_font(&candidate) {
            Ok(font) => {
                debug!("using font {}", candidate.display());
                return Ok(Some(font));
            }
            Err(err) => warn!("skip font {}: {}", candidate.display(), err),
        }
    }

    warn!("no usable font found, labels will not be drawn; pass --font to set one");
    Ok(None)
}

fn read_font(path: &Path) -> Result<FontArc, FormVerifyError> {
    let bytes = std::fs::read(path).context(FontReadSnafu {
        path: path.to_string_lossy(),
    })?;

    FontArc::try_from_vec(bytes).context(FontSnafu {})
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::bbox::Bbox;
    use glam::Vec2;
    use image::{GenericImageView, Rgb, RgbImage};

    const FONT: &[u8] = include_bytes!("../../../fonts/DejaVuSans.ttf");

    fn white_canvas(width: u32, height: u32) -> ImageCanvas {
        let image = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));
        ImageCanvas::new(DynamicImage::ImageRgb8(image), height, None, DEFAULT_FONT_SIZE)
    }

    fn white_canvas_with_font(width: u32, height: u32) -> ImageCanvas {
        let image = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));
        let font = FontArc::try_from_slice(FONT).unwrap();
        ImageCanvas::new(
            DynamicImage::ImageRgb8(image),
            height,
            Some(font),
            DEFAULT_FONT_SIZE,
        )
    }

    /// Pixels in the label band: `size` rows above the baseline at `anchor`.
    fn label_band(image: &DynamicImage, anchor: Vec2, size: u32) -> Vec<Rgba<u8>> {
        let (x0, baseline) = (anchor.x as u32, anchor.y as u32);
        (baseline - size..baseline)
            .flat_map(|y| (x0..x0 + 60).map(move |x| (x, y)))
            .map(|(x, y)| image.get_pixel(x, y))
            .collect()
    }

    fn sample_box() -> ImageBox {
        ImageBox {
            rect: Bbox::new(Vec2::new(10.0, 10.0), Vec2::new(30.0, 20.0)),
            anchor: Vec2::new(10.0, 10.0),
        }
    }

    #[test]
    fn test_draw_stroke_and_fill() {
        let mut canvas = white_canvas(100, 60);
        assert_eq!(canvas.height(), 60);

        canvas.draw_labeled_box(&sample_box(), "Name", Role::Key);
        let image = canvas.into_image();
        assert!(!image.color().has_alpha());

        // outline corners in blue
        assert_eq!(image.get_pixel(10, 10), Rgba([0, 0, 255, 255]));
        assert_eq!(image.get_pixel(30, 20), Rgba([0, 0, 255, 255]));

        // interior is white darkened by the translucent gray
        let Rgba([r, g, b, _]) = image.get_pixel(20, 15);
        for channel in [r, g, b] {
            assert!((140..=165).contains(&channel), "channel {channel}");
        }

        // untouched outside the box
        assert_eq!(image.get_pixel(50, 50), Rgba([255, 255, 255, 255]));
        assert_eq!(image.get_pixel(31, 15), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_marker_value_color() {
        let mut canvas = white_canvas(40, 40);
        canvas.draw_labeled_box(&sample_box(), "Contoso", Role::MarkerValue);

        let image = canvas.into_image();
        assert_eq!(image.get_pixel(10, 15), Rgba([128, 0, 128, 255]));
    }

    #[test]
    fn test_box_outside_image_is_clipped() {
        let mut canvas = white_canvas(20, 20);
        let image_box = ImageBox {
            rect: Bbox::new(Vec2::new(-5.0, -40.0), Vec2::new(50.0, -2.0)),
            anchor: Vec2::new(-5.0, -40.0),
        };
        canvas.draw_labeled_box(&image_box, "off page", Role::Value);

        let image = canvas.into_image();
        assert_eq!(image.dimensions(), (20, 20));
        assert_eq!(image.get_pixel(5, 5), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_label_drawn_above_box() {
        let anchor = Vec2::new(20.0, 40.0);
        let image_box = ImageBox {
            rect: Bbox::new(anchor, Vec2::new(110.0, 55.0)),
            anchor,
        };

        let mut canvas = white_canvas_with_font(160, 80);
        canvas.draw_labeled_box(&image_box, "Name", Role::Key);
        let image = canvas.into_image();

        let band = label_band(&image, anchor, DEFAULT_FONT_SIZE as u32);
        let inked: Vec<_> = band
            .iter()
            .filter(|pixel| **pixel != Rgba([255, 255, 255, 255]))
            .collect();
        assert!(inked.len() > 20, "only {} label pixels", inked.len());
        // antialiased glyph pixels are white blended towards blue
        assert!(inked.iter().all(|Rgba([r, g, b, _])| r == g && b >= r));
        assert!(inked.iter().any(|Rgba([r, _, b, _])| *b > 200 && *r < 100));

        // nothing written left of the anchor or below the box
        assert_eq!(image.get_pixel(5, 35), Rgba([255, 255, 255, 255]));
        assert_eq!(image.get_pixel(60, 70), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_label_uses_marker_color() {
        let anchor = Vec2::new(20.0, 40.0);
        let image_box = ImageBox {
            rect: Bbox::new(anchor, Vec2::new(110.0, 55.0)),
            anchor,
        };

        let mut canvas = white_canvas_with_font(160, 80);
        canvas.draw_labeled_box(&image_box, "Contoso", Role::MarkerValue);
        let image = canvas.into_image();

        let band = label_band(&image, anchor, DEFAULT_FONT_SIZE as u32);
        let inked: Vec<_> = band
            .iter()
            .filter(|pixel| **pixel != Rgba([255, 255, 255, 255]))
            .collect();
        assert!(!inked.is_empty());
        // purple keeps red and blue equal, unlike the blue key color
        assert!(inked.iter().all(|Rgba([r, g, b, _])| r == b && g <= r));
        assert!(inked.iter().any(|Rgba([r, g, _, _])| r.saturating_sub(*g) > 60));
    }

    #[test]
    fn test_no_font_leaves_label_band_blank() {
        let anchor = Vec2::new(20.0, 40.0);
        let image_box = ImageBox {
            rect: Bbox::new(anchor, Vec2::new(110.0, 55.0)),
            anchor,
        };

        let mut canvas = white_canvas(160, 80);
        canvas.draw_labeled_box(&image_box, "Name", Role::Key);
        let image = canvas.into_image();

        let band = label_band(&image, anchor, DEFAULT_FONT_SIZE as u32);
        assert!(band.iter().all(|pixel| *pixel == Rgba([255, 255, 255, 255])));
        // the box itself is still there
        assert_eq!(image.get_pixel(20, 40), Rgba([0, 0, 255, 255]));
    }

    #[test]
    fn test_huge_box_is_clipped_to_image() {
        // the Cartesian quad [-3e9, 469, 3e9, 469, 3e9, 457, -3e9, 457] on a 500px tall scan
        let image_box = ImageBox {
            rect: Bbox::new(Vec2::new(-3e9, 31.0), Vec2::new(3e9, 43.0)),
            anchor: Vec2::new(-3e9, 31.0),
        };

        let mut canvas = white_canvas_with_font(200, 500);
        canvas.draw_labeled_box(&image_box, "Total", Role::Key);
        let image = canvas.into_image();

        for x in [0, 100, 199] {
            assert_eq!(image.get_pixel(x, 31), Rgba([0, 0, 255, 255]));
            assert_eq!(image.get_pixel(x, 43), Rgba([0, 0, 255, 255]));
            assert_ne!(image.get_pixel(x, 37), Rgba([255, 255, 255, 255]));
        }
        assert_eq!(image.get_pixel(100, 44), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_box_below_image_is_skipped() {
        let mut canvas = white_canvas(20, 20);
        let image_box = ImageBox {
            rect: Bbox::new(Vec2::new(0.0, 3e9), Vec2::new(f32::MAX, f32::MAX)),
            anchor: Vec2::new(0.0, 3e9),
        };
        canvas.draw_labeled_box(&image_box, "far away", Role::Value);

        let image = canvas.into_image();
        assert!(image.pixels().all(|(_, _, pixel)| pixel == Rgba([255, 255, 255, 255])));
    }

    #[test]
    fn test_alpha_preserved() {
        let image = RgbaImage::from_pixel(8, 8, Rgba([0, 0, 0, 0]));
        let canvas = ImageCanvas::new(DynamicImage::ImageRgba8(image), 8, None, 12.0);
        assert_eq!(canvas.dimensions(), (8, 8));
        assert!(canvas.into_image().color().has_alpha());
    }

    #[test]
    fn test_save_png() -> Result<(), Box<dyn std::error::Error>> {
        let dir = std::env::temp_dir().join(format!("formverify-canvas-{}", std::process::id()));
        std::fs::create_dir_all(&dir)?;
        let output = dir.join("out-scan.png");

        let mut canvas = white_canvas(64, 48);
        canvas.draw_labeled_box(&sample_box(), "Name", Role::Key);
        canvas.save(&output)?;

        let saved = image::open(&output)?;
        assert_eq!(saved.dimensions(), (64, 48));
        assert_eq!(saved.to_rgba8().get_pixel(10, 10), &Rgba([0, 0, 255, 255]));

        std::fs::remove_dir_all(&dir)?;
        Ok(())
    }

    #[test]
    fn test_load_font_errors() {
        let err = load_font(Some(Path::new("/no/such/font.ttf"))).unwrap_err();
        assert!(matches!(err, FormVerifyError::FontRead { .. }));

        let dir = std::env::temp_dir().join(format!("formverify-font-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let bogus = dir.join("bogus.ttf");
        std::fs::write(&bogus, b"not a font").unwrap();

        let err = load_font(Some(&bogus)).unwrap_err();
        assert!(matches!(err, FormVerifyError::Font { .. }));
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
