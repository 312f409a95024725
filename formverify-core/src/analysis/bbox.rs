use glam::Vec2;
use imageproc::rect::Rect;
use serde::Serialize;

/// A 2D axis-aligned bounding box in image space, represented by minimum and maximum points.
///
/// Image space has its origin at the top-left corner with Y increasing downward,
/// so `min` is the top-left corner and `max` the bottom-right one.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Bbox {
    /// The minimum point of the bounding box (top-left corner).
    pub min: Vec2,
    /// The maximum point of the bounding box (bottom-right corner).
    pub max: Vec2,
}

impl Bbox {
    /// Creates a new bounding box from minimum and maximum points.
    ///
    /// # Example
    /// ```
    /// use glam::Vec2;
    /// use formverify_core::analysis::bbox::Bbox;
    /// let bbox = Bbox::new(Vec2::new(0.0, 0.0), Vec2::new(10.0, 5.0));
    /// assert_eq!(bbox.width(), 10.0);
    /// ```
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Creates the smallest bounding box holding both points, whatever their order.
    ///
    /// # Example
    /// ```
    /// use glam::Vec2;
    /// use formverify_core::analysis::bbox::Bbox;
    /// let bbox = Bbox::from_points(Vec2::new(85.0, 43.0), Vec2::new(45.0, 31.0));
    /// assert_eq!(bbox.min, Vec2::new(45.0, 31.0));
    /// assert_eq!(bbox.max, Vec2::new(85.0, 43.0));
    /// ```
    pub fn from_points(a: Vec2, b: Vec2) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// Creates a union bounding box that encompasses both this bounding box and another.
    ///
    /// # Example
    /// ```
    /// use glam::Vec2;
    /// use formverify_core::analysis::bbox::Bbox;
    ///
    /// let bbox1 = Bbox::new(Vec2::new(0.0, 0.0), Vec2::new(5.0, 5.0));
    /// let bbox2 = Bbox::new(Vec2::new(3.0, 3.0), Vec2::new(8.0, 8.0));
    /// let union = bbox1.union(&bbox2);
    ///
    /// assert_eq!(union.min, Vec2::new(0.0, 0.0));
    /// assert_eq!(union.max, Vec2::new(8.0, 8.0));
    /// ```
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Rounds the box to whole pixels and clips it to a `width` x `height` canvas.
    ///
    /// Both edges are inclusive, so a box whose edges round to the same pixel
    /// becomes a 1-pixel line rather than an empty rectangle. Edges beyond the
    /// canvas are pulled to one pixel outside it, keeping them off-canvas while
    /// bounding the rectangle size. Returns `None` when nothing of the box
    /// lands on the canvas.
    ///
    /// # Example
    /// ```
    /// use glam::Vec2;
    /// use formverify_core::analysis::bbox::Bbox;
    /// let bbox = Bbox::new(Vec2::new(-3e9, 31.0), Vec2::new(3e9, 43.0));
    /// let rect = bbox.clip_rect(200, 500).unwrap();
    /// assert_eq!((rect.left(), rect.right()), (-1, 200));
    /// assert!(Bbox::new(Vec2::new(300.0, 0.0), Vec2::new(400.0, 9.0)).clip_rect(200, 500).is_none());
    /// ```
    pub fn clip_rect(&self, width: u32, height: u32) -> Option<Rect> {
        if width == 0 || height == 0 {
            return None;
        }
        let (width, height) = (width as i64, height as i64);

        // f32 -> i64 casts saturate, NaN maps to 0
        let left = self.min.x.round() as i64;
        let top = self.min.y.round() as i64;
        let right = (self.max.x.round() as i64).max(left);
        let bottom = (self.max.y.round() as i64).max(top);

        if right < 0 || bottom < 0 || left >= width || top >= height {
            return None;
        }

        let left = left.max(-1);
        let top = top.max(-1);
        let right = right.min(width);
        let bottom = bottom.min(height);

        Some(
            Rect::at(left as i32, top as i32)
                .of_size((right - left + 1) as u32, (bottom - top + 1) as u32),
        )
    }
}

/// How a corner quadrilateral becomes an axis-aligned rectangle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BoxMode {
    /// Left/top from corner 0, right from corner 1, bottom from corner 3.
    ///
    /// Only correct for corners ordered top-left, top-right, bottom-right, bottom-left.
    #[default]
    Corners,
    /// Smallest rectangle holding all four corners, for any winding order.
    Enclosing,
}

/// A rectangle ready to draw: the region plus where its label goes.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ImageBox {
    pub rect: Bbox,
    pub anchor: Vec2,
}

/// Four corners of a detected text region in Cartesian coordinates
/// ((0,0) is the bottom-left of the image).
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Quad {
    pub corners: [Vec2; 4],
}

impl Quad {
    pub fn new(corners: [Vec2; 4]) -> Self {
        Self { corners }
    }

    /// Builds a quad from the flat `[x0, y0, x1, y1, x2, y2, x3, y3]` layout.
    ///
    /// # Example
    /// ```
    /// use formverify_core::analysis::bbox::Quad;
    /// let quad = Quad::from_flat([45.0, 469.0, 85.0, 469.0, 85.0, 457.0, 45.0, 457.0]);
    /// assert_eq!(quad.corners[3].y, 457.0);
    /// ```
    pub fn from_flat(values: [f32; 8]) -> Self {
        Self {
            corners: [
                Vec2::new(values[0], values[1]),
                Vec2::new(values[2], values[3]),
                Vec2::new(values[4], values[5]),
                Vec2::new(values[6], values[7]),
            ],
        }
    }

    /// Flips every corner into image coordinates for an image `image_height` pixels tall.
    ///
    /// For each point: x stays, y becomes `image_height - y`.
    pub fn to_image(&self, image_height: f32) -> Self {
        Self {
            corners: self
                .corners
                .map(|corner| Vec2::new(corner.x, image_height - corner.y)),
        }
    }

    /// Converts the quad to a drawable image-space rectangle.
    ///
    /// # Example
    /// ```
    /// use glam::Vec2;
    /// use formverify_core::analysis::bbox::{BoxMode, Quad};
    /// let quad = Quad::from_flat([45.0, 469.0, 85.0, 469.0, 85.0, 457.0, 45.0, 457.0]);
    /// let image_box = quad.project(500.0, BoxMode::Corners);
    /// assert_eq!(image_box.rect.min, Vec2::new(45.0, 31.0));
    /// assert_eq!(image_box.rect.max, Vec2::new(85.0, 43.0));
    /// assert_eq!(image_box.anchor, Vec2::new(45.0, 31.0));
    /// ```
    pub fn project(&self, image_height: f32, mode: BoxMode) -> ImageBox {
        let image = self.to_image(image_height);
        let [c0, c1, _, c3] = image.corners;

        match mode {
            BoxMode::Corners => ImageBox {
                rect: Bbox::from_points(c0, Vec2::new(c1.x, c3.y)),
                anchor: c0,
            },
            BoxMode::Enclosing => {
                let rect = image.corners[1..]
                    .iter()
                    .fold(Bbox::new(c0, c0), |acc, corner| {
                        acc.union(&Bbox::new(*corner, *corner))
                    });
                ImageBox {
                    rect,
                    anchor: rect.min,
                }
            }
        }
    }
}
