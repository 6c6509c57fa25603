use image::RgbImage;
use imageproc::point::Point;

/// Boundary of one connected region of the edge map, every traced point kept
#[derive(Debug, Clone)]
pub struct Contour {
    pub points: Vec<Point<i32>>,
}

impl Contour {
    pub fn new(points: Vec<Point<i32>>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Enclosed area of the closed polygon through the points (shoelace formula).
    /// Open or degenerate contours enclose little or nothing.
    pub fn area(&self) -> f64 {
        if self.points.len() < 3 {
            return 0.0;
        }

        let mut twice_area: i64 = 0;
        for (i, p) in self.points.iter().enumerate() {
            let q = &self.points[(i + 1) % self.points.len()];
            twice_area += p.x as i64 * q.y as i64 - q.x as i64 * p.y as i64;
        }

        (twice_area as f64 / 2.0).abs()
    }
}

/// Axis-aligned rectangle in working-resolution pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn is_within(&self, width: u32, height: u32) -> bool {
        self.right() <= width && self.bottom() <= height
    }
}

/// Outcome of isolating one photo
#[derive(Debug, Clone)]
pub struct Isolation {
    /// The masked and cropped card
    pub card: RgbImage,
    /// Crop rectangle actually used, after clamping
    pub crop: BoundingBox,
    /// Whether the margin had to be clamped at the image border
    pub clamped: bool,
    pub contour_count: usize,
    pub contour_area: f64,
}
