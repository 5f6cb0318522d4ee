use crate::draw::model::{Point, Stroke};

pub const DEFAULT_REGION_PADDING: f32 = 12.0;
pub const DEFAULT_MIN_REGION_SIZE: f32 = 20.0;

/// Axis-aligned box in viewport-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl BoundingBox {
    pub fn new(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Envelope of every point of every non-degenerate stroke.
    pub fn envelope<'a, I>(strokes: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Stroke>,
    {
        let mut points = strokes
            .into_iter()
            .filter(|stroke| !stroke.is_degenerate())
            .flat_map(|stroke| stroke.points().iter().copied());
        let first = points.next()?;
        let mut bounds = Self::new(first.x, first.y, first.x, first.y);
        for point in points {
            bounds.include(point);
        }
        Some(bounds)
    }

    /// Padded and clamped capture region, or `None` when it is too small to be useful.
    pub fn capture_region<'a, I>(
        strokes: I,
        viewport: (f32, f32),
        padding: f32,
        min_size: f32,
    ) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Stroke>,
    {
        let region = Self::envelope(strokes)?
            .padded(padding)
            .clamped(viewport.0, viewport.1);
        if region.width() < min_size || region.height() < min_size {
            return None;
        }
        Some(region)
    }

    pub fn include(&mut self, point: Point) {
        self.min_x = self.min_x.min(point.x);
        self.min_y = self.min_y.min(point.y);
        self.max_x = self.max_x.max(point.x);
        self.max_y = self.max_y.max(point.y);
    }

    pub fn padded(self, pad: f32) -> Self {
        Self::new(
            self.min_x - pad,
            self.min_y - pad,
            self.max_x + pad,
            self.max_y + pad,
        )
    }

    pub fn clamped(self, width: f32, height: f32) -> Self {
        Self::new(
            self.min_x.clamp(0.0, width),
            self.min_y.clamp(0.0, height),
            self.max_x.clamp(0.0, width),
            self.max_y.clamp(0.0, height),
        )
    }

    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }

    pub fn contains_box(&self, other: &BoundingBox) -> bool {
        self.min_x <= other.min_x
            && self.min_y <= other.min_y
            && self.max_x >= other.max_x
            && self.max_y >= other.max_y
    }

    /// Maps the box through per-axis scale factors into a bitmap of the given size.
    pub fn to_pixel_rect(&self, scale: (f32, f32), bitmap: (u32, u32)) -> Option<PixelRect> {
        let (sx, sy) = scale;
        let to_px = |value: f32, limit: u32| -> u32 { value.round().clamp(0.0, limit as f32) as u32 };
        let x0 = to_px(self.min_x * sx, bitmap.0);
        let y0 = to_px(self.min_y * sy, bitmap.1);
        let x1 = to_px(self.max_x * sx, bitmap.0);
        let y1 = to_px(self.max_y * sy, bitmap.1);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(PixelRect {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        })
    }
}

/// Integer rectangle in bitmap pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.width > 0 && self.height > 0 && self.right() <= width && self.bottom() <= height
    }
}
