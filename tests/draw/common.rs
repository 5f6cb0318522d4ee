use anyhow::{anyhow, Result};
use image::{Rgba, RgbaImage};
use lastminute_core::draw::composite::{blank_canvas, encode_png, png_data_url};
use lastminute_core::draw::model::{Color, Point, Stroke};
use lastminute_core::draw::{CapturableContainer, ContainerMetrics};

pub const MARKER: Rgba<u8> = Rgba([0, 180, 0, 255]);

pub struct StaticContainer {
    pub bitmap: Option<RgbaImage>,
    pub metrics: ContainerMetrics,
    pub capturable: bool,
}

impl StaticContainer {
    pub fn showing(bitmap: RgbaImage, client: (f32, f32)) -> Self {
        Self {
            bitmap: Some(bitmap),
            metrics: ContainerMetrics {
                scroll_size: client,
                client_size: client,
                scroll_offset: (0.0, 0.0),
            },
            capturable: true,
        }
    }

    pub fn failing(client: (f32, f32)) -> Self {
        Self {
            bitmap: None,
            ..Self::showing(RgbaImage::new(0, 0), client)
        }
    }
}

impl CapturableContainer for StaticContainer {
    fn metrics(&self) -> ContainerMetrics {
        self.metrics
    }

    fn render_bitmap(&self) -> Result<RgbaImage> {
        self.bitmap
            .clone()
            .ok_or_else(|| anyhow!("screenshot backend threw"))
    }

    fn is_capturable(&self) -> bool {
        self.capturable
    }
}

pub fn stroke(points: &[(f32, f32)]) -> Stroke {
    Stroke::from_points(points.iter().map(|&(x, y)| Point::new(x, y)).collect())
}

pub fn png_source(width: u32, height: u32) -> String {
    let png = encode_png(&blank_canvas(width, height, Color::rgba(0, 0, 255, 255))).unwrap();
    png_data_url(&png)
}
