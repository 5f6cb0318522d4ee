use crate::draw::bounds::PixelRect;
use crate::draw::model::Color;
use anyhow::{anyhow, Context, Result};
use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine as _};
use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder, Rgba, RgbaImage};

pub fn blank_canvas(width: u32, height: u32, fill: Color) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba(fill.to_rgba_array()))
}

pub fn blend_pixel(bottom: Rgba<u8>, top: Color) -> Rgba<u8> {
    let sa = top.a as f32 / 255.0;
    let da = bottom[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);

    if out_a <= f32::EPSILON {
        return Rgba([0, 0, 0, 0]);
    }

    let blend = |s: u8, d: u8| -> u8 {
        (((s as f32 * sa) + (d as f32 * da * (1.0 - sa))) / out_a)
            .round()
            .clamp(0.0, 255.0) as u8
    };

    Rgba([
        blend(top.r, bottom[0]),
        blend(top.g, bottom[1]),
        blend(top.b, bottom[2]),
        (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
    ])
}

/// Copies `rect` out of `source` into a new minimal bitmap.
pub fn crop(source: &RgbaImage, rect: PixelRect) -> Result<RgbaImage> {
    if !rect.fits_within(source.width(), source.height()) {
        return Err(anyhow!(
            "crop {:?} does not fit a {}x{} bitmap",
            rect,
            source.width(),
            source.height()
        ));
    }
    Ok(image::imageops::crop_imm(source, rect.x, rect.y, rect.width, rect.height).to_image())
}

pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes)
        .write_image(image.as_raw(), image.width(), image.height(), ColorType::Rgba8)
        .context("encode capture as png")?;
    Ok(bytes)
}

pub fn png_data_url(png: &[u8]) -> String {
    format!("data:image/png;base64,{}", BASE64_STANDARD.encode(png))
}

/// Decodes a bare base64 payload or a `data:<mime>;base64,<payload>` URL.
pub fn decode_base64_payload(payload: &str) -> Result<Vec<u8>> {
    let payload = payload.trim();
    let encoded = match payload.strip_prefix("data:") {
        Some(rest) => {
            let (_, data) = rest
                .split_once(',')
                .ok_or_else(|| anyhow!("data url has no payload separator"))?;
            data
        }
        None => payload,
    };
    if encoded.is_empty() {
        return Err(anyhow!("image payload is empty"));
    }
    BASE64_STANDARD
        .decode(encoded)
        .context("decode base64 image payload")
}

pub fn decode_rgba(bytes: &[u8]) -> Result<RgbaImage> {
    let image = image::load_from_memory(bytes).context("decode bitmap")?;
    Ok(image.to_rgba8())
}
