use crate::draw::bounds::PixelRect;
use crate::draw::composite::blend_pixel;
use crate::draw::model::{Stroke, StrokeStyle};
use image::RgbaImage;

/// Pixel bounds touched by a stroke, clipped to the bitmap.
pub fn stroke_pixel_bounds(stroke: &Stroke, style: StrokeStyle, size: (u32, u32)) -> Option<PixelRect> {
    let first = stroke.points().first()?;
    let pad = style.width.max(1.0) / 2.0 + 1.0;
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
    for p in stroke.points() {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    let x0 = (min_x - pad).floor().clamp(0.0, size.0 as f32) as u32;
    let y0 = (min_y - pad).floor().clamp(0.0, size.1 as f32) as u32;
    let x1 = (max_x + pad).ceil().clamp(0.0, size.0 as f32) as u32;
    let y1 = (max_y + pad).ceil().clamp(0.0, size.1 as f32) as u32;
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

pub fn render_strokes<'a, I>(image: &mut RgbaImage, strokes: I, style: StrokeStyle)
where
    I: IntoIterator<Item = &'a Stroke>,
{
    for stroke in strokes {
        render_stroke(image, stroke, style, None);
    }
}

/// Draws a stroke with round caps and joins. Each covered pixel is blended
/// exactly once so translucent ink does not darken where segments overlap.
pub fn render_stroke(image: &mut RgbaImage, stroke: &Stroke, style: StrokeStyle, clip: Option<PixelRect>) {
    if stroke.is_degenerate() {
        return;
    }
    let size = image.dimensions();
    let Some(bounds) = stroke_pixel_bounds(stroke, style, size) else {
        return;
    };
    let Some(area) = clip.map_or(Some(bounds), |clip| intersect(bounds, clip)) else {
        return;
    };

    let radius = style.width.max(1.0) / 2.0;
    let radius_sq = radius * radius;
    let mut coverage = vec![false; (area.width as usize) * (area.height as usize)];

    for segment in stroke.points().windows(2) {
        let (a, b) = (segment[0], segment[1]);
        let seg_x0 = (a.x.min(b.x) - radius).floor().max(area.x as f32) as u32;
        let seg_y0 = (a.y.min(b.y) - radius).floor().max(area.y as f32) as u32;
        let seg_x1 = ((a.x.max(b.x) + radius).ceil().max(0.0) as u32).min(area.right());
        let seg_y1 = ((a.y.max(b.y) + radius).ceil().max(0.0) as u32).min(area.bottom());
        for y in seg_y0..seg_y1 {
            for x in seg_x0..seg_x1 {
                let center = (x as f32 + 0.5, y as f32 + 0.5);
                if point_segment_distance_sq(center, (a.x, a.y), (b.x, b.y)) <= radius_sq {
                    let idx = ((y - area.y) * area.width + (x - area.x)) as usize;
                    coverage[idx] = true;
                }
            }
        }
    }

    for (idx, covered) in coverage.iter().enumerate() {
        if !covered {
            continue;
        }
        let x = area.x + (idx as u32 % area.width);
        let y = area.y + (idx as u32 / area.width);
        let dst = image.get_pixel_mut(x, y);
        *dst = blend_pixel(*dst, style.color);
    }
}

pub fn copy_rect(src: &RgbaImage, dst: &mut RgbaImage, rect: PixelRect) {
    if src.dimensions() != dst.dimensions() || !rect.fits_within(src.width(), src.height()) {
        return;
    }
    for y in rect.y..rect.bottom() {
        for x in rect.x..rect.right() {
            dst.put_pixel(x, y, *src.get_pixel(x, y));
        }
    }
}

fn intersect(a: PixelRect, b: PixelRect) -> Option<PixelRect> {
    let x0 = a.x.max(b.x);
    let y0 = a.y.max(b.y);
    let x1 = a.right().min(b.right());
    let y1 = a.bottom().min(b.bottom());
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

fn point_segment_distance_sq(point: (f32, f32), start: (f32, f32), end: (f32, f32)) -> f32 {
    let (px, py) = point;
    let (x0, y0) = start;
    let vx = end.0 - x0;
    let vy = end.1 - y0;
    let wx = px - x0;
    let wy = py - y0;
    let len_sq = vx * vx + vy * vy;
    if len_sq <= f32::EPSILON {
        return wx * wx + wy * wy;
    }
    let t = ((wx * vx + wy * vy) / len_sq).clamp(0.0, 1.0);
    let dx = px - (x0 + vx * t);
    let dy = py - (y0 + vy * t);
    dx * dx + dy * dy
}
