use std::io::Cursor;

use ab_glyph::{FontRef, InvalidFont, PxScale};
use image::{ImageError, ImageFormat, Rgb, RgbImage};
use imageproc::drawing::draw_text_mut;

use super::font;

pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
pub const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
pub const GRID: Rgb<u8> = Rgb([220, 220, 220]);

/// Pixel surface the charts are drawn on.
pub struct Canvas {
    img: RgbImage,
    font: FontRef<'static>,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Result<Self, InvalidFont> {
        Ok(Self {
            img: RgbImage::from_pixel(width, height, WHITE),
            font: font::load()?,
        })
    }

    pub fn width(&self) -> u32 {
        self.img.width()
    }

    pub fn height(&self) -> u32 {
        self.img.height()
    }

    /// Fills a rectangle, clipped to the canvas.
    pub fn fill_rect(&mut self, x: i64, y: i64, w: u32, h: u32, color: Rgb<u8>) {
        let x0 = x.max(0) as u32;
        let y0 = y.max(0) as u32;
        let x1 = ((x + w as i64).max(0) as u32).min(self.width());
        let y1 = ((y + h as i64).max(0) as u32).min(self.height());
        for py in y0..y1 {
            for px in x0..x1 {
                self.img.put_pixel(px, py, color);
            }
        }
    }

    pub fn hline(&mut self, x: i64, y: i64, len: u32, color: Rgb<u8>) {
        self.fill_rect(x, y, len, 1, color);
    }

    pub fn vline(&mut self, x: i64, y: i64, len: u32, color: Rgb<u8>) {
        self.fill_rect(x, y, 1, len, color);
    }

    /// Draws `text` at `size` px with its top-left corner at (x, y).
    pub fn text(&mut self, x: i64, y: i64, text: &str, size: f32, color: Rgb<u8>) {
        draw_text_mut(&mut self.img, color, x as i32, y as i32, PxScale::from(size), &self.font, text);
    }

    /// Draws `text` horizontally centred on `cx`.
    pub fn text_centered(&mut self, cx: i64, y: i64, text: &str, size: f32, color: Rgb<u8>) {
        let w = self.text_width(text, size) as i64;
        self.text(cx - w / 2, y, text, size, color);
    }

    pub fn text_width(&self, text: &str, size: f32) -> u32 {
        font::text_width(&self.font, text, size)
    }

    pub fn fit_text(&self, text: &str, size: f32, max_width: u32) -> String {
        font::fit_text(&self.font, text, size, max_width)
    }

    /// Fills a full disc split into sectors.
    ///
    /// `start_deg` is measured counter-clockwise from 3 o'clock, each sector
    /// takes `fraction * 360` degrees, continuing counter-clockwise.
    pub fn fill_pie(&mut self, cx: i64, cy: i64, radius: u32, start_deg: f64, sectors: &[(f64, Rgb<u8>)]) {
        let r = radius as i64;
        let r2 = (r * r) as f64;
        for py in (cy - r).max(0)..(cy + r + 1).min(self.height() as i64) {
            for px in (cx - r).max(0)..(cx + r + 1).min(self.width() as i64) {
                let dx = (px - cx) as f64;
                let dy = (cy - py) as f64;
                if dx * dx + dy * dy > r2 {
                    continue;
                }
                let angle = dy.atan2(dx).to_degrees();
                let offset = (angle - start_deg).rem_euclid(360.0) / 360.0;
                if let Some(color) = sector_at(sectors, offset) {
                    self.img.put_pixel(px as u32, py as u32, color);
                }
            }
        }
    }

    pub fn into_png(self) -> Result<Vec<u8>, ImageError> {
        let mut buf = Cursor::new(Vec::new());
        self.img.write_to(&mut buf, ImageFormat::Png)?;
        Ok(buf.into_inner())
    }

    #[cfg(test)]
    pub fn pixel(&self, x: u32, y: u32) -> Rgb<u8> {
        *self.img.get_pixel(x, y)
    }

    #[cfg(test)]
    pub fn image(&self) -> &RgbImage {
        &self.img
    }
}

fn sector_at(sectors: &[(f64, Rgb<u8>)], offset: f64) -> Option<Rgb<u8>> {
    let mut acc = 0.0;
    for (fraction, color) in sectors {
        acc += fraction;
        if offset < acc {
            return Some(*color);
        }
    }
    // rounding can leave a sliver at the very end
    sectors.last().map(|(_, c)| *c)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgb<u8> = Rgb([255, 0, 0]);
    const BLUE: Rgb<u8> = Rgb([0, 0, 255]);

    #[test]
    fn test_fill_rect_clips() {
        let mut canvas = Canvas::new(10, 10).unwrap();
        canvas.fill_rect(-5, 8, 8, 10, RED);
        assert_eq!(canvas.pixel(0, 9), RED);
        assert_eq!(canvas.pixel(2, 9), RED);
        assert_eq!(canvas.pixel(3, 9), WHITE);
        assert_eq!(canvas.pixel(0, 7), WHITE);
    }

    #[test]
    fn test_pie_sectors_follow_start_angle() {
        let mut canvas = Canvas::new(101, 101).unwrap();
        // first half starts at 3 o'clock and sweeps up through 12
        canvas.fill_pie(50, 50, 40, 0.0, &[(0.5, RED), (0.5, BLUE)]);
        assert_eq!(canvas.pixel(50, 20), RED);
        assert_eq!(canvas.pixel(50, 80), BLUE);
        assert_eq!(canvas.pixel(2, 2), WHITE);
    }

    fn rendered(text: &str) -> RgbImage {
        let mut canvas = Canvas::new(120, 40).unwrap();
        canvas.text(4, 4, text, font::LABEL_SIZE, BLACK);
        canvas.image().clone()
    }

    #[test]
    fn test_text_marks_pixels() {
        let img = rendered("I");
        assert!(img.pixels().any(|p| *p != WHITE));
        assert_eq!(*img.get_pixel(119, 39), WHITE);
    }

    #[test]
    fn test_text_keeps_case_and_accents() {
        assert_ne!(rendered("The"), rendered("the"));
        assert_ne!(rendered("The"), rendered("THE"));
        assert_ne!(rendered("café"), rendered("cafè"));
        assert_ne!(rendered("café"), rendered("cafe"));
    }

    #[test]
    fn test_png_roundtrip_dimensions() {
        let png = Canvas::new(32, 16).unwrap().into_png().unwrap();
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (32, 16));
    }
}
