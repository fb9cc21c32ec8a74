//! Label font for the charts.
//!
//! DejaVu Sans is compiled into the binary, so labels keep their case and
//! Latin-1 accents whatever fonts the host has installed.

use ab_glyph::{FontRef, InvalidFont, PxScale};

static DEJAVU_SANS: &[u8] = include_bytes!("../../assets/DejaVuSans.ttf");

pub const LABEL_SIZE: f32 = 18.0;
pub const TITLE_SIZE: f32 = 26.0;

pub fn load() -> Result<FontRef<'static>, InvalidFont> {
    FontRef::try_from_slice(DEJAVU_SANS)
}

/// Pixel width of `text` at `size` px.
pub fn text_width(font: &FontRef<'_>, text: &str, size: f32) -> u32 {
    imageproc::drawing::text_size(PxScale::from(size), font, text).0
}

/// Cuts `text` so it fits in `max_width` pixels, marking the cut with `..`.
pub fn fit_text(font: &FontRef<'_>, text: &str, size: f32, max_width: u32) -> String {
    if text_width(font, text, size) <= max_width {
        return text.to_string();
    }
    let chars: Vec<char> = text.chars().collect();
    for keep in (0..chars.len()).rev() {
        let mut cut: String = chars[..keep].iter().collect();
        cut.push_str("..");
        if text_width(font, &cut, size) <= max_width {
            return cut;
        }
    }
    String::new()
}
