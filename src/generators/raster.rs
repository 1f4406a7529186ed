//! Certificate image rendering.
//!
//! Draws the recipient's name onto the template image, centered horizontally at a fixed
//! baseline height. A missing or unreadable font file falls back to the built-in 8x8 bitmap
//! face instead of failing the request.

use ab_glyph::{FontVec, PxScale};
use font8x8::{UnicodeFonts, BASIC_FONTS};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};
use std::fs;
use std::path::{Path, PathBuf};

use super::GeneratorError;

pub const DEFAULT_FONT_PATH: &str = "arialbd.ttf";
pub const DEFAULT_FONT_SIZE: f32 = 100.0;
pub const DEFAULT_NAME_Y: i32 = 600;
/// Orange.
pub const NAME_COLOR: Rgba<u8> = Rgba([255, 165, 0, 255]);

const GLYPH_CELL: u32 = 8;
const FALLBACK_SCALE: u32 = 4;

/// Font used to draw the name.
pub enum TextFace {
    Outline { font: FontVec, scale: PxScale },
    /// Built-in 8x8 bitmap glyphs, each pixel drawn as a `scale`×`scale` block.
    Bitmap { scale: u32 },
}

impl TextFace {
    /// Load a TrueType/OpenType font, falling back to the built-in face.
    pub fn load(path: &Path, size: f32) -> Self {
        let loaded = fs::read(path)
            .map_err(|e| e.to_string())
            .and_then(|bytes| FontVec::try_from_vec(bytes).map_err(|e| e.to_string()));

        match loaded {
            Ok(font) => Self::Outline {
                font,
                scale: PxScale::from(size),
            },
            Err(e) => {
                log::warn!(
                    "Font {} unavailable ({}); using built-in bitmap font",
                    path.display(),
                    e
                );
                Self::builtin()
            }
        }
    }

    pub fn builtin() -> Self {
        Self::Bitmap {
            scale: FALLBACK_SCALE,
        }
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self, Self::Bitmap { .. })
    }

    /// Rendered width of `text` in pixels.
    pub fn text_width(&self, text: &str) -> u32 {
        match self {
            Self::Outline { font, scale } => text_size(*scale, font, text).0,
            Self::Bitmap { scale } => text.chars().count() as u32 * GLYPH_CELL * scale,
        }
    }

    fn draw(&self, canvas: &mut RgbaImage, color: Rgba<u8>, x: i32, y: i32, text: &str) {
        match self {
            Self::Outline { font, scale } => draw_text_mut(canvas, color, x, y, *scale, font, text),
            Self::Bitmap { scale } => draw_bitmap_text(canvas, color, x, y, *scale, text),
        }
    }
}

fn draw_bitmap_text(
    canvas: &mut RgbaImage,
    color: Rgba<u8>,
    x: i32,
    y: i32,
    scale: u32,
    text: &str,
) {
    let (width, height) = canvas.dimensions();
    let scale = scale as i64;
    let cell = GLYPH_CELL as i64 * scale;

    for (index, ch) in text.chars().enumerate() {
        let glyph = BASIC_FONTS
            .get(ch)
            .or_else(|| BASIC_FONTS.get('?'))
            .unwrap_or([0; 8]);
        let origin_x = x as i64 + index as i64 * cell;

        for (row, bits) in glyph.iter().enumerate() {
            for col in 0..GLYPH_CELL as i64 {
                if bits & (1u8 << col) == 0 {
                    continue;
                }
                for dy in 0..scale {
                    for dx in 0..scale {
                        let px = origin_x + col * scale + dx;
                        let py = y as i64 + row as i64 * scale + dy;
                        if px >= 0 && py >= 0 && px < width as i64 && py < height as i64 {
                            canvas.put_pixel(px as u32, py as u32, color);
                        }
                    }
                }
            }
        }
    }
}

/// Horizontal offset that centers text of `text_width` in an image of `image_width`.
pub fn center_offset(image_width: u32, text_width: u32) -> i32 {
    (image_width as i32 - text_width as i32) / 2
}

/// Visual settings for certificate names.
#[derive(Debug, Clone)]
pub struct CertificateStyle {
    pub font_path: PathBuf,
    pub font_size: f32,
    pub name_y: i32,
    pub color: Rgba<u8>,
}

impl Default for CertificateStyle {
    fn default() -> Self {
        Self {
            font_path: PathBuf::from(DEFAULT_FONT_PATH),
            font_size: DEFAULT_FONT_SIZE,
            name_y: DEFAULT_NAME_Y,
            color: NAME_COLOR,
        }
    }
}

pub struct CertificateRenderer {
    face: TextFace,
    name_y: i32,
    color: Rgba<u8>,
}

impl CertificateRenderer {
    pub fn new(style: &CertificateStyle) -> Self {
        Self::with_face(
            TextFace::load(&style.font_path, style.font_size),
            style.name_y,
            style.color,
        )
    }

    pub fn with_face(face: TextFace, name_y: i32, color: Rgba<u8>) -> Self {
        Self {
            face,
            name_y,
            color,
        }
    }

    pub fn face(&self) -> &TextFace {
        &self.face
    }

    /// Draw `name` onto a copy of the template.
    pub fn render(&self, template: &DynamicImage, name: &str) -> RgbaImage {
        let mut canvas = template.to_rgba8();
        let x = center_offset(canvas.width(), self.face.text_width(name));
        self.face.draw(&mut canvas, self.color, x, self.name_y, name);
        canvas
    }

    pub fn render_to_file(
        &self,
        template: &DynamicImage,
        name: &str,
        path: &Path,
    ) -> Result<(), GeneratorError> {
        let canvas = self.render(template, name);
        canvas.save_with_format(path, ImageFormat::Png)?;
        Ok(())
    }
}
