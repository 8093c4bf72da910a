//! Raster canvas with the few primitives the charts need.

use std::path::Path;

use image::{ImageFormat, Rgb, RgbImage};

use super::font::{glyph, text_width, GLYPH_ADVANCE, GLYPH_HEIGHT, GLYPH_WIDTH};
use crate::auditor::error::{AuditError, AuditResult};

pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
pub const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
pub const GRID: Rgb<u8> = Rgb([225, 225, 225]);

pub struct Canvas {
    image: RgbImage,
}

impl Canvas {
    /// White canvas of the given size
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbImage::from_pixel(width, height, WHITE),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    /// Set one pixel; coordinates outside the canvas are ignored.
    pub fn put(&mut self, x: i64, y: i64, color: Rgb<u8>) {
        if x >= 0 && y >= 0 && (x as u32) < self.width() && (y as u32) < self.height() {
            self.image.put_pixel(x as u32, y as u32, color);
        }
    }

    pub fn fill_rect(&mut self, x: i64, y: i64, width: u32, height: u32, color: Rgb<u8>) {
        for dy in 0..height as i64 {
            for dx in 0..width as i64 {
                self.put(x + dx, y + dy, color);
            }
        }
    }

    /// One-pixel rectangle outline.
    pub fn stroke_rect(&mut self, x: i64, y: i64, width: u32, height: u32, color: Rgb<u8>) {
        if width == 0 || height == 0 {
            return;
        }
        self.hline(x, x + width as i64 - 1, y, color);
        self.hline(x, x + width as i64 - 1, y + height as i64 - 1, color);
        self.vline(x, y, y + height as i64 - 1, color);
        self.vline(x + width as i64 - 1, y, y + height as i64 - 1, color);
    }

    pub fn hline(&mut self, x0: i64, x1: i64, y: i64, color: Rgb<u8>) {
        for x in x0.min(x1)..=x0.max(x1) {
            self.put(x, y, color);
        }
    }

    pub fn vline(&mut self, x: i64, y0: i64, y1: i64, color: Rgb<u8>) {
        for y in y0.min(y1)..=y0.max(y1) {
            self.put(x, y, color);
        }
    }

    /// Draw `text` with its top-left corner at (x, y).
    pub fn text(&mut self, x: i64, y: i64, text: &str, scale: u32, color: Rgb<u8>) {
        let scale_i = scale as i64;
        for (i, ch) in text.chars().enumerate() {
            let origin = x + (i as i64) * (GLYPH_ADVANCE as i64) * scale_i;
            for (row, bits) in glyph(ch).iter().enumerate() {
                for col in 0..GLYPH_WIDTH {
                    if bits & (1 << (GLYPH_WIDTH - 1 - col)) != 0 {
                        self.fill_rect(
                            origin + col as i64 * scale_i,
                            y + row as i64 * scale_i,
                            scale,
                            scale,
                            color,
                        );
                    }
                }
            }
        }
    }

    /// Draw `text` horizontally centred on `cx`.
    pub fn text_centered(&mut self, cx: i64, y: i64, text: &str, scale: u32, color: Rgb<u8>) {
        let x = cx - text_width(text, scale) as i64 / 2;
        self.text(x, y, text, scale, color);
    }

    /// Draw `text` ending at `right`.
    pub fn text_right(&mut self, right: i64, y: i64, text: &str, scale: u32, color: Rgb<u8>) {
        let x = right - text_width(text, scale) as i64;
        self.text(x, y, text, scale, color);
    }

    /// Draw `text` rotated a quarter turn counter-clockwise, centred on `cy`.
    pub fn text_vertical(&mut self, x: i64, cy: i64, text: &str, scale: u32, color: Rgb<u8>) {
        let scale_i = scale as i64;
        let bottom = cy + text_width(text, scale) as i64 / 2;
        for (i, ch) in text.chars().enumerate() {
            let origin = bottom - (i as i64) * (GLYPH_ADVANCE as i64) * scale_i;
            for (row, bits) in glyph(ch).iter().enumerate() {
                for col in 0..GLYPH_WIDTH {
                    if bits & (1 << (GLYPH_WIDTH - 1 - col)) != 0 {
                        self.fill_rect(
                            x + row as i64 * scale_i,
                            origin - (col as i64 + 1) * scale_i,
                            scale,
                            scale,
                            color,
                        );
                    }
                }
            }
        }
    }

    /// Height of one text line at `scale`.
    pub fn line_height(scale: u32) -> u32 {
        GLYPH_HEIGHT * scale
    }

    /// Encode as PNG at `path`, replacing any existing file.
    pub fn save_png(&self, path: &Path) -> AuditResult<()> {
        self.image
            .save_with_format(path, ImageFormat::Png)
            .map_err(|e| AuditError::Chart {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
    }
}
