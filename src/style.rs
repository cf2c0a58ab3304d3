//! Text styling: the handful of properties the report actually varies.

use crate::font::StandardFont;

/// An RGB color with components in 0.0..=1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };
    pub const GRAY: Color = Color {
        r: 0.5,
        g: 0.5,
        b: 0.5,
    };
}

/// Font, size, and color for a run of text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub font: StandardFont,
    pub font_size: f64,
    pub color: Color,
}

impl TextStyle {
    pub fn regular(font_size: f64) -> Self {
        Self {
            font: StandardFont::Helvetica,
            font_size,
            color: Color::BLACK,
        }
    }

    pub fn bold(font_size: f64) -> Self {
        Self {
            font: StandardFont::HelveticaBold,
            font_size,
            color: Color::BLACK,
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn line_height(&self) -> f64 {
        self.font.metrics().line_height(self.font_size)
    }
}
