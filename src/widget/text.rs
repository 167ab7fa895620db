//! Static text, centred on the panel.

use std::time::Duration;

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::Point;
use infopanel_common::colors::{WHITE, from_rgb, to_rgb};
use infopanel_common::{Font, HAlign, Surface, TextOptions, VAlign, draw_text};
use serde::Deserialize;

use super::Widget;
use crate::config::WidgetSpec;
use crate::error::{ConfigError, RenderError};

#[derive(Deserialize, Debug, Clone)]
pub struct TextParams {
    /// Text to show; `\n` separates lines.
    #[serde(default = "default_text")]
    pub text: String,

    #[serde(default = "default_font")]
    pub font: String,

    #[serde(default = "default_color")]
    pub color: [u8; 3],
}

fn default_text() -> String { "Hello, World!".to_string() }

fn default_font() -> String { Font::Regular.name().to_string() }

fn default_color() -> [u8; 3] { to_rgb(WHITE) }

/// Shows one or more lines of fixed text, centred as a block.
pub struct TextWidget {
    lines: Vec<String>,
    font: Font,
    color: Rgb888,
}

impl TextWidget {
    pub fn new(params: TextParams) -> Result<Self, ConfigError> {
        let font = Font::from_name(&params.font).ok_or(ConfigError::UnknownFont(params.font))?;
        Ok(Self {
            lines: params.text.lines().map(str::to_string).collect(),
            font,
            color: from_rgb(params.color),
        })
    }

    pub fn from_spec(spec: &WidgetSpec) -> Result<Box<dyn Widget>, ConfigError> {
        Ok(Box::new(Self::new(spec.params()?)?))
    }
}

impl Widget for TextWidget {
    fn render(
        &mut self,
        surface: &mut dyn Surface,
        _delta: Duration,
    ) -> Result<(), RenderError> {
        let line_height = surface.line_height(self.font);
        let count = self.lines.len() as i32;
        let offset = (-(count - 1) * line_height).div_euclid(2);

        let options = TextOptions::new(self.font)
            .max_width(surface.width())
            .halign(HAlign::Center)
            .valign(VAlign::Center);

        let x = surface.width() / 2;
        for (i, line) in self.lines.iter().enumerate() {
            let y = surface.height() / 2 + i as i32 * line_height + offset;
            draw_text(surface, line, Point::new(x, y), &options, self.color);
        }
        Ok(())
    }
}
