//! LED matrix emulation on top of `embedded-graphics-simulator`.
//!
//! Frames are drawn into a [`SimulatorDisplay`] back buffer. `swap` presents
//! it (window backend) and clears it for the next frame. Closing the window or
//! pressing `Q` cancels the shutdown token handed to [`LedPanel::new`].

use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Baseline, Text};
use embedded_graphics_simulator::sdl2::Keycode;
use embedded_graphics_simulator::{OutputSettingsBuilder, SimulatorDisplay, SimulatorEvent, Window};
use infopanel_common::colors::BLACK;
use infopanel_common::{Font, MonoMetrics, Surface, TextMetrics};

use crate::cancel::CancellationToken;
use crate::config::{Backend, PanelConfig};
use crate::error::ConfigError;

const WINDOW_TITLE: &str = "infopanel";

enum Output {
    Window(Box<Window>),
    Headless,
}

pub struct LedPanel {
    display: SimulatorDisplay<Rgb888>,
    output: Output,
    shutdown: CancellationToken,
    width: i32,
    height: i32,
    frames: u64,
}

impl LedPanel {
    pub fn new(
        config: &PanelConfig,
        shutdown: CancellationToken,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut display = SimulatorDisplay::new(Size::new(config.cols, config.rows));
        display.clear(BLACK).ok();

        let output = match config.backend {
            Backend::Window => {
                let settings = OutputSettingsBuilder::new().scale(config.scale).build();
                let mut window = Window::new(WINDOW_TITLE, &settings);
                // Opens the window; events are only available afterwards.
                window.update(&display);
                Output::Window(Box::new(window))
            }
            Backend::Headless => Output::Headless,
        };
        tracing::info!(cols = config.cols, rows = config.rows, backend = ?config.backend, "Panel ready");

        Ok(Self {
            display,
            output,
            shutdown,
            width: config.cols as i32,
            height: config.rows as i32,
            frames: 0,
        })
    }

    /// Frames presented so far.
    #[inline]
    pub const fn frames(&self) -> u64 { self.frames }
}

impl TextMetrics for LedPanel {
    fn character_advance(
        &self,
        font: Font,
        ch: char,
    ) -> i32 {
        MonoMetrics.character_advance(font, ch)
    }

    fn line_height(
        &self,
        font: Font,
    ) -> i32 {
        MonoMetrics.line_height(font)
    }

    fn baseline(
        &self,
        font: Font,
    ) -> i32 {
        MonoMetrics.baseline(font)
    }
}

impl Surface for LedPanel {
    fn width(&self) -> i32 { self.width }

    fn height(&self) -> i32 { self.height }

    fn draw_text(
        &mut self,
        font: Font,
        origin: Point,
        color: Rgb888,
        text: &str,
    ) {
        let style = MonoTextStyle::new(font.mono(), color);
        Text::with_baseline(text, origin, style, Baseline::Alphabetic)
            .draw(&mut self.display)
            .ok();
    }

    fn swap(&mut self) {
        if let Output::Window(window) = &mut self.output {
            window.update(&self.display);
        }
        self.frames += 1;
        self.display.clear(BLACK).ok();
    }

    fn poll(&mut self) {
        let Output::Window(window) = &mut self.output else {
            return;
        };
        for event in window.events() {
            match event {
                SimulatorEvent::Quit
                | SimulatorEvent::KeyDown {
                    keycode: Keycode::Q,
                    ..
                } => {
                    tracing::info!("Window closed");
                    self.shutdown.cancel();
                }
                _ => {}
            }
        }
    }
}
