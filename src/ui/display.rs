use anyhow::{Context, Result};
use minifb::{Key, ScaleMode, Window, WindowOptions};

use super::render_util::frame_to_argb;
use crate::{pipeline::Presenter, types::Frame};

const WINDOW_TITLE: &str = "Rock Paper Scissors";

/// `minifb` window showing the composited frames. `q` or Escape quits.
pub struct WindowPresenter {
    window: Window,
    buffer: Vec<u32>,
}

impl WindowPresenter {
    pub fn open(width: u32, height: u32, target_fps: usize) -> Result<Self> {
        let mut window = Window::new(
            WINDOW_TITLE,
            width as usize,
            height as usize,
            WindowOptions {
                resize: true,
                scale_mode: ScaleMode::AspectRatioStretch,
                ..WindowOptions::default()
            },
        )
        .context("failed to open game window")?;
        window.set_target_fps(target_fps);

        Ok(Self {
            window,
            buffer: Vec::new(),
        })
    }
}

impl Presenter for WindowPresenter {
    fn display(&mut self, frame: &Frame) -> Result<()> {
        frame_to_argb(frame, &mut self.buffer);
        self.window
            .update_with_buffer(&self.buffer, frame.width as usize, frame.height as usize)
            .context("failed to present frame")
    }

    fn poll_quit(&self) -> bool {
        !self.window.is_open()
            || self.window.is_key_down(Key::Q)
            || self.window.is_key_down(Key::Escape)
    }
}
