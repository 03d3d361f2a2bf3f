use glam::Vec2;
use winit::event::{MouseScrollDelta, TouchPhase, WindowEvent};

/// The two external scalars the animation reacts to
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Signals {
    /// Pointer position normalized to [-1, 1] on both axes, +y up
    pub pointer: Vec2,
    /// Scroll offset as a fraction of the scrollable range, in [0, 1]
    pub scroll_fraction: f32,
}

/// Adapter that turns Winit events into pointer and scroll signals
#[derive(Debug, Clone)]
pub struct WinitSignals {
    /// Current window size in physical pixels
    window_size: (f32, f32),
    /// Last cursor position in physical pixels
    cursor: Option<(f32, f32)>,
    /// Scroll offset in pixels, kept in [0, scroll_range]
    scroll_offset: f32,
    scroll_range: f32,
    /// Pixels per wheel line
    scroll_step: f32,
    /// Last touch y while a touch drag is in progress
    touch_anchor: Option<f32>,
}

impl WinitSignals {
    pub fn new(scroll_range: f32, scroll_step: f32) -> Self {
        Self {
            window_size: (1.0, 1.0),
            cursor: None,
            scroll_offset: 0.0,
            scroll_range,
            scroll_step,
            touch_anchor: None,
        }
    }

    /// Process a Winit WindowEvent and update internal state
    pub fn process_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::Resized(size) => {
                self.set_window_size(size.width, size.height);
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = Some((position.x as f32, position.y as f32));
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
            }
            WindowEvent::MouseWheel { delta, .. } => self.wheel(*delta),
            WindowEvent::Touch(touch) => self.touch(touch.phase, touch.location.y as f32),
            _ => {}
        }
    }

    /// Wheel input: positive line or pixel deltas scroll back toward the top
    pub fn wheel(&mut self, delta: MouseScrollDelta) {
        match delta {
            MouseScrollDelta::LineDelta(_, lines) => self.scroll_by(-lines * self.scroll_step),
            MouseScrollDelta::PixelDelta(pos) => self.scroll_by(-pos.y as f32),
        }
    }

    /// Touch drag at vertical position `y`; moves without a started drag are ignored
    pub fn touch(&mut self, phase: TouchPhase, y: f32) {
        match phase {
            TouchPhase::Started => self.touch_anchor = Some(y),
            TouchPhase::Moved => {
                if let Some(anchor) = self.touch_anchor {
                    // Dragging up scrolls the page down
                    self.scroll_by(anchor - y);
                    self.touch_anchor = Some(y);
                }
            }
            TouchPhase::Ended | TouchPhase::Cancelled => self.touch_anchor = None,
        }
    }

    pub fn set_window_size(&mut self, width: u32, height: u32) {
        self.window_size = (width.max(1) as f32, height.max(1) as f32);
    }

    /// Move the scroll offset by `pixels`, clamped to the scrollable range
    pub fn scroll_by(&mut self, pixels: f32) {
        if pixels.is_finite() {
            self.scroll_offset = (self.scroll_offset + pixels).clamp(0.0, self.scroll_range);
        }
    }

    pub fn scroll_offset(&self) -> f32 {
        self.scroll_offset
    }

    /// Snapshot of the current signals
    pub fn signals(&self) -> Signals {
        let pointer = match self.cursor {
            Some((x, y)) => Vec2::new(
                (x / self.window_size.0) * 2.0 - 1.0,
                1.0 - (y / self.window_size.1) * 2.0,
            )
            .clamp(Vec2::splat(-1.0), Vec2::splat(1.0)),
            None => Vec2::ZERO,
        };

        let scroll_fraction = if self.scroll_range > 0.0 {
            (self.scroll_offset / self.scroll_range).clamp(0.0, 1.0)
        } else {
            0.0
        };

        Signals {
            pointer,
            scroll_fraction,
        }
    }
}

impl Default for WinitSignals {
    fn default() -> Self {
        Self::new(3000.0, 60.0)
    }
}
