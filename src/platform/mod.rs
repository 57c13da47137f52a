//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Frame timing
//! - Canvas sizing against device pixel ratio
//! - Frame loop and DOM listener registration

mod frame_loop;
mod listeners;
#[cfg(target_arch = "wasm32")]
mod web;

pub use frame_loop::{FrameLoop, FrameScheduler};
pub use listeners::Listeners;
#[cfg(target_arch = "wasm32")]
pub use web::{BrowserFrames, WebRuntime};

use crate::consts::FIRST_FRAME_DT;

/// Everything that keeps a running scene fed. Dropping it cancels the
/// pending frame and removes every listener.
pub struct Runtime<S: FrameScheduler, L> {
    frame_loop: FrameLoop<S>,
    listeners: Listeners<L>,
}

impl<S: FrameScheduler, L> Runtime<S, L> {
    pub fn new(frame_loop: FrameLoop<S>, listeners: Listeners<L>) -> Self {
        Self {
            frame_loop,
            listeners,
        }
    }

    /// Whether a frame is queued
    pub fn is_running(&self) -> bool {
        self.frame_loop.is_scheduled()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

/// Turns absolute frame timestamps into per-frame deltas
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    last_time: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds since the previous frame, given a timestamp in milliseconds
    /// (as passed to `requestAnimationFrame` callbacks). Not clamped above.
    pub fn delta(&mut self, time_ms: f64) -> f32 {
        let dt = match self.last_time {
            Some(last) => ((time_ms - last) / 1000.0) as f32,
            None => FIRST_FRAME_DT,
        };
        self.last_time = Some(time_ms);
        dt.max(0.0)
    }
}

/// Drawing buffer size for a canvas of the given CSS size
pub fn drawing_buffer_size(css_width: f64, css_height: f64, pixel_ratio: f64) -> (u32, u32) {
    let width = (css_width * pixel_ratio).round().max(1.0) as u32;
    let height = (css_height * pixel_ratio).round().max(1.0) as u32;
    (width, height)
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::frame_loop::testing::ManualFrames;
    use super::*;

    /// Registration that counts its own removal
    struct CountedListener(Rc<Cell<u32>>);

    impl Drop for CountedListener {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn test_first_frame_uses_fallback() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.delta(1234.0), FIRST_FRAME_DT);
    }

    #[test]
    fn test_delta_in_seconds() {
        let mut clock = FrameClock::new();
        clock.delta(1000.0);
        assert!((clock.delta(1016.0) - 0.016).abs() < 1e-6);
        // Long stalls pass through untouched
        assert!((clock.delta(3016.0) - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_delta_never_negative() {
        let mut clock = FrameClock::new();
        clock.delta(500.0);
        assert_eq!(clock.delta(400.0), 0.0);
    }

    #[test]
    fn test_drawing_buffer_size() {
        assert_eq!(drawing_buffer_size(400.0, 300.0, 2.0), (800, 600));
        assert_eq!(drawing_buffer_size(0.0, 0.0, 1.0), (1, 1));
        assert_eq!(drawing_buffer_size(333.0, 111.0, 1.5), (500, 167));
    }

    #[test]
    fn test_dropping_runtime_releases_everything() {
        let frames = ManualFrames::default();
        let removed = Rc::new(Cell::new(0));
        let ticks = Rc::new(Cell::new(0));

        let frame_loop = {
            let ticks = ticks.clone();
            FrameLoop::start(frames.clone(), move |_| ticks.set(ticks.get() + 1))
        };
        let mut listeners = Listeners::new();
        assert!(listeners.is_empty());
        listeners.push(CountedListener(removed.clone()));
        listeners.push(CountedListener(removed.clone()));

        let runtime = Runtime::new(frame_loop, listeners);
        assert!(runtime.is_running());
        assert_eq!(runtime.listener_count(), 2);
        frames.fire(0.0);
        assert_eq!(ticks.get(), 1);
        assert_eq!(removed.get(), 0);

        drop(runtime);
        assert_eq!(removed.get(), 2);
        assert_eq!(frames.pending(), 0);
        frames.fire(16.0);
        assert_eq!(ticks.get(), 1);
    }
}
