//! Browser frame scheduling and event listeners
//!
//! Both are scoped registrations: dropping the handle cancels the pending
//! animation frame or removes the listener, so nothing calls back into a
//! scene that has been torn down.

use gloo::events::EventListener;
use gloo::render::{AnimationFrame, request_animation_frame};
use web_sys::EventTarget;

use super::{FrameScheduler, Listeners, Runtime};

/// Frames from `requestAnimationFrame`
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserFrames;

impl FrameScheduler for BrowserFrames {
    // Cancels itself on drop
    type Handle = AnimationFrame;

    fn request(&self, callback: Box<dyn FnOnce(f64)>) -> AnimationFrame {
        request_animation_frame(callback)
    }
}

impl Listeners<EventListener> {
    /// Listen for `event` on `target` until the set is dropped
    pub fn on(
        &mut self,
        target: &EventTarget,
        event: &'static str,
        callback: impl FnMut(&web_sys::Event) + 'static,
    ) {
        self.push(EventListener::new(target, event, callback));
    }
}

pub type WebRuntime = Runtime<BrowserFrames, EventListener>;
