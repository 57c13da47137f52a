//! Self-rescheduling frame loop
//!
//! The loop owns the handle of its single pending frame. Each frame runs the
//! callback and then requests the next one through a weak reference to that
//! handle, so once the loop is dropped nothing gets rescheduled.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Runs a callback once on the next display refresh
pub trait FrameScheduler: Clone + 'static {
    /// Pending frame; dropping it cancels the frame
    type Handle: 'static;

    fn request(&self, callback: Box<dyn FnOnce(f64)>) -> Self::Handle;
}

type FrameSlot<H> = Rc<RefCell<Option<H>>>;
type FrameCallback = Rc<RefCell<dyn FnMut(f64)>>;

/// Repeating frame registration, cancelled on drop
pub struct FrameLoop<S: FrameScheduler> {
    slot: FrameSlot<S::Handle>,
}

impl<S: FrameScheduler> FrameLoop<S> {
    /// Call `callback` with the frame timestamp until the loop is dropped
    pub fn start(scheduler: S, callback: impl FnMut(f64) + 'static) -> Self {
        let slot: FrameSlot<S::Handle> = Rc::new(RefCell::new(None));
        let callback: FrameCallback = Rc::new(RefCell::new(callback));
        let handle = schedule(scheduler, Rc::downgrade(&slot), callback);
        *slot.borrow_mut() = Some(handle);
        Self { slot }
    }

    pub fn is_scheduled(&self) -> bool {
        self.slot.borrow().is_some()
    }
}

impl<S: FrameScheduler> Drop for FrameLoop<S> {
    fn drop(&mut self) {
        self.slot.borrow_mut().take();
        log::debug!("Frame loop stopped");
    }
}

fn schedule<S: FrameScheduler>(
    scheduler: S,
    slot: Weak<RefCell<Option<S::Handle>>>,
    callback: FrameCallback,
) -> S::Handle {
    let next = scheduler.clone();
    scheduler.request(Box::new(move |time| {
        (&mut *callback.borrow_mut())(time);

        // Loop dropped, possibly from inside the callback
        let Some(slot) = slot.upgrade() else {
            return;
        };
        let handle = schedule(next, Rc::downgrade(&slot), callback);
        *slot.borrow_mut() = Some(handle);
    }))
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::{Cell, RefCell};
    use std::rc::{Rc, Weak};

    use super::FrameScheduler;

    type Queue = RefCell<Vec<(u32, Box<dyn FnOnce(f64)>)>>;

    /// Scheduler driven by hand: frames run only when `fire` is called
    #[derive(Clone, Default)]
    pub struct ManualFrames {
        queue: Rc<Queue>,
        next_id: Rc<Cell<u32>>,
    }

    pub struct ManualHandle {
        id: u32,
        queue: Weak<Queue>,
    }

    impl Drop for ManualHandle {
        fn drop(&mut self) {
            if let Some(queue) = self.queue.upgrade() {
                queue.borrow_mut().retain(|(id, _)| *id != self.id);
            }
        }
    }

    impl FrameScheduler for ManualFrames {
        type Handle = ManualHandle;

        fn request(&self, callback: Box<dyn FnOnce(f64)>) -> ManualHandle {
            let id = self.next_id.get();
            self.next_id.set(id + 1);
            self.queue.borrow_mut().push((id, callback));
            ManualHandle {
                id,
                queue: Rc::downgrade(&self.queue),
            }
        }
    }

    impl ManualFrames {
        pub fn pending(&self) -> usize {
            self.queue.borrow().len()
        }

        /// Run every frame requested so far, like one display refresh
        pub fn fire(&self, time: f64) {
            let due: Vec<_> = self.queue.borrow_mut().drain(..).collect();
            for (_, callback) in due {
                callback(time);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use super::testing::ManualFrames;
    use super::*;

    fn counter() -> (Rc<Cell<u32>>, impl FnMut(f64) + 'static) {
        let count = Rc::new(Cell::new(0));
        let inner = count.clone();
        (count, move |_| inner.set(inner.get() + 1))
    }

    #[test]
    fn test_loop_reschedules_every_frame() {
        let frames = ManualFrames::default();
        let (count, callback) = counter();
        let frame_loop = FrameLoop::start(frames.clone(), callback);

        assert!(frame_loop.is_scheduled());
        for i in 0..3 {
            frames.fire(i as f64 * 16.0);
            assert_eq!(frames.pending(), 1);
        }
        assert_eq!(count.get(), 3);
    }

    #[test]
    fn test_drop_cancels_pending_frame() {
        let frames = ManualFrames::default();
        let (count, callback) = counter();
        let frame_loop = FrameLoop::start(frames.clone(), callback);
        frames.fire(0.0);

        drop(frame_loop);
        assert_eq!(frames.pending(), 0);
        frames.fire(16.0);
        frames.fire(32.0);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_drop_from_inside_callback_stops_loop() {
        let frames = ManualFrames::default();
        let holder: Rc<RefCell<Option<FrameLoop<ManualFrames>>>> = Rc::new(RefCell::new(None));
        let count = Rc::new(Cell::new(0));

        let frame_loop = {
            let holder = holder.clone();
            let count = count.clone();
            FrameLoop::start(frames.clone(), move |_| {
                count.set(count.get() + 1);
                if count.get() == 2 {
                    holder.borrow_mut().take();
                }
            })
        };
        *holder.borrow_mut() = Some(frame_loop);

        frames.fire(0.0);
        assert!(holder.borrow().as_ref().is_some_and(FrameLoop::is_scheduled));
        frames.fire(16.0);
        assert!(holder.borrow().is_none());
        assert_eq!(frames.pending(), 0);

        frames.fire(32.0);
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn test_callback_receives_frame_time() {
        let frames = ManualFrames::default();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let _frame_loop = {
            let seen = seen.clone();
            FrameLoop::start(frames.clone(), move |time| seen.borrow_mut().push(time))
        };
        frames.fire(1000.0);
        frames.fire(1016.5);
        assert_eq!(*seen.borrow(), vec![1000.0, 1016.5]);
    }
}
