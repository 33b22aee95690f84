use std::sync::Arc;

use winit::window::Window;

/// Identifies one scheduled frame callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickHandle(u64);

/// Source of per-refresh callbacks
///
/// At most one tick is outstanding at a time. `take_due` hands the due tick back
/// to the host, which passes it to the render loop.
pub trait FrameTicker {
    fn schedule(&mut self) -> TickHandle;
    fn cancel(&mut self, handle: TickHandle);
    fn take_due(&mut self) -> Option<TickHandle>;
}

/// Ticker driven by hand, every scheduled tick is immediately due
#[derive(Debug, Default)]
pub struct ManualTicker {
    next_id: u64,
    pending: Option<TickHandle>,
    scheduled: u64,
    cancelled: u64,
}

impl ManualTicker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> Option<TickHandle> {
        self.pending
    }

    pub fn scheduled_count(&self) -> u64 {
        self.scheduled
    }

    pub fn cancelled_count(&self) -> u64 {
        self.cancelled
    }
}

impl FrameTicker for ManualTicker {
    fn schedule(&mut self) -> TickHandle {
        self.next_id += 1;
        self.scheduled += 1;
        let handle = TickHandle(self.next_id);
        self.pending = Some(handle);
        handle
    }

    fn cancel(&mut self, handle: TickHandle) {
        if self.pending == Some(handle) {
            self.pending = None;
            self.cancelled += 1;
        }
    }

    fn take_due(&mut self) -> Option<TickHandle> {
        self.pending.take()
    }
}

/// Ticker backed by winit redraw requests
///
/// A scheduled tick becomes due on the next `RedrawRequested`. Cancelling only
/// forgets the handle; a redraw already queued by the platform finds nothing due.
pub struct RedrawTicker {
    window: Arc<Window>,
    next_id: u64,
    pending: Option<TickHandle>,
}

impl RedrawTicker {
    pub fn new(window: Arc<Window>) -> Self {
        Self {
            window,
            next_id: 0,
            pending: None,
        }
    }
}

impl FrameTicker for RedrawTicker {
    fn schedule(&mut self) -> TickHandle {
        self.next_id += 1;
        let handle = TickHandle(self.next_id);
        self.pending = Some(handle);
        self.window.request_redraw();
        handle
    }

    fn cancel(&mut self, handle: TickHandle) {
        if self.pending == Some(handle) {
            self.pending = None;
        }
    }

    fn take_due(&mut self) -> Option<TickHandle> {
        self.pending.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_are_unique() {
        let mut ticker = ManualTicker::new();
        let a = ticker.schedule();
        let b = ticker.schedule();
        assert_ne!(a, b);
        assert_eq!(ticker.pending(), Some(b));
    }

    #[test]
    fn cancel_only_matches_pending() {
        let mut ticker = ManualTicker::new();
        let stale = ticker.schedule();
        let current = ticker.schedule();

        ticker.cancel(stale);
        assert_eq!(ticker.pending(), Some(current));
        assert_eq!(ticker.cancelled_count(), 0);

        ticker.cancel(current);
        assert_eq!(ticker.take_due(), None);
        assert_eq!(ticker.cancelled_count(), 1);
    }

    #[test]
    fn due_tick_is_taken_once() {
        let mut ticker = ManualTicker::new();
        let handle = ticker.schedule();
        assert_eq!(ticker.take_due(), Some(handle));
        assert_eq!(ticker.take_due(), None);
    }
}
