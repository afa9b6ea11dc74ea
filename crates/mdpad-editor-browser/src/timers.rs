//! Single-shot timers.

use gloo_timers::callback::Timeout;

/// At most one pending timeout. Scheduling again cancels the previous one.
#[derive(Default)]
pub struct Debouncer {
    timeout: Option<Timeout>,
}

impl Debouncer {
    pub fn schedule<F>(&mut self, millis: u32, callback: F)
    where
        F: 'static + FnOnce(),
    {
        // Dropping a gloo Timeout clears it.
        self.timeout = Some(Timeout::new(millis, callback));
    }

    pub fn cancel(&mut self) {
        self.timeout = None;
    }
}
