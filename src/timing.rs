use std::time::Duration;

/// Rate limiter invoking at most once per interval, on both leading and trailing edges.
///
/// Time is supplied by caller, so host event loop decides what "now" is.
#[derive(Debug, Clone)]
pub struct Throttle {
    wait: Duration,
    last: Option<Duration>,
    pending: bool,
}

impl Throttle {
    pub fn new(wait: Duration) -> Self {
        Self {
            wait,
            last: None,
            pending: false,
        }
    }

    /// Registers call, returns true if it must be invoked right now (leading edge).
    pub fn call(&mut self, now: Duration) -> bool {
        match self.last {
            Some(last) if now.saturating_sub(last) < self.wait => {
                self.pending = true;
                false
            }
            _ => {
                self.last = Some(now);
                self.pending = false;
                true
            }
        }
    }

    /// Returns true if suppressed call must be invoked now (trailing edge).
    pub fn poll(&mut self, now: Duration) -> bool {
        match self.deadline() {
            Some(deadline) if now >= deadline => {
                self.last = Some(now);
                self.pending = false;
                true
            }
            _ => false,
        }
    }

    /// Moment of pending trailing invocation, if any.
    pub fn deadline(&self) -> Option<Duration> {
        match (self.pending, self.last) {
            (true, Some(last)) => Some(last + self.wait),
            _ => None,
        }
    }
}

/// Invokes on leading edge of a burst, further calls are swallowed until calls
/// stop for the whole interval, then a single trailing invocation is due.
#[derive(Debug, Clone)]
pub struct Debounce {
    wait: Duration,
    last: Option<Duration>,
    pending: bool,
}

impl Debounce {
    pub fn new(wait: Duration) -> Self {
        Self {
            wait,
            last: None,
            pending: false,
        }
    }

    /// Registers call, returns true if it must be invoked right now (leading edge).
    pub fn call(&mut self, now: Duration) -> bool {
        let quiet = match self.last {
            None => true,
            Some(last) => now.saturating_sub(last) >= self.wait,
        };
        self.last = Some(now);
        self.pending = !quiet;
        quiet
    }

    /// Returns true if swallowed calls must be invoked now, burst is over.
    pub fn poll(&mut self, now: Duration) -> bool {
        match self.deadline() {
            Some(deadline) if now >= deadline => {
                self.pending = false;
                true
            }
            _ => false,
        }
    }

    pub fn deadline(&self) -> Option<Duration> {
        match (self.pending, self.last) {
            (true, Some(last)) => Some(last + self.wait),
            _ => None,
        }
    }
}
