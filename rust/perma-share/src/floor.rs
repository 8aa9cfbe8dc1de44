use std::time::Duration;

use tokio::time::Instant;

/// The minimum time a denied request takes, measured from when the request
/// started to be handled.
pub const DEFAULT_DENIAL_FLOOR: Duration = Duration::from_millis(200);

/// A lower bound on how quickly a denial may be reported.
///
/// Without it, the time taken to deny a request would reveal how far along
/// the chain verification got, and therefore whether the early hops exist.
/// Successful requests are never delayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DenialFloor {
    duration: Duration,
}

impl DenialFloor {
    /// A floor of `duration`.
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }

    /// The minimum time a denial takes.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Start timing a request.
    pub fn start(&self) -> FloorTimer {
        FloorTimer {
            started: Instant::now(),
            floor: self.duration,
        }
    }
}

impl Default for DenialFloor {
    fn default() -> Self {
        Self::new(DEFAULT_DENIAL_FLOOR)
    }
}

/// Measures one request against a [DenialFloor].
#[must_use]
#[derive(Debug)]
pub struct FloorTimer {
    started: Instant,
    floor: Duration,
}

impl FloorTimer {
    /// How much of the floor is still left to wait out.
    pub fn remaining(&self) -> Duration {
        self.floor.saturating_sub(self.started.elapsed())
    }

    /// Wait until the floor has passed. Returns immediately if it already
    /// has.
    pub async fn elapse(self) {
        tokio::time::sleep_until(self.started + self.floor).await;
    }
}
