//! Fixed-delay pacing between consecutive batches

use std::time::Duration;
use tokio::time::sleep;

/// Rate limiter for one (language, sheet) unit.
///
/// The first batch goes out immediately; each later batch waits `delay`.
#[derive(Debug, Clone)]
pub struct BatchPacer {
    delay: Duration,
    issued: usize,
}

impl BatchPacer {
    pub fn new(delay: Duration) -> Self {
        Self { delay, issued: 0 }
    }

    /// Wait until the next batch may be issued
    pub async fn ready(&mut self) {
        if self.issued > 0 && !self.delay.is_zero() {
            sleep(self.delay).await;
        }
        self.issued += 1;
    }

    /// Batches released so far
    pub fn issued(&self) -> usize {
        self.issued
    }
}
