use core::{
    ops::RangeInclusive,
    sync::atomic::{AtomicU64, Ordering},
};

use block_fetcher::FetchProgress;
use tracing::info;
use types::phase0::primitives::Slot;

const STEPS: u64 = 10;

/// Logs fetch progress every time another tenth of the slots is done.
pub struct LoggingProgress {
    total: u64,
    fetched: AtomicU64,
}

impl LoggingProgress {
    #[must_use]
    pub fn new(slots: &RangeInclusive<Slot>) -> Self {
        let total = slots
            .end()
            .saturating_sub(*slots.start())
            .saturating_add(1);

        Self {
            total,
            fetched: AtomicU64::new(0),
        }
    }
}

impl FetchProgress for LoggingProgress {
    fn slot_fetched(&self) {
        let fetched = self.fetched.fetch_add(1, Ordering::Relaxed) + 1;

        if let Some(percent) = completed_step(fetched, self.total) {
            info!("fetched {fetched}/{} slots ({percent}%)", self.total);
        }
    }
}

// Percentage reached if `fetched` is the first count to complete another step.
fn completed_step(fetched: u64, total: u64) -> Option<u64> {
    if total == 0 || fetched == 0 || fetched > total {
        return None;
    }

    let step = fetched * STEPS / total;
    let previous_step = (fetched - 1) * STEPS / total;

    (step > previous_step).then_some(step * 100 / STEPS)
}
