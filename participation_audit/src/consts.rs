use core::num::{NonZeroU64, NonZeroUsize};

use nonzero_ext::nonzero;
use types::phase0::primitives::Epoch;

pub const APPLICATION_NAME: &str = "participation_audit";
pub const APPLICATION_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_CONCURRENCY_PER_SOURCE: NonZeroUsize = nonzero!(16_usize);
pub const DEFAULT_REQUEST_TIMEOUT_MS: NonZeroU64 = nonzero!(30_000_u64);

// Roughly a week of epochs.
pub const MAX_EPOCH_SPAN: Epoch = 1575;
