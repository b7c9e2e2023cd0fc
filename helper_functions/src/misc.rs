use core::ops::RangeInclusive;

use typenum::Unsigned as _;
use types::phase0::{
    consts::SlotsPerEpoch,
    primitives::{Epoch, Slot},
};

#[must_use]
pub const fn compute_start_slot_at_epoch(epoch: Epoch) -> Slot {
    epoch.saturating_mul(SlotsPerEpoch::U64)
}

/// Position of `slot` within its epoch.
#[must_use]
pub const fn slots_since_epoch_start(slot: Slot) -> u64 {
    slot % SlotsPerEpoch::U64
}

/// Every slot of every epoch from `start_epoch` to `end_epoch`, both inclusive.
#[must_use]
pub const fn slots_in_epochs(start_epoch: Epoch, end_epoch: Epoch) -> RangeInclusive<Slot> {
    let first = compute_start_slot_at_epoch(start_epoch);
    let last = compute_start_slot_at_epoch(end_epoch).saturating_add(SlotsPerEpoch::U64 - 1);
    first..=last
}
