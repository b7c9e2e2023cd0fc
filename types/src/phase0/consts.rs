use typenum::U32;

use crate::phase0::primitives::CommitteeIndex;

/// Number of slots after its own slot in which an attestation may still be included.
pub const ATTESTATION_PROPAGATION_SLOT_RANGE: u64 = 32;
pub const MAX_COMMITTEES_PER_SLOT: CommitteeIndex = 64;
pub const MAX_VALIDATORS_PER_COMMITTEE: usize = 2048;

pub type SlotsPerEpoch = U32;
