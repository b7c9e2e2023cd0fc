use thiserror::Error;
use types::phase0::primitives::{CommitteeIndex, Slot, H256};

#[derive(Debug, Error)]
#[cfg_attr(test, derive(PartialEq, Eq))]
pub enum Error {
    #[error("no blocks were observed in the requested range")]
    NoBlocks,
    #[error(
        "block {child_root:?} at slot {child_slot} points to parent at slot {parent_slot} \
         that is not earlier than it"
    )]
    NonMonotonicParent {
        child_root: H256,
        child_slot: Slot,
        parent_slot: Slot,
    },
    #[error("attestation for slot {slot} has committee index {index} out of range")]
    CommitteeIndexOutOfRange { slot: Slot, index: CommitteeIndex },
    #[error(
        "committee {index} at slot {slot} has {expected} members \
         but an attestation for it has {actual} aggregation bits"
    )]
    CommitteeSizeMismatch {
        slot: Slot,
        index: CommitteeIndex,
        expected: usize,
        actual: usize,
    },
    #[error(
        "committee {index} at slot {slot} has {size} members, \
         more than a committee may have"
    )]
    CommitteeTooLarge {
        slot: Slot,
        index: CommitteeIndex,
        size: usize,
    },
    #[error("block at slot {block_slot} contains attestation for slot {attestation_slot}")]
    IncludedTooEarly {
        block_slot: Slot,
        attestation_slot: Slot,
    },
}
