use core::ops::RangeInclusive;
use std::collections::BTreeMap;

use anyhow::{ensure, Result};
use tracing::debug;
use types::phase0::{
    consts::{MAX_COMMITTEES_PER_SLOT, MAX_VALIDATORS_PER_COMMITTEE},
    containers::AttestationData,
    primitives::{CommitteeIndex, Slot},
};

use crate::{canonical_chain::CanonicalChain, error::Error};

#[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
pub struct AttesterParticipation {
    inclusion_slot: Option<Slot>,
}

impl AttesterParticipation {
    #[must_use]
    pub const fn included(self) -> bool {
        self.inclusion_slot.is_some()
    }

    #[must_use]
    pub const fn inclusion_slot(self) -> Option<Slot> {
        self.inclusion_slot
    }

    // Only the earliest inclusion counts. Later copies of the same vote are ignored.
    fn include(&mut self, block_slot: Slot) {
        if self.inclusion_slot.is_none() {
            self.inclusion_slot = Some(block_slot);
        }
    }
}

pub type CommitteeParticipation = Vec<AttesterParticipation>;

/// Participation of every committee seen in the canonical chain, keyed by
/// `(attestation slot, committee index)`.
#[derive(Default, Debug)]
pub struct SlotParticipations {
    committees: BTreeMap<(Slot, CommitteeIndex), CommitteeParticipation>,
}

impl SlotParticipations {
    pub fn organize(chain: &CanonicalChain, slots: &RangeInclusive<Slot>) -> Result<Self> {
        let mut participations = Self::default();

        for block in chain.blocks() {
            for attestation in &block.attestations {
                let AttestationData { slot, index, .. } = attestation.data;

                if !slots.contains(&slot) {
                    continue;
                }

                ensure!(
                    index < MAX_COMMITTEES_PER_SLOT,
                    Error::CommitteeIndexOutOfRange { slot, index },
                );

                ensure!(
                    slot < block.slot,
                    Error::IncludedTooEarly {
                        block_slot: block.slot,
                        attestation_slot: slot,
                    },
                );

                let aggregation_bits = &attestation.aggregation_bits;
                let size = aggregation_bits.len();

                ensure!(
                    size <= MAX_VALIDATORS_PER_COMMITTEE,
                    Error::CommitteeTooLarge { slot, index, size },
                );

                let committee = participations
                    .committees
                    .entry((slot, index))
                    .or_insert_with(|| vec![AttesterParticipation::default(); size]);

                ensure!(
                    committee.len() == size,
                    Error::CommitteeSizeMismatch {
                        slot,
                        index,
                        expected: committee.len(),
                        actual: size,
                    },
                );

                for position in aggregation_bits.iter_ones() {
                    committee[position].include(block.slot);
                }
            }
        }

        debug!(
            "organized participation of {} committees",
            participations.committees.len(),
        );

        Ok(participations)
    }

    pub fn committees(
        &self,
    ) -> impl Iterator<Item = (Slot, CommitteeIndex, &CommitteeParticipation)> {
        self.committees
            .iter()
            .map(|((slot, index), committee)| (*slot, *index, committee))
    }

    #[must_use]
    pub fn committee(&self, slot: Slot, index: CommitteeIndex) -> Option<&CommitteeParticipation> {
        self.committees.get(&(slot, index))
    }
}
