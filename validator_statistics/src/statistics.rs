use core::{
    fmt::{Display, Formatter, Result as FmtResult},
    ops::RangeInclusive,
};

use helper_functions::misc;
use serde::Serialize;
use tracing::debug;
use typenum::Unsigned as _;
use types::phase0::{consts::SlotsPerEpoch, primitives::Slot};

use crate::{
    attestations::{CommitteeParticipation, SlotParticipations},
    canonical_chain::CanonicalChain,
};

#[derive(Clone, Copy, Default, PartialEq, Eq, Debug, Serialize)]
pub struct ParticipationCounts {
    /// Committee seats.
    pub assigned: u64,
    /// Seats whose vote made it into the canonical chain.
    pub executed: u64,
    /// Sum of inclusion delays of executed votes, measured from the earliest block that could
    /// have included them. A vote included in that block has a delay of 1.
    pub inclusion_delay: u64,
}

impl ParticipationCounts {
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    #[expect(clippy::float_arithmetic)]
    pub fn participation_rate(self) -> Option<f64> {
        (self.assigned > 0).then(|| self.executed as f64 / self.assigned as f64)
    }

    /// Reciprocal of the average inclusion delay. Equal to 1 when every vote was included as
    /// early as possible.
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    #[expect(clippy::float_arithmetic)]
    pub fn effectiveness(self) -> Option<f64> {
        (self.executed > 0).then(|| self.executed as f64 / self.inclusion_delay as f64)
    }

    fn add_committee(&mut self, committee: &CommitteeParticipation, earliest_inclusion_slot: Slot) {
        for participation in committee {
            self.assigned += 1;

            if let Some(inclusion_slot) = participation.inclusion_slot() {
                // Inclusion happens in a canonical block after the attestation slot, so it can
                // be earlier than `earliest_inclusion_slot` only if `participations` were
                // organized over a different chain.
                self.executed += 1;
                self.inclusion_delay += inclusion_slot.saturating_sub(earliest_inclusion_slot) + 1;
            }
        }
    }
}

#[derive(Clone, Copy, Default, PartialEq, Eq, Debug, Serialize)]
pub struct ParticipationStatistics {
    pub total: ParticipationCounts,
    pub by_epoch_position: [ParticipationCounts; SlotsPerEpoch::USIZE],
}

impl ParticipationStatistics {
    #[must_use]
    pub fn calculate(participations: &SlotParticipations, chain: &CanonicalChain) -> Self {
        let mut statistics = Self::default();
        let mut skipped = 0_usize;

        for (slot, index, committee) in participations.committees() {
            // No block after `slot` means none of its votes could have been included yet.
            let Some(earliest_inclusion_slot) = chain.earliest_inclusion_slot(slot) else {
                debug!("skipping committee {index} at slot {slot} with no later block");
                skipped += 1;
                continue;
            };

            #[expect(clippy::cast_possible_truncation)]
            let position = misc::slots_since_epoch_start(slot) as usize;

            statistics
                .total
                .add_committee(committee, earliest_inclusion_slot);

            if let Some(counts) = statistics.by_epoch_position.get_mut(position) {
                counts.add_committee(committee, earliest_inclusion_slot);
            }
        }

        if skipped > 0 {
            debug!("skipped {skipped} committees with no later block in the chain");
        }

        statistics
    }
}

/// Fraction of slots in `slots` that have a block in the canonical chain.
#[must_use]
#[expect(clippy::cast_precision_loss)]
#[expect(clippy::float_arithmetic)]
pub fn proposal_rate(chain: &CanonicalChain, slots: &RangeInclusive<Slot>) -> Option<f64> {
    let slot_count = slots.end().checked_add(1)?.checked_sub(*slots.start())?;
    let proposed = chain.proposed_in(slots);

    (slot_count > 0).then(|| proposed as f64 / slot_count as f64)
}

/// A ratio displayed as a percentage with one decimal place.
#[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
pub struct Rate {
    whole: u64,
    decimal: u64,
}

impl Rate {
    #[must_use]
    pub fn new(count: u64, total: u64) -> Option<Self> {
        if total == 0 {
            return None;
        }

        // Scale to preserve 1 decimal place: e.g., 95.6% becomes 956
        let scaled = (u128::from(count) * 1000 + u128::from(total) / 2) / u128::from(total);
        let scaled = u64::try_from(scaled).unwrap_or(u64::MAX);

        Some(Self {
            whole: scaled / 10,
            decimal: scaled % 10,
        })
    }
}

impl Display for Rate {
    fn fmt(&self, formatter: &mut Formatter) -> FmtResult {
        let Self { whole, decimal } = self;

        if *decimal == 0 {
            write!(formatter, "{whole}%")
        } else {
            write!(formatter, "{whole}.{decimal}%")
        }
    }
}
