pub use crate::{
    attestations::{AttesterParticipation, CommitteeParticipation, SlotParticipations},
    canonical_chain::CanonicalChain,
    error::Error,
    statistics::{proposal_rate, ParticipationCounts, ParticipationStatistics, Rate},
};

mod attestations;
mod canonical_chain;
mod error;
mod statistics;

#[cfg(test)]
mod test_utils;
