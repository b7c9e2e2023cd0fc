use serde_with::DeserializeFromStr;
use strum::{AsRefStr, Display, EnumString};

use crate::phase0::{
    containers::Attestation,
    primitives::{Slot, H256},
};

#[derive(
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Debug,
    AsRefStr,
    Display,
    EnumString,
    DeserializeFromStr,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Phase {
    Phase0,
    Altair,
    Bellatrix,
    Capella,
    Deneb,
    Electra,
    Fulu,
    Gloas,
}

impl Phase {
    /// Starting with Electra, on-chain aggregates cover several committees at once.
    /// Splitting their aggregation bits requires committee sizes.
    #[must_use]
    pub const fn has_single_committee_attestations(self) -> bool {
        matches!(
            self,
            Self::Phase0 | Self::Altair | Self::Bellatrix | Self::Capella | Self::Deneb,
        )
    }
}

/// A block as observed from a single source, stripped down to what chain reconstruction and
/// participation accounting need.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct BlockWithRoot {
    pub root: H256,
    pub slot: Slot,
    pub parent_root: H256,
    pub attestations: Vec<Attestation>,
}
