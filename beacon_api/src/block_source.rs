use core::fmt::Display;

use anyhow::Result;
use async_trait::async_trait;
use types::{nonstandard::BlockWithRoot, phase0::primitives::Slot};

/// A beacon node or anything else that can answer block queries by slot.
///
/// Sources are interchangeable. Different sources may disagree about forks;
/// disagreements are resolved later by chain reconstruction.
#[async_trait]
pub trait BlockSource: Display + Send + Sync {
    /// Client name and version reported by the source.
    async fn node_version(&self) -> Result<String>;

    /// Returns `Ok(None)` if the source has no block at `slot`.
    /// Any other failure is an error.
    async fn fetch_block(&self, slot: Slot) -> Result<Option<BlockWithRoot>>;
}
