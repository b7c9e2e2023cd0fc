use core::ops::RangeInclusive;
use std::collections::HashMap;

use anyhow::{ensure, Result};
use tracing::{debug, info};
use types::{
    nonstandard::BlockWithRoot,
    phase0::primitives::{Slot, H256},
};

use crate::error::Error;

/// Blocks reachable from the chain tip through parent links, in ascending slot order.
///
/// Blocks observed by sources that are not ancestors of the tip (sibling forks, reorged
/// blocks) are discarded during reconstruction.
#[derive(Debug)]
pub struct CanonicalChain {
    blocks: Vec<BlockWithRoot>,
    orphaned: usize,
}

impl CanonicalChain {
    /// Reconstructs the chain from blocks observed by any number of sources.
    ///
    /// The walk stops at the first block whose parent was not observed or whose parent lies
    /// before `lower_bound`.
    pub fn reconstruct(
        observed: impl IntoIterator<Item = BlockWithRoot>,
        lower_bound: Slot,
    ) -> Result<Self> {
        let mut by_root = HashMap::<H256, (BlockWithRoot, usize)>::new();

        for block in observed {
            by_root
                .entry(block.root)
                .and_modify(|(_, observations)| *observations += 1)
                .or_insert((block, 1));
        }

        let tip_root = by_root
            .iter()
            .max_by(|(root_a, (block_a, count_a)), (root_b, (block_b, count_b))| {
                block_a
                    .slot
                    .cmp(&block_b.slot)
                    .then(count_a.cmp(count_b))
                    .then(root_b.cmp(root_a))
            })
            .map(|(root, _)| *root)
            .ok_or(Error::NoBlocks)?;

        let (mut current, _) = by_root.remove(&tip_root).ok_or(Error::NoBlocks)?;
        let mut blocks = vec![];

        // Removing visited entries also guarantees the walk terminates on malformed input.
        while let Some((parent, _)) = by_root.remove(&current.parent_root) {
            if parent.slot < lower_bound {
                break;
            }

            ensure!(
                parent.slot < current.slot,
                Error::NonMonotonicParent {
                    child_root: current.root,
                    child_slot: current.slot,
                    parent_slot: parent.slot,
                },
            );

            blocks.push(core::mem::replace(&mut current, parent));
        }

        blocks.push(current);
        blocks.reverse();

        let orphaned = by_root.len();

        for (root, (block, _)) in &by_root {
            debug!("discarding block {root:?} at slot {} not on canonical chain", block.slot);
        }

        info!(
            "reconstructed canonical chain of {} blocks ({orphaned} discarded)",
            blocks.len(),
        );

        Ok(Self { blocks, orphaned })
    }

    #[must_use]
    pub fn blocks(&self) -> &[BlockWithRoot] {
        &self.blocks
    }

    /// Number of distinct observed blocks that are not part of the chain.
    #[must_use]
    pub const fn orphaned(&self) -> usize {
        self.orphaned
    }

    /// Slot of the first block in the chain proposed after `slot`.
    ///
    /// This is the earliest point at which an attestation for `slot` could have been included.
    #[must_use]
    pub fn earliest_inclusion_slot(&self, slot: Slot) -> Option<Slot> {
        let index = self.blocks.partition_point(|block| block.slot <= slot);
        self.blocks.get(index).map(|block| block.slot)
    }

    #[must_use]
    pub fn proposed_in(&self, slots: &RangeInclusive<Slot>) -> u64 {
        let start = self.blocks.partition_point(|block| block.slot < *slots.start());
        let end = self.blocks.partition_point(|block| block.slot <= *slots.end());
        end.saturating_sub(start) as u64
    }
}
