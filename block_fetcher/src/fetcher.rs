use core::{
    ops::RangeInclusive,
    sync::atomic::{AtomicBool, Ordering},
};
use std::sync::Arc;

use anyhow::Result;
use beacon_api::{PooledSource, SourcePool};
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};
use types::{
    nonstandard::BlockWithRoot,
    phase0::{consts::ATTESTATION_PROPAGATION_SLOT_RANGE, primitives::Slot},
};

use crate::progress::FetchProgress;

#[derive(Debug, Error)]
#[cfg_attr(test, derive(PartialEq, Eq))]
pub enum Error {
    #[error("failed to fetch block at slot {slot} from source {source_index}")]
    SlotFetchFailed { slot: Slot, source_index: usize },
}

/// Slots that have to be fetched to see every inclusion of attestations from `window`.
///
/// Attestations for the last slots of the window may be included up to
/// [`ATTESTATION_PROPAGATION_SLOT_RANGE`] slots later.
#[must_use]
pub fn slots_to_fetch(window: &RangeInclusive<Slot>) -> RangeInclusive<Slot> {
    *window.start()..=window.end().saturating_add(ATTESTATION_PROPAGATION_SLOT_RANGE)
}

pub struct BlockFetcher {
    pool: Arc<SourcePool>,
    progress: Arc<dyn FetchProgress>,
}

impl BlockFetcher {
    #[must_use]
    pub fn new(pool: Arc<SourcePool>, progress: Arc<dyn FetchProgress>) -> Self {
        Self { pool, progress }
    }

    /// Fetches every slot in `slots` and returns the observed blocks sorted by slot.
    ///
    /// Empty slots contribute nothing. The first hard error fails the whole fetch,
    /// but only after all spawned tasks have finished. Tasks that get their turn after a failure
    /// do not send requests.
    pub async fn fetch(&self, slots: RangeInclusive<Slot>) -> Result<Vec<BlockWithRoot>> {
        let failed = Arc::new(AtomicBool::new(false));
        let mut tasks = JoinSet::new();

        info!(
            "fetching slots {}..={} from {} sources",
            slots.start(),
            slots.end(),
            self.pool.len(),
        );

        for slot in slots {
            let pooled = self.pool.choose();
            let failed = Arc::clone(&failed);
            let progress = Arc::clone(&self.progress);

            tasks.spawn(async move {
                let source_index = pooled.index();
                let result = fetch_slot(&pooled, slot, &failed).await;

                if result.is_err() {
                    failed.store(true, Ordering::Release);
                }

                progress.slot_fetched();

                (slot, source_index, result)
            });
        }

        let mut blocks = vec![];
        let mut first_error = None;

        while let Some(joined) = tasks.join_next().await {
            let (slot, source_index, result) = joined?;

            match result {
                Ok(Some(block)) => blocks.push(block),
                Ok(None) => debug!("slot {slot} is empty"),
                Err(error) => {
                    warn!("failed to fetch slot {slot} from source {source_index}: {error:?}");

                    first_error.get_or_insert_with(|| {
                        error.context(Error::SlotFetchFailed { slot, source_index })
                    });
                }
            }
        }

        if let Some(error) = first_error {
            return Err(error);
        }

        blocks.sort_by_key(|block| block.slot);

        info!("fetched {} blocks", blocks.len());

        Ok(blocks)
    }
}

async fn fetch_slot(
    pooled: &PooledSource,
    slot: Slot,
    failed: &AtomicBool,
) -> Result<Option<BlockWithRoot>> {
    let _permit = pooled.acquire().await?;

    if failed.load(Ordering::Acquire) {
        return Ok(None);
    }

    pooled.source().fetch_block(slot).await
}

#[cfg(test)]
mod tests {
    use core::{
        fmt::{Display, Formatter, Result as FmtResult},
        sync::atomic::AtomicUsize,
    };
    use std::collections::HashMap;

    use anyhow::bail;
    use async_trait::async_trait;
    use beacon_api::BlockSource;
    use nonzero_ext::nonzero;
    use types::phase0::primitives::H256;

    use super::*;

    #[derive(Default)]
    struct MapSource {
        blocks: HashMap<Slot, BlockWithRoot>,
        failing_slot: Option<Slot>,
        requests: AtomicUsize,
    }

    impl Display for MapSource {
        fn fmt(&self, formatter: &mut Formatter) -> FmtResult {
            formatter.write_str("map source")
        }
    }

    #[async_trait]
    impl BlockSource for MapSource {
        async fn node_version(&self) -> Result<String> {
            Ok("Map/0.0.0".to_owned())
        }

        async fn fetch_block(&self, slot: Slot) -> Result<Option<BlockWithRoot>> {
            self.requests.fetch_add(1, Ordering::SeqCst);

            if self.failing_slot == Some(slot) {
                bail!("connection reset by peer");
            }

            Ok(self.blocks.get(&slot).cloned())
        }
    }

    #[derive(Default)]
    struct CountingProgress(AtomicUsize);

    impl FetchProgress for CountingProgress {
        fn slot_fetched(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn block(slot: Slot) -> BlockWithRoot {
        BlockWithRoot {
            root: H256::from_low_u64_be(slot + 1),
            slot,
            parent_root: H256::from_low_u64_be(slot),
            attestations: vec![],
        }
    }

    fn fetcher(source: Arc<MapSource>, progress: Arc<CountingProgress>) -> Result<BlockFetcher> {
        let sources: [Arc<dyn BlockSource>; 1] = [source];
        let pool = SourcePool::new(sources, nonzero!(4_usize))?;
        Ok(BlockFetcher::new(Arc::new(pool), progress))
    }

    #[test]
    fn test_slots_to_fetch_adds_inclusion_margin() {
        assert_eq!(slots_to_fetch(&(64..=127)), 64..=159);
        assert_eq!(slots_to_fetch(&(0..=u64::MAX)), 0..=u64::MAX);
    }

    #[tokio::test]
    async fn test_fetch_skips_empty_slots_and_sorts() -> Result<()> {
        let source = Arc::new(MapSource {
            blocks: [1, 2, 4, 7].into_iter().map(|slot| (slot, block(slot))).collect(),
            ..MapSource::default()
        });

        let progress = Arc::new(CountingProgress::default());
        let blocks = fetcher(Arc::clone(&source), Arc::clone(&progress))?
            .fetch(0..=9)
            .await?;

        assert_eq!(
            blocks.iter().map(|block| block.slot).collect::<Vec<_>>(),
            [1, 2, 4, 7],
        );

        assert_eq!(source.requests.load(Ordering::SeqCst), 10);
        assert_eq!(progress.0.load(Ordering::SeqCst), 10);

        Ok(())
    }

    #[tokio::test]
    async fn test_fetch_fails_on_hard_error() -> Result<()> {
        let source = Arc::new(MapSource {
            blocks: (0..10).map(|slot| (slot, block(slot))).collect(),
            failing_slot: Some(5),
            ..MapSource::default()
        });

        let progress = Arc::new(CountingProgress::default());
        let error = fetcher(source, Arc::clone(&progress))?
            .fetch(0..=9)
            .await
            .expect_err("failure at slot 5 should fail the whole fetch");

        assert_eq!(
            error.downcast_ref::<Error>(),
            Some(&Error::SlotFetchFailed {
                slot: 5,
                source_index: 0,
            }),
        );

        assert_eq!(progress.0.load(Ordering::SeqCst), 10);

        Ok(())
    }

    #[tokio::test]
    async fn test_no_requests_are_sent_after_failure() -> Result<()> {
        let source = Arc::new(MapSource {
            failing_slot: Some(0),
            ..MapSource::default()
        });

        let sources: [Arc<dyn BlockSource>; 1] = [Arc::<MapSource>::clone(&source)];
        let pool = SourcePool::new(sources, nonzero!(1_usize))?;

        BlockFetcher::new(Arc::new(pool), Arc::new(()))
            .fetch(0..=31)
            .await
            .expect_err("failure at slot 0 should fail the whole fetch");

        assert_eq!(source.requests.load(Ordering::SeqCst), 1);

        Ok(())
    }
}
