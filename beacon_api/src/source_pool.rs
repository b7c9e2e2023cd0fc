use core::num::NonZeroUsize;
use std::sync::Arc;

use anyhow::{ensure, Result};
use futures::future::try_join_all;
use rand::Rng as _;
use reqwest::Client;
use thiserror::Error;
use tokio::sync::{Semaphore, SemaphorePermit};
use tracing::{debug, info};
use types::{nonstandard::BlockWithRoot, phase0::primitives::Slot, redacting_url::RedactingUrl};

use crate::{block_source::BlockSource, http_source::HttpBlockSource};

#[derive(Debug, Error)]
#[cfg_attr(test, derive(PartialEq, Eq))]
pub enum Error {
    #[error("no beacon nodes configured")]
    NoSources,
}

/// A source together with the semaphore bounding requests sent to it.
#[derive(Clone)]
pub struct PooledSource {
    index: usize,
    source: Arc<dyn BlockSource>,
    permits: Arc<Semaphore>,
}

impl PooledSource {
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn source(&self) -> &dyn BlockSource {
        self.source.as_ref()
    }

    /// Waits for a free request slot on this source.
    ///
    /// The slot is released when the returned permit is dropped.
    pub async fn acquire(&self) -> Result<SemaphorePermit<'_>> {
        self.permits.acquire().await.map_err(Into::into)
    }

    pub async fn fetch_block(&self, slot: Slot) -> Result<Option<BlockWithRoot>> {
        let _permit = self.acquire().await?;
        self.source.fetch_block(slot).await
    }
}

/// Interchangeable sources with a separate concurrency budget for each of them.
pub struct SourcePool {
    sources: Vec<PooledSource>,
}

impl SourcePool {
    pub fn new(
        sources: impl IntoIterator<Item = Arc<dyn BlockSource>>,
        concurrency_per_source: NonZeroUsize,
    ) -> Result<Self> {
        let sources = sources
            .into_iter()
            .enumerate()
            .map(|(index, source)| PooledSource {
                index,
                source,
                permits: Arc::new(Semaphore::new(concurrency_per_source.get())),
            })
            .collect::<Vec<_>>();

        ensure!(!sources.is_empty(), Error::NoSources);

        Ok(Self { sources })
    }

    pub fn http(
        client: &Client,
        urls: impl IntoIterator<Item = RedactingUrl>,
        concurrency_per_source: NonZeroUsize,
    ) -> Result<Self> {
        let sources = urls.into_iter().map(|url| -> Arc<dyn BlockSource> {
            Arc::new(HttpBlockSource::new(client.clone(), url))
        });

        Self::new(sources, concurrency_per_source)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Checks that every source is reachable before any work is started.
    pub async fn connect(&self) -> Result<()> {
        let versions = try_join_all(self.sources.iter().map(|pooled| async move {
            pooled
                .source
                .node_version()
                .await
                .map(|version| (pooled, version))
        }))
        .await?;

        for (pooled, version) in versions {
            info!("connected to beacon node {} ({version})", pooled.source);
        }

        Ok(())
    }

    /// Picks a source uniformly at random.
    #[must_use]
    pub fn choose(&self) -> PooledSource {
        let index = rand::thread_rng().gen_range(0..self.sources.len());
        let pooled = self.sources[index].clone();

        debug!("chose source {index} ({})", pooled.source);

        pooled
    }

    pub async fn fetch_block(&self, slot: Slot) -> Result<Option<BlockWithRoot>> {
        self.choose().fetch_block(slot).await
    }
}
