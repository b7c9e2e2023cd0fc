use core::{num::NonZeroUsize, time::Duration};

use itertools::Itertools as _;
use tracing::info;
use types::redacting_url::RedactingUrl;

use crate::{epoch_range::EpochRange, report::OutputFormat};

#[cfg_attr(test, derive(Debug))]
pub struct AuditConfig {
    pub beacon_node_urls: Vec<RedactingUrl>,
    pub concurrency_per_source: NonZeroUsize,
    pub request_timeout: Duration,
    pub output_format: OutputFormat,
    pub epochs: EpochRange,
}

impl AuditConfig {
    pub fn report(&self) {
        let Self {
            beacon_node_urls,
            concurrency_per_source,
            request_timeout,
            epochs,
            ..
        } = self;

        let slots = epochs.slots();

        info!("beacon node URLs: [{}]", beacon_node_urls.iter().format(", "));
        info!("concurrent requests per beacon node: {concurrency_per_source}");
        info!("request timeout: {request_timeout:?}");
        info!(
            "auditing epochs {epochs} (slots {}-{})",
            slots.start(),
            slots.end(),
        );
    }
}
