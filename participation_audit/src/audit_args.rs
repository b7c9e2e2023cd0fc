use core::{
    fmt::Display,
    num::{NonZeroU64, NonZeroUsize},
    time::Duration,
};

use anyhow::{ensure, Result};
use clap::{error::ErrorKind, CommandFactory as _, Error as ClapError, Parser};
use thiserror::Error;
use types::{phase0::primitives::Epoch, redacting_url::RedactingUrl};

use crate::{
    audit_config::AuditConfig,
    consts::{
        APPLICATION_NAME, APPLICATION_VERSION, DEFAULT_CONCURRENCY_PER_SOURCE,
        DEFAULT_REQUEST_TIMEOUT_MS, MAX_EPOCH_SPAN,
    },
    epoch_range::EpochRange,
    report::OutputFormat,
};

/// Measures attestation participation and inclusion effectiveness
/// from blocks served by one or more beacon nodes
#[derive(Parser)]
#[clap(display_name = APPLICATION_NAME, verbatim_doc_comment, version = APPLICATION_VERSION)]
pub struct AuditArgs {
    /// Beacon node API URLs. Each request goes to one of them chosen at random
    #[clap(long, required = true, value_delimiter = ',')]
    beacon_node_urls: Vec<RedactingUrl>,

    /// Maximum number of requests in flight to a single beacon node
    #[clap(long, default_value_t = DEFAULT_CONCURRENCY_PER_SOURCE)]
    concurrency: NonZeroUsize,

    /// Timeout for a single request in milliseconds
    #[clap(long, default_value_t = DEFAULT_REQUEST_TIMEOUT_MS)]
    request_timeout: NonZeroU64,

    #[clap(long, value_enum, default_value_t = OutputFormat::default())]
    output_format: OutputFormat,

    /// Epoch to audit (N) or inclusive range of epochs (A-B)
    epochs: EpochRange,
}

impl AuditArgs {
    pub fn try_into_config(self) -> Result<AuditConfig> {
        let Self {
            beacon_node_urls,
            concurrency,
            request_timeout,
            output_format,
            epochs,
        } = self;

        ensure!(
            epochs.span() <= MAX_EPOCH_SPAN,
            Error::EpochSpanTooLarge {
                epochs,
                span: epochs.span(),
            },
        );

        Ok(AuditConfig {
            beacon_node_urls,
            concurrency_per_source: concurrency,
            request_timeout: Duration::from_millis(request_timeout.get()),
            output_format,
            epochs,
        })
    }

    #[must_use]
    pub fn clap_error(message: impl Display) -> ClapError {
        Self::command().error(ErrorKind::ValueValidation, message)
    }
}

#[derive(Debug, Error)]
#[cfg_attr(test, derive(PartialEq, Eq))]
enum Error {
    #[error("epochs {epochs} span {span} epochs; at most {MAX_EPOCH_SPAN} are allowed")]
    EpochSpanTooLarge { epochs: EpochRange, span: Epoch },
}
