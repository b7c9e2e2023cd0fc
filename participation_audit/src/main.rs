use core::future::Future;
use std::{io, process::ExitCode, sync::Arc, time::Instant};

use anyhow::Result;
use beacon_api::SourcePool;
use block_fetcher::BlockFetcher;
use clap::{Error as ClapError, Parser as _};
use reqwest::Client;
use tokio::runtime::Builder;
use tracing::{error, info};
use validator_statistics::{CanonicalChain, ParticipationStatistics, SlotParticipations};

use crate::{
    audit_args::AuditArgs,
    audit_config::AuditConfig,
    progress::LoggingProgress,
    report::{AuditReport, StageTimings},
};

mod audit_args;
mod audit_config;
mod consts;
mod epoch_range;
mod progress;
mod report;

fn main() -> ExitCode {
    if let Err(error) = try_main() {
        error.downcast_ref().map(ClapError::exit);
        error!("{error:?}");
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn try_main() -> Result<()> {
    binary_utils::initialize_tracing_logger(
        module_path!(),
        cfg!(feature = "logger-always-write-style"),
    )?;

    let config = AuditArgs::try_parse()?
        .try_into_config()
        .map_err(AuditArgs::clap_error)?;

    info!("starting participation audit");
    config.report();

    let report = block_on(audit(&config))?;

    report.write(config.output_format, io::stdout().lock())
}

async fn audit(config: &AuditConfig) -> Result<AuditReport> {
    let AuditConfig {
        beacon_node_urls,
        concurrency_per_source,
        request_timeout,
        epochs,
        ..
    } = config;

    let client = Client::builder().timeout(*request_timeout).build()?;

    let pool = SourcePool::http(
        &client,
        beacon_node_urls.iter().cloned(),
        *concurrency_per_source,
    )?;

    pool.connect().await?;

    let window = epochs.slots();
    let slots = block_fetcher::slots_to_fetch(&window);
    let progress = Arc::new(LoggingProgress::new(&slots));
    let fetcher = BlockFetcher::new(Arc::new(pool), progress);

    let started = Instant::now();
    let blocks = fetcher.fetch(slots).await?;
    let fetch = started.elapsed();

    let started = Instant::now();
    let chain = CanonicalChain::reconstruct(blocks, *window.start())?;
    let reconstruct = started.elapsed();

    let started = Instant::now();
    let participations = SlotParticipations::organize(&chain, &window)?;
    let statistics = ParticipationStatistics::calculate(&participations, &chain);
    let aggregate = started.elapsed();

    let timings = StageTimings {
        fetch,
        reconstruct,
        aggregate,
    };

    Ok(AuditReport::new(*epochs, &chain, &statistics, timings))
}

fn block_on<T>(future: impl Future<Output = Result<T>>) -> Result<T> {
    Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(future)
}
