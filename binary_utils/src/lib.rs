use std::io::{self, IsTerminal as _};

use anyhow::Result;
use chrono::{Local, SecondsFormat};
use tracing::debug;
use tracing_subscriber::{
    filter::LevelFilter,
    fmt::{self, format::Writer, time::FormatTime},
    prelude::*,
    EnvFilter, Registry,
};

const LOG_FILTER_ENV_VAR: &str = "PARTICIPATION_AUDIT_LOG";

const LOGGED_CRATES: &[&str] = &[
    "beacon_api",
    "binary_utils",
    "block_fetcher",
    "validator_statistics",
];

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> core::fmt::Result {
        write!(
            w,
            "[{}]",
            Local::now().to_rfc3339_opts(SecondsFormat::Millis, true)
        )
    }
}

pub fn initialize_tracing_logger(module_path: &str, always_write_style: bool) -> Result<()> {
    let mut filter = default_filter(module_path)?;

    if let Ok(env_filter) = EnvFilter::try_from_env(LOG_FILTER_ENV_VAR) {
        for directive in env_filter.to_string().split(',') {
            filter = filter.add_directive(directive.parse()?);
        }
    }

    // Reports go to stdout. Logs must not end up mixed into them.
    let enable_ansi = always_write_style || io::stderr().is_terminal();

    let stderr_layer = fmt::layer::<Registry>()
        .with_writer(io::stderr)
        .compact()
        .with_thread_ids(false)
        .with_target(true)
        .with_file(false)
        .with_line_number(true)
        .with_timer(LocalTimer)
        .with_ansi(enable_ansi)
        .with_filter(filter);

    tracing_subscriber::registry().with(stderr_layer).try_init()?;

    debug!("tracing started");

    Ok(())
}

fn default_filter(module_path: &str) -> Result<EnvFilter> {
    let mut filter = EnvFilter::default().add_directive(LevelFilter::OFF.into());

    for crate_name in LOGGED_CRATES.iter().copied().chain([module_path]) {
        filter = filter.add_directive(format!("{crate_name}=info").parse()?);
    }

    Ok(filter)
}
