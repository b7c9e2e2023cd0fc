pub use crate::{
    fetcher::{slots_to_fetch, BlockFetcher, Error},
    progress::FetchProgress,
};

mod fetcher;
mod progress;
