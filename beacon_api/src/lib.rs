pub use crate::{
    block_source::BlockSource,
    http_source::{Error, HttpBlockSource},
    source_pool::{Error as SourcePoolError, PooledSource, SourcePool},
};

mod block_source;
mod http_source;
mod source_pool;
