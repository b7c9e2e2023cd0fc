/// Receives a signal every time the fetcher is done with a slot,
/// whether a block was found there or not.
///
/// Called from fetch tasks. Implementations must not block.
pub trait FetchProgress: Send + Sync {
    fn slot_fetched(&self);
}

impl FetchProgress for () {
    fn slot_fetched(&self) {}
}
