use crate::Envelope;

/// Items on the asynchronous dispatch queue.
#[derive(Debug)]
pub(crate) enum WorkerCommand {
    /// A message published with `post_async`.
    Dispatch(Envelope),
    /// Wake the worker so it notices the bus is stopping.
    Shutdown,
}
