/// Cancellation predicate polled by reply pollers.
///
/// Pollers call [`CancelCheck::is_cancelled`] before every blocking wait, so
/// cancellation latency is bounded by one wait, never by the full timeout.
pub trait CancelCheck: Send + Sync {
    fn is_cancelled(&self) -> bool;
}

impl<F> CancelCheck for F
where
    F: Fn() -> bool + Send + Sync,
{
    fn is_cancelled(&self) -> bool {
        self()
    }
}

/// A predicate that never fires.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverCancel;

impl CancelCheck for NeverCancel {
    fn is_cancelled(&self) -> bool {
        false
    }
}
