use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

/// Cooperative cancellation signal threaded through a run.
///
/// The scheduler checks it at the top of every wave; long-running node
/// operations (HTTP, streamed generation) select against [`cancelled`]
/// themselves. Cancelling never interrupts a node that does not observe the
/// signal; the scheduler's guarantee is only that no new wave is
/// dispatched afterwards.
///
/// [`cancelled`]: CancellationSignal::cancelled
#[derive(Debug, Clone, Default)]
pub struct CancellationSignal {
    token: CancellationToken,
}

impl CancellationSignal {
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.token.cancelled()
    }
}
