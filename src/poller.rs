use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use crate::config::{DEFAULT_MAX_ATTEMPTS, DEFAULT_POLL_INTERVAL_SECS};
use crate::decoder;
use crate::error::PollError;
use crate::report::Report;
use crate::transport::Transport;

/// Polls one tester device until its diagnostic run completes.
///
/// Strictly sequential: request, decide, sleep, repeat. Each instance owns
/// its own attempt budget; callers polling several devices run independent
/// pollers. The returned future suspends only at the fetch and the
/// inter-attempt sleep, so racing it against an external cancellation
/// signal is always safe.
pub struct Poller<T: Transport> {
    transport: T,
    max_attempts: u32,
    interval: Duration,
    deadline: Option<Duration>,
}

impl<T: Transport> Poller<T> {
    pub fn new(transport: T) -> Self {
        Poller {
            transport,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            deadline: None,
        }
    }

    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Bound total wall-clock time in addition to the attempt budget. The
    /// deadline is checked before each attempt, so `Timeout` still reports
    /// how many attempts were actually consumed.
    pub fn deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Poll until the device reports a complete run, then decode it.
    ///
    /// Network errors and unparseable bodies are transient: each consumes
    /// one attempt and is retried. Completeness is all-or-nothing — there
    /// is no partial report, only `Report` or `PollError::Timeout`. A
    /// complete envelope whose payload violates the schema is terminal
    /// (`PollError::Schema`), never retried.
    pub async fn poll(&mut self) -> Result<Report, PollError> {
        let started = Instant::now();
        let mut attempts = 0u32;

        while attempts < self.max_attempts {
            if let Some(deadline) = self.deadline {
                if started.elapsed() >= deadline {
                    warn!("Deadline passed after {} attempts", attempts);
                    return Err(PollError::Timeout { attempts });
                }
            }

            attempts += 1;

            match self.transport.fetch().await {
                Ok(envelope) => {
                    if envelope.is_complete() {
                        info!(
                            "Test run complete ({}/{} sub-tests, session {})",
                            envelope.fin_item_count, envelope.total_item_count, envelope.id
                        );
                        return Ok(decoder::decode(&envelope.payload)?);
                    }
                    debug!(
                        "Attempt {}/{}: {}/{} sub-tests finished",
                        attempts,
                        self.max_attempts,
                        envelope.fin_item_count,
                        envelope.total_item_count
                    );
                }
                Err(e) => {
                    warn!("Attempt {}/{} failed: {}", attempts, self.max_attempts, e);
                }
            }

            if attempts < self.max_attempts {
                sleep(self.interval).await;
            }
        }

        Err(PollError::Timeout { attempts })
    }
}
