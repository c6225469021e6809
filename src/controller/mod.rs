//! Boundary between plain requests and the services.
//!
//! Every operation runs through [`intercept`], which logs the call and turns
//! any service error into a failure [`Reply`]. Nothing below this layer
//! reaches a caller as a raw error.

use std::future::Future;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::error::ServiceError;
use crate::models::reply::Reply;

mod citizen;
mod vote;

pub use citizen::CitizenController;
pub use vote::VoteController;

pub(crate) async fn intercept<T, F>(operation: &'static str, call: F) -> Reply<T>
where
    F: Future<Output = Result<Reply<T>, ServiceError>>,
{
    debug!(operation, "controller call started");
    let started = Instant::now();
    let outcome = call.await;
    let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    match outcome {
        Ok(reply) => {
            info!(operation, elapsed_ms, "controller call succeeded");
            reply
        }
        Err(err) => {
            warn!(
                operation,
                elapsed_ms,
                kind = ?err.kind(),
                error = %err,
                "controller call failed"
            );
            Reply::failure(&err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;

    #[tokio::test]
    async fn intercept_passes_success_through() {
        let reply: Reply<u8> =
            intercept("test", async { Ok::<_, ServiceError>(Reply::Data(7)) }).await;
        assert_eq!(reply, Reply::Data(7));
    }

    #[tokio::test]
    async fn intercept_converts_errors() {
        let reply: Reply = intercept("test", async {
            Err::<Reply, _>(ServiceError::invalid_state("Vote 1 is not active"))
        })
        .await;
        assert_eq!(
            reply,
            Reply::Failure {
                kind: FailureKind::InvalidState,
                error: "Vote 1 is not active".into(),
            }
        );
    }
}
