use crate::infrastructure::model::ModelError;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum GuardError {
    #[error("model call exceeded the {deadline:?} deadline")]
    Timeout { deadline: Duration },
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("model call aborted: {0}")]
    Aborted(String),
}

/// Runs `call` on the runtime and waits at most `deadline` for it.
///
/// On expiry the task is detached, not cancelled: whatever it eventually
/// produces is discarded.
pub async fn invoke<F, T>(deadline: Duration, call: F) -> Result<T, GuardError>
where
    F: Future<Output = Result<T, ModelError>> + Send + 'static,
    T: Send + 'static,
{
    let handle = tokio::spawn(call);
    match tokio::time::timeout(deadline, handle).await {
        Err(_) => {
            warn!(?deadline, "Model call timed out");
            Err(GuardError::Timeout { deadline })
        }
        Ok(Err(join)) => Err(GuardError::Aborted(join.to_string())),
        Ok(Ok(result)) => result.map_err(GuardError::from),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[tokio::test(start_paused = true)]
    async fn fast_call_passes_through() {
        let value = invoke(Duration::from_secs(10), async {
            tokio::time::sleep(Duration::from_secs(1)).await;
            Ok::<_, ModelError>("FINAL_ANSWER: [8]")
        })
        .await
        .unwrap();

        assert_eq!(value, "FINAL_ANSWER: [8]");
    }

    #[tokio::test(start_paused = true)]
    async fn slow_call_times_out_and_keeps_running() {
        let finished = Arc::new(AtomicBool::new(false));
        let flag = finished.clone();

        let err = invoke(Duration::from_secs(10), async move {
            tokio::time::sleep(Duration::from_secs(60)).await;
            flag.store(true, Ordering::SeqCst);
            Ok::<_, ModelError>(())
        })
        .await
        .unwrap_err();

        assert!(matches!(err, GuardError::Timeout { deadline } if deadline == Duration::from_secs(10)));
        assert!(!finished.load(Ordering::SeqCst));

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert!(finished.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn model_failure_is_not_a_timeout() {
        let err = invoke(Duration::from_secs(10), async {
            Err::<(), _>(ModelError::provider_not_found("gemini"))
        })
        .await
        .unwrap_err();

        assert!(matches!(err, GuardError::Model(ModelError::ProviderNotFound { .. })));
    }

    #[tokio::test]
    async fn panicking_call_is_aborted() {
        let err = invoke(Duration::from_secs(10), async {
            if true {
                panic!("backend exploded");
            }
            Ok::<(), ModelError>(())
        })
        .await
        .unwrap_err();

        assert!(matches!(err, GuardError::Aborted(_)));
    }
}
