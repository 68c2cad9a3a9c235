use log::warn;
use std::future::Future;

use crate::errors::Result;

/// Runs `attempt`, and runs it once more if it lost an optimistic-version race.
///
/// Each attempt must re-read its inputs. A second stale write is returned as is.
pub async fn retry_on_stale_write<T, F, Fut>(operation: &str, mut attempt: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    match attempt().await {
        Err(err) if err.is_stale_write() => {
            warn!("{} hit a concurrent modification, retrying: {}", operation, err);
            attempt().await
        }
        result => result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{DatabaseError, Error, ErrorKind};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn retries_a_stale_write_once() {
        let calls = AtomicUsize::new(0);
        let result = retry_on_stale_write("test", || async {
            if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(DatabaseError::ConcurrentModification("fund".to_string()).into())
            } else {
                Ok(7)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn second_stale_write_surfaces_as_conflict() {
        let calls = AtomicUsize::new(0);
        let result: Result<()> = retry_on_stale_write("test", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(DatabaseError::ConcurrentModification("fund".to_string()).into())
        })
        .await;
        assert_eq!(result.unwrap_err().kind(), ErrorKind::Conflict);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn other_errors_are_not_retried() {
        let calls = AtomicUsize::new(0);
        let result: Result<()> = retry_on_stale_write("test", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(Error::invalid_input("bad"))
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
