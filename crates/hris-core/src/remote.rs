//! Bounded store calls.
//!
//! Every call the engines make into an [`HrStore`](crate::store::HrStore) goes
//! through [`call`], which applies the configured timeout and turns backend
//! errors into [`Error`] at the operation boundary.

use std::{future::Future, time::Duration};

use tracing::warn;

use crate::{Error, Result, store::StoreFault};

pub(crate) async fn call<T, E, F>(op: &'static str, after: Duration, fut: F) -> Result<T>
where
  E: StoreFault,
  F: Future<Output = Result<T, E>>,
{
  match tokio::time::timeout(after, fut).await {
    Ok(Ok(value)) => Ok(value),
    Ok(Err(e)) if e.is_conflict() => Err(Error::Conflict(e.to_string())),
    Ok(Err(e)) => {
      warn!(op, error = %e, "store call failed");
      Err(Error::Store(Box::new(e)))
    }
    Err(_) => {
      warn!(op, ?after, "store call timed out");
      Err(Error::Timeout { op, after })
    }
  }
}

#[cfg(test)]
mod tests {
  use std::future;

  use super::*;
  use crate::ErrorKind;

  #[derive(Debug, thiserror::Error)]
  enum Fault {
    #[error("unique constraint failed")]
    Unique,
    #[error("database is locked")]
    Locked,
  }

  impl StoreFault for Fault {
    fn is_conflict(&self) -> bool { matches!(self, Self::Unique) }
  }

  #[tokio::test(start_paused = true)]
  async fn a_hung_store_call_times_out() {
    let after = Duration::from_secs(10);
    let err = call::<(), Fault, _>("list_leaves", after, future::pending()).await.unwrap_err();

    assert!(matches!(err, Error::Timeout { op: "list_leaves", after: a } if a == after));
    assert_eq!(err.kind(), ErrorKind::Remote);
  }

  #[tokio::test]
  async fn store_failures_are_classified() {
    let after = Duration::from_secs(10);

    let err = call::<(), _, _>("insert_attendance", after, async { Err(Fault::Unique) }).await;
    assert!(matches!(err, Err(Error::Conflict(_))));

    let err = call::<(), _, _>("insert_attendance", after, async { Err(Fault::Locked) }).await;
    let err = err.unwrap_err();
    assert!(matches!(err, Error::Store(_)));
    assert_eq!(err.kind(), ErrorKind::Remote);

    let ok = call::<_, Fault, _>("count_employees", after, async { Ok(3) }).await;
    assert_eq!(ok.unwrap(), 3);
  }
}
