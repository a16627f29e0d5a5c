use pin_project_lite::pin_project;
use std::any::Any;
use std::panic;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::task::Context;
use std::task::Poll;

/// Payload of a caught panic.
pub(crate) type Panic = Box<dyn Any + Send>;

pin_project! {
  /// Future that turns a panic while polling `future` into an `Err`.
  ///
  /// Process futures own all of their state, nothing observes it after a
  /// panic, so the wrapped future is treated as unwind safe.
  #[derive(Debug)]
  #[repr(transparent)]
  pub(crate) struct CatchUnwind<F> {
    #[pin]
    future: F,
  }
}

impl<F> CatchUnwind<F>
where
  F: Future,
{
  #[inline]
  pub(crate) const fn new(future: F) -> Self {
    Self { future }
  }
}

impl<F> Future for CatchUnwind<F>
where
  F: Future,
{
  type Output = Result<F::Output, Panic>;

  fn poll(self: Pin<&mut Self>, context: &mut Context<'_>) -> Poll<Self::Output> {
    let future: Pin<&mut F> = self.project().future;

    match panic::catch_unwind(AssertUnwindSafe(|| future.poll(context))) {
      Ok(Poll::Ready(output)) => Poll::Ready(Ok(output)),
      Ok(Poll::Pending) => Poll::Pending,
      Err(payload) => Poll::Ready(Err(payload)),
    }
  }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use std::panic;

  use super::Panic;
  use crate::core::Exit;
  use crate::utils::CatchUnwind;

  #[tokio::test]
  async fn test_ready() {
    assert_eq!(CatchUnwind::new(async { 7 }).await.ok(), Some(7));
  }

  #[tokio::test]
  async fn test_panic_payload() {
    let result: Result<(), Panic> = CatchUnwind::new(async {
      tokio::task::yield_now().await;
      panic::resume_unwind(Box::new(Exit::KILLED));
    })
    .await;

    let payload: Panic = result.unwrap_err();

    assert_eq!(payload.downcast_ref::<Exit>(), Some(&Exit::KILLED));
  }
}
