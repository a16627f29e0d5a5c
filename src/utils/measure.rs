//! Wall-clock timing of synchronous work.

use std::time::Duration;
use std::time::Instant;

/// Runs `f` and returns its output along with the time it took.
#[inline]
pub(crate) fn measure<F, R>(f: F) -> (R, Duration)
where
  F: FnOnce() -> R,
{
  let start: Instant = Instant::now();
  let output: R = f();

  (output, start.elapsed())
}

#[cfg(test)]
mod tests {
  use std::thread;
  use std::time::Duration;

  use crate::utils::measure;

  #[test]
  fn test_measure_output() {
    let (output, _elapsed): (u32, Duration) = measure(|| 6 * 7);

    assert_eq!(output, 42);
  }

  #[test]
  fn test_measure_elapsed() {
    let ((), elapsed): ((), Duration) = measure(|| thread::sleep(Duration::from_millis(10)));

    assert!(elapsed >= Duration::from_millis(10));
  }
}
