use std::fmt::Debug;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

static NEXT_REF: AtomicU64 = AtomicU64::new(1);

/// Reference uniquely identifying a runtime object, such as a monitor.
#[derive(Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[repr(transparent)]
pub struct InternalRef {
  bits: u64,
}

/// Reference identifying an active monitor.
pub type MonitorRef = InternalRef;

impl InternalRef {
  /// Creates a new unique reference.
  #[expect(clippy::new_without_default, reason = "possibly confusing")]
  #[inline]
  pub fn new() -> Self {
    Self {
      bits: NEXT_REF.fetch_add(1, Ordering::Relaxed),
    }
  }

  /// Converts this reference into its raw bits.
  #[inline]
  pub const fn into_bits(self) -> u64 {
    self.bits
  }
}

impl Debug for InternalRef {
  fn fmt(&self, f: &mut Formatter<'_>) -> Result {
    Display::fmt(self, f)
  }
}

impl Display for InternalRef {
  fn fmt(&self, f: &mut Formatter<'_>) -> Result {
    write!(f, "#Ref<0.{}>", self.bits)
  }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------
