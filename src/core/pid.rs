use std::fmt::Debug;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

/// Source of process numbers; starts at 1 so `0` is never handed out.
static NEXT_PID: AtomicU64 = AtomicU64::new(1);

/// Identifier uniquely naming a process for the lifetime of the runtime.
///
/// PIDs are drawn from a monotonically increasing 64-bit counter and are
/// never reused, so a stale PID can never address a newer process.
///
/// # Format
///
/// PIDs display as `#PID<0.Number.0>` where the leading `0` denotes the
/// local node.
#[derive(Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[repr(transparent)]
pub struct InternalPid {
  bits: u64,
}

impl InternalPid {
  /// Sentinel value representing an undefined PID.
  pub(crate) const UNDEFINED: Self = Self::from_bits(0);

  /// Allocates the next process identifier.
  #[inline]
  pub(crate) fn next() -> Self {
    Self::from_bits(NEXT_PID.fetch_add(1, Ordering::Relaxed))
  }

  /// Creates a PID from its raw bits.
  #[inline]
  pub const fn from_bits(bits: u64) -> Self {
    Self { bits }
  }

  /// Converts this PID into its raw bits.
  #[inline]
  pub const fn into_bits(self) -> u64 {
    self.bits
  }
}

impl Debug for InternalPid {
  fn fmt(&self, f: &mut Formatter<'_>) -> Result {
    Display::fmt(self, f)
  }
}

impl Display for InternalPid {
  fn fmt(&self, f: &mut Formatter<'_>) -> Result {
    write!(f, "#PID<0.{}.0>", self.bits)
  }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------
