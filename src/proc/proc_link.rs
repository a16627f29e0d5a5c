use crate::core::Dest;
use crate::core::InternalPid;

// -----------------------------------------------------------------------------
// Proc Link
// -----------------------------------------------------------------------------

/// State of one side of a process link.
///
/// A link is enabled until `unlink` is called, at which point it is disabled
/// with a unique id. The peer answers with an acknowledgment carrying the
/// same id; only then is the entry removed. Exit signals arriving from a
/// disabled link are ignored.
#[derive(Debug)]
#[repr(transparent)]
pub(crate) struct ProcLink {
  unlink: Option<u64>,
}

impl ProcLink {
  /// Creates a new enabled link.
  #[inline]
  pub(crate) const fn new() -> Self {
    Self { unlink: None }
  }

  #[inline]
  pub(crate) const fn is_enabled(&self) -> bool {
    self.unlink.is_none()
  }

  #[inline]
  pub(crate) const fn is_disabled(&self) -> bool {
    self.unlink.is_some()
  }

  #[inline]
  pub(crate) fn enable(&mut self) {
    self.unlink = None;
  }

  #[inline]
  pub(crate) fn disable(&mut self, ulid: u64) {
    self.unlink = Some(ulid);
  }

  /// Returns `true` if an unlink with id `ulid` is in progress.
  #[inline]
  pub(crate) fn matches(&self, ulid: u64) -> bool {
    self.unlink == Some(ulid)
  }
}

// -----------------------------------------------------------------------------
// Proc Monitor
// -----------------------------------------------------------------------------

/// State of a monitor, stored by both the watcher and the watched process.
///
/// `peer` is the process on the other side: the watched process in the
/// watcher's table, and the watcher in the watched process's table.
#[derive(Debug)]
pub(crate) struct ProcMonitor {
  peer: InternalPid,
  target: Dest,
}

impl ProcMonitor {
  #[inline]
  pub(crate) const fn new(peer: InternalPid, target: Dest) -> Self {
    Self { peer, target }
  }

  /// Returns the process on the other side of the monitor.
  #[inline]
  pub(crate) const fn peer(&self) -> InternalPid {
    self.peer
  }

  /// Returns the watched destination as given to `monitor`.
  #[inline]
  pub(crate) const fn target(&self) -> Dest {
    self.target
  }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use crate::proc::ProcLink;

  #[test]
  fn test_link_states() {
    let mut link: ProcLink = ProcLink::new();

    assert!(link.is_enabled());

    link.disable(7);

    assert!(link.is_disabled());
    assert!(link.matches(7));
    assert!(!link.matches(8));

    link.enable();

    assert!(link.is_enabled());
    assert!(!link.matches(7));
  }
}
