use spindle::core::Exit;
use spindle::core::InternalPid;
use spindle::core::MonitorRef;
use spindle::error::ProcessError;
use spindle::erts::DynMessage;
use spindle::erts::ExitMessage;
use spindle::erts::Process;
use spindle::erts::SpawnConfig;
use spindle::erts::SpawnHandle;
use spindle::init;
use std::time::Duration;

const WAIT: Duration = Duration::from_secs(5);

fn run<F>(future: F)
where
  F: Future<Output = ()> + Send + 'static,
{
  init::block_on(future).unwrap();
}

async fn recv_down(mref: MonitorRef) -> Exit {
  match Process::receive_timeout(|message| message.is_down_for(mref), WAIT).await {
    Ok(DynMessage::Down(down)) => down.reason().clone(),
    other => panic!("expected DOWN, got {other:?}"),
  }
}

async fn recv_exit(pid: InternalPid) -> Exit {
  match Process::receive_timeout(|message| message.is_exit_from(pid), WAIT).await {
    Ok(DynMessage::Exit(exit)) => exit.reason().clone(),
    other => panic!("expected EXIT, got {other:?}"),
  }
}

fn spawn_trapping<F>(future: F) -> (InternalPid, MonitorRef)
where
  F: Future<Output = ()> + Send + 'static,
{
  let options: SpawnConfig = SpawnConfig {
    trap_exit: true,
    ..SpawnConfig::new_monitor()
  };

  match Process::spawn_opt(future, options) {
    SpawnHandle::Monitor(pid, mref) => (pid, mref),
    SpawnHandle::Process(_) => panic!("expected monitor"),
  }
}

async fn idle() {
  let _message: DynMessage = Process::receive_any().await;
}

#[test]
fn trapped_link_exit() {
  run(async {
    Process::trap_exit(true);

    let child: InternalPid = Process::spawn_link(async {
      Process::terminate("kaboom") as ()
    });

    assert_eq!(recv_exit(child).await, Exit::from("kaboom"));
  });
}

#[test]
fn exit_propagates_through_links() {
  run(async {
    let (middle, mref): (InternalPid, MonitorRef) = Process::spawn_monitor(async {
      Process::spawn_link(async {
        Process::sleep(Duration::from_millis(20)).await;
        Process::terminate("kaboom") as ()
      });

      idle().await;
    });

    assert_eq!(recv_down(mref).await, Exit::from("kaboom"));
    assert!(!Process::alive(middle));
  });
}

#[test]
fn normal_exit_keeps_linked_alive() {
  run(async {
    let (watcher, mref): (InternalPid, MonitorRef) = Process::spawn_monitor(async {
      Process::spawn_link(async {});
      idle().await;
    });

    Process::sleep(Duration::from_millis(100)).await;

    assert!(Process::alive(watcher));

    Process::send(watcher, ());

    assert_eq!(recv_down(mref).await, Exit::NORMAL);
  });
}

#[test]
fn link_to_dead_process() {
  run(async {
    Process::trap_exit(true);

    let (pid, mref): (InternalPid, MonitorRef) = Process::spawn_monitor(async {});

    recv_down(mref).await;
    Process::link(pid);

    assert_eq!(recv_exit(pid).await, Exit::NOPROC);
  });
}

#[test]
fn link_to_dead_process_kills_caller() {
  run(async {
    let (pid, mref): (InternalPid, MonitorRef) = Process::spawn_monitor(async {});

    recv_down(mref).await;

    let (_caller, mref): (InternalPid, MonitorRef) = Process::spawn_monitor(async move {
      Process::link(pid);
      idle().await;
    });

    assert_eq!(recv_down(mref).await, Exit::NOPROC);
  });
}

#[test]
fn unlink_stops_propagation() {
  run(async {
    Process::trap_exit(true);

    let child: InternalPid = Process::spawn_link(idle());

    Process::unlink(child);

    let mref: MonitorRef = Process::monitor(child);

    Process::exit(child, "kaboom");

    assert_eq!(recv_down(mref).await, Exit::from("kaboom"));

    let result: Result<DynMessage, ProcessError> =
      Process::receive_timeout(|message| message.is_exit_from(child), Duration::from_millis(50)).await;

    assert_eq!(result.unwrap_err(), ProcessError::Timeout);
  });
}

#[test]
fn kill_is_untrappable() {
  run(async {
    let (child, mref): (InternalPid, MonitorRef) = spawn_trapping(idle());

    Process::kill(child);

    assert_eq!(recv_down(mref).await, Exit::KILLED);
  });
}

#[test]
fn killed_propagates_as_killed() {
  run(async {
    Process::trap_exit(true);

    let child: InternalPid = Process::spawn_link(idle());

    Process::kill(child);

    assert_eq!(recv_exit(child).await, Exit::KILLED);
  });
}

#[test]
fn normal_exit_signal_ignored() {
  run(async {
    let (child, mref): (InternalPid, MonitorRef) = Process::spawn_monitor(idle());

    Process::exit(child, Exit::NORMAL);
    Process::sleep(Duration::from_millis(50)).await;

    assert!(Process::alive(child));

    Process::kill(child);

    assert_eq!(recv_down(mref).await, Exit::KILLED);
  });
}

#[test]
fn exit_signal_terminates() {
  run(async {
    let (child, mref): (InternalPid, MonitorRef) = Process::spawn_monitor(idle());

    Process::exit(child, "shutdown_now");

    assert_eq!(recv_down(mref).await, Exit::from("shutdown_now"));
  });
}

#[test]
fn exit_signal_trapped() {
  run(async {
    let parent: InternalPid = Process::this();

    let (child, mref): (InternalPid, MonitorRef) = spawn_trapping(async move {
      let exit: Box<ExitMessage> = Process::receive_exact().await;
      Process::send(parent, (exit.from(), exit.reason().clone()));
    });

    Process::exit(child, "kaboom");

    let report: Box<(InternalPid, Exit)> = Process::receive_exact_timeout(WAIT).await.unwrap();

    assert_eq!(*report, (parent, Exit::from("kaboom")));
    assert_eq!(recv_down(mref).await, Exit::NORMAL);
  });
}

#[test]
fn link_is_idempotent() {
  run(async {
    Process::trap_exit(true);

    let child: InternalPid = Process::spawn(idle());

    Process::link(child);
    Process::link(child);
    Process::link(Process::this());
    Process::exit(child, "kaboom");

    assert_eq!(recv_exit(child).await, Exit::from("kaboom"));

    let result: Result<DynMessage, ProcessError> =
      Process::receive_timeout(|message| message.is_exit_from(child), Duration::from_millis(50)).await;

    assert_eq!(result.unwrap_err(), ProcessError::Timeout);
  });
}
