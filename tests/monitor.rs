use spindle::core::Atom;
use spindle::core::Dest;
use spindle::core::Exit;
use spindle::core::InternalPid;
use spindle::core::MonitorRef;
use spindle::error::ProcessError;
use spindle::erts::DownMessage;
use spindle::erts::DynMessage;
use spindle::erts::Process;
use spindle::init;
use std::time::Duration;

const WAIT: Duration = Duration::from_secs(5);

fn run<F>(future: F)
where
  F: Future<Output = ()> + Send + 'static,
{
  init::block_on(future).unwrap();
}

async fn recv_down(mref: MonitorRef) -> DownMessage {
  match Process::receive_timeout(|message| message.is_down_for(mref), WAIT).await {
    Ok(DynMessage::Down(down)) => down,
    other => panic!("expected DOWN, got {other:?}"),
  }
}

async fn no_down(mref: MonitorRef) {
  let result: Result<DynMessage, ProcessError> =
    Process::receive_timeout(|message| message.is_down_for(mref), Duration::from_millis(50)).await;

  assert_eq!(result.unwrap_err(), ProcessError::Timeout);
}

async fn idle() {
  let _message: DynMessage = Process::receive_any().await;
}

#[test]
fn exactly_one_down() {
  run(async {
    let (pid, mref): (InternalPid, MonitorRef) = Process::spawn_monitor(async {
      Process::terminate("kaboom") as ()
    });

    let down: DownMessage = recv_down(mref).await;

    assert_eq!(down.mref(), mref);
    assert_eq!(down.from(), pid);
    assert_eq!(down.item(), Dest::Pid(pid));
    assert_eq!(*down.reason(), Exit::from("kaboom"));

    no_down(mref).await;
  });
}

#[test]
fn monitor_dead_process() {
  run(async {
    let (pid, mref): (InternalPid, MonitorRef) = Process::spawn_monitor(async {});

    recv_down(mref).await;

    let mref: MonitorRef = Process::monitor(pid);
    let down: DownMessage = recv_down(mref).await;

    assert_eq!(down.item(), Dest::Pid(pid));
    assert_eq!(*down.reason(), Exit::NOPROC);
  });
}

#[test]
fn monitor_unregistered_name() {
  run(async {
    let mref: MonitorRef = Process::monitor("monitor_name_missing");
    let down: DownMessage = recv_down(mref).await;

    assert_eq!(down.item(), Dest::Name(Atom::new("monitor_name_missing")));
    assert_eq!(*down.reason(), Exit::NOPROC);
  });
}

#[test]
fn monitor_registered_name() {
  run(async {
    let child: InternalPid = Process::spawn(idle());

    Process::register(child, "monitor_name_watched").unwrap();

    let mref: MonitorRef = Process::monitor("monitor_name_watched");

    Process::exit(child, "kaboom");

    let down: DownMessage = recv_down(mref).await;

    assert_eq!(down.item(), Dest::Name(Atom::new("monitor_name_watched")));
    assert_eq!(down.from(), child);
    assert_eq!(*down.reason(), Exit::from("kaboom"));
  });
}

#[test]
fn demonitor_prevents_down() {
  run(async {
    let child: InternalPid = Process::spawn(idle());
    let mref: MonitorRef = Process::monitor(child);
    let sync: MonitorRef = Process::monitor(child);

    assert!(Process::demonitor(mref));
    assert!(!Process::demonitor(mref));

    Process::kill(child);

    assert_eq!(*recv_down(sync).await.reason(), Exit::KILLED);

    no_down(mref).await;
  });
}

#[test]
fn flush_down_removes_message() {
  run(async {
    let (_pid, mref): (InternalPid, MonitorRef) = Process::spawn_monitor(async {});

    Process::sleep(Duration::from_millis(100)).await;

    assert!(Process::flush_down(mref));
    assert!(!Process::flush_down(mref));

    no_down(mref).await;
  });
}

#[test]
fn monitor_does_not_kill_watcher() {
  run(async {
    let (_pid, mref): (InternalPid, MonitorRef) = Process::spawn_monitor(async {
      panic!("boom") as ()
    });

    let down: DownMessage = recv_down(mref).await;

    assert_eq!(down.reason().downcast_ref::<String>().map(String::as_str), Some("boom"));
    assert!(Process::alive(Process::this()));
  });
}

#[test]
fn monitors_are_independent() {
  run(async {
    let child: InternalPid = Process::spawn(idle());
    let first: MonitorRef = Process::monitor(child);
    let second: MonitorRef = Process::monitor(child);

    assert_ne!(first, second);

    Process::send(child, ());

    assert_eq!(*recv_down(second).await.reason(), Exit::NORMAL);
    assert_eq!(*recv_down(first).await.reason(), Exit::NORMAL);
  });
}
