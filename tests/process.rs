use spindle::core::Atom;
use spindle::core::Dest;
use spindle::core::Exit;
use spindle::core::InternalPid;
use spindle::core::MonitorRef;
use spindle::error::ProcessError;
use spindle::erts::DynMessage;
use spindle::erts::Process;
use spindle::erts::ProcessFlags;
use spindle::erts::ProcessInfo;
use spindle::erts::ProcessStatus;
use spindle::erts::SpawnConfig;
use spindle::erts::SpawnHandle;
use spindle::init;
use std::num::NonZeroUsize;
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

#[test]
fn spawn_and_reply() {
  run(async {
    let parent: InternalPid = Process::this();

    let child: InternalPid = Process::spawn(async move {
      let value: Box<u32> = Process::receive_exact().await;
      Process::send(parent, *value * 2);
    });

    Process::send(child, 21_u32);

    let reply: Box<u32> = Process::receive_exact_timeout(WAIT).await.unwrap();

    assert_eq!(*reply, 42);
  });
}

#[test]
fn add_terminates_normal() {
  run(async {
    let (_pid, mref): (InternalPid, MonitorRef) = Process::spawn_monitor(async {
      let _sum: i32 = 2 + 3;
    });

    assert_eq!(recv_down(mref).await, Exit::NORMAL);
  });
}

#[test]
fn fifo_per_sender() {
  run(async {
    let parent: InternalPid = Process::this();

    Process::spawn(async move {
      for index in 0..100_u32 {
        Process::send(parent, index);
      }
    });

    for expected in 0..100_u32 {
      let value: Box<u32> = Process::receive_exact_timeout(WAIT).await.unwrap();
      assert_eq!(*value, expected);
    }
  });
}

#[test]
fn terminate_sets_reason() {
  run(async {
    let (_pid, mref): (InternalPid, MonitorRef) = Process::spawn_monitor(async {
      Process::terminate("kaboom") as ()
    });

    assert_eq!(recv_down(mref).await, Exit::from("kaboom"));
  });
}

#[test]
fn panic_becomes_exit_reason() {
  run(async {
    let (_pid, mref): (InternalPid, MonitorRef) = Process::spawn_monitor(async {
      panic!("boom") as ()
    });

    let reason: Exit = recv_down(mref).await;

    assert_eq!(reason.downcast_ref::<String>().map(String::as_str), Some("boom"));
  });
}

#[test]
fn result_output_becomes_exit_reason() {
  run(async {
    let (_pid, mref): (InternalPid, MonitorRef) = Process::spawn_monitor(async {
      Err::<(), Exit>(Exit::from("failed"))
    });

    assert_eq!(recv_down(mref).await, Exit::from("failed"));
  });
}

#[test]
fn alive_and_terminated() {
  run(async {
    assert!(Process::alive(Process::this()));

    let (pid, mref): (InternalPid, MonitorRef) = Process::spawn_monitor(async {});

    recv_down(mref).await;

    assert!(!Process::alive(pid));
    assert!(Process::info(pid).is_none());
    assert!(!Process::list().contains(&pid));
  });
}

#[test]
fn flags_and_info() {
  run(async {
    let this: InternalPid = Process::this();

    assert!(!Process::trap_exit(true));
    assert!(Process::trap_exit(true));
    assert!(Process::get_flags().contains(ProcessFlags::TRAP_EXIT));

    Process::send(this, 1_u8);
    Process::register(this, "process_info_test").unwrap();

    let info: ProcessInfo = Process::info(this).unwrap();

    assert_eq!(info.pid, this);
    assert_eq!(info.status, ProcessStatus::Runnable);
    assert_eq!(info.registered_name, Some(Atom::new("process_info_test")));
    assert!(info.trap_exit);
    assert!(info.parent.is_some());

    Process::set_flags(ProcessFlags::empty());

    assert!(!Process::set_flag(ProcessFlags::TRAP_EXIT, false));
  });
}

#[test]
fn waiting_status() {
  run(async {
    let child: InternalPid = Process::spawn(async {
      let _message: DynMessage = Process::receive_any().await;
    });

    let mut status: Option<ProcessStatus> = None;

    for _ in 0..100 {
      status = Process::info(child).map(|info| info.status);

      if status == Some(ProcessStatus::Waiting) {
        break;
      }

      Process::sleep(Duration::from_millis(10)).await;
    }

    assert_eq!(status, Some(ProcessStatus::Waiting));

    Process::send(child, ());
  });
}

#[test]
fn register_and_send_by_name() {
  run(async {
    let parent: InternalPid = Process::this();

    let child: InternalPid = Process::spawn(async move {
      let value: Box<&'static str> = Process::receive_exact().await;
      Process::send(parent, *value);
    });

    Process::register(child, "process_name_echo").unwrap();

    assert_eq!(Process::whereis("process_name_echo"), Some(child));
    assert!(Process::registered().contains(&Atom::new("process_name_echo")));

    assert_eq!(
      Process::register(parent, "process_name_echo"),
      Err(ProcessError::NameTaken(Atom::new("process_name_echo"))),
    );

    Process::send("process_name_echo", "ping");

    let reply: Box<&'static str> = Process::receive_exact_timeout(WAIT).await.unwrap();

    assert_eq!(*reply, "ping");
  });
}

#[test]
fn name_released_on_exit() {
  run(async {
    let (pid, mref): (InternalPid, MonitorRef) = Process::spawn_monitor(async {
      let _message: DynMessage = Process::receive_any().await;
    });

    Process::register(pid, "process_name_release").unwrap();
    Process::send(pid, ());

    recv_down(mref).await;

    assert!(!Process::alive(pid));
    assert!(!Process::list().contains(&pid));
    assert_eq!(Process::whereis("process_name_release"), None);
    assert_eq!(Process::unregister("process_name_release"), Err(ProcessError::NotRegistered));

    Process::register(Process::this(), "process_name_release").unwrap();
    Process::unregister("process_name_release").unwrap();
  });
}

#[test]
fn register_dead_process() {
  run(async {
    let (pid, mref): (InternalPid, MonitorRef) = Process::spawn_monitor(async {});

    recv_down(mref).await;

    assert_eq!(Process::register(pid, "process_name_dead"), Err(ProcessError::NoSuchProcess));
  });
}

#[test]
fn send_to_missing_is_dropped() {
  run(async {
    Process::send("process_name_missing", 1_u8);
    Process::send(Dest::Name(Atom::new("process_name_missing")), 2_u8);
  });
}

#[test]
fn spawn_opt_trap_exit() {
  run(async {
    let parent: InternalPid = Process::this();
    let options: SpawnConfig = SpawnConfig {
      trap_exit: true,
      ..SpawnConfig::new_monitor()
    };

    let handle: SpawnHandle = Process::spawn_opt(
      async move {
        Process::send(parent, Process::get_flags().contains(ProcessFlags::TRAP_EXIT));
      },
      options,
    );

    assert!(handle.is_monitor());

    let trapping: Box<bool> = Process::receive_exact_timeout(WAIT).await.unwrap();

    assert!(*trapping);
    assert_eq!(recv_down(handle.mref().unwrap()).await, Exit::NORMAL);
  });
}

#[test]
fn mailbox_limit_drops_overflow() {
  run(async {
    let parent: InternalPid = Process::this();
    let options: SpawnConfig = SpawnConfig {
      mailbox_limit: NonZeroUsize::new(2),
      ..SpawnConfig::new()
    };

    let child: InternalPid = Process::spawn_opt(
      async move {
        Process::sleep(Duration::from_millis(200)).await;

        let len: usize = Process::info(Process::this()).unwrap().message_queue_len;
        let first: Box<u32> = Process::receive_exact().await;
        let second: Box<u32> = Process::receive_exact().await;

        Process::send(parent, (len, *first, *second));
      },
      options,
    )
    .pid();

    for index in 0..5_u32 {
      Process::send(child, index);
    }

    let report: Box<(usize, u32, u32)> = Process::receive_exact_timeout(WAIT).await.unwrap();

    assert_eq!(*report, (2, 0, 1));
  });
}

#[test]
fn mailbox_limit_keeps_notices() {
  run(async {
    let parent: InternalPid = Process::this();
    let options: SpawnConfig = SpawnConfig::new()
      .with_trap_exit(true)
      .with_mailbox_limit(NonZeroUsize::new(1));

    Process::spawn_opt(
      async move {
        Process::send(Process::this(), 0_u8);
        Process::sleep(Duration::from_millis(50)).await;

        let (_pid, mref): (InternalPid, MonitorRef) = Process::spawn_monitor(async {});

        let linked: InternalPid = Process::spawn_link(async {
          Process::terminate("boom") as ()
        });

        let down: bool = Process::receive_timeout(|message| message.is_down_for(mref), WAIT)
          .await
          .is_ok();

        let exit: bool = Process::receive_timeout(|message| message.is_exit_from(linked), WAIT)
          .await
          .is_ok();

        let len: usize = Process::info(Process::this()).unwrap().message_queue_len;

        Process::send(parent, (down, exit, len));
      },
      options,
    );

    let report: Box<(bool, bool, usize)> = Process::receive_exact_timeout(WAIT).await.unwrap();

    assert_eq!(*report, (true, true, 1));
  });
}

#[test]
fn call_outside_process_panics() {
  assert!(std::panic::catch_unwind(Process::this).is_err());
}
