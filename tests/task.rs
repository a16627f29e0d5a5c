use spindle::core::Exit;
use spindle::core::InternalPid;
use spindle::error::ProcessError;
use spindle::erts::DynMessage;
use spindle::erts::Process;
use spindle::init;
use spindle::task::Task;
use std::time::Duration;

const WAIT: Duration = Duration::from_secs(5);

fn run<F>(future: F)
where
  F: Future<Output = ()> + Send + 'static,
{
  init::block_on(future).unwrap();
}

#[test]
fn join_returns_output() {
  run(async {
    let task: Task<i32> = Task::spawn(async { 2 + 3 });

    assert_eq!(task.join().await, Ok(5));
  });
}

#[test]
fn task_runs_as_process() {
  run(async {
    let parent: InternalPid = Process::this();

    let task: Task<InternalPid> = Task::spawn(async move {
      let value: Box<u8> = Process::receive_exact().await;
      Process::send(parent, *value + 1);
      Process::this()
    });

    Process::send(task.pid(), 1_u8);

    let reply: Box<u8> = Process::receive_exact_timeout(WAIT).await.unwrap();
    let pid: InternalPid = task.pid();

    assert_eq!(*reply, 2);
    assert_eq!(task.join().await, Ok(pid));
  });
}

#[test]
fn panicking_task() {
  run(async {
    let task: Task<()> = Task::spawn(async {
      panic!("task failed");
    });

    match task.join().await {
      Err(ProcessError::AbnormalExit(reason)) => {
        assert_eq!(reason.downcast_ref::<String>().map(String::as_str), Some("task failed"));
      }
      other => panic!("expected abnormal exit, got {other:?}"),
    }
  });
}

#[test]
fn terminated_task() {
  run(async {
    let task: Task<u8> = Task::spawn(async { Process::terminate("kaboom") });

    assert_eq!(task.join().await, Err(ProcessError::AbnormalExit(Exit::from("kaboom"))));
  });
}

#[test]
fn normal_exit_without_output() {
  run(async {
    let task: Task<u8> = Task::spawn(async { Process::terminate(Exit::NORMAL) });

    assert_eq!(task.join().await, Err(ProcessError::AbnormalExit(Exit::NORMAL)));
  });
}

#[test]
fn join_timeout_expires() {
  run(async {
    let task: Task<u8> = Task::spawn(async {
      Process::sleep(Duration::from_millis(500)).await;
      1
    });

    let pid: InternalPid = task.pid();

    assert_eq!(task.join_timeout(Duration::from_millis(20)).await, Err(ProcessError::Timeout));
    assert!(Process::alive(pid));

    Process::kill(pid);
  });
}

#[test]
fn join_timeout_in_time() {
  run(async {
    let task: Task<&'static str> = Task::spawn(async { "done" });

    assert_eq!(task.join_timeout(WAIT).await, Ok("done"));
  });
}

#[test]
fn shutdown_running_task() {
  run(async {
    let task: Task<u8> = Task::spawn(async {
      let _message: DynMessage = Process::receive_any().await;
      1
    });

    let pid: InternalPid = task.pid();

    assert_eq!(task.shutdown().await, None);
    assert!(!Process::alive(pid));
  });
}

#[test]
fn shutdown_finished_task() {
  run(async {
    let task: Task<u8> = Task::spawn(async { 7 });

    Process::sleep(Duration::from_millis(100)).await;

    assert_eq!(task.shutdown().await, Some(7));
  });
}

#[test]
fn link_propagated_exit() {
  run(async {
    let task: Task<()> = Task::spawn(async {
      Process::spawn_link(async {
        Process::terminate("kaboom") as ()
      });

      let _message: DynMessage = Process::receive_any().await;
    });

    assert_eq!(
      task.join().await,
      Err(ProcessError::LinkPropagatedExit(Exit::from("kaboom"))),
    );
  });
}

#[test]
fn tasks_are_independent() {
  run(async {
    let tasks: Vec<Task<usize>> = (0..8).map(|index| Task::spawn(async move { index * index })).collect();
    let mut total: usize = 0;

    for task in tasks {
      total += task.join().await.unwrap();
    }

    assert_eq!(total, 140);
  });
}
