use criterion::BenchmarkGroup;
use criterion::BenchmarkId;
use criterion::Criterion;
use criterion::criterion_group;
use criterion::criterion_main;
use spindle::core::InternalPid;
use spindle::erts::DynMessage;
use spindle::erts::Process;
use spindle::init;
use std::time::Duration;
use std::time::Instant;

const BACKLOG: &[usize] = &[0, 16, 256];

/// Sends `iters` messages to self and receives them back.
fn self_send(iters: u64) -> Duration {
  init::block_on(async move {
    let this: InternalPid = Process::this();
    let start: Instant = Instant::now();

    for index in 0..iters {
      Process::send(this, index);

      let _value: Box<u64> = Process::receive_exact().await;
    }

    start.elapsed()
  })
  .unwrap()
}

/// Receives past `backlog` unmatched messages on every round.
fn selective(iters: u64, backlog: usize) -> Duration {
  init::block_on(async move {
    let this: InternalPid = Process::this();

    for _ in 0..backlog {
      Process::send(this, ());
    }

    let start: Instant = Instant::now();

    for index in 0..iters {
      Process::send(this, index);

      let _value: Box<u64> = Process::receive_exact().await;
    }

    start.elapsed()
  })
  .unwrap()
}

/// Round trip between two processes.
fn ping_pong(iters: u64) -> Duration {
  init::block_on(async move {
    let this: InternalPid = Process::this();

    let echo: InternalPid = Process::spawn(async move {
      loop {
        match Process::receive_any().await.downcast_exact::<u64>() {
          Ok(value) => Process::send(this, *value),
          Err(DynMessage::Term(_)) => break,
          Err(_) => continue,
        }
      }
    });

    let start: Instant = Instant::now();

    for index in 0..iters {
      Process::send(echo, index);

      let _value: Box<u64> = Process::receive_exact().await;
    }

    let elapsed: Duration = start.elapsed();

    Process::send(echo, ());

    elapsed
  })
  .unwrap()
}

fn bench_mailbox(criterion: &mut Criterion) {
  let mut group: BenchmarkGroup<_> = criterion.benchmark_group("mailbox");

  group.bench_function("self-send", |bench| bench.iter_custom(self_send));
  group.bench_function("ping-pong", |bench| bench.iter_custom(ping_pong));

  for backlog in BACKLOG {
    let id: BenchmarkId = BenchmarkId::new("selective", backlog);

    group.bench_with_input(id, backlog, |bench, &backlog| {
      bench.iter_custom(|iters| selective(iters, backlog))
    });
  }

  group.finish();
}

criterion_group! {
  name = benches;
  config = Criterion::default();
  targets = bench_mailbox
}

criterion_main!(benches);
