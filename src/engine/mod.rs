//! Round orchestration
//!
//! The [`Engine`] drives `max_iters` rounds over a [`Workload`]. Every round walks
//! the same state machine:
//!
//! ```text
//! Idle -> Dispatching -> AwaitingBarrier -> Reducing -> (next round | Done)
//! ```
//!
//! - **Dispatching**: partition Y and hand each worker its exclusive segment
//! - **AwaitingBarrier**: block until every worker of the round has finished
//! - **Reducing**: compute the mean of Y and record it for this round
//!
//! Rounds never overlap. Everything a worker writes in round `it` is visible to the
//! reducer of round `it` and to every worker of round `it + 1`.
//!
//! # Strategies
//!
//! How workers are run is selected by [`Strategy`]:
//!
//! - **Spawn**: scoped OS threads created and joined every round (fork-join)
//! - **Pool**: scoped OS threads created once; segments travel to the workers and
//!   back over channels each round, and collecting all of them is the barrier
//! - **Rayon**: a dedicated rayon pool; each round is one in-place scope on it
//!
//! All three partition identically and reduce left to right, so they produce the
//! same Y and the same per-round means.
//!
//! # Example
//!
//! ```
//! use saxpulse::engine::{Engine, EngineSettings, Strategy};
//! use saxpulse::init::{UniformGenerator, Workload};
//!
//! let workload = Workload::generate(10_000, &mut UniformGenerator::with_seed(1));
//! let engine = Engine::new(EngineSettings {
//!     threads: 4,
//!     max_iters: 10,
//!     strategy: Strategy::Spawn,
//!     cpu_cores: None,
//! })?;
//!
//! let result = engine.run(workload)?;
//! assert_eq!(result.y_avgs.len(), 10);
//! # Ok::<(), saxpulse::error::EngineError>(())
//! ```

mod pool;

use crate::error::EngineError;
use crate::init::Workload;
use crate::partition::{self, split_disjoint};
use crate::stats::{self, RunResult};
use crate::util::time::Timestamp;
use crate::worker::Worker;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

/// How worker threads are created and synchronized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Create and join one thread per worker every round
    #[default]
    Spawn,
    /// Persistent worker threads with a per-round barrier
    Pool,
    /// Dedicated rayon thread pool, one scope per round
    Rayon,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Spawn => write!(f, "spawn"),
            Strategy::Pool => write!(f, "pool"),
            Strategy::Rayon => write!(f, "rayon"),
        }
    }
}

/// Phase of the round state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    Idle,
    Dispatching,
    AwaitingBarrier,
    Reducing,
    Done,
}

/// Hooks called by the engine from the orchestrating thread
///
/// All methods default to doing nothing.
pub trait RoundObserver {
    /// Called on entry to each phase. `Idle` and `Done` carry round 0 and the
    /// number of completed rounds respectively.
    fn on_phase(&self, _round: usize, _phase: RoundPhase) {}

    /// Called once per worker and round, after the worker has been handed its
    /// segment. Always between `Dispatching` and `AwaitingBarrier`.
    fn on_dispatch(&self, _round: usize, _worker: usize) {}

    /// Called once per round after its mean has been recorded
    fn on_round(&self, _round: usize, _mean: f64) {}
}

/// Observer that ignores every event
pub struct NoopObserver;

impl RoundObserver for NoopObserver {}

/// Engine parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    pub threads: usize,
    pub max_iters: usize,
    pub strategy: Strategy,
    /// Cores to pin workers to, assigned round robin
    pub cpu_cores: Option<Vec<usize>>,
}

/// Runs the SAXPY rounds
pub struct Engine {
    settings: EngineSettings,
    workers: Vec<Worker>,
}

/// Per-run borrowed state shared by the strategies
struct RoundContext<'a> {
    x: &'a [f64],
    a: f64,
    max_iters: usize,
    observer: &'a dyn RoundObserver,
}

impl RoundContext<'_> {
    fn reduce(&self, round: usize, mean: f64, y_avgs: &mut Vec<f64>) {
        debug_assert_eq!(y_avgs.len(), round, "rounds must be reduced in order");
        y_avgs.push(mean);
        log::trace!("round {} mean {}", round, mean);
        self.observer.on_round(round, mean);
    }
}

impl Engine {
    pub fn new(settings: EngineSettings) -> Result<Self, EngineError> {
        if settings.threads == 0 {
            return Err(EngineError::InvalidSettings(
                "at least one worker thread is required".into(),
            ));
        }
        if settings.max_iters == 0 {
            return Err(EngineError::InvalidSettings(
                "at least one round is required".into(),
            ));
        }

        let workers = Worker::for_slots(settings.threads, settings.cpu_cores.as_deref());
        Ok(Self { settings, workers })
    }

    /// Run every round and return the final Y and the per-round means
    pub fn run(&self, workload: Workload) -> Result<RunResult, EngineError> {
        self.run_observed(workload, &NoopObserver)
    }

    /// Like [`run`](Self::run), reporting phases and means to `observer`
    pub fn run_observed(
        &self,
        workload: Workload,
        observer: &dyn RoundObserver,
    ) -> Result<RunResult, EngineError> {
        let Workload { x, mut y, a } = workload;
        if x.len() != y.len() {
            return Err(EngineError::LengthMismatch {
                x_len: x.len(),
                y_len: y.len(),
            });
        }

        observer.on_phase(0, RoundPhase::Idle);
        log::debug!(
            "engine: {} elements, {} workers, {} rounds, strategy {}",
            x.len(),
            self.settings.threads,
            self.settings.max_iters,
            self.settings.strategy
        );

        let ctx = RoundContext {
            x: &x,
            a,
            max_iters: self.settings.max_iters,
            observer,
        };
        let mut y_avgs = Vec::with_capacity(self.settings.max_iters);

        let start = Timestamp::now();
        match self.settings.strategy {
            Strategy::Spawn => self.run_spawn(&ctx, &mut y, &mut y_avgs)?,
            Strategy::Pool => pool::run(&self.workers, &ctx, &mut y, &mut y_avgs)?,
            Strategy::Rayon => self.run_rayon(&ctx, &mut y, &mut y_avgs)?,
        }
        let elapsed = start.elapsed();

        observer.on_phase(y_avgs.len(), RoundPhase::Done);
        log::debug!("engine: {} rounds in {:?}", y_avgs.len(), elapsed);

        Ok(RunResult { y, y_avgs, elapsed })
    }

    /// Fork-join: fresh scoped threads every round, joined before reducing
    fn run_spawn(
        &self,
        ctx: &RoundContext<'_>,
        y: &mut [f64],
        y_avgs: &mut Vec<f64>,
    ) -> Result<(), EngineError> {
        let threads = self.workers.len();
        let (x, a) = (ctx.x, ctx.a);

        for round in 0..ctx.max_iters {
            ctx.observer.on_phase(round, RoundPhase::Dispatching);
            let segments = partition::segments(y.len(), threads)?;
            let views = split_disjoint(&mut *y, &segments);

            thread::scope(|s| -> Result<(), EngineError> {
                let mut handles = Vec::with_capacity(threads);
                for ((worker, &segment), view) in self.workers.iter().zip(&segments).zip(views) {
                    let handle = thread::Builder::new()
                        .name(format!("saxpy-{}", worker.id()))
                        .spawn_scoped(s, move || {
                            worker.pin_current_thread();
                            worker.apply(a, x, segment, view);
                        })
                        .map_err(|source| EngineError::ResourceExhaustion {
                            worker: worker.id(),
                            round,
                            source,
                        })?;
                    handles.push((worker.id(), handle));
                    ctx.observer.on_dispatch(round, worker.id());
                }

                ctx.observer.on_phase(round, RoundPhase::AwaitingBarrier);
                let mut panicked = None;
                for (id, handle) in handles {
                    if handle.join().is_err() && panicked.is_none() {
                        panicked = Some(id);
                    }
                }
                match panicked {
                    Some(worker) => Err(EngineError::WorkerPanicked { worker, round }),
                    None => Ok(()),
                }
            })?;

            ctx.observer.on_phase(round, RoundPhase::Reducing);
            ctx.reduce(round, stats::mean(y), y_avgs);
        }

        Ok(())
    }

    /// One `in_place_scope` per round on a pool sized to the worker count
    fn run_rayon(
        &self,
        ctx: &RoundContext<'_>,
        y: &mut [f64],
        y_avgs: &mut Vec<f64>,
    ) -> Result<(), EngineError> {
        let threads = self.workers.len();
        let cores = self.settings.cpu_cores.clone().filter(|c| !c.is_empty());

        let mut builder = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("saxpy-rayon-{}", i));
        if let Some(cores) = cores {
            builder = builder.start_handler(move |i| {
                Worker::new(i, Some(cores[i % cores.len()])).pin_current_thread();
            });
        }
        let pool = builder
            .build()
            .map_err(|source| EngineError::PoolBuild { threads, source })?;

        let (x, a) = (ctx.x, ctx.a);
        const NO_PANIC: usize = usize::MAX;

        for round in 0..ctx.max_iters {
            ctx.observer.on_phase(round, RoundPhase::Dispatching);
            let segments = partition::segments(y.len(), threads)?;
            let views = split_disjoint(&mut *y, &segments);
            let panicked = AtomicUsize::new(NO_PANIC);

            // Runs on this thread; returns only after every spawned task has finished
            pool.in_place_scope(|s| {
                for ((worker, &segment), view) in self.workers.iter().zip(&segments).zip(views) {
                    let panicked = &panicked;
                    s.spawn(move |_| {
                        if !worker.apply_guarded(a, x, segment, view) {
                            let _ = panicked.compare_exchange(
                                NO_PANIC,
                                worker.id(),
                                Ordering::Relaxed,
                                Ordering::Relaxed,
                            );
                        }
                    });
                    ctx.observer.on_dispatch(round, worker.id());
                }
                ctx.observer.on_phase(round, RoundPhase::AwaitingBarrier);
            });

            let worker = panicked.into_inner();
            if worker != NO_PANIC {
                return Err(EngineError::WorkerPanicked { worker, round });
            }

            ctx.observer.on_phase(round, RoundPhase::Reducing);
            ctx.reduce(round, stats::mean(y), y_avgs);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    const TOLERANCE: f64 = 1e-9;

    fn settings(threads: usize, max_iters: usize, strategy: Strategy) -> EngineSettings {
        EngineSettings {
            threads,
            max_iters,
            strategy,
            cpu_cores: None,
        }
    }

    fn workload(len: usize) -> Workload {
        let x = (0..len).map(|i| (i % 17) as f64 * 0.25).collect();
        let y = (0..len).map(|i| (i % 5) as f64).collect();
        Workload::new(x, y, 0.75).unwrap()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= TOLERANCE * a.abs().max(b.abs()).max(1.0)
    }

    #[derive(Default)]
    struct Recorder {
        phases: RefCell<Vec<(usize, RoundPhase)>>,
        rounds: RefCell<Vec<usize>>,
    }

    impl RoundObserver for Recorder {
        fn on_phase(&self, round: usize, phase: RoundPhase) {
            self.phases.borrow_mut().push((round, phase));
        }

        fn on_round(&self, round: usize, _mean: f64) {
            self.rounds.borrow_mut().push(round);
        }
    }

    const ALL: [Strategy; 3] = [Strategy::Spawn, Strategy::Pool, Strategy::Rayon];

    #[test]
    fn test_rejects_zero_threads_or_rounds() {
        assert!(Engine::new(settings(0, 1, Strategy::Spawn)).is_err());
        assert!(Engine::new(settings(1, 0, Strategy::Spawn)).is_err());
    }

    #[test]
    fn test_single_round_applies_update() {
        for strategy in ALL {
            let w = workload(1_001);
            let expected: Vec<f64> = w.x.iter().zip(&w.y).map(|(x, y)| y + w.a * x).collect();

            let engine = Engine::new(settings(4, 1, strategy)).unwrap();
            let result = engine.run(w).unwrap();

            for (got, want) in result.y.iter().zip(&expected) {
                assert!(close(*got, *want), "{}: {} != {}", strategy, got, want);
            }
        }
    }

    #[test]
    fn test_means_match_independent_computation() {
        for strategy in ALL {
            let w = workload(257);
            let (x, mut y, a) = (w.x.clone(), w.y.clone(), w.a);

            let engine = Engine::new(settings(3, 5, strategy)).unwrap();
            let result = engine.run(w).unwrap();

            for it in 0..5 {
                for (yj, xj) in y.iter_mut().zip(&x) {
                    *yj += a * xj;
                }
                let expected = y.iter().sum::<f64>() / y.len() as f64;
                assert!(close(result.y_avgs[it], expected), "{} round {}", strategy, it);
            }
        }
    }

    #[test]
    fn test_worker_count_invariance() {
        for strategy in ALL {
            let single = Engine::new(settings(1, 8, strategy)).unwrap().run(workload(10_007)).unwrap();
            let multi = Engine::new(settings(4, 8, strategy)).unwrap().run(workload(10_007)).unwrap();

            assert_eq!(single.y.len(), multi.y.len());
            assert!(single.y.iter().zip(&multi.y).all(|(a, b)| close(*a, *b)));
            assert!(single.y_avgs.iter().zip(&multi.y_avgs).all(|(a, b)| close(*a, *b)));
        }
    }

    #[test]
    fn test_strategies_agree_exactly() {
        let spawn = Engine::new(settings(3, 4, Strategy::Spawn)).unwrap().run(workload(999)).unwrap();
        for strategy in [Strategy::Pool, Strategy::Rayon] {
            let other = Engine::new(settings(3, 4, strategy)).unwrap().run(workload(999)).unwrap();
            assert_eq!(spawn.y, other.y, "{}", strategy);
            assert_eq!(spawn.y_avgs, other.y_avgs, "{}", strategy);
        }
    }

    #[test]
    fn test_phase_sequence_is_strict() {
        for strategy in ALL {
            let recorder = Recorder::default();
            let engine = Engine::new(settings(2, 3, strategy)).unwrap();
            engine.run_observed(workload(50), &recorder).unwrap();

            let mut expected = vec![(0, RoundPhase::Idle)];
            for round in 0..3 {
                expected.push((round, RoundPhase::Dispatching));
                expected.push((round, RoundPhase::AwaitingBarrier));
                expected.push((round, RoundPhase::Reducing));
            }
            expected.push((3, RoundPhase::Done));

            assert_eq!(*recorder.phases.borrow(), expected, "{}", strategy);
            assert_eq!(*recorder.rounds.borrow(), vec![0, 1, 2], "{}", strategy);
        }
    }

    #[derive(Default)]
    struct Timeline(RefCell<Vec<String>>);

    impl RoundObserver for Timeline {
        fn on_phase(&self, round: usize, phase: RoundPhase) {
            self.0.borrow_mut().push(format!("{:?}{}", phase, round));
        }

        fn on_dispatch(&self, round: usize, worker: usize) {
            self.0.borrow_mut().push(format!("w{}@{}", worker, round));
        }
    }

    #[test]
    fn test_barrier_reported_after_every_dispatch() {
        for strategy in ALL {
            let timeline = Timeline::default();
            let engine = Engine::new(settings(3, 2, strategy)).unwrap();
            engine.run_observed(workload(40), &timeline).unwrap();

            let mut expected = vec!["Idle0".to_string()];
            for round in 0..2 {
                expected.push(format!("Dispatching{}", round));
                for worker in 0..3 {
                    expected.push(format!("w{}@{}", worker, round));
                }
                expected.push(format!("AwaitingBarrier{}", round));
                expected.push(format!("Reducing{}", round));
            }
            expected.push("Done2".to_string());

            assert_eq!(*timeline.0.borrow(), expected, "{}", strategy);
        }
    }

    #[test]
    fn test_worker_panic_fails_the_round() {
        // X too short for the second segment, so worker 1 panics on slicing
        let x = vec![1.0; 6];
        let ctx = RoundContext {
            x: &x,
            a: 1.0,
            max_iters: 3,
            observer: &NoopObserver,
        };

        for strategy in [Strategy::Spawn, Strategy::Rayon] {
            let engine = Engine::new(settings(2, 3, strategy)).unwrap();
            let mut y = vec![0.0; 10];
            let mut y_avgs = Vec::new();
            let result = match strategy {
                Strategy::Spawn => engine.run_spawn(&ctx, &mut y, &mut y_avgs),
                _ => engine.run_rayon(&ctx, &mut y, &mut y_avgs),
            };

            assert!(
                matches!(result, Err(EngineError::WorkerPanicked { worker: 1, round: 0 })),
                "{}",
                strategy
            );
            assert!(y_avgs.is_empty(), "{}", strategy);
        }
    }

    #[test]
    fn test_more_threads_than_elements() {
        for strategy in ALL {
            let w = workload(3);
            let expected: Vec<f64> = w.x.iter().zip(&w.y).map(|(x, y)| y + 2.0 * w.a * x).collect();

            let result = Engine::new(settings(8, 2, strategy)).unwrap().run(w).unwrap();

            assert_eq!(result.y_avgs.len(), 2);
            for (got, want) in result.y.iter().zip(&expected) {
                assert!(close(*got, *want), "{}", strategy);
            }
        }
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let w = Workload {
            x: vec![1.0; 4],
            y: vec![1.0; 3],
            a: 1.0,
        };
        let engine = Engine::new(settings(2, 1, Strategy::Spawn)).unwrap();
        assert!(matches!(engine.run(w), Err(EngineError::LengthMismatch { .. })));
    }

    #[test]
    fn test_strategy_display() {
        assert_eq!(Strategy::Pool.to_string(), "pool");
        assert_eq!(Strategy::default(), Strategy::Spawn);
    }
}
