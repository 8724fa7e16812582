//! Persistent worker pool
//!
//! Worker threads are created once per run. Each round the orchestrator sends every
//! worker its `&mut` segment of Y over that worker's channel; the worker applies the
//! update and sends the segment back. The barrier is the orchestrator collecting all
//! segments again: while it holds every view no worker can touch Y, and the channel
//! hand-off orders each worker's writes before the reduction and the next round.
//!
//! Dropping the per-worker senders ends the workers' receive loops, which is how the
//! pool shuts down on success and on every error path.

use super::{RoundContext, RoundPhase};
use crate::error::EngineError;
use crate::partition::{self, split_disjoint};
use crate::stats;
use crate::worker::Worker;
use crossbeam::channel::{self, Receiver, Sender};
use std::thread;

/// Message a worker sends back at the end of a round
struct Handback<'y> {
    worker: usize,
    view: &'y mut [f64],
    ok: bool,
}

pub(super) fn run(
    workers: &[Worker],
    ctx: &RoundContext<'_>,
    y: &mut [f64],
    y_avgs: &mut Vec<f64>,
) -> Result<(), EngineError> {
    let threads = workers.len();
    let segments = partition::segments(y.len(), threads)?;
    let mut views = split_disjoint(y, &segments);

    let (done_tx, done_rx) = channel::unbounded::<Handback<'_>>();
    let (task_txs, task_rxs): (Vec<Sender<&mut [f64]>>, Vec<Receiver<&mut [f64]>>) =
        (0..threads).map(|_| channel::bounded(1)).unzip();

    let (x, a) = (ctx.x, ctx.a);

    thread::scope(|s| -> Result<(), EngineError> {
        // Owned by the closure so the senders drop, and the workers exit, before
        // the scope joins them
        let task_txs = task_txs;

        for ((worker, &segment), task_rx) in workers.iter().zip(&segments).zip(task_rxs) {
            let done_tx = done_tx.clone();
            thread::Builder::new()
                .name(format!("saxpy-pool-{}", worker.id()))
                .spawn_scoped(s, move || {
                    worker.pin_current_thread();
                    for view in task_rx.iter() {
                        let ok = worker.apply_guarded(a, x, segment, &mut *view);
                        let handback = Handback {
                            worker: worker.id(),
                            view,
                            ok,
                        };
                        if done_tx.send(handback).is_err() {
                            break;
                        }
                    }
                })
                .map_err(|source| EngineError::ResourceExhaustion {
                    worker: worker.id(),
                    round: 0,
                    source,
                })?;
        }
        drop(done_tx);

        for round in 0..ctx.max_iters {
            ctx.observer.on_phase(round, RoundPhase::Dispatching);
            for (worker, (task_tx, view)) in task_txs.iter().zip(views.drain(..)).enumerate() {
                task_tx
                    .send(view)
                    .map_err(|_| EngineError::WorkerDisconnected { worker, round })?;
                ctx.observer.on_dispatch(round, worker);
            }

            ctx.observer.on_phase(round, RoundPhase::AwaitingBarrier);
            let mut returned: Vec<Option<&mut [f64]>> = (0..threads).map(|_| None).collect();
            let mut panicked = None;
            for _ in 0..threads {
                let handback = done_rx.recv().map_err(|_| EngineError::WorkerDisconnected {
                    worker: returned.iter().position(Option::is_none).unwrap_or(0),
                    round,
                })?;
                if !handback.ok && panicked.is_none() {
                    panicked = Some(handback.worker);
                }
                returned[handback.worker] = Some(handback.view);
            }
            if let Some(worker) = panicked {
                return Err(EngineError::WorkerPanicked { worker, round });
            }
            views = returned.into_iter().flatten().collect();

            ctx.observer.on_phase(round, RoundPhase::Reducing);
            let mean = stats::segmented_mean(views.iter().map(|v| &**v));
            ctx.reduce(round, mean, y_avgs);
        }

        Ok(())
    })
}
