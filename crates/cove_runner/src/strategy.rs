//! Scheduling strategies for fan-out stages.
//!
//! Every strategy maps N independent units of work to exactly N outcomes with
//! no ordering guarantee. A unit returning `Err` is the only thing that stops a
//! stage early; callers that want fail-soft behavior return `Ok` for captured
//! failures and use [`RunnerStrategy::map`].

use std::convert::Infallible;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};

use cove_core::config::DEFAULT_WORKERS;
use cove_core::RunnerKind;
use indicatif::ProgressBar;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};
use tracing::warn;

use crate::progress::{finish, stage_progress, tick};

pub trait RunnerStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Run `work` once per input, stopping at the first `Err`.
    fn try_map<I, O, E, F>(&self, label: &str, inputs: Vec<I>, work: F) -> Result<Vec<O>, E>
    where
        I: Send,
        O: Send,
        E: Send,
        F: Fn(I) -> Result<O, E> + Sync + Send;

    /// Run `work` once per input; every input yields one output.
    fn map<I, O, F>(&self, label: &str, inputs: Vec<I>, work: F) -> Vec<O>
    where
        I: Send,
        O: Send,
        F: Fn(I) -> O + Sync + Send,
    {
        match self.try_map(label, inputs, |input| Ok::<O, Infallible>(work(input))) {
            Ok(outputs) => outputs,
            Err(never) => match never {},
        }
    }
}

fn build_pool(workers: usize) -> Result<ThreadPool, ThreadPoolBuildError> {
    ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|index| format!("cove-worker-{index}"))
        .build()
}

/// Bounded worker pool, results collected eagerly once every unit finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PooledRunner {
    workers: usize,
    show_progress: bool,
}

impl Default for PooledRunner {
    fn default() -> Self {
        Self::new(DEFAULT_WORKERS)
    }
}

impl PooledRunner {
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
            show_progress: false,
        }
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }
}

impl RunnerStrategy for PooledRunner {
    fn name(&self) -> &'static str {
        "pooled"
    }

    fn try_map<I, O, E, F>(&self, label: &str, inputs: Vec<I>, work: F) -> Result<Vec<O>, E>
    where
        I: Send,
        O: Send,
        E: Send,
        F: Fn(I) -> Result<O, E> + Sync + Send,
    {
        let bar = stage_progress(label, inputs.len(), self.show_progress);
        let run = || {
            inputs
                .into_par_iter()
                .map(|input| {
                    let outcome = work(input);
                    tick(&bar);
                    outcome
                })
                .collect::<Result<Vec<O>, E>>()
        };

        let outcome = match build_pool(self.workers) {
            Ok(pool) => pool.install(run),
            Err(error) => {
                warn!(%error, workers = self.workers, "Failed to build worker pool, using the global pool");
                run()
            }
        };
        finish(bar);
        outcome
    }
}

/// Single worker, inputs processed in order. Deterministic; meant for debugging and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SequentialRunner {
    show_progress: bool,
}

impl SequentialRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }
}

impl RunnerStrategy for SequentialRunner {
    fn name(&self) -> &'static str {
        "sequential"
    }

    fn try_map<I, O, E, F>(&self, label: &str, inputs: Vec<I>, work: F) -> Result<Vec<O>, E>
    where
        I: Send,
        O: Send,
        E: Send,
        F: Fn(I) -> Result<O, E> + Sync + Send,
    {
        let bar = stage_progress(label, inputs.len(), self.show_progress);
        let outcome = inputs
            .into_iter()
            .map(|input| {
                let outcome = work(input);
                tick(&bar);
                outcome
            })
            .collect::<Result<Vec<O>, E>>();
        finish(bar);
        outcome
    }
}

/// Bounded worker pool streaming outcomes back in completion order.
///
/// The first `Err` received stops collection; units that have not started yet
/// are skipped, units already running finish and are discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamingRunner {
    workers: usize,
    show_progress: bool,
}

impl Default for StreamingRunner {
    fn default() -> Self {
        Self::new(DEFAULT_WORKERS)
    }
}

impl StreamingRunner {
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
            show_progress: false,
        }
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }
}

impl RunnerStrategy for StreamingRunner {
    fn name(&self) -> &'static str {
        "streaming"
    }

    fn try_map<I, O, E, F>(&self, label: &str, inputs: Vec<I>, work: F) -> Result<Vec<O>, E>
    where
        I: Send,
        O: Send,
        E: Send,
        F: Fn(I) -> Result<O, E> + Sync + Send,
    {
        let total = inputs.len();
        let bar = stage_progress(label, total, self.show_progress);
        let stop = AtomicBool::new(false);
        let (sender, receiver) = mpsc::channel();

        let outcome = match build_pool(self.workers) {
            Ok(pool) => pool.in_place_scope(|scope| {
                spawn_units(scope, inputs, &work, &stop, sender);
                drain(&receiver, &stop, &bar, total)
            }),
            Err(error) => {
                warn!(%error, workers = self.workers, "Failed to build worker pool, using the global pool");
                rayon::in_place_scope(|scope| {
                    spawn_units(scope, inputs, &work, &stop, sender);
                    drain(&receiver, &stop, &bar, total)
                })
            }
        };
        finish(bar);
        outcome
    }
}

fn spawn_units<'scope, I, O, E, F>(
    scope: &rayon::Scope<'scope>,
    inputs: Vec<I>,
    work: &'scope F,
    stop: &'scope AtomicBool,
    sender: Sender<Result<O, E>>,
) where
    I: Send + 'scope,
    O: Send + 'scope,
    E: Send + 'scope,
    F: Fn(I) -> Result<O, E> + Sync,
{
    for input in inputs {
        let sender = sender.clone();
        scope.spawn(move |_| {
            if stop.load(Ordering::Acquire) {
                return;
            }
            // The receiver is gone only after collection stopped.
            let _ = sender.send(work(input));
        });
    }
}

fn drain<O, E>(
    receiver: &Receiver<Result<O, E>>,
    stop: &AtomicBool,
    bar: &Option<ProgressBar>,
    total: usize,
) -> Result<Vec<O>, E> {
    let mut outputs = Vec::with_capacity(total);
    for outcome in receiver.iter() {
        tick(bar);
        match outcome {
            Ok(output) => outputs.push(output),
            Err(error) => {
                stop.store(true, Ordering::Release);
                return Err(error);
            }
        }
    }
    Ok(outputs)
}

/// Strategy selected from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Runner {
    Pooled(PooledRunner),
    Sequential(SequentialRunner),
    Streaming(StreamingRunner),
}

impl Runner {
    pub fn from_kind(kind: RunnerKind, workers: usize, show_progress: bool) -> Self {
        match kind {
            RunnerKind::Pooled => {
                Self::Pooled(PooledRunner::new(workers).with_progress(show_progress))
            }
            RunnerKind::Sequential => {
                Self::Sequential(SequentialRunner::new().with_progress(show_progress))
            }
            RunnerKind::Streaming => {
                Self::Streaming(StreamingRunner::new(workers).with_progress(show_progress))
            }
        }
    }
}

impl RunnerStrategy for Runner {
    fn name(&self) -> &'static str {
        match self {
            Self::Pooled(runner) => runner.name(),
            Self::Sequential(runner) => runner.name(),
            Self::Streaming(runner) => runner.name(),
        }
    }

    fn try_map<I, O, E, F>(&self, label: &str, inputs: Vec<I>, work: F) -> Result<Vec<O>, E>
    where
        I: Send,
        O: Send,
        E: Send,
        F: Fn(I) -> Result<O, E> + Sync + Send,
    {
        match self {
            Self::Pooled(runner) => runner.try_map(label, inputs, work),
            Self::Sequential(runner) => runner.try_map(label, inputs, work),
            Self::Streaming(runner) => runner.try_map(label, inputs, work),
        }
    }
}
