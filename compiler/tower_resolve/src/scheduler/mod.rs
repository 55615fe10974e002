//! Cooperative priority scheduler for resolution tasks.
//!
//! Every task is an explicit state machine. The scheduler repeatedly asks a
//! task for the key of its next step and either runs that step immediately,
//! suspends the task behind a more urgent one, or prunes it when the early
//! stop predicate says the key can no longer change the outcome.
//!
//! # Ordering
//!
//! Steps run in non-decreasing key order for the whole of one [`run`]. Tasks
//! queued at equal keys resume in the order they were queued: a task
//! requesting a key is suspended whenever a pending task sits at an equal or
//! smaller key, so it never overtakes work that was queued first.
//!
//! [`run`]: Scheduler::run

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::mem;

use tracing::{debug, trace};

use crate::key::PriorityKey;

/// The "keep exploring?" predicate consulted before every step.
pub trait EarlyStop {
    /// Whether work at `key` can no longer change the outcome.
    fn should_stop_at(&self, key: &PriorityKey) -> bool;
}

/// One suspendable unit of resolution work.
///
/// A task alternates between requesting a key ([`next_key`]) and doing the
/// work at that key ([`run_step`]). Requested keys must never decrease.
///
/// [`next_key`]: ResolverTask::next_key
/// [`run_step`]: ResolverTask::run_step
pub trait ResolverTask<Cx> {
    /// Key of the next step, or `None` when the task is finished.
    fn next_key(&mut self) -> Option<PriorityKey>;

    /// Do the work of the step requested at `key`.
    ///
    /// New tasks may be handed to `scheduler`; they start at `key`.
    fn run_step(&mut self, key: &PriorityKey, cx: &mut Cx, scheduler: &mut Scheduler<'_, Cx>);
}

/// Counters for one [`Scheduler::run`].
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct RunSummary {
    /// Tasks taken off the queue and continued.
    pub resumed: usize,
    /// Steps executed.
    pub steps: usize,
    /// Times a task was put back behind a more urgent one.
    pub suspended: usize,
    /// Tasks dropped by the early stop predicate.
    pub pruned: usize,
    /// Tasks that ran out of steps.
    pub completed: usize,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum ResumePoint {
    /// Not started yet: ask for the first key.
    Entry,
    /// Suspended right before the step at the queued key.
    Step,
}

struct Pending<'t, Cx> {
    key: PriorityKey,
    seq: u64,
    resume: ResumePoint,
    task: Box<dyn ResolverTask<Cx> + 't>,
}

// Reversed, so the max-heap pops the smallest key, then the oldest entry.
impl<Cx> Ord for Pending<'_, Cx> {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .key
            .cmp(&self.key)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl<Cx> PartialOrd for Pending<'_, Cx> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<Cx> PartialEq for Pending<'_, Cx> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<Cx> Eq for Pending<'_, Cx> {}

/// Min-priority queue of suspended tasks and the loop that drives them.
pub struct Scheduler<'t, Cx> {
    queue: BinaryHeap<Pending<'t, Cx>>,
    next_seq: u64,
    /// Key of the last executed step.
    progress: Option<PriorityKey>,
    summary: RunSummary,
}

impl<Cx> Default for Scheduler<'_, Cx> {
    fn default() -> Self {
        Scheduler {
            queue: BinaryHeap::new(),
            next_seq: 0,
            progress: None,
            summary: RunSummary::default(),
        }
    }
}

impl<'t, Cx: EarlyStop> Scheduler<'t, Cx> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a fresh task at `key`, unconditionally.
    pub fn enqueue(&mut self, task: Box<dyn ResolverTask<Cx> + 't>, key: PriorityKey) {
        trace!(?key, "enqueue task");
        self.push(task, key, ResumePoint::Entry);
    }

    /// Queue a fresh task at the key of the step currently running.
    pub fn spawn(&mut self, task: Box<dyn ResolverTask<Cx> + 't>) {
        let key = self.progress.clone().unwrap_or_else(PriorityKey::start);
        trace!(?key, "spawn task");
        self.push(task, key, ResumePoint::Entry);
    }

    /// Number of queued tasks.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Drop every queued task.
    pub fn reset(&mut self) {
        self.queue.clear();
        self.progress = None;
    }

    /// Drive queued tasks until none is left.
    pub fn run(&mut self, cx: &mut Cx) -> RunSummary {
        self.progress = None;
        self.summary = RunSummary::default();

        while let Some(Pending {
            key,
            resume,
            mut task,
            ..
        }) = self.queue.pop()
        {
            if cx.should_stop_at(&key) {
                trace!(?key, "prune queued task");
                self.summary.pruned += 1;
                continue;
            }
            trace!(?key, ?resume, "resume task");
            self.summary.resumed += 1;
            if resume == ResumePoint::Step {
                self.step(&key, task.as_mut(), cx);
            }
            self.advance(task, cx);
        }

        let summary = mem::take(&mut self.summary);
        debug!(
            resumed = summary.resumed,
            steps = summary.steps,
            suspended = summary.suspended,
            pruned = summary.pruned,
            completed = summary.completed,
            "scheduler run complete"
        );
        summary
    }

    /// Keep running `task` until it finishes, suspends or is pruned.
    fn advance(&mut self, mut task: Box<dyn ResolverTask<Cx> + 't>, cx: &mut Cx) {
        loop {
            let Some(key) = task.next_key() else {
                trace!("task complete");
                self.summary.completed += 1;
                return;
            };
            if cx.should_stop_at(&key) {
                trace!(?key, "prune task");
                self.summary.pruned += 1;
                return;
            }
            if self.queue.peek().is_some_and(|pending| pending.key <= key) {
                trace!(?key, "suspend task");
                self.summary.suspended += 1;
                self.push(task, key, ResumePoint::Step);
                return;
            }
            self.step(&key, task.as_mut(), cx);
        }
    }

    fn step(&mut self, key: &PriorityKey, task: &mut (dyn ResolverTask<Cx> + 't), cx: &mut Cx) {
        if let Some(progress) = &self.progress {
            assert!(
                key >= progress,
                "resolution step at {key:?} runs after a step at {progress:?}"
            );
        }
        self.progress = Some(key.clone());
        self.summary.steps += 1;
        task.run_step(key, cx, self);
    }

    fn push(
        &mut self,
        task: Box<dyn ResolverTask<Cx> + 't>,
        key: PriorityKey,
        resume: ResumePoint,
    ) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Pending {
            key,
            seq,
            resume,
            task,
        });
    }
}
