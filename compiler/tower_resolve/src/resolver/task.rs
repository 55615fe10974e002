//! Resolution tasks and the state they share while the scheduler runs.

use std::collections::VecDeque;
use std::mem;

use tracing::trace;

use super::plan::{explicit_receiver_levels, invoke_extension_levels, PlanBuilder, PlannedLevel};
use crate::call::{CallInfo, CallKind, ExplicitReceiver, ReceiverValue};
use crate::candidate::{
    Candidate, CandidateApplicability, CandidateCollector, CandidateFactory, ExplicitReceiverKind,
    ResolutionContext,
};
use crate::config::ResolveConfig;
use crate::key::{InvokeResolvePriority, PriorityKey, PriorityKind};
use crate::level::LevelProcessor;
use crate::scheduler::{EarlyStop, ResolverTask, Scheduler};
use crate::tower::TowerData;
use crate::Name;

/// Everything the tasks of one resolution share.
pub(super) struct ResolveSession<'a> {
    pub config: &'a ResolveConfig,
    pub tower: &'a TowerData,
    pub factory: &'a dyn CandidateFactory,
    pub collector: &'a mut dyn CandidateCollector,
}

impl EarlyStop for ResolveSession<'_> {
    fn should_stop_at(&self, key: &PriorityKey) -> bool {
        self.collector.should_stop_at_the_group(key)
    }
}

/// How a receiver found by an invoke-receiver task is invoked.
#[derive(Clone, Debug)]
pub(super) enum InvokeKind {
    /// `value.invoke(...)`.
    Common,
    /// `explicit.value(...)` as `value.invoke(explicit, ...)`.
    ExplicitExtension(ReceiverValue),
    /// `value(...)` as `value.invoke(this, ...)` for the implicit receiver
    /// at `depth`.
    ImplicitExtension { depth: usize, receiver: ReceiverValue },
}

enum TaskMode {
    /// Candidates go straight to the caller's collector.
    Direct,
    /// Resolve the callee as a value; invokable values spawn invoke tasks.
    InvokeReceiver {
        receivers: InvokeReceiverCollector,
        invoke: InvokeKind,
    },
    /// Resolve `invoke` on a value found earlier.
    InvokeFunction { receiver: Option<Candidate> },
}

/// A walk over a fixed plan of levels.
pub(super) struct TowerTask {
    call: CallInfo,
    levels: VecDeque<PlannedLevel>,
    found_any: bool,
    mode: TaskMode,
}

impl TowerTask {
    pub fn direct(call: CallInfo, levels: VecDeque<PlannedLevel>) -> Self {
        TowerTask {
            call,
            levels,
            found_any: false,
            mode: TaskMode::Direct,
        }
    }

    pub fn invoke_receiver(
        call: CallInfo,
        levels: VecDeque<PlannedLevel>,
        invoke: InvokeKind,
    ) -> Self {
        TowerTask {
            call,
            levels,
            found_any: false,
            mode: TaskMode::InvokeReceiver {
                receivers: InvokeReceiverCollector::default(),
                invoke,
            },
        }
    }

    pub fn invoke_function(
        call: CallInfo,
        levels: VecDeque<PlannedLevel>,
        receiver: Option<Candidate>,
    ) -> Self {
        TowerTask {
            call,
            levels,
            found_any: false,
            mode: TaskMode::InvokeFunction { receiver },
        }
    }

    /// The invoke task for a receiver found at `receiver_key`.
    fn invoke_task(
        tower: &TowerData,
        invoke: &InvokeKind,
        receiver: Candidate,
        value: ReceiverValue,
        receiver_key: &PriorityKey,
    ) -> Self {
        let levels = match invoke {
            InvokeKind::Common => {
                let mut plan = PlanBuilder::through_receiver(
                    receiver_key.clone(),
                    InvokeResolvePriority::CommonInvoke,
                );
                explicit_receiver_levels(&mut plan, tower, &value);
                plan.finish()
            }
            InvokeKind::ExplicitExtension(explicit) => {
                let mut plan = PlanBuilder::through_receiver(
                    receiver_key.clone(),
                    InvokeResolvePriority::InvokeExtension,
                );
                invoke_extension_levels(
                    &mut plan,
                    PriorityKind::Member,
                    &value,
                    explicit,
                    ExplicitReceiverKind::BothReceivers,
                );
                plan.finish()
            }
            InvokeKind::ImplicitExtension { depth, receiver } => {
                let mut plan = PlanBuilder::through_receiver(
                    receiver_key.clone(),
                    InvokeResolvePriority::InvokeExtension,
                );
                invoke_extension_levels(
                    &mut plan,
                    PriorityKind::Implicit(*depth),
                    &value,
                    receiver,
                    ExplicitReceiverKind::DispatchReceiver,
                );
                plan.finish()
            }
        };
        let call = CallInfo::new(Name::INVOKE, CallKind::Function)
            .with_receiver(ExplicitReceiver::Expression(value));
        TowerTask::invoke_function(call, levels, Some(receiver))
    }
}

impl<'a> ResolverTask<ResolveSession<'a>> for TowerTask {
    fn next_key(&mut self) -> Option<PriorityKey> {
        let next = self.levels.front()?;
        if let TaskMode::InvokeReceiver { receivers, .. } = &self.mode {
            if receivers.shadows(&next.key) {
                trace!(key = ?next.key, "closer receiver shadows remaining levels");
                self.levels.clear();
                return None;
            }
        }
        Some(next.key.clone())
    }

    fn run_step(
        &mut self,
        key: &PriorityKey,
        cx: &mut ResolveSession<'a>,
        scheduler: &mut Scheduler<'_, ResolveSession<'a>>,
    ) {
        let Some(planned) = self.levels.pop_front() else {
            return;
        };
        if planned.only_if_nothing_found && self.found_any {
            trace!(?key, "earlier level matched, fallback skipped");
            return;
        }

        let processor = LevelProcessor::new(&self.call, cx.config, cx.factory);
        let outcome = match &mut self.mode {
            TaskMode::Direct => processor.process_level(&planned.level, key, &mut *cx.collector),
            TaskMode::InvokeFunction { receiver } => {
                let processor = match receiver.as_ref() {
                    Some(receiver) => processor.through_invoke_receiver(receiver),
                    None => processor,
                };
                processor.process_level(&planned.level, key, &mut *cx.collector)
            }
            TaskMode::InvokeReceiver { receivers, invoke } => {
                let outcome = processor.process_level(&planned.level, key, receivers);
                for receiver in receivers.take_fresh() {
                    let Some(value) = cx.factory.invoke_receiver(&receiver) else {
                        continue;
                    };
                    trace!(?key, symbol = receiver.symbol.id.raw(), "invokable receiver found");
                    let task = TowerTask::invoke_task(cx.tower, invoke, receiver, value, key);
                    scheduler.spawn(Box::new(task));
                }
                outcome
            }
        };
        self.found_any |= outcome.found_any();
    }
}

/// Private collector of an invoke-receiver task.
///
/// Every value found is a receiver; whether it can be invoked is decided by
/// [`CandidateFactory::invoke_receiver`]. The closest receiver shadows
/// receivers found further out.
#[derive(Debug, Default)]
pub(super) struct InvokeReceiverCollector {
    closest: Option<PriorityKey>,
    fresh: Vec<Candidate>,
}

impl InvokeReceiverCollector {
    fn shadows(&self, key: &PriorityKey) -> bool {
        self.closest.as_ref().is_some_and(|closest| closest < key)
    }

    fn take_fresh(&mut self) -> Vec<Candidate> {
        mem::take(&mut self.fresh)
    }
}

impl CandidateCollector for InvokeReceiverCollector {
    fn consume_candidate(
        &mut self,
        key: &PriorityKey,
        candidate: Candidate,
        _context: &ResolutionContext<'_>,
    ) -> CandidateApplicability {
        if !self.has_decisive_candidate(key) {
            self.closest = Some(key.clone());
        }
        self.fresh.push(candidate);
        CandidateApplicability::Resolved
    }

    fn should_stop_at_the_group(&self, key: &PriorityKey) -> bool {
        self.shadows(key)
    }

    fn has_decisive_candidate(&self, key: &PriorityKey) -> bool {
        self.closest.as_ref().is_some_and(|closest| closest <= key)
    }

    fn is_success(&self) -> bool {
        self.closest.is_some()
    }

    fn new_data_set(&mut self) {
        self.closest = None;
        self.fresh.clear();
    }
}
