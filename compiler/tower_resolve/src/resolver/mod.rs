//! The resolution orchestrator.
//!
//! [`TowerResolver::run_resolver`] classifies the explicit receiver of a call
//! and seeds the scheduler with the tasks for that shape:
//!
//! | Shape | Direct task | Invoke families |
//! |---|---|---|
//! | none | outward tower walk | `name` as a value, then `invoke`; per implicit receiver, `name` as an extension-typed value |
//! | qualifier | static scope, companion, qualifier value | same, as values |
//! | `super` | supertype members | same, as values |
//! | expression | members, then extensions | `recv.name` as a value; `name` as an extension-typed value |
//! | implicit invoke | none | `invoke` on the receiver |
//!
//! Every task starts at [`PriorityKey::start`]. Invoke interpretations are
//! keyed through the key of the receiver they were found on, so a direct
//! candidate and an invoke candidate at the same level always compare.

mod plan;
mod task;

use std::sync::Arc;

use tracing::debug;

use crate::call::{CallInfo, CallKind, ExplicitReceiver, ReceiverShape};
use crate::candidate::{CandidateCollector, CandidateFactory};
use crate::config::ResolveConfig;
use crate::key::{InvokeResolvePriority, PriorityKey, PriorityKind};
use crate::level::{ConstructorLevel, LevelOutcome, LevelProcessor};
use crate::scheduler::{RunSummary, Scheduler};
use crate::symbol::Scope;
use crate::tower::TowerData;

use plan::{explicit_receiver_levels, levels_for, PlanBuilder};
use task::{InvokeKind, ResolveSession, TowerTask};

/// Resolves calls against a scope tower.
#[derive(Clone, Debug, Default)]
pub struct TowerResolver {
    config: ResolveConfig,
}

impl TowerResolver {
    pub fn new(config: ResolveConfig) -> Self {
        TowerResolver { config }
    }

    pub fn config(&self) -> &ResolveConfig {
        &self.config
    }

    /// Feed every candidate for `call` visible from `tower` into `collector`,
    /// most preferred first, until the collector stops the search.
    #[tracing::instrument(level = "debug", skip_all, fields(
        name = call.name.raw(),
        kind = ?call.kind,
        shape = ?call.receiver_shape(),
    ))]
    pub fn run_resolver(
        &self,
        call: &CallInfo,
        tower: &TowerData,
        collector: &mut dyn CandidateCollector,
        factory: &dyn CandidateFactory,
    ) -> RunSummary {
        let mut scheduler = Scheduler::new();
        self.seed(call, tower, &mut scheduler);
        debug!(tasks = scheduler.len(), "seeded resolution tasks");

        let mut session = ResolveSession {
            config: &self.config,
            tower,
            factory,
            collector,
        };
        scheduler.run(&mut session)
    }

    fn seed(
        &self,
        call: &CallInfo,
        tower: &TowerData,
        scheduler: &mut Scheduler<'_, ResolveSession<'_>>,
    ) {
        let start = PriorityKey::start();
        let shape = call.receiver_shape();
        debug!(?shape, "classified explicit receiver");

        if shape == ReceiverShape::ImplicitInvoke {
            let Some(ExplicitReceiver::Expression(value)) = &call.explicit_receiver else {
                debug!("implicit invoke without a value to invoke, nothing to resolve");
                return;
            };
            let mut plan =
                PlanBuilder::through_receiver(start.clone(), InvokeResolvePriority::CommonInvoke);
            explicit_receiver_levels(&mut plan, tower, value);
            let task = TowerTask::invoke_function(call.clone(), plan.finish(), None);
            scheduler.enqueue(Box::new(task), start);
            return;
        }

        let direct = levels_for(call, tower, &self.config, InvokeResolvePriority::None);
        scheduler.enqueue(Box::new(TowerTask::direct(call.clone(), direct)), start.clone());

        if !self.config.invoke_resolution || call.kind != CallKind::Function {
            return;
        }

        let value_call = call.as_variable_access();
        let levels =
            levels_for(&value_call, tower, &self.config, InvokeResolvePriority::InvokeReceiver);
        let task = TowerTask::invoke_receiver(value_call, levels, InvokeKind::Common);
        scheduler.enqueue(Box::new(task), start.clone());

        match (shape, &call.explicit_receiver) {
            (ReceiverShape::Expression, Some(ExplicitReceiver::Expression(explicit))) => {
                let invoke = InvokeKind::ExplicitExtension(explicit.clone());
                self.seed_extension_receivers(call, tower, invoke, &start, scheduler);
            }
            (ReceiverShape::None, _) => {
                for (depth, receiver) in tower.implicit_receivers() {
                    let invoke = InvokeKind::ImplicitExtension {
                        depth,
                        receiver: receiver.clone(),
                    };
                    self.seed_extension_receivers(call, tower, invoke, &start, scheduler);
                }
            }
            _ => {}
        }
    }

    /// The callee read as a bare value, invoked with an extension receiver.
    fn seed_extension_receivers(
        &self,
        call: &CallInfo,
        tower: &TowerData,
        invoke: InvokeKind,
        start: &PriorityKey,
        scheduler: &mut Scheduler<'_, ResolveSession<'_>>,
    ) {
        let bare_call = call.as_unqualified_variable_access();
        let levels =
            levels_for(&bare_call, tower, &self.config, InvokeResolvePriority::InvokeReceiver);
        let task = TowerTask::invoke_receiver(bare_call, levels, invoke);
        scheduler.enqueue(Box::new(task), start.clone());
    }

    /// Resolve a delegating constructor call (`this(...)`, `super(...)`)
    /// against the constructors in `constructors`.
    ///
    /// This is a single lookup at [`PriorityKind::Member`]; the scheduler is
    /// not involved. Inner-class constructors are dispatched on the innermost
    /// implicit receiver of `tower`.
    #[tracing::instrument(level = "debug", skip_all, fields(name = call.name.raw()))]
    pub fn resolve_delegating_constructor(
        &self,
        call: &CallInfo,
        constructors: Arc<dyn Scope>,
        tower: &TowerData,
        collector: &mut dyn CandidateCollector,
        factory: &dyn CandidateFactory,
    ) -> LevelOutcome {
        let level = ConstructorLevel {
            scope: constructors,
            outer_receiver: tower.innermost_receiver().cloned(),
        };
        LevelProcessor::new(call, &self.config, factory).process_level(
            &level,
            &PriorityKey::of(PriorityKind::Member),
            collector,
        )
    }
}

#[cfg(test)]
mod tests;
