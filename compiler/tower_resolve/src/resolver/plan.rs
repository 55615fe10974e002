//! Level plans: which levels a task visits, and under which keys.
//!
//! A plan is built eagerly from the tower and sorted by key, so a task only
//! walks it front to back and its requested keys never decrease.

use std::collections::VecDeque;

use crate::call::{CallInfo, CallKind, ExplicitReceiver, QualifierReceiver, ReceiverValue};
use crate::candidate::ExplicitReceiverKind;
use crate::config::ResolveConfig;
use crate::key::{InvokeResolvePriority, PriorityKey, PriorityKind};
use crate::level::{MemberScopeLevel, ScopeLevel, TowerLevel};
use crate::tower::{NonLocalElement, TowerData};

/// One level of a plan.
#[derive(Debug)]
pub(super) struct PlannedLevel {
    pub key: PriorityKey,
    pub level: TowerLevel,
    /// Skip the level when an earlier level of the task found anything.
    pub only_if_nothing_found: bool,
}

#[derive(Clone, Debug)]
enum KeyStyle {
    Direct(InvokeResolvePriority),
    ThroughReceiver {
        receiver_key: PriorityKey,
        priority: InvokeResolvePriority,
    },
}

pub(super) struct PlanBuilder {
    base: PriorityKey,
    style: KeyStyle,
    levels: Vec<PlannedLevel>,
}

impl PlanBuilder {
    /// Keys are level paths tagged with `priority`.
    pub fn direct(priority: InvokeResolvePriority) -> Self {
        PlanBuilder {
            base: PriorityKey::root(),
            style: KeyStyle::Direct(priority),
            levels: Vec::new(),
        }
    }

    /// Keys never precede `receiver_key` and link back to it.
    pub fn through_receiver(receiver_key: PriorityKey, priority: InvokeResolvePriority) -> Self {
        PlanBuilder {
            base: PriorityKey::root(),
            style: KeyStyle::ThroughReceiver {
                receiver_key,
                priority,
            },
            levels: Vec::new(),
        }
    }

    fn key(&self, kind: PriorityKind) -> PriorityKey {
        let path = self.base.refine(kind);
        match &self.style {
            KeyStyle::Direct(priority) => path.with_invoke_priority(*priority),
            KeyStyle::ThroughReceiver {
                receiver_key,
                priority,
            } => path.through_invoke_receiver(receiver_key, *priority),
        }
    }

    pub fn add(&mut self, kind: PriorityKind, level: impl Into<TowerLevel>) {
        let key = self.key(kind);
        self.levels.push(PlannedLevel {
            key,
            level: level.into(),
            only_if_nothing_found: false,
        });
    }

    pub fn add_fallback(&mut self, kind: PriorityKind, level: impl Into<TowerLevel>) {
        let key = self.key(kind);
        self.levels.push(PlannedLevel {
            key,
            level: level.into(),
            only_if_nothing_found: true,
        });
    }

    /// Levels added by `f` are keyed under `kind`.
    pub fn under(&mut self, kind: PriorityKind, f: impl FnOnce(&mut Self)) {
        let outer = self.base.clone();
        self.base = outer.refine(kind);
        f(self);
        self.base = outer;
    }

    pub fn finish(mut self) -> VecDeque<PlannedLevel> {
        self.levels.sort_by(|a, b| a.key.cmp(&b.key));
        self.levels.into()
    }
}

/// Levels for `call`, dispatched on its explicit receiver.
pub(super) fn levels_for(
    call: &CallInfo,
    tower: &TowerData,
    config: &ResolveConfig,
    priority: InvokeResolvePriority,
) -> VecDeque<PlannedLevel> {
    let mut plan = PlanBuilder::direct(priority);
    match &call.explicit_receiver {
        None => implicit_receiver_levels(&mut plan, tower, call.kind, config),
        Some(ExplicitReceiver::Qualifier(qualifier)) => {
            qualifier_levels(&mut plan, tower, qualifier);
        }
        Some(ExplicitReceiver::Super(receiver)) => plan.add(
            PriorityKind::Member,
            MemberScopeLevel::new(receiver.clone(), ExplicitReceiverKind::DispatchReceiver),
        ),
        Some(ExplicitReceiver::Expression(receiver)) => {
            explicit_receiver_levels(&mut plan, tower, receiver);
        }
    }
    plan.finish()
}

/// No explicit receiver: walk the tower outward.
pub(super) fn implicit_receiver_levels(
    plan: &mut PlanBuilder,
    tower: &TowerData,
    call_kind: CallKind,
    config: &ResolveConfig,
) {
    for (index, scope) in tower.prioritized_scopes() {
        plan.under(PriorityKind::TopPrioritized(index), |plan| {
            for (depth, receiver) in tower.implicit_receivers() {
                plan.add(
                    PriorityKind::Implicit(depth),
                    ScopeLevel::extensions_of(
                        scope.clone(),
                        receiver.clone(),
                        ExplicitReceiverKind::NoExplicitReceiver,
                    )
                    .hiding_members(),
                );
            }
        });
    }

    for (depth, scope) in tower.local_scopes() {
        plan.add(PriorityKind::Local(depth), ScopeLevel::new(scope.clone()));
    }

    for (depth, element) in tower.non_local() {
        match element {
            NonLocalElement::ImplicitReceiver(receiver) => {
                plan.add(
                    PriorityKind::Implicit(depth),
                    MemberScopeLevel::new(
                        receiver.clone(),
                        ExplicitReceiverKind::NoExplicitReceiver,
                    ),
                );
                plan.under(PriorityKind::Implicit(depth), |plan| {
                    extension_levels(
                        plan,
                        tower,
                        receiver,
                        ExplicitReceiverKind::NoExplicitReceiver,
                    );
                });
            }
            NonLocalElement::Scope(scope) => {
                plan.add(PriorityKind::NonLocal(depth), ScopeLevel::new(scope.clone()));
            }
        }
    }

    for (group, receivers) in tower.context_receiver_groups() {
        for receiver in receivers {
            plan.add(
                PriorityKind::ContextReceiverGroup(group),
                MemberScopeLevel::new(receiver.clone(), ExplicitReceiverKind::NoExplicitReceiver),
            );
        }
        plan.under(PriorityKind::ContextReceiverGroup(group), |plan| {
            for (depth, scope) in tower.non_local_scopes() {
                for receiver in receivers {
                    plan.add(
                        PriorityKind::NonLocal(depth),
                        ScopeLevel::extensions_of(
                            scope.clone(),
                            receiver.clone(),
                            ExplicitReceiverKind::NoExplicitReceiver,
                        ),
                    );
                }
            }
        });
    }

    if call_kind == CallKind::VariableAccess && config.unqualified_enum_fallback {
        for (index, scope) in tower.enum_scopes() {
            plan.add(PriorityKind::UnqualifiedEnum(index), ScopeLevel::new(scope.clone()));
        }
    }
}

/// `receiver.name`: members first, then extensions outward.
pub(super) fn explicit_receiver_levels(
    plan: &mut PlanBuilder,
    tower: &TowerData,
    receiver: &ReceiverValue,
) {
    for (index, scope) in tower.prioritized_scopes() {
        plan.add(
            PriorityKind::TopPrioritized(index),
            ScopeLevel::extensions_of(
                scope.clone(),
                receiver.clone(),
                ExplicitReceiverKind::ExtensionReceiver,
            )
            .hiding_members(),
        );
    }

    plan.add(
        PriorityKind::Member,
        MemberScopeLevel::new(receiver.clone(), ExplicitReceiverKind::DispatchReceiver),
    );

    extension_levels(plan, tower, receiver, ExplicitReceiverKind::ExtensionReceiver);

    for (group, receivers) in tower.context_receiver_groups() {
        for dispatch in receivers {
            plan.add(
                PriorityKind::ContextReceiverGroup(group),
                MemberScopeLevel::new(dispatch.clone(), ExplicitReceiverKind::ExtensionReceiver)
                    .with_extension_receiver(receiver.clone()),
            );
        }
    }
}

/// Extensions of `receiver`: local scopes, member extensions of implicit
/// receivers, then non-local scopes.
fn extension_levels(
    plan: &mut PlanBuilder,
    tower: &TowerData,
    receiver: &ReceiverValue,
    explicit_receiver_kind: ExplicitReceiverKind,
) {
    for (depth, scope) in tower.local_scopes() {
        plan.add(
            PriorityKind::Local(depth),
            ScopeLevel::extensions_of(scope.clone(), receiver.clone(), explicit_receiver_kind),
        );
    }
    for (depth, element) in tower.non_local() {
        match element {
            NonLocalElement::ImplicitReceiver(dispatch) => plan.add(
                PriorityKind::Implicit(depth),
                MemberScopeLevel::new(dispatch.clone(), explicit_receiver_kind)
                    .with_extension_receiver(receiver.clone()),
            ),
            NonLocalElement::Scope(scope) => plan.add(
                PriorityKind::NonLocal(depth),
                ScopeLevel::extensions_of(scope.clone(), receiver.clone(), explicit_receiver_kind),
            ),
        }
    }
}

/// `Qualifier.name`: static members, then the companion if nothing static
/// matched, then the qualifier as a value.
fn qualifier_levels(plan: &mut PlanBuilder, tower: &TowerData, qualifier: &QualifierReceiver) {
    plan.add(PriorityKind::Qualifier, ScopeLevel::new(qualifier.static_scope.clone()));
    if let Some(companion) = &qualifier.companion {
        plan.add_fallback(
            PriorityKind::Classifier,
            MemberScopeLevel::new(companion.clone(), ExplicitReceiverKind::DispatchReceiver),
        );
    }
    if let Some(value) = &qualifier.value {
        plan.under(PriorityKind::QualifierValue, |plan| {
            explicit_receiver_levels(plan, tower, value);
        });
    }
}

/// `value()` where `value` has an extension function type: `invoke` is
/// looked up on `value` with `extension_receiver` passed as its receiver.
///
/// `prefix` is where the extension receiver came from: `Member` for an
/// explicit receiver, `Implicit(d)` for an implicit one.
pub(super) fn invoke_extension_levels(
    plan: &mut PlanBuilder,
    prefix: PriorityKind,
    value: &ReceiverValue,
    extension_receiver: &ReceiverValue,
    explicit_receiver_kind: ExplicitReceiverKind,
) {
    plan.under(prefix, |plan| {
        plan.add(
            PriorityKind::InvokeExtension,
            MemberScopeLevel::new(value.clone(), explicit_receiver_kind)
                .with_extension_receiver(extension_receiver.clone()),
        );
    });
}
