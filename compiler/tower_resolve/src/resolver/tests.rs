use std::collections::VecDeque;

use super::plan::{invoke_extension_levels, levels_for, PlannedLevel};
use super::*;
use crate::call::{QualifierReceiver, ReceiverId, ReceiverValue};
use crate::candidate::ExplicitReceiverKind;
use crate::symbol::{ScopeId, SymbolScope};
use crate::Name;
use pretty_assertions::assert_eq;

const FOO: Name = Name::from_raw(10);

fn scope(id: u32) -> Arc<dyn Scope> {
    Arc::new(SymbolScope::new(ScopeId::from_raw(id)))
}

fn receiver(id: u32) -> ReceiverValue {
    ReceiverValue::new(ReceiverId::from_raw(id), scope(100 + id))
}

fn keys(levels: &VecDeque<PlannedLevel>) -> Vec<String> {
    levels.iter().map(|l| format!("{:?}", l.key)).collect()
}

fn plan_for(
    call: &CallInfo,
    tower: &TowerData,
    priority: InvokeResolvePriority,
) -> VecDeque<PlannedLevel> {
    levels_for(call, tower, &ResolveConfig::default(), priority)
}

fn small_tower() -> TowerData {
    TowerData::new()
        .with_local_scope(scope(1))
        .with_implicit_receiver(receiver(1))
        .with_non_local_scope(scope(2))
}

#[test]
fn implicit_walk_goes_outward() {
    let call = CallInfo::new(FOO, CallKind::Function);
    let levels = plan_for(&call, &small_tower(), InvokeResolvePriority::None);

    assert_eq!(
        keys(&levels),
        vec![
            "Local(0)",
            "Implicit(0)",
            "Implicit(0).Local(0)",
            "Implicit(0).Implicit(0)",
            "Implicit(0).NonLocal(1)",
            "NonLocal(1)",
        ]
    );
}

#[test]
fn prioritized_and_context_levels_bracket_the_walk() {
    let tower = small_tower()
        .with_prioritized_scope(scope(3))
        .with_context_receiver_group(vec![receiver(2), receiver(3)]);
    let call = CallInfo::new(FOO, CallKind::Function);
    let levels = plan_for(&call, &tower, InvokeResolvePriority::None);
    let keys = keys(&levels);

    assert_eq!(keys.first().map(String::as_str), Some("TopPrioritized(0).Implicit(0)"));
    assert_eq!(
        keys[keys.len() - 4..].to_vec(),
        vec![
            "ContextReceiverGroup(0)",
            "ContextReceiverGroup(0)",
            "ContextReceiverGroup(0).NonLocal(1)",
            "ContextReceiverGroup(0).NonLocal(1)",
        ]
    );
}

#[test]
fn context_receivers_look_for_extensions_in_non_local_scopes() {
    let tower = TowerData::new()
        .with_non_local_scope(scope(2))
        .with_implicit_receiver(receiver(1))
        .with_non_local_scope(scope(3))
        .with_context_receiver_group(vec![receiver(8)]);
    let call = CallInfo::new(FOO, CallKind::Function);
    let levels = plan_for(&call, &tower, InvokeResolvePriority::None);
    let keys = keys(&levels);

    let context: Vec<&str> = keys
        .iter()
        .map(String::as_str)
        .filter(|k| k.starts_with("ContextReceiverGroup"))
        .collect();
    assert_eq!(
        context,
        vec![
            "ContextReceiverGroup(0)",
            "ContextReceiverGroup(0).NonLocal(0)",
            "ContextReceiverGroup(0).NonLocal(2)",
        ]
    );
}

#[test]
fn enum_fallback_only_for_value_access() {
    let tower = small_tower().with_enum_scope(scope(4));
    let config = ResolveConfig::default();

    let function = levels_for(
        &CallInfo::new(FOO, CallKind::Function),
        &tower,
        &config,
        InvokeResolvePriority::None,
    );
    assert!(!keys(&function).iter().any(|k| k.starts_with("UnqualifiedEnum")));

    let value = levels_for(
        &CallInfo::new(FOO, CallKind::VariableAccess),
        &tower,
        &config,
        InvokeResolvePriority::None,
    );
    assert_eq!(keys(&value).last().map(String::as_str), Some("UnqualifiedEnum(0)"));

    let disabled = ResolveConfig {
        unqualified_enum_fallback: false,
        ..ResolveConfig::default()
    };
    let value = levels_for(
        &CallInfo::new(FOO, CallKind::VariableAccess),
        &tower,
        &disabled,
        InvokeResolvePriority::None,
    );
    assert!(!keys(&value).iter().any(|k| k.starts_with("UnqualifiedEnum")));
}

#[test]
fn qualifier_plan_has_static_companion_and_value_levels() {
    let qualifier = QualifierReceiver {
        static_scope: scope(5),
        companion: Some(receiver(5)),
        value: Some(receiver(6)),
    };
    let call = CallInfo::new(FOO, CallKind::Function)
        .with_receiver(ExplicitReceiver::Qualifier(qualifier));
    let levels = plan_for(&call, &TowerData::new(), InvokeResolvePriority::None);

    assert_eq!(
        keys(&levels),
        vec!["Qualifier", "Classifier", "QualifierValue.Member"]
    );
    let fallbacks: Vec<bool> = levels.iter().map(|l| l.only_if_nothing_found).collect();
    assert_eq!(fallbacks, vec![false, true, false]);
}

#[test]
fn expression_plan_searches_members_then_extensions() {
    let call = CallInfo::new(FOO, CallKind::Function)
        .with_receiver(ExplicitReceiver::Expression(receiver(9)));
    let levels = plan_for(&call, &small_tower(), InvokeResolvePriority::None);

    assert_eq!(
        keys(&levels),
        vec!["Member", "Local(0)", "Implicit(0)", "NonLocal(1)"]
    );
}

#[test]
fn super_plan_is_members_only() {
    let call = CallInfo::new(FOO, CallKind::Function)
        .with_receiver(ExplicitReceiver::Super(receiver(9)));
    let levels = plan_for(&call, &small_tower(), InvokeResolvePriority::None);

    assert_eq!(keys(&levels), vec!["Member"]);
}

#[test]
fn receiver_plans_carry_their_invoke_priority() {
    let call = CallInfo::new(FOO, CallKind::VariableAccess);
    let levels = plan_for(&call, &small_tower(), InvokeResolvePriority::InvokeReceiver);

    assert_eq!(keys(&levels)[0], "Local(0)[InvokeReceiver]");
    assert!(levels
        .iter()
        .all(|l| l.key.invoke_priority() == InvokeResolvePriority::InvokeReceiver));
}

#[test]
fn invoke_plans_never_precede_their_receiver() {
    let receiver_key = PriorityKey::of(PriorityKind::Local(0))
        .with_invoke_priority(InvokeResolvePriority::InvokeReceiver);
    let mut plan =
        PlanBuilder::through_receiver(receiver_key.clone(), InvokeResolvePriority::CommonInvoke);
    explicit_receiver_levels(&mut plan, &small_tower(), &receiver(9));
    let levels = plan.finish();

    assert_eq!(
        keys(&levels)[0],
        "Local(0)[CommonInvoke] <- Local(0)[InvokeReceiver]"
    );
    for level in &levels {
        assert!(level.key > receiver_key);
        assert_eq!(level.key.receiver_group(), Some(&receiver_key));
    }
}

#[test]
fn implicit_receiver_invoke_extension_is_keyed_under_its_depth() {
    let receiver_key = PriorityKey::of(PriorityKind::Local(0))
        .with_invoke_priority(InvokeResolvePriority::InvokeReceiver);
    let mut plan =
        PlanBuilder::through_receiver(receiver_key.clone(), InvokeResolvePriority::InvokeExtension);
    invoke_extension_levels(
        &mut plan,
        PriorityKind::Implicit(2),
        &receiver(9),
        &receiver(1),
        ExplicitReceiverKind::DispatchReceiver,
    );
    let levels = plan.finish();

    assert_eq!(
        keys(&levels),
        vec!["Implicit(2).InvokeExtension[InvokeExtension] <- Local(0)[InvokeReceiver]"]
    );
    assert!(levels[0].key > receiver_key);
}

#[test]
fn delegating_constructor_is_one_member_lookup() {
    use crate::candidate::{CandidateApplicability, TowerCandidateCollector, TowerCandidateFactory};
    use crate::symbol::{Symbol, SymbolFlags, SymbolId, SymbolKind};

    let constructors: Arc<dyn Scope> = Arc::new(
        SymbolScope::new(ScopeId::from_raw(7)).with(
            Symbol::new(SymbolId::from_raw(70), FOO, SymbolKind::Constructor)
                .with_flags(SymbolFlags::INNER),
        ),
    );
    let call = CallInfo::new(FOO, CallKind::Function);
    let mut collector = TowerCandidateCollector::new(|_: &crate::candidate::Candidate| {
        CandidateApplicability::Resolved
    });

    let outcome = TowerResolver::default().resolve_delegating_constructor(
        &call,
        constructors,
        &TowerData::new()
            .with_non_local_scope(scope(3))
            .with_implicit_receiver(receiver(1))
            .with_implicit_receiver(receiver(2)),
        &mut collector,
        &TowerCandidateFactory::new(),
    );

    assert!(outcome.functions.is_found());
    assert_eq!(collector.best_key(), &PriorityKey::of(PriorityKind::Member));
    let winner = collector.single_candidate().map(|c| c.dispatch_receiver);
    assert_eq!(winner, Some(Some(ReceiverId::from_raw(1))));
}
