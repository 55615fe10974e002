use super::*;
use crate::call::CallKind;
use crate::symbol::{SymbolKind, SymbolScope};
use crate::Name;
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn symbol(id: u32) -> Symbol {
    Symbol::new(SymbolId::from_raw(id), Name::from_raw(10), SymbolKind::Function)
}

fn candidate(id: u32) -> Candidate {
    let call = CallInfo::new(Name::from_raw(10), CallKind::Function);
    TowerCandidateFactory::new().create_candidate(
        &call,
        &symbol(id),
        ExplicitReceiverKind::NoExplicitReceiver,
        &CandidateSite::in_scope(ScopeId::from_raw(1)),
    )
}

/// Symbols 1xx resolve, 2xx are unsafe, 3xx are low priority, others are inapplicable.
fn by_symbol(candidate: &Candidate) -> CandidateApplicability {
    match candidate.symbol.id.raw() / 100 {
        1 => CandidateApplicability::Resolved,
        2 => CandidateApplicability::UnsafeCall,
        3 => CandidateApplicability::ResolvedLowPriority,
        _ => CandidateApplicability::Inapplicable,
    }
}

fn consume<A: ApplicabilityCheck>(
    collector: &mut TowerCandidateCollector<A>,
    key: &PriorityKey,
    candidate: Candidate,
) -> CandidateApplicability {
    let config = ResolveConfig::default();
    let call = CallInfo::new(Name::from_raw(10), CallKind::Function);
    let context = ResolutionContext {
        config: &config,
        call: &call,
    };
    collector.consume_candidate(key, candidate, &context)
}

#[test]
fn applicability_order_and_predicates() {
    use CandidateApplicability::*;
    assert!(Hidden < Inapplicable);
    assert!(Inapplicable < ResolvedLowPriority);
    assert!(ResolvedLowPriority < UnsafeCall);
    assert!(UnsafeCall < Resolved);

    assert!(!Inapplicable.is_success());
    assert!(ResolvedLowPriority.is_success());
    assert!(!ResolvedLowPriority.should_stop_resolve());
    assert!(UnsafeCall.should_stop_resolve());
    assert!(Resolved.should_stop_resolve());
}

#[test]
fn factory_packages_the_site() {
    let scope = Arc::new(SymbolScope::new(ScopeId::from_raw(4)));
    let dispatch = ReceiverValue::new(crate::call::ReceiverId::from_raw(7), scope.clone());
    let extensions = [ReceiverValue::new(crate::call::ReceiverId::from_raw(8), scope)];
    let site = CandidateSite {
        scope: ScopeId::from_raw(4),
        dispatch_receiver: Some(&dispatch),
        extension_receivers: &extensions,
        is_from_object_by_name: true,
        is_smart_cast_original: true,
    };
    let call = CallInfo::new(Name::from_raw(10), CallKind::VariableAccess);
    let candidate = TowerCandidateFactory::new().create_candidate(
        &call,
        &symbol(5),
        ExplicitReceiverKind::DispatchReceiver,
        &site,
    );

    assert_eq!(candidate.call_kind, CallKind::VariableAccess);
    assert_eq!(candidate.scope, ScopeId::from_raw(4));
    assert_eq!(candidate.dispatch_receiver.map(|r| r.raw()), Some(7));
    assert_eq!(candidate.extension_receivers.len(), 1);
    assert!(candidate.is_from_object_by_name);
    assert!(candidate.is_smart_cast_original);
    assert!(candidate.invoke_receiver.is_none());
}

#[test]
fn factory_reports_registered_invoke_receivers() {
    let scope = Arc::new(SymbolScope::new(ScopeId::from_raw(9)));
    let receiver = ReceiverValue::new(crate::call::ReceiverId::from_raw(3), scope);
    let factory =
        TowerCandidateFactory::new().with_invoke_receiver(SymbolId::from_raw(5), receiver);

    let found = factory.invoke_receiver(&candidate(5));
    assert_eq!(found.map(|r| r.id().raw()), Some(3));
    assert!(factory.invoke_receiver(&candidate(6)).is_none());
}

#[test]
fn collector_keeps_only_the_best_group() {
    let mut collector = TowerCandidateCollector::new(by_symbol);
    let member = PriorityKey::of(PriorityKind::Member);
    let local = PriorityKey::of(PriorityKind::Local(0));

    consume(&mut collector, &local, candidate(101));
    assert_eq!(collector.best_key(), &local);

    // Equal applicability at a smaller key replaces the group.
    consume(&mut collector, &member, candidate(102));
    assert_eq!(collector.best_key(), &member);
    assert_eq!(collector.candidates().len(), 1);

    // Same group accumulates.
    consume(&mut collector, &member, candidate(103));
    assert_eq!(collector.candidates().len(), 2);
    assert!(collector.single_candidate().is_none());

    // Worse applicability never displaces.
    consume(&mut collector, &PriorityKey::start(), candidate(400));
    assert_eq!(collector.best_key(), &member);
    assert_eq!(collector.current_applicability(), CandidateApplicability::Resolved);
}

#[test]
fn better_applicability_wins_over_earlier_group() {
    let mut collector = TowerCandidateCollector::new(by_symbol);
    let member = PriorityKey::of(PriorityKind::Member);
    let local = PriorityKey::of(PriorityKind::Local(0));

    consume(&mut collector, &member, candidate(301));
    assert!(collector.is_success());
    assert!(!collector.should_stop_at_the_group(&local));

    consume(&mut collector, &local, candidate(101));
    assert_eq!(collector.best_key(), &local);
    assert_eq!(
        collector.single_candidate().map(|c| c.symbol.id.raw()),
        Some(101)
    );
}

#[test]
fn stop_predicates_follow_the_best_decisive_key() {
    let mut collector = TowerCandidateCollector::new(by_symbol);
    let member = PriorityKey::of(PriorityKind::Member);
    let local = PriorityKey::of(PriorityKind::Local(0));

    assert!(!collector.should_stop_at_the_group(&local));
    consume(&mut collector, &member, candidate(201));

    assert!(!collector.should_stop_at_the_group(&member));
    assert!(collector.should_stop_at_the_group(&local));
    assert!(collector.has_decisive_candidate(&member));
    assert!(!collector.has_decisive_candidate(&PriorityKey::start()));
}

#[test]
fn new_data_set_forgets_everything() {
    let mut collector = TowerCandidateCollector::new(by_symbol);
    consume(&mut collector, &PriorityKey::start(), candidate(101));
    assert!(collector.is_success());

    collector.new_data_set();
    assert!(!collector.is_success());
    assert!(collector.candidates().is_empty());
    assert_eq!(collector.best_key(), &PriorityKey::of(PriorityKind::Last));
}
