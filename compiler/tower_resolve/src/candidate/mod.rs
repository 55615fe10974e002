//! Candidates and the collaborators that create and judge them.
//!
//! The resolver decides *where* to look and in which order. Whether a
//! candidate actually fits the call, and which of several equally preferred
//! candidates wins, is decided by the [`CandidateCollector`] the caller
//! supplies. [`TowerCandidateCollector`] keeps the best group found so far
//! and drives early stopping from it.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::call::{CallInfo, CallKind, ReceiverId, ReceiverValue};
use crate::key::{PriorityKey, PriorityKind};
use crate::symbol::{ScopeId, Symbol, SymbolId};
use crate::ResolveConfig;

/// Role the explicit receiver plays for a candidate.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum ExplicitReceiverKind {
    /// No explicit receiver, or the candidate ignores it.
    #[default]
    NoExplicitReceiver,
    /// The explicit receiver is the dispatch receiver (`a.member()`).
    DispatchReceiver,
    /// The explicit receiver is the extension receiver (`a.extension()`).
    ExtensionReceiver,
    /// `a.value()` as `value.invoke(a)`: the value dispatches, `a` is the
    /// extension receiver.
    BothReceivers,
}

/// How well a candidate fits the call, worst to best.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum CandidateApplicability {
    /// Not visible from the call site.
    #[default]
    Hidden,
    /// Visible but does not accept the call.
    Inapplicable,
    /// Fits, but loses to any normal-priority fit.
    ResolvedLowPriority,
    /// Fits, but the call is unsafe (e.g. nullable receiver); still decisive.
    UnsafeCall,
    /// Fits.
    Resolved,
}

impl CandidateApplicability {
    /// The candidate is an acceptable answer.
    #[inline]
    pub const fn is_success(self) -> bool {
        matches!(
            self,
            CandidateApplicability::ResolvedLowPriority
                | CandidateApplicability::UnsafeCall
                | CandidateApplicability::Resolved
        )
    }

    /// Less preferred groups can no longer change the outcome.
    #[inline]
    pub const fn should_stop_resolve(self) -> bool {
        matches!(
            self,
            CandidateApplicability::UnsafeCall | CandidateApplicability::Resolved
        )
    }
}

/// Where and how a symbol was found at a level.
#[derive(Copy, Clone, Debug)]
pub struct CandidateSite<'a> {
    /// Scope the symbol was enumerated from.
    pub scope: ScopeId,
    /// Receiver the member is dispatched on.
    pub dispatch_receiver: Option<&'a ReceiverValue>,
    /// Receivers that may serve as the extension receiver.
    pub extension_receivers: &'a [ReceiverValue],
    /// An object or classifier used as a value by its name.
    pub is_from_object_by_name: bool,
    /// Found through the declared type of a smart-cast receiver.
    pub is_smart_cast_original: bool,
}

impl<'a> CandidateSite<'a> {
    /// A symbol found in `scope` with no receivers involved.
    pub fn in_scope(scope: ScopeId) -> Self {
        CandidateSite {
            scope,
            dispatch_receiver: None,
            extension_receivers: &[],
            is_from_object_by_name: false,
            is_smart_cast_original: false,
        }
    }
}

/// A symbol bound to the way it was reached.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Candidate {
    pub symbol: Symbol,
    pub call_kind: CallKind,
    pub explicit_receiver_kind: ExplicitReceiverKind,
    pub scope: ScopeId,
    pub dispatch_receiver: Option<ReceiverId>,
    pub extension_receivers: SmallVec<[ReceiverId; 1]>,
    pub is_from_object_by_name: bool,
    pub is_smart_cast_original: bool,
    /// For `invoke` candidates: the value the `invoke` is called on.
    pub invoke_receiver: Option<Box<Candidate>>,
}

/// Builds candidates from enumerated symbols.
pub trait CandidateFactory {
    /// Bind `symbol` to the call and the site it was found at.
    fn create_candidate(
        &self,
        call: &CallInfo,
        symbol: &Symbol,
        explicit_receiver_kind: ExplicitReceiverKind,
        site: &CandidateSite<'_>,
    ) -> Candidate;

    /// The receiver an `invoke` would be called on when `candidate` is used
    /// as a value, or `None` when its type has no `invoke`.
    fn invoke_receiver(&self, candidate: &Candidate) -> Option<ReceiverValue> {
        let _ = candidate;
        None
    }
}

/// Straightforward [`CandidateFactory`].
///
/// Invokable values are registered up front by symbol.
#[derive(Clone, Debug, Default)]
pub struct TowerCandidateFactory {
    invoke_receivers: FxHashMap<SymbolId, ReceiverValue>,
}

impl TowerCandidateFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Values of `symbol` can be invoked; `receiver` exposes their `invoke`.
    #[must_use]
    pub fn with_invoke_receiver(mut self, symbol: SymbolId, receiver: ReceiverValue) -> Self {
        self.invoke_receivers.insert(symbol, receiver);
        self
    }
}

impl CandidateFactory for TowerCandidateFactory {
    fn create_candidate(
        &self,
        call: &CallInfo,
        symbol: &Symbol,
        explicit_receiver_kind: ExplicitReceiverKind,
        site: &CandidateSite<'_>,
    ) -> Candidate {
        Candidate {
            symbol: *symbol,
            call_kind: call.kind,
            explicit_receiver_kind,
            scope: site.scope,
            dispatch_receiver: site.dispatch_receiver.map(ReceiverValue::id),
            extension_receivers: site.extension_receivers.iter().map(ReceiverValue::id).collect(),
            is_from_object_by_name: site.is_from_object_by_name,
            is_smart_cast_original: site.is_smart_cast_original,
            invoke_receiver: None,
        }
    }

    fn invoke_receiver(&self, candidate: &Candidate) -> Option<ReceiverValue> {
        self.invoke_receivers.get(&candidate.symbol.id).cloned()
    }
}

/// Per-candidate state shared with the collector.
#[derive(Copy, Clone, Debug)]
pub struct ResolutionContext<'a> {
    pub config: &'a ResolveConfig,
    /// The call the candidate was produced for.
    pub call: &'a CallInfo,
}

/// Receives candidates in priority order and decides when to stop looking.
pub trait CandidateCollector {
    /// Judge and record a candidate found at `key`.
    fn consume_candidate(
        &mut self,
        key: &PriorityKey,
        candidate: Candidate,
        context: &ResolutionContext<'_>,
    ) -> CandidateApplicability;

    /// Whether exploring `key` can no longer change the outcome.
    fn should_stop_at_the_group(&self, key: &PriorityKey) -> bool;

    /// Whether a decisive candidate was recorded at `key` or before.
    fn has_decisive_candidate(&self, key: &PriorityKey) -> bool;

    /// Whether any successful candidate was recorded.
    fn is_success(&self) -> bool;

    /// Forget everything, for an independent resolution pass.
    fn new_data_set(&mut self);
}

/// The external judgement of a single candidate.
pub trait ApplicabilityCheck {
    fn check(&self, candidate: &Candidate, context: &ResolutionContext<'_>)
        -> CandidateApplicability;
}

impl<F> ApplicabilityCheck for F
where
    F: Fn(&Candidate) -> CandidateApplicability,
{
    fn check(&self, candidate: &Candidate, _: &ResolutionContext<'_>) -> CandidateApplicability {
        self(candidate)
    }
}

/// Collector that keeps every candidate of the best group.
///
/// A candidate replaces the current group when it is strictly more
/// applicable, or equally applicable at a smaller key.
#[derive(Debug)]
pub struct TowerCandidateCollector<A> {
    check: A,
    best_key: PriorityKey,
    current_applicability: CandidateApplicability,
    candidates: Vec<Candidate>,
}

impl<A: ApplicabilityCheck> TowerCandidateCollector<A> {
    pub fn new(check: A) -> Self {
        TowerCandidateCollector {
            check,
            best_key: PriorityKey::of(PriorityKind::Last),
            current_applicability: CandidateApplicability::Hidden,
            candidates: Vec::new(),
        }
    }

    /// Candidates of the best group, in the order they were found.
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Key of the best group.
    pub fn best_key(&self) -> &PriorityKey {
        &self.best_key
    }

    pub fn current_applicability(&self) -> CandidateApplicability {
        self.current_applicability
    }

    /// The single winner, if the best group is successful and unambiguous.
    pub fn single_candidate(&self) -> Option<&Candidate> {
        match self.candidates.as_slice() {
            [only] if self.current_applicability.is_success() => Some(only),
            _ => None,
        }
    }
}

impl<A: ApplicabilityCheck> CandidateCollector for TowerCandidateCollector<A> {
    fn consume_candidate(
        &mut self,
        key: &PriorityKey,
        candidate: Candidate,
        context: &ResolutionContext<'_>,
    ) -> CandidateApplicability {
        let applicability = self.check.check(&candidate, context);
        if applicability > self.current_applicability
            || (applicability == self.current_applicability && *key < self.best_key)
        {
            self.candidates.clear();
            self.current_applicability = applicability;
            self.best_key = key.clone();
        }
        if applicability == self.current_applicability && *key == self.best_key {
            self.candidates.push(candidate);
        }
        applicability
    }

    fn should_stop_at_the_group(&self, key: &PriorityKey) -> bool {
        self.current_applicability.should_stop_resolve() && self.best_key < *key
    }

    fn has_decisive_candidate(&self, key: &PriorityKey) -> bool {
        self.current_applicability.should_stop_resolve() && self.best_key <= *key
    }

    fn is_success(&self) -> bool {
        self.current_applicability.is_success()
    }

    fn new_data_set(&mut self) {
        self.best_key = PriorityKey::of(PriorityKind::Last);
        self.current_applicability = CandidateApplicability::Hidden;
        self.candidates.clear();
    }
}

#[cfg(test)]
mod tests;
