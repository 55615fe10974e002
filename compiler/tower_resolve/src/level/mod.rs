//! Tower levels and the per-level processor.
//!
//! A level is one place symbols can come from: the member scope of a
//! receiver, a lexical or imported scope (optionally searched for extensions
//! of given receivers), or the constructors of a class. Every level exposes
//! the same three enumeration entry points through [`LevelSource`].
//!
//! [`LevelProcessor`] drives one level for one call. It decides which entry
//! points to use from the call kind, turns every symbol into a candidate and
//! hands it to the collector under the active priority key.

use std::sync::Arc;

use rustc_hash::FxHashSet;
use smallvec::SmallVec;
use tracing::trace;

use crate::call::{CallInfo, CallKind, ReceiverValue};
use crate::candidate::{
    Candidate, CandidateCollector, CandidateFactory, CandidateSite, ExplicitReceiverKind,
    ResolutionContext,
};
use crate::config::{ObjectShadowing, ResolveConfig};
use crate::key::PriorityKey;
use crate::symbol::{Scope, Symbol, SymbolFlags, SymbolId, SymbolKind};

/// Whether an enumeration produced anything.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum ProcessResult {
    /// At least one symbol was handed to the processor.
    Found,
    /// Nothing matched. A normal outcome, not an error.
    #[default]
    ScopeEmpty,
}

impl ProcessResult {
    #[inline]
    pub fn is_found(self) -> bool {
        self == ProcessResult::Found
    }

    /// `Found` if either side found something.
    #[inline]
    #[must_use]
    pub fn merge(self, other: ProcessResult) -> ProcessResult {
        if self.is_found() || other.is_found() {
            ProcessResult::Found
        } else {
            ProcessResult::ScopeEmpty
        }
    }

    fn from_found(found: bool) -> ProcessResult {
        if found {
            ProcessResult::Found
        } else {
            ProcessResult::ScopeEmpty
        }
    }
}

/// Receives every symbol a level enumerates.
pub trait ScopeLevelProcessor {
    fn consume_candidate(
        &mut self,
        symbol: &Symbol,
        explicit_receiver_kind: ExplicitReceiverKind,
        site: &CandidateSite<'_>,
    );
}

/// The three enumeration entry points of one level.
pub trait LevelSource {
    fn process_functions_by_name(
        &self,
        call: &CallInfo,
        processor: &mut dyn ScopeLevelProcessor,
    ) -> ProcessResult;

    fn process_properties_by_name(
        &self,
        call: &CallInfo,
        processor: &mut dyn ScopeLevelProcessor,
    ) -> ProcessResult;

    /// Objects and classifiers usable as values by their name.
    fn process_objects_by_name(
        &self,
        call: &CallInfo,
        processor: &mut dyn ScopeLevelProcessor,
    ) -> ProcessResult;

    /// Whether this level searches for extensions of some receiver.
    fn has_extension_receivers(&self) -> bool {
        false
    }
}

/// Members of one receiver value.
///
/// With extension receivers, only member extensions are visible: the
/// dispatch receiver is an implicit receiver and the explicit receiver
/// becomes the extension receiver. A smart-cast dispatch receiver exposes
/// its narrowed scope first, then the declared type's scope.
#[derive(Clone, Debug)]
pub struct MemberScopeLevel {
    pub dispatch_receiver: ReceiverValue,
    pub explicit_receiver_kind: ExplicitReceiverKind,
    pub extension_receivers: SmallVec<[ReceiverValue; 1]>,
}

impl MemberScopeLevel {
    /// Plain members of `dispatch_receiver`.
    pub fn new(
        dispatch_receiver: ReceiverValue,
        explicit_receiver_kind: ExplicitReceiverKind,
    ) -> Self {
        MemberScopeLevel {
            dispatch_receiver,
            explicit_receiver_kind,
            extension_receivers: SmallVec::new(),
        }
    }

    /// Member extensions of `dispatch_receiver` applicable to `extension_receiver`.
    #[must_use]
    pub fn with_extension_receiver(mut self, extension_receiver: ReceiverValue) -> Self {
        self.extension_receivers.push(extension_receiver);
        self
    }

    fn accepts(&self, symbol: &Symbol) -> bool {
        symbol.is_extension() == !self.extension_receivers.is_empty()
    }

    fn process_members(
        &self,
        processor: &mut dyn ScopeLevelProcessor,
        enumerate: impl Fn(&dyn Scope, &mut dyn FnMut(&Symbol)),
    ) -> ProcessResult {
        let mut seen = FxHashSet::default();
        let narrowed = self.dispatch_receiver.member_scope();
        let found_narrowed =
            self.process_scope(narrowed.as_ref(), false, &mut seen, processor, &enumerate);
        let found_original = match self.dispatch_receiver.original_scope() {
            Some(original) => {
                self.process_scope(original.as_ref(), true, &mut seen, processor, &enumerate)
            }
            None => false,
        };
        ProcessResult::from_found(found_narrowed || found_original)
    }

    fn process_scope(
        &self,
        scope: &dyn Scope,
        is_smart_cast_original: bool,
        seen: &mut FxHashSet<SymbolId>,
        processor: &mut dyn ScopeLevelProcessor,
        enumerate: &impl Fn(&dyn Scope, &mut dyn FnMut(&Symbol)),
    ) -> bool {
        let site = CandidateSite {
            scope: scope.id(),
            dispatch_receiver: Some(&self.dispatch_receiver),
            extension_receivers: &self.extension_receivers,
            is_from_object_by_name: false,
            is_smart_cast_original,
        };
        let mut found = false;
        enumerate(scope, &mut |symbol: &Symbol| {
            if self.accepts(symbol) && seen.insert(symbol.id) {
                found = true;
                processor.consume_candidate(symbol, self.explicit_receiver_kind, &site);
            }
        });
        found
    }
}

impl LevelSource for MemberScopeLevel {
    fn process_functions_by_name(
        &self,
        call: &CallInfo,
        processor: &mut dyn ScopeLevelProcessor,
    ) -> ProcessResult {
        self.process_members(processor, |scope, f| scope.process_functions_by_name(call.name, f))
    }

    fn process_properties_by_name(
        &self,
        call: &CallInfo,
        processor: &mut dyn ScopeLevelProcessor,
    ) -> ProcessResult {
        self.process_members(processor, |scope, f| scope.process_properties_by_name(call.name, f))
    }

    fn process_objects_by_name(
        &self,
        _call: &CallInfo,
        _processor: &mut dyn ScopeLevelProcessor,
    ) -> ProcessResult {
        ProcessResult::ScopeEmpty
    }

    fn has_extension_receivers(&self) -> bool {
        !self.extension_receivers.is_empty()
    }
}

/// A lexical, imported or fallback scope.
///
/// Without extension receivers it exposes top-level declarations; with them
/// it exposes the extensions declared there.
#[derive(Clone, Debug)]
pub struct ScopeLevel {
    pub scope: Arc<dyn Scope>,
    pub explicit_receiver_kind: ExplicitReceiverKind,
    pub extension_receivers: SmallVec<[ReceiverValue; 1]>,
    /// Only symbols flagged [`SymbolFlags::HIDES_MEMBERS`] are visible.
    pub hide_members_only: bool,
}

impl ScopeLevel {
    pub fn new(scope: Arc<dyn Scope>) -> Self {
        ScopeLevel {
            scope,
            explicit_receiver_kind: ExplicitReceiverKind::NoExplicitReceiver,
            extension_receivers: SmallVec::new(),
            hide_members_only: false,
        }
    }

    /// Extensions of `receiver` declared in `scope`.
    pub fn extensions_of(
        scope: Arc<dyn Scope>,
        receiver: ReceiverValue,
        explicit_receiver_kind: ExplicitReceiverKind,
    ) -> Self {
        let mut extension_receivers = SmallVec::new();
        extension_receivers.push(receiver);
        ScopeLevel {
            scope,
            explicit_receiver_kind,
            extension_receivers,
            hide_members_only: false,
        }
    }

    /// Restrict to declarations that hide members.
    #[must_use]
    pub fn hiding_members(mut self) -> Self {
        self.hide_members_only = true;
        self
    }

    fn accepts(&self, symbol: &Symbol) -> bool {
        if self.hide_members_only && !symbol.flags.contains(SymbolFlags::HIDES_MEMBERS) {
            return false;
        }
        symbol.is_extension() == !self.extension_receivers.is_empty()
    }

    fn site(&self, is_from_object_by_name: bool) -> CandidateSite<'_> {
        CandidateSite {
            scope: self.scope.id(),
            dispatch_receiver: None,
            extension_receivers: &self.extension_receivers,
            is_from_object_by_name,
            is_smart_cast_original: false,
        }
    }

    fn process_accepted(
        &self,
        processor: &mut dyn ScopeLevelProcessor,
        is_from_object_by_name: bool,
        enumerate: impl FnOnce(&mut dyn FnMut(&Symbol)),
    ) -> ProcessResult {
        let site = self.site(is_from_object_by_name);
        let mut found = false;
        enumerate(&mut |symbol: &Symbol| {
            if self.accepts(symbol) {
                found = true;
                processor.consume_candidate(symbol, self.explicit_receiver_kind, &site);
            }
        });
        ProcessResult::from_found(found)
    }
}

impl LevelSource for ScopeLevel {
    fn process_functions_by_name(
        &self,
        call: &CallInfo,
        processor: &mut dyn ScopeLevelProcessor,
    ) -> ProcessResult {
        self.process_accepted(processor, false, |f| {
            self.scope.process_functions_by_name(call.name, f);
        })
    }

    fn process_properties_by_name(
        &self,
        call: &CallInfo,
        processor: &mut dyn ScopeLevelProcessor,
    ) -> ProcessResult {
        self.process_accepted(processor, false, |f| {
            self.scope.process_properties_by_name(call.name, f);
        })
    }

    fn process_objects_by_name(
        &self,
        call: &CallInfo,
        processor: &mut dyn ScopeLevelProcessor,
    ) -> ProcessResult {
        // Objects are never extensions, and never hide members.
        if self.has_extension_receivers() || self.hide_members_only {
            return ProcessResult::ScopeEmpty;
        }
        self.process_accepted(processor, true, |f| {
            self.scope.process_classifiers_by_name(call.name, f);
        })
    }

    fn has_extension_receivers(&self) -> bool {
        !self.extension_receivers.is_empty()
    }
}

/// Constructors of one class, for delegating constructor calls.
///
/// Inner-class constructors are dispatched on the innermost enclosing
/// receiver.
#[derive(Clone, Debug)]
pub struct ConstructorLevel {
    pub scope: Arc<dyn Scope>,
    pub outer_receiver: Option<ReceiverValue>,
}

impl LevelSource for ConstructorLevel {
    fn process_functions_by_name(
        &self,
        call: &CallInfo,
        processor: &mut dyn ScopeLevelProcessor,
    ) -> ProcessResult {
        let mut found = false;
        self.scope.process_functions_by_name(call.name, &mut |symbol: &Symbol| {
            if symbol.kind != SymbolKind::Constructor {
                return;
            }
            let dispatch_receiver = if symbol.flags.contains(SymbolFlags::INNER) {
                self.outer_receiver.as_ref()
            } else {
                None
            };
            let site = CandidateSite {
                dispatch_receiver,
                ..CandidateSite::in_scope(self.scope.id())
            };
            found = true;
            processor.consume_candidate(symbol, ExplicitReceiverKind::NoExplicitReceiver, &site);
        });
        ProcessResult::from_found(found)
    }

    fn process_properties_by_name(
        &self,
        _call: &CallInfo,
        _processor: &mut dyn ScopeLevelProcessor,
    ) -> ProcessResult {
        ProcessResult::ScopeEmpty
    }

    fn process_objects_by_name(
        &self,
        _call: &CallInfo,
        _processor: &mut dyn ScopeLevelProcessor,
    ) -> ProcessResult {
        ProcessResult::ScopeEmpty
    }
}

/// Any level of the tower.
#[derive(Clone, Debug)]
pub enum TowerLevel {
    Member(MemberScopeLevel),
    Scope(ScopeLevel),
    Constructor(ConstructorLevel),
}

impl TowerLevel {
    fn source(&self) -> &dyn LevelSource {
        match self {
            TowerLevel::Member(level) => level,
            TowerLevel::Scope(level) => level,
            TowerLevel::Constructor(level) => level,
        }
    }
}

impl LevelSource for TowerLevel {
    fn process_functions_by_name(
        &self,
        call: &CallInfo,
        processor: &mut dyn ScopeLevelProcessor,
    ) -> ProcessResult {
        self.source().process_functions_by_name(call, processor)
    }

    fn process_properties_by_name(
        &self,
        call: &CallInfo,
        processor: &mut dyn ScopeLevelProcessor,
    ) -> ProcessResult {
        self.source().process_properties_by_name(call, processor)
    }

    fn process_objects_by_name(
        &self,
        call: &CallInfo,
        processor: &mut dyn ScopeLevelProcessor,
    ) -> ProcessResult {
        self.source().process_objects_by_name(call, processor)
    }

    fn has_extension_receivers(&self) -> bool {
        self.source().has_extension_receivers()
    }
}

impl From<MemberScopeLevel> for TowerLevel {
    fn from(level: MemberScopeLevel) -> Self {
        TowerLevel::Member(level)
    }
}

impl From<ScopeLevel> for TowerLevel {
    fn from(level: ScopeLevel) -> Self {
        TowerLevel::Scope(level)
    }
}

impl From<ConstructorLevel> for TowerLevel {
    fn from(level: ConstructorLevel) -> Self {
        TowerLevel::Constructor(level)
    }
}

/// Per-kind result of processing one level.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct LevelOutcome {
    pub properties: ProcessResult,
    pub functions: ProcessResult,
    pub objects: ProcessResult,
}

impl LevelOutcome {
    /// Whether any entry point produced a symbol.
    pub fn found_any(&self) -> bool {
        self.properties
            .merge(self.functions)
            .merge(self.objects)
            .is_found()
    }
}

/// Feeds the symbols of one level into a collector.
pub struct LevelProcessor<'a> {
    pub call: &'a CallInfo,
    pub config: &'a ResolveConfig,
    pub factory: &'a dyn CandidateFactory,
    /// Set when resolving `invoke` on a value found earlier.
    pub invoke_receiver: Option<&'a Candidate>,
}

impl<'a> LevelProcessor<'a> {
    pub fn new(
        call: &'a CallInfo,
        config: &'a ResolveConfig,
        factory: &'a dyn CandidateFactory,
    ) -> Self {
        LevelProcessor {
            call,
            config,
            factory,
            invoke_receiver: None,
        }
    }

    /// Attach `receiver` to every candidate produced.
    #[must_use]
    pub fn through_invoke_receiver(mut self, receiver: &'a Candidate) -> Self {
        self.invoke_receiver = Some(receiver);
        self
    }

    /// Enumerate `level` for the call under `key`.
    pub fn process_level(
        &self,
        level: &dyn LevelSource,
        key: &PriorityKey,
        collector: &mut dyn CandidateCollector,
    ) -> LevelOutcome {
        let mut outcome = LevelOutcome::default();
        let mut sink = CollectingProcessor {
            processor: self,
            key,
            collector,
        };

        match self.call.kind {
            CallKind::VariableAccess => {
                outcome.properties = level.process_properties_by_name(self.call, &mut sink);
                if !self.skips_objects(level, key, &*sink.collector) {
                    outcome.objects = level.process_objects_by_name(self.call, &mut sink);
                }
            }
            CallKind::Function => {
                outcome.functions = level.process_functions_by_name(self.call, &mut sink);
            }
            CallKind::CallableReference => {
                outcome.functions = level.process_functions_by_name(self.call, &mut sink);
                outcome.properties = level.process_properties_by_name(self.call, &mut sink);
            }
        }

        trace!(
            key = ?key,
            properties = ?outcome.properties,
            functions = ?outcome.functions,
            objects = ?outcome.objects,
            "processed level"
        );
        outcome
    }

    fn skips_objects(
        &self,
        level: &dyn LevelSource,
        key: &PriorityKey,
        collector: &dyn CandidateCollector,
    ) -> bool {
        match self.config.object_shadowing {
            ObjectShadowing::AfterDecisiveCandidate => {
                collector.has_decisive_candidate(key) && !level.has_extension_receivers()
            }
            ObjectShadowing::AfterAnySuccess => collector.is_success(),
            ObjectShadowing::Never => false,
        }
    }
}

struct CollectingProcessor<'p, 'a> {
    processor: &'p LevelProcessor<'a>,
    key: &'p PriorityKey,
    collector: &'p mut dyn CandidateCollector,
}

impl ScopeLevelProcessor for CollectingProcessor<'_, '_> {
    fn consume_candidate(
        &mut self,
        symbol: &Symbol,
        explicit_receiver_kind: ExplicitReceiverKind,
        site: &CandidateSite<'_>,
    ) {
        let LevelProcessor {
            call,
            config,
            factory,
            invoke_receiver,
        } = *self.processor;
        let mut candidate = factory.create_candidate(call, symbol, explicit_receiver_kind, site);
        candidate.invoke_receiver = invoke_receiver.map(|receiver| Box::new(receiver.clone()));
        let context = ResolutionContext { config, call };
        self.collector.consume_candidate(self.key, candidate, &context);
    }
}
