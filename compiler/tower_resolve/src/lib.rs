//! Priority-ordered name and overload resolution over the scope tower.
//!
//! Resolving `foo` or `recv.foo(...)` means consulting many visibility
//! levels: local scopes, members of implicit receivers, imported scopes,
//! extension scopes and fallbacks such as unqualified enum entries. This
//! crate decides the *order* in which those levels are consulted and stops
//! as soon as less preferred levels can no longer change the outcome.
//!
//! - [`PriorityKey`]: a totally ordered key describing how a candidate was
//!   reached, packed into a `u64`.
//! - [`LevelProcessor`]: enumerates one level for one call and feeds the
//!   candidates to a [`CandidateCollector`].
//! - [`Scheduler`]: runs suspendable tasks in key order with a FIFO
//!   tie-break and prunes them through the collector's early stop predicate.
//! - [`TowerResolver`]: seeds the scheduler for the shape of the call's
//!   explicit receiver, including operator-invoke interpretations.
//!
//! Judging a candidate (visibility, signature match, ambiguity) is left to
//! the [`CandidateCollector`] and [`CandidateFactory`] the caller supplies.
//!
//! # Debug Environment Variables
//!
//! - `RUST_LOG=tower_resolve=debug`: seeding and run summaries.
//! - `RUST_LOG=tower_resolve=trace`: every scheduler decision and every
//!   processed level.

pub mod call;
pub mod candidate;
pub mod config;
pub mod key;
pub mod level;
pub mod name;
pub mod resolver;
pub mod scheduler;
pub mod symbol;
pub mod tower;

pub use call::{
    CallInfo, CallKind, ExplicitReceiver, QualifierReceiver, ReceiverId, ReceiverShape,
    ReceiverValue,
};
pub use candidate::{
    ApplicabilityCheck, Candidate, CandidateApplicability, CandidateCollector, CandidateFactory,
    CandidateSite, ExplicitReceiverKind, ResolutionContext, TowerCandidateCollector,
    TowerCandidateFactory,
};
pub use config::{ObjectShadowing, ResolveConfig};
pub use key::{InvokeResolvePriority, KeyCapacityError, PriorityKey, PriorityKind};
pub use level::{
    ConstructorLevel, LevelOutcome, LevelProcessor, LevelSource, MemberScopeLevel, ProcessResult,
    ScopeLevel, ScopeLevelProcessor, TowerLevel,
};
pub use name::Name;
pub use resolver::TowerResolver;
pub use scheduler::{EarlyStop, ResolverTask, RunSummary, Scheduler};
pub use symbol::{Scope, ScopeId, Symbol, SymbolFlags, SymbolId, SymbolKind, SymbolScope};
pub use tower::{NonLocalElement, TowerData};

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Install a `tracing` subscriber filtered by `RUST_LOG`.
///
/// Does nothing unless `RUST_LOG` is set, and only runs once per process.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
