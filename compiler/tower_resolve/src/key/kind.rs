//! Priority kinds: the alphabet priority keys are spelled in.
//!
//! Each kind owns a 4-bit class index. Kinds that carry a depth pack a
//! 16-bit depth right after their class index, so two keys that reach the
//! same class at different nesting distances still order by that distance.
//!
//! # Class Layout
//!
//! | Class | Kinds |
//! |-------|-------|
//! | 0 | `Start` |
//! | 1 | `Qualifier` |
//! | 2 | `Classifier` |
//! | 3 | `TopPrioritized(depth)` |
//! | 4 | `Member` |
//! | 5 | `Local(depth)` |
//! | 6 | `Implicit(depth)`, `NonLocal(depth)` |
//! | 7 | `ContextReceiverGroup(depth)` |
//! | 8 | `InvokeExtension` |
//! | 9 | `QualifierValue`, `UnqualifiedEnum(depth)` |
//! | 10-14 | reserved |
//! | 15 | `Last` |

use std::fmt;

/// One step of a search path through the tower.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub enum PriorityKind {
    /// Root of every search.
    Start,
    /// Static scope of an explicit qualifier (`Pkg.foo`, `Class.foo`).
    Qualifier,
    /// Members of the classifier a qualifier names (companion/object members).
    Classifier,
    /// Language-prioritized extensions that hide members.
    TopPrioritized(usize),
    /// Member scope of a receiver.
    Member,
    /// Local scope, 0 = innermost.
    Local(usize),
    /// Implicit receiver at the given outward depth.
    Implicit(usize),
    /// Non-local (file, package, imported) scope at the given outward depth.
    ///
    /// Shares its class with `Implicit`: both index the same outward walk.
    NonLocal(usize),
    /// Group of context receivers.
    ContextReceiverGroup(usize),
    /// `invoke` reached through an extension-function-typed value.
    InvokeExtension,
    /// A qualifier used as a value.
    QualifierValue,
    /// Enum entries reachable without qualification.
    UnqualifiedEnum(usize),
    /// Sentinel after every other kind.
    Last,
}

impl PriorityKind {
    /// Number of bits taken by the class index.
    pub const CLASS_BITS: u32 = 4;

    /// Number of bits taken by a depth payload.
    pub const DEPTH_BITS: u32 = 16;

    /// Largest depth a kind can carry.
    pub const MAX_DEPTH: usize = 0xFFFF;

    /// The 4-bit class index of this kind.
    #[inline]
    pub const fn class_index(self) -> u8 {
        match self {
            PriorityKind::Start => 0,
            PriorityKind::Qualifier => 1,
            PriorityKind::Classifier => 2,
            PriorityKind::TopPrioritized(_) => 3,
            PriorityKind::Member => 4,
            PriorityKind::Local(_) => 5,
            PriorityKind::Implicit(_) | PriorityKind::NonLocal(_) => 6,
            PriorityKind::ContextReceiverGroup(_) => 7,
            PriorityKind::InvokeExtension => 8,
            PriorityKind::QualifierValue | PriorityKind::UnqualifiedEnum(_) => 9,
            PriorityKind::Last => 0b1111,
        }
    }

    /// The depth payload, for kinds that carry one.
    #[inline]
    pub const fn depth(self) -> Option<usize> {
        match self {
            PriorityKind::TopPrioritized(depth)
            | PriorityKind::Local(depth)
            | PriorityKind::Implicit(depth)
            | PriorityKind::NonLocal(depth)
            | PriorityKind::ContextReceiverGroup(depth)
            | PriorityKind::UnqualifiedEnum(depth) => Some(depth),
            PriorityKind::Start
            | PriorityKind::Qualifier
            | PriorityKind::Classifier
            | PriorityKind::Member
            | PriorityKind::InvokeExtension
            | PriorityKind::QualifierValue
            | PriorityKind::Last => None,
        }
    }

    /// Bits this kind consumes when appended to a key.
    #[inline]
    pub const fn encoded_bits(self) -> u32 {
        if self.depth().is_some() {
            Self::CLASS_BITS + Self::DEPTH_BITS
        } else {
            Self::CLASS_BITS
        }
    }

    /// Short label used in key debug output.
    pub const fn label(self) -> &'static str {
        match self {
            PriorityKind::Start => "Start",
            PriorityKind::Qualifier => "Qualifier",
            PriorityKind::Classifier => "Classifier",
            PriorityKind::TopPrioritized(_) => "TopPrioritized",
            PriorityKind::Member => "Member",
            PriorityKind::Local(_) => "Local",
            PriorityKind::Implicit(_) => "Implicit",
            PriorityKind::NonLocal(_) => "NonLocal",
            PriorityKind::ContextReceiverGroup(_) => "ContextReceiverGroup",
            PriorityKind::InvokeExtension => "InvokeExtension",
            PriorityKind::QualifierValue => "QualifierValue",
            PriorityKind::UnqualifiedEnum(_) => "UnqualifiedEnum",
            PriorityKind::Last => "Last",
        }
    }
}

impl fmt::Debug for PriorityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.depth() {
            Some(depth) => write!(f, "{}({depth})", self.label()),
            None => f.write_str(self.label()),
        }
    }
}
