//! Priority keys for candidates found along the scope tower.
//!
//! A `PriorityKey` records *how* a candidate was reached: the sequence of
//! priority kinds walked from the root of the search down to the level that
//! produced it. Keys are totally ordered; a smaller key is more preferred.
//!
//! # Encoding
//!
//! The kind sequence is packed big-endian into a single `u64`:
//!
//! ```text
//! 63                                              6 5      0
//! +-----------+-----------+------------------+ ... +--------+
//! | class (4) | class (4) | depth (16)       |     | used   |
//! +-----------+-----------+------------------+ ... +--------+
//! ```
//!
//! - Earlier kinds occupy more significant bits, so unsigned comparison of
//!   codes is lexicographic comparison of kind sequences.
//! - The low 6 bits hold the number of payload bits consumed, leaving 58
//!   usable bits. A prefix always compares below its extensions.
//! - Refinement never mutates: it returns a new key, so sibling branches of
//!   the search share prefixes freely.
//!
//! Two further fields break ties between equal codes: the invoke resolve
//! priority, then (only when both keys carry one) the receiver-group key that
//! an operator-invoke interpretation was reached through.

mod kind;

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use smallvec::SmallVec;

pub use kind::PriorityKind;

/// Mask for the running bit count stored in the low bits of a code.
const USED_BITS_MASK: u64 = 0b11_1111;

/// Width of a code.
const TOTAL_BITS: u32 = u64::BITS;

/// Bits available for kinds and depths (58).
const USABLE_BITS: u32 = USED_BITS_MASK.leading_zeros();

/// Tie-break between interpretations that reach the same level.
///
/// Direct calls (`None`) always win over operator-invoke interpretations
/// found at the same code.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum InvokeResolvePriority {
    /// A direct interpretation.
    #[default]
    None,
    /// Resolving the value an `invoke` will be called on.
    InvokeReceiver,
    /// `value.invoke(...)` through a member or extension `invoke`.
    CommonInvoke,
    /// `receiver.value(...)` where `value` has an extension function type.
    InvokeExtension,
}

/// Encoding capacity exceeded while refining a key.
///
/// Nesting depth and path length are bounded by the static structure of the
/// program, so this is a defect in the caller rather than a user error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeyCapacityError {
    /// A depth payload does not fit in 16 bits.
    DepthOverflow { kind: PriorityKind, depth: usize },
    /// Appending the kind would exceed the 58 usable bits.
    BitBudgetExceeded { used: u32, requested: u32 },
}

impl fmt::Display for KeyCapacityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyCapacityError::DepthOverflow { kind, depth } => write!(
                f,
                "priority kind {} has depth {depth}, max is {}",
                kind.label(),
                PriorityKind::MAX_DEPTH
            ),
            KeyCapacityError::BitBudgetExceeded { used, requested } => write!(
                f,
                "priority key uses {used} bits, appending {requested} more exceeds the {USABLE_BITS} usable bits"
            ),
        }
    }
}

impl std::error::Error for KeyCapacityError {}

/// Immutable, totally ordered priority of a search path.
#[derive(Clone)]
pub struct PriorityKey {
    /// Packed kinds plus the used-bit count in the low 6 bits.
    code: u64,
    /// Kinds in arrival order, kept for diagnostics only.
    kinds: SmallVec<[PriorityKind; 4]>,
    invoke_priority: InvokeResolvePriority,
    /// Key of the receiver an operator-invoke interpretation came through.
    receiver_group: Option<Arc<PriorityKey>>,
}

impl PriorityKey {
    /// Bits available for kinds and depths.
    pub const USABLE_BITS: u32 = USABLE_BITS;

    /// The empty path. Every key is a refinement of the root.
    pub fn root() -> Self {
        PriorityKey {
            code: 0,
            kinds: SmallVec::new(),
            invoke_priority: InvokeResolvePriority::None,
            receiver_group: None,
        }
    }

    /// The key every resolution task is seeded at.
    pub fn start() -> Self {
        Self::of(PriorityKind::Start)
    }

    /// The root refined by a single kind.
    pub fn of(kind: PriorityKind) -> Self {
        Self::root().refine(kind)
    }

    /// Append `kind`, failing if the encoding capacity is exceeded.
    ///
    /// The result describes a fresh path: the invoke priority and receiver
    /// link of `self` describe a finished key and are not inherited.
    pub fn try_refine(&self, kind: PriorityKind) -> Result<Self, KeyCapacityError> {
        let used = self.used_bits();
        let kind_used = used + PriorityKind::CLASS_BITS;
        let mut code = self.code & !USED_BITS_MASK;

        let total_used = match kind.depth() {
            Some(depth) => {
                if depth > PriorityKind::MAX_DEPTH {
                    return Err(KeyCapacityError::DepthOverflow { kind, depth });
                }
                let depth_used = kind_used + PriorityKind::DEPTH_BITS;
                if depth_used > USABLE_BITS {
                    return Err(KeyCapacityError::BitBudgetExceeded {
                        used,
                        requested: kind.encoded_bits(),
                    });
                }
                code |= u64::from(kind.class_index()) << (TOTAL_BITS - kind_used);
                code |= (depth as u64) << (TOTAL_BITS - depth_used);
                depth_used
            }
            None => {
                if kind_used > USABLE_BITS {
                    return Err(KeyCapacityError::BitBudgetExceeded {
                        used,
                        requested: kind.encoded_bits(),
                    });
                }
                code |= u64::from(kind.class_index()) << (TOTAL_BITS - kind_used);
                kind_used
            }
        };

        let mut kinds = self.kinds.clone();
        kinds.push(kind);
        Ok(PriorityKey {
            code: code | u64::from(total_used),
            kinds,
            invoke_priority: InvokeResolvePriority::None,
            receiver_group: None,
        })
    }

    /// Append `kind`.
    ///
    /// # Panics
    /// Panics if the encoding capacity is exceeded (see [`KeyCapacityError`]).
    #[must_use]
    pub fn refine(&self, kind: PriorityKind) -> Self {
        self.try_refine(kind).unwrap_or_else(|e| panic!("{e}"))
    }

    /// Same path, different invoke resolve priority.
    #[must_use]
    pub fn with_invoke_priority(&self, priority: InvokeResolvePriority) -> Self {
        PriorityKey {
            invoke_priority: priority,
            ..self.clone()
        }
    }

    /// Same path, linked to the key of the receiver it was reached through.
    #[must_use]
    pub fn linked_to(&self, receiver_group: &PriorityKey) -> Self {
        PriorityKey {
            receiver_group: Some(Arc::new(receiver_group.clone())),
            ..self.clone()
        }
    }

    /// Key of an operator-invoke interpretation found at `self` through a
    /// receiver found at `receiver_group`.
    ///
    /// An invoke can never be more preferred than the receiver it is called
    /// on, so the path is the larger of the two.
    #[must_use]
    pub fn through_invoke_receiver(
        &self,
        receiver_group: &PriorityKey,
        priority: InvokeResolvePriority,
    ) -> Self {
        let level = self.with_invoke_priority(priority);
        let path = if level >= *receiver_group {
            level
        } else {
            receiver_group.with_invoke_priority(priority)
        };
        path.linked_to(receiver_group)
    }

    /// The packed code, including the used-bit count.
    #[inline]
    pub fn code(&self) -> u64 {
        self.code
    }

    /// Number of payload bits consumed so far.
    #[inline]
    pub fn used_bits(&self) -> u32 {
        (self.code & USED_BITS_MASK) as u32
    }

    /// Kinds in arrival order.
    pub fn kinds(&self) -> &[PriorityKind] {
        &self.kinds
    }

    /// The invoke resolve priority.
    #[inline]
    pub fn invoke_priority(&self) -> InvokeResolvePriority {
        self.invoke_priority
    }

    /// The receiver-group key, for operator-invoke interpretations.
    pub fn receiver_group(&self) -> Option<&PriorityKey> {
        self.receiver_group.as_deref()
    }
}

impl Ord for PriorityKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.code
            .cmp(&other.code)
            .then_with(|| self.invoke_priority.cmp(&other.invoke_priority))
            .then_with(|| match (&self.receiver_group, &other.receiver_group) {
                (Some(mine), Some(theirs)) => mine.cmp(theirs),
                _ => Ordering::Equal,
            })
    }
}

impl PartialOrd for PriorityKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for PriorityKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PriorityKey {}

// Receiver groups are left out: keys that only differ by a missing link
// compare equal and must hash equal.
impl Hash for PriorityKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.code.hash(state);
        self.invoke_priority.hash(state);
    }
}

impl fmt::Debug for PriorityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.kinds.is_empty() {
            f.write_str("<root>")?;
        }
        for (i, kind) in self.kinds.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{kind:?}")?;
        }
        if self.invoke_priority != InvokeResolvePriority::None {
            write!(f, "[{:?}]", self.invoke_priority)?;
        }
        if let Some(receiver) = &self.receiver_group {
            write!(f, " <- {receiver:?}")?;
        }
        Ok(())
    }
}
