//! Interned identifiers for the names being resolved.
//!
//! Resolution compares names constantly (every symbol enumerated at every
//! level), so names are 32-bit handles into the surrounding compiler's
//! interner. Handles 0 and 1 are reserved for `""` and `invoke`.

use std::fmt;

/// Interned identifier.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
#[repr(transparent)]
pub struct Name(u32);

impl Name {
    /// Pre-interned empty string.
    pub const EMPTY: Name = Name(0);

    /// Pre-interned `invoke`, the operator convention for calling a value.
    pub const INVOKE: Name = Name(1);

    /// Create from raw u32 value.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Name(raw)
    }

    /// Get raw u32 value.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::EMPTY => write!(f, "Name::EMPTY"),
            Self::INVOKE => write!(f, "Name::INVOKE"),
            _ => write!(f, "Name({})", self.0),
        }
    }
}
