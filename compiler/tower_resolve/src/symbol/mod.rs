//! Symbols and the scopes that expose them.
//!
//! Symbol-table storage belongs to the surrounding compiler. The resolver only
//! needs to enumerate, by name, the symbols a scope makes visible; that is the
//! [`Scope`] trait. [`SymbolScope`] is a plain in-memory implementation.

use std::fmt;

use bitflags::bitflags;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::Name;

/// Handle to a declaration in the surrounding symbol table.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct SymbolId(u32);

impl SymbolId {
    /// Create from raw u32 value.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        SymbolId(raw)
    }

    /// Get raw u32 value.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// Handle identifying one scope, for diagnostics and candidate provenance.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ScopeId(u32);

impl ScopeId {
    /// Create from raw u32 value.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        ScopeId(raw)
    }

    /// Get raw u32 value.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// What a symbol declares.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum SymbolKind {
    /// A function or method.
    Function,
    /// A class constructor.
    Constructor,
    /// A property (possibly with accessors).
    Property,
    /// A plain field.
    Field,
    /// An enum entry.
    EnumEntry,
    /// A named object, usable as a value by its name.
    Object,
    /// A class whose name is usable as a value through its companion.
    Classifier,
}

impl SymbolKind {
    /// Functions and constructors.
    #[inline]
    pub const fn is_callable(self) -> bool {
        matches!(self, SymbolKind::Function | SymbolKind::Constructor)
    }

    /// Properties, fields and enum entries.
    #[inline]
    pub const fn is_variable(self) -> bool {
        matches!(
            self,
            SymbolKind::Property | SymbolKind::Field | SymbolKind::EnumEntry
        )
    }

    /// Objects and classifiers.
    #[inline]
    pub const fn is_classifier(self) -> bool {
        matches!(self, SymbolKind::Object | SymbolKind::Classifier)
    }
}

bitflags! {
    /// Declaration properties the resolver filters on.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct SymbolFlags: u8 {
        /// Declares an extension receiver.
        const EXTENSION = 1 << 0;
        /// Wins over members of the receiver type when in a prioritized scope.
        const HIDES_MEMBERS = 1 << 1;
        /// Constructor of an inner class; needs an outer instance.
        const INNER = 1 << 2;
    }
}

/// A declaration visible at some level.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Symbol {
    pub id: SymbolId,
    pub name: Name,
    pub kind: SymbolKind,
    pub flags: SymbolFlags,
}

impl Symbol {
    /// Create a symbol without flags.
    pub const fn new(id: SymbolId, name: Name, kind: SymbolKind) -> Self {
        Symbol {
            id,
            name,
            kind,
            flags: SymbolFlags::empty(),
        }
    }

    /// Same symbol with `flags` added.
    #[must_use]
    pub const fn with_flags(mut self, flags: SymbolFlags) -> Self {
        self.flags = self.flags.union(flags);
        self
    }

    /// Whether the symbol declares an extension receiver.
    #[inline]
    pub const fn is_extension(&self) -> bool {
        self.flags.contains(SymbolFlags::EXTENSION)
    }
}

/// Name-keyed view of one scope of the surrounding symbol table.
///
/// Each method calls `f` for every matching symbol, in declaration order.
pub trait Scope: fmt::Debug {
    /// Identity of this scope.
    fn id(&self) -> ScopeId;

    /// Functions and constructors named `name`.
    fn process_functions_by_name(&self, name: Name, f: &mut dyn FnMut(&Symbol));

    /// Properties, fields and enum entries named `name`.
    fn process_properties_by_name(&self, name: Name, f: &mut dyn FnMut(&Symbol));

    /// Objects and classifiers named `name`.
    fn process_classifiers_by_name(&self, name: Name, f: &mut dyn FnMut(&Symbol));
}

/// In-memory [`Scope`].
#[derive(Clone, Debug)]
pub struct SymbolScope {
    id: ScopeId,
    symbols: FxHashMap<Name, SmallVec<[Symbol; 2]>>,
}

impl SymbolScope {
    /// Create an empty scope.
    pub fn new(id: ScopeId) -> Self {
        SymbolScope {
            id,
            symbols: FxHashMap::default(),
        }
    }

    /// Declare a symbol.
    pub fn declare(&mut self, symbol: Symbol) {
        self.symbols.entry(symbol.name).or_default().push(symbol);
    }

    /// Builder form of [`declare`](Self::declare).
    #[must_use]
    pub fn with(mut self, symbol: Symbol) -> Self {
        self.declare(symbol);
        self
    }

    /// Total number of declared symbols.
    pub fn len(&self) -> usize {
        self.symbols.values().map(SmallVec::len).sum()
    }

    /// Whether no symbol has been declared.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    fn process_matching(
        &self,
        name: Name,
        accept: impl Fn(SymbolKind) -> bool,
        f: &mut dyn FnMut(&Symbol),
    ) {
        if let Some(symbols) = self.symbols.get(&name) {
            for symbol in symbols.iter().filter(|s| accept(s.kind)) {
                f(symbol);
            }
        }
    }
}

impl Scope for SymbolScope {
    fn id(&self) -> ScopeId {
        self.id
    }

    fn process_functions_by_name(&self, name: Name, f: &mut dyn FnMut(&Symbol)) {
        self.process_matching(name, SymbolKind::is_callable, f);
    }

    fn process_properties_by_name(&self, name: Name, f: &mut dyn FnMut(&Symbol)) {
        self.process_matching(name, SymbolKind::is_variable, f);
    }

    fn process_classifiers_by_name(&self, name: Name, f: &mut dyn FnMut(&Symbol)) {
        self.process_matching(name, SymbolKind::is_classifier, f);
    }
}

#[cfg(test)]
mod tests;
