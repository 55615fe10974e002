//! Call requests and the receivers they are resolved against.

use std::fmt;
use std::sync::Arc;

use crate::symbol::Scope;
use crate::Name;

/// How the resolved name is going to be used.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum CallKind {
    /// `foo` read as a value.
    VariableAccess,
    /// `foo(...)`.
    Function,
    /// `::foo`, denoting either a function or a property.
    CallableReference,
}

/// Handle to a receiver value (an expression, `this`, a context receiver).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ReceiverId(u32);

impl ReceiverId {
    /// Create from raw u32 value.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        ReceiverId(raw)
    }

    /// Get raw u32 value.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// A value members can be dispatched on.
///
/// Carries the member scope of its type. A smart-cast receiver also carries
/// the member scope of its declared type, searched after the narrowed one.
#[derive(Clone)]
pub struct ReceiverValue {
    id: ReceiverId,
    member_scope: Arc<dyn Scope>,
    original_scope: Option<Arc<dyn Scope>>,
}

impl ReceiverValue {
    /// A receiver whose type exposes `member_scope`.
    pub fn new(id: ReceiverId, member_scope: Arc<dyn Scope>) -> Self {
        ReceiverValue {
            id,
            member_scope,
            original_scope: None,
        }
    }

    /// A smart-cast receiver: `member_scope` is the narrowed type's,
    /// `original_scope` the declared type's.
    pub fn smart_cast(
        id: ReceiverId,
        member_scope: Arc<dyn Scope>,
        original_scope: Arc<dyn Scope>,
    ) -> Self {
        ReceiverValue {
            id,
            member_scope,
            original_scope: Some(original_scope),
        }
    }

    #[inline]
    pub fn id(&self) -> ReceiverId {
        self.id
    }

    pub fn member_scope(&self) -> &Arc<dyn Scope> {
        &self.member_scope
    }

    pub fn original_scope(&self) -> Option<&Arc<dyn Scope>> {
        self.original_scope.as_ref()
    }
}

impl fmt::Debug for ReceiverValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("ReceiverValue");
        s.field("id", &self.id.raw());
        s.field("member_scope", &self.member_scope.id());
        if let Some(original) = &self.original_scope {
            s.field("original_scope", &original.id());
        }
        s.finish()
    }
}

/// A package, class or object named explicitly before the dot.
#[derive(Clone, Debug)]
pub struct QualifierReceiver {
    /// Static members and nested classifiers.
    pub static_scope: Arc<dyn Scope>,
    /// The companion (or the object itself) whose members the name may denote.
    pub companion: Option<ReceiverValue>,
    /// The qualifier evaluated as a value, when it denotes one.
    pub value: Option<ReceiverValue>,
}

/// The explicit receiver of a call.
#[derive(Clone, Debug)]
pub enum ExplicitReceiver {
    /// `Qualifier.foo`.
    Qualifier(QualifierReceiver),
    /// `super.foo`; the receiver exposes the supertype member scope.
    Super(ReceiverValue),
    /// `expr.foo`.
    Expression(ReceiverValue),
}

/// One call to resolve.
#[derive(Clone, Debug)]
pub struct CallInfo {
    pub name: Name,
    pub kind: CallKind,
    pub explicit_receiver: Option<ExplicitReceiver>,
    /// The call invokes its explicit receiver (`value(...)` rewritten to
    /// `value.invoke(...)`).
    pub is_implicit_invoke: bool,
}

impl CallInfo {
    /// A call with no explicit receiver.
    pub fn new(name: Name, kind: CallKind) -> Self {
        CallInfo {
            name,
            kind,
            explicit_receiver: None,
            is_implicit_invoke: false,
        }
    }

    /// Same call with an explicit receiver.
    #[must_use]
    pub fn with_receiver(mut self, receiver: ExplicitReceiver) -> Self {
        self.explicit_receiver = Some(receiver);
        self
    }

    /// `receiver(...)`: invoke the given value.
    pub fn implicit_invoke(receiver: ReceiverValue) -> Self {
        CallInfo {
            name: Name::INVOKE,
            kind: CallKind::Function,
            explicit_receiver: Some(ExplicitReceiver::Expression(receiver)),
            is_implicit_invoke: true,
        }
    }

    /// The same name read as a value, as the receiver of an `invoke`.
    #[must_use]
    pub fn as_variable_access(&self) -> Self {
        CallInfo {
            kind: CallKind::VariableAccess,
            is_implicit_invoke: false,
            ..self.clone()
        }
    }

    /// The same name read as a value, without the explicit receiver.
    #[must_use]
    pub fn as_unqualified_variable_access(&self) -> Self {
        CallInfo::new(self.name, CallKind::VariableAccess)
    }

    /// Shape of the explicit receiver. An implicit invoke takes precedence
    /// over the receiver it carries.
    pub fn receiver_shape(&self) -> ReceiverShape {
        if self.is_implicit_invoke {
            return ReceiverShape::ImplicitInvoke;
        }
        match &self.explicit_receiver {
            None => ReceiverShape::None,
            Some(ExplicitReceiver::Qualifier(_)) => ReceiverShape::Qualifier,
            Some(ExplicitReceiver::Super(_)) => ReceiverShape::Super,
            Some(ExplicitReceiver::Expression(_)) => ReceiverShape::Expression,
        }
    }
}

/// The five receiver shapes the resolver seeds differently.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ReceiverShape {
    /// Package, class or object reference.
    Qualifier,
    /// No explicit receiver.
    None,
    /// `super`.
    Super,
    /// The call invokes its receiver.
    ImplicitInvoke,
    /// Any other expression.
    Expression,
}

#[cfg(test)]
mod tests;
