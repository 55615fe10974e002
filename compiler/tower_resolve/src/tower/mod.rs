//! The scope tower of one call site.
//!
//! Levels are listed innermost first. Implicit receivers and non-local
//! scopes interleave along one outward walk and share its depth index, so a
//! `this` of an enclosing class and a file scope further out keep their
//! relative order.

use std::sync::Arc;

use crate::call::ReceiverValue;
use crate::symbol::Scope;

/// One step of the outward walk past the local scopes.
#[derive(Clone, Debug)]
pub enum NonLocalElement {
    /// An implicit `this` of an enclosing declaration.
    ImplicitReceiver(ReceiverValue),
    /// A member-less scope: file, package, default or explicit imports.
    Scope(Arc<dyn Scope>),
}

/// Everything visible from one call site.
#[derive(Clone, Debug, Default)]
pub struct TowerData {
    local_scopes: Vec<Arc<dyn Scope>>,
    non_local: Vec<NonLocalElement>,
    context_receiver_groups: Vec<Vec<ReceiverValue>>,
    prioritized_scopes: Vec<Arc<dyn Scope>>,
    enum_scopes: Vec<Arc<dyn Scope>>,
}

impl TowerData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the next local scope outward.
    #[must_use]
    pub fn with_local_scope(mut self, scope: Arc<dyn Scope>) -> Self {
        self.local_scopes.push(scope);
        self
    }

    /// Add the next implicit receiver outward.
    #[must_use]
    pub fn with_implicit_receiver(mut self, receiver: ReceiverValue) -> Self {
        self.non_local.push(NonLocalElement::ImplicitReceiver(receiver));
        self
    }

    /// Add the next non-local scope outward.
    #[must_use]
    pub fn with_non_local_scope(mut self, scope: Arc<dyn Scope>) -> Self {
        self.non_local.push(NonLocalElement::Scope(scope));
        self
    }

    /// Add a group of context receivers, searched after the outward walk.
    #[must_use]
    pub fn with_context_receiver_group(mut self, group: Vec<ReceiverValue>) -> Self {
        self.context_receiver_groups.push(group);
        self
    }

    /// Add a scope whose member-hiding declarations beat members.
    #[must_use]
    pub fn with_prioritized_scope(mut self, scope: Arc<dyn Scope>) -> Self {
        self.prioritized_scopes.push(scope);
        self
    }

    /// Add an enum whose entries are reachable by unqualified name.
    #[must_use]
    pub fn with_enum_scope(mut self, scope: Arc<dyn Scope>) -> Self {
        self.enum_scopes.push(scope);
        self
    }

    /// Local scopes with their depth, innermost first.
    pub fn local_scopes(&self) -> impl Iterator<Item = (usize, &Arc<dyn Scope>)> {
        self.local_scopes.iter().enumerate()
    }

    /// The outward walk with its shared depth index.
    pub fn non_local(&self) -> impl Iterator<Item = (usize, &NonLocalElement)> {
        self.non_local.iter().enumerate()
    }

    /// Implicit receivers with their depth in the outward walk.
    pub fn implicit_receivers(&self) -> impl Iterator<Item = (usize, &ReceiverValue)> {
        self.non_local().filter_map(|(depth, element)| match element {
            NonLocalElement::ImplicitReceiver(receiver) => Some((depth, receiver)),
            NonLocalElement::Scope(_) => None,
        })
    }

    /// Non-local scopes with their depth in the outward walk.
    pub fn non_local_scopes(&self) -> impl Iterator<Item = (usize, &Arc<dyn Scope>)> {
        self.non_local().filter_map(|(depth, element)| match element {
            NonLocalElement::Scope(scope) => Some((depth, scope)),
            NonLocalElement::ImplicitReceiver(_) => None,
        })
    }

    pub fn context_receiver_groups(&self) -> impl Iterator<Item = (usize, &[ReceiverValue])> {
        self.context_receiver_groups
            .iter()
            .map(Vec::as_slice)
            .enumerate()
    }

    pub fn prioritized_scopes(&self) -> impl Iterator<Item = (usize, &Arc<dyn Scope>)> {
        self.prioritized_scopes.iter().enumerate()
    }

    pub fn enum_scopes(&self) -> impl Iterator<Item = (usize, &Arc<dyn Scope>)> {
        self.enum_scopes.iter().enumerate()
    }

    /// The innermost implicit receiver, if any.
    pub fn innermost_receiver(&self) -> Option<&ReceiverValue> {
        self.implicit_receivers().map(|(_, receiver)| receiver).next()
    }
}
