use super::*;
use crate::symbol::{ScopeId, SymbolScope};
use pretty_assertions::assert_eq;

fn receiver(id: u32) -> ReceiverValue {
    ReceiverValue::new(
        ReceiverId::from_raw(id),
        Arc::new(SymbolScope::new(ScopeId::from_raw(id))),
    )
}

fn qualifier() -> QualifierReceiver {
    QualifierReceiver {
        static_scope: Arc::new(SymbolScope::new(ScopeId::from_raw(50))),
        companion: None,
        value: None,
    }
}

#[test]
fn receiver_shapes_are_classified() {
    let name = Name::from_raw(7);
    let plain = CallInfo::new(name, CallKind::Function);
    assert_eq!(plain.receiver_shape(), ReceiverShape::None);

    let qualified = plain
        .clone()
        .with_receiver(ExplicitReceiver::Qualifier(qualifier()));
    assert_eq!(qualified.receiver_shape(), ReceiverShape::Qualifier);

    let sup = plain
        .clone()
        .with_receiver(ExplicitReceiver::Super(receiver(1)));
    assert_eq!(sup.receiver_shape(), ReceiverShape::Super);

    let expr = plain.with_receiver(ExplicitReceiver::Expression(receiver(2)));
    assert_eq!(expr.receiver_shape(), ReceiverShape::Expression);

    let invoke = CallInfo::implicit_invoke(receiver(3));
    assert_eq!(invoke.receiver_shape(), ReceiverShape::ImplicitInvoke);
    assert_eq!(invoke.name, Name::INVOKE);
}

#[test]
fn implicit_invoke_flag_decides_the_shape() {
    let mut call = CallInfo::new(Name::INVOKE, CallKind::Function)
        .with_receiver(ExplicitReceiver::Qualifier(qualifier()));
    call.is_implicit_invoke = true;
    assert_eq!(call.receiver_shape(), ReceiverShape::ImplicitInvoke);

    call.explicit_receiver = None;
    assert_eq!(call.receiver_shape(), ReceiverShape::ImplicitInvoke);
}

#[test]
fn variable_access_rewrites_keep_or_drop_the_receiver() {
    let call = CallInfo::new(Name::from_raw(7), CallKind::Function)
        .with_receiver(ExplicitReceiver::Expression(receiver(2)));

    let with_receiver = call.as_variable_access();
    assert_eq!(with_receiver.kind, CallKind::VariableAccess);
    assert_eq!(with_receiver.receiver_shape(), ReceiverShape::Expression);

    let bare = call.as_unqualified_variable_access();
    assert_eq!(bare.kind, CallKind::VariableAccess);
    assert_eq!(bare.name, call.name);
    assert_eq!(bare.receiver_shape(), ReceiverShape::None);
}

#[test]
fn smart_cast_receiver_keeps_both_scopes() {
    let narrowed: Arc<dyn Scope> = Arc::new(SymbolScope::new(ScopeId::from_raw(1)));
    let declared: Arc<dyn Scope> = Arc::new(SymbolScope::new(ScopeId::from_raw(2)));
    let value = ReceiverValue::smart_cast(ReceiverId::from_raw(9), narrowed, declared);
    assert_eq!(value.member_scope().id(), ScopeId::from_raw(1));
    assert_eq!(value.original_scope().map(|s| s.id()), Some(ScopeId::from_raw(2)));
    assert!(format!("{value:?}").contains("original_scope"));
}
