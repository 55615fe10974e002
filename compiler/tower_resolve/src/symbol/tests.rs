use super::*;
use pretty_assertions::assert_eq;

fn collect(
    scope: &SymbolScope,
    name: Name,
    which: fn(&SymbolScope, Name, &mut dyn FnMut(&Symbol)),
) -> Vec<SymbolId> {
    let mut found = Vec::new();
    which(scope, name, &mut |symbol| found.push(symbol.id));
    found
}

#[test]
fn enumeration_splits_by_kind() {
    let foo = Name::from_raw(10);
    let scope = SymbolScope::new(ScopeId::from_raw(0))
        .with(Symbol::new(SymbolId::from_raw(1), foo, SymbolKind::Function))
        .with(Symbol::new(SymbolId::from_raw(2), foo, SymbolKind::Property))
        .with(Symbol::new(SymbolId::from_raw(3), foo, SymbolKind::Object))
        .with(Symbol::new(SymbolId::from_raw(4), foo, SymbolKind::EnumEntry))
        .with(Symbol::new(SymbolId::from_raw(5), foo, SymbolKind::Constructor));

    assert_eq!(
        collect(&scope, foo, SymbolScope::process_functions_by_name),
        vec![SymbolId::from_raw(1), SymbolId::from_raw(5)]
    );
    assert_eq!(
        collect(&scope, foo, SymbolScope::process_properties_by_name),
        vec![SymbolId::from_raw(2), SymbolId::from_raw(4)]
    );
    assert_eq!(
        collect(&scope, foo, SymbolScope::process_classifiers_by_name),
        vec![SymbolId::from_raw(3)]
    );
    assert_eq!(scope.len(), 5);
}

#[test]
fn unknown_name_yields_nothing() {
    let scope = SymbolScope::new(ScopeId::from_raw(0)).with(Symbol::new(
        SymbolId::from_raw(1),
        Name::from_raw(10),
        SymbolKind::Function,
    ));
    assert!(collect(&scope, Name::from_raw(11), SymbolScope::process_functions_by_name).is_empty());
}

#[test]
fn flags_accumulate() {
    let symbol = Symbol::new(SymbolId::from_raw(1), Name::from_raw(1), SymbolKind::Function)
        .with_flags(SymbolFlags::EXTENSION)
        .with_flags(SymbolFlags::HIDES_MEMBERS);
    assert!(symbol.is_extension());
    assert!(symbol.flags.contains(SymbolFlags::HIDES_MEMBERS));
    assert!(!symbol.flags.contains(SymbolFlags::INNER));
}
