use pl0_compiler::symtab::{SemanticError, SymbolKind, SymbolTable};

/// Root with two vars plus a two-parameter procedure `f` with one local.
fn sample_table() -> SymbolTable {
    let mut table = SymbolTable::new();
    table.insert_var("a").expect("fresh name");
    table.insert_var("b").expect("fresh name");
    let handle = table.insert_proc("f", 2).expect("fresh name");
    let inner = table.enter_proc_layer();
    table.set_owner(inner, "f");
    table.bind_inner_scope(handle, inner);
    table.insert_param("x").expect("fresh name");
    table.insert_param("y").expect("fresh name");
    table.insert_var("z").expect("fresh name");
    table
}

#[test]
fn offsets_are_dense_with_params_before_vars() {
    let table = sample_table();

    let (x, diff) = table.find_global("x").expect("param resolves");
    assert_eq!(diff, 0);
    assert!(matches!(x.kind, SymbolKind::Param { offset: 0 }));

    let (y, _) = table.find_global("y").expect("param resolves");
    assert!(matches!(y.kind, SymbolKind::Param { offset: 1 }));

    // Vars are assigned offsets past the params.
    let (z, _) = table.find_global("z").expect("var resolves");
    assert!(matches!(z.kind, SymbolKind::Var { offset: 2 }));

    let inner = table.current_scope_id();
    assert_eq!(table.scope(inner).frame_slots(), 3);
    assert_eq!(table.scope(inner).param_count(), 2);
}

#[test]
fn lookup_from_a_nested_layer_reports_the_level_difference() {
    let table = sample_table();
    let (a, diff) = table.find_global("a").expect("outer var resolves");
    assert!(matches!(a.kind, SymbolKind::Var { offset: 0 }));
    assert_eq!(a.level, 0);
    assert_eq!(diff, 1);
}

#[test]
fn breadth_first_resolution_prefers_the_outermost_match() {
    let mut table = SymbolTable::new();
    table.insert_var("n").expect("fresh name");
    let handle = table.insert_proc("p", 0).expect("fresh name");
    let inner = table.enter_proc_layer();
    table.bind_inner_scope(handle, inner);
    table.insert_var("n").expect("shadowing is legal across layers");

    let (symbol, diff) = table.find_global("n").expect("resolves");
    assert_eq!(symbol.level, 0);
    assert_eq!(diff, 1);
}

#[test]
fn duplicate_names_in_one_layer_are_rejected_across_kinds() {
    let mut table = SymbolTable::new();
    table.insert_const("n", 1).expect("fresh name");
    assert!(matches!(
        table.insert_var("n"),
        Err(SemanticError::DuplicateDefinition { .. })
    ));
    assert!(matches!(
        table.insert_proc("n", 0),
        Err(SemanticError::DuplicateDefinition { .. })
    ));
}

#[test]
fn undefined_lookup_carries_the_current_row() {
    let mut table = SymbolTable::new();
    table.set_row(7);
    assert!(matches!(
        table.find_global("ghost"),
        Err(SemanticError::Undefined { row: 7, .. })
    ));
}

#[test]
fn entry_backpatch_and_lookup_by_entry() {
    let mut table = sample_table();
    let inner = table.current_scope_id();
    table.fill_entry(inner, 5);

    table.exit_proc_layer().expect("inner layer has a parent");
    let (f, _) = table.find_global("f").expect("proc resolves");
    assert!(matches!(
        f.kind,
        SymbolKind::Proc {
            param_count: 2,
            entry_address: 5,
            ..
        }
    ));
    assert_eq!(table.find_proc_by_entry(5), Some(inner));
    assert_eq!(table.find_proc_by_entry(99), None);
}

#[test]
fn the_global_layer_cannot_be_left() {
    let mut table = SymbolTable::new();
    assert!(matches!(
        table.exit_proc_layer(),
        Err(SemanticError::ScopeUnderflow)
    ));
}

#[test]
fn scope_tree_serializes_and_round_trips() {
    let table = sample_table();
    let json = serde_json::to_string(&table).expect("tree serializes");
    let back: SymbolTable = serde_json::from_str(&json).expect("tree deserializes");
    assert_eq!(back, table);
}
