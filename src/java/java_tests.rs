use super::*;
use crate::test_support::{java_test, offset_of, parse_body};

// ─── Parsing and imports ─────────────────────────────────────────────

#[test]
fn test_parse_collects_imports() {
    let source = "package a.b;\n\nimport org.mockito.Mockito;\nimport org.mockito.*;\n\
                  import static org.mockito.BDDMockito.given;\nimport static org.mockito.Mockito.*;\n\nclass T {}\n";
    let file = JavaFile::parse(source).unwrap();
    let imports = file.imports();
    assert_eq!(imports.single, vec!["org.mockito.Mockito"]);
    assert_eq!(imports.on_demand, vec!["org.mockito"]);
    assert_eq!(
        imports.static_single,
        vec![("org.mockito.BDDMockito".to_string(), "given".to_string())]
    );
    assert_eq!(imports.static_on_demand, vec!["org.mockito.Mockito"]);
    assert!(imports.package_end.is_some());
    assert!(imports.last_import_end.unwrap() > imports.package_end.unwrap());
}

#[test]
fn test_class_named_requires_import() {
    let file = JavaFile::parse("class T {}").unwrap();
    assert_eq!(file.imports().class_named("Mockito"), None);
    assert_eq!(file.imports().class_named("org.mockito.Mockito"), Some(MockitoClass::Mockito));

    let file = JavaFile::parse("import org.mockito.*;\nclass T {}").unwrap();
    assert_eq!(file.imports().class_named("BDDMockito"), Some(MockitoClass::BddMockito));
}

#[test]
fn test_static_member_resolution() {
    let file = JavaFile::parse("import static org.mockito.BDDMockito.*;\nclass T {}").unwrap();
    // BDDMockito.* sees Mockito statics too
    assert_eq!(file.imports().static_member("verify"), Some(MockitoClass::Mockito));
    assert_eq!(file.imports().static_member("given"), Some(MockitoClass::BddMockito));

    let file = JavaFile::parse("import static org.mockito.Mockito.*;\nclass T {}").unwrap();
    assert_eq!(file.imports().static_member("when"), Some(MockitoClass::Mockito));
    assert_eq!(file.imports().static_member("given"), None);

    let file = JavaFile::parse("import static org.mockito.Mockito.when;\nclass T {}").unwrap();
    assert_eq!(file.imports().static_member("when"), Some(MockitoClass::Mockito));
    assert_eq!(file.imports().static_member("verify"), None);
}

#[test]
fn test_is_importable() {
    let file = JavaFile::parse("import org.mockito.Mockito;\nclass T {}").unwrap();
    assert!(file.imports().is_importable("org.mockito.Mockito"));
    assert!(!file.imports().is_importable("org.mockito.InOrder"));
}

// ─── Symbols ─────────────────────────────────────────────────────────

#[test]
fn test_symbol_table_records_mockito_types() {
    let file = parse_body(
        "InOrder inOrder = Mockito.inOrder(mock);\n\
         var order = Mockito.inOrder(mock, other);\n\
         inOrder.verify(mock).call();",
    );
    let at = offset_of(file.source(), "inOrder.verify");
    let symbol = file.symbols().lookup("inOrder", at).unwrap();
    assert_eq!(symbol.kind, SymbolKind::Local);
    assert_eq!(symbol.ty, Some(MockitoType::InOrder));
    assert_eq!(file.symbols().lookup("order", at).unwrap().ty, Some(MockitoType::InOrder));
    assert_eq!(file.symbols().lookup("mock", at).unwrap().kind, SymbolKind::Field);
}

#[test]
fn test_symbol_table_records_mocked_class() {
    let file = parse_body(
        "try (MockedStatic<Util> util = Mockito.mockStatic(Util.class)) {\n\
         util.verify(Util::load);\n\
         }",
    );
    let at = offset_of(file.source(), "util.verify");
    let symbol = file.symbols().lookup("util", at).unwrap();
    assert_eq!(symbol.kind, SymbolKind::Resource);
    assert_eq!(symbol.ty, Some(MockitoType::MockedStatic));
    assert_eq!(file.mocked_class_of("util", at), Some("Util.class"));
}

#[test]
fn test_local_not_visible_before_declaration() {
    let file = parse_body("mock.call();\nInOrder late = Mockito.inOrder(mock);");
    let at = offset_of(file.source(), "mock.call");
    assert!(file.symbols().lookup("late", at).is_none());
}

// ─── Decomposition ───────────────────────────────────────────────────

#[test]
fn test_chain_of_returns_whole_chain_from_any_link() {
    let file = parse_body("Mockito.when(mock.call()).thenReturn(1).thenReturn(2);");
    let from_root = file.chain_of(file.call_at(offset_of(file.source(), "when")).unwrap());
    let from_tail = file.chain_of(file.call_at(offset_of(file.source(), "thenReturn(2)")).unwrap());
    assert_eq!(from_root.names(), vec!["when", "thenReturn", "thenReturn"]);
    assert_eq!(from_root, from_tail);
}

#[test]
fn test_nested_chain_stays_separate() {
    let file = parse_body("Mockito.when(mock.call()).thenReturn(1);");
    let inner = file.chain_of(file.call_at(offset_of(file.source(), "call()")).unwrap());
    assert_eq!(inner.names(), vec!["call"]);
}

#[test]
fn test_decompose_orders() {
    let file = parse_body("Mockito.doReturn(1).doReturn(2).when(mock).call();");
    let source = file.source().as_bytes();
    let first = file.call_at(offset_of(file.source(), "doReturn(1)")).unwrap();
    let last = outermost_call(first);

    let names = |calls: Vec<tree_sitter::Node>| {
        calls
            .into_iter()
            .map(|c| node_text(c.child_by_field_name("name").unwrap(), source).to_string())
            .collect::<Vec<_>>()
    };
    assert_eq!(names(decompose_from_last(last)), vec!["call", "when", "doReturn", "doReturn"]);
    assert_eq!(names(decompose_from_first(first, true)), vec!["doReturn", "doReturn", "when", "call"]);
    assert_eq!(names(decompose_from_first(first, false)), vec!["doReturn", "when", "call"]);

    assert!(find_call_downward(first, "when", source).is_some());
    assert!(find_call_downward(last, "when", source).is_none());
    assert!(find_call_upward(last, "doReturn", source).is_some());
    assert!(find_call_upward(first, "when", source).is_none());
}

#[test]
fn test_decompose_of_non_call_is_empty() {
    let file = parse_body("int x = 1;");
    let node = file.root().descendant_for_byte_range(
        offset_of(file.source(), "x ="),
        offset_of(file.source(), "x =") + 1,
    );
    let node = node.unwrap();
    assert!(decompose_from_last(node).is_empty());
    assert!(decompose_from_first(node, true).is_empty());
    assert!(file.chain_of(node).is_empty());
}

// ─── Snapshots ───────────────────────────────────────────────────────

#[test]
fn test_snapshot_receivers_follow_return_types() {
    let file = parse_body("Mockito.when(mock.call()).thenReturn(1);");
    let chain = file.chain_of(file.call_at(offset_of(file.source(), "when")).unwrap());
    assert_eq!(chain[0].receiver, Receiver::Static(MockitoClass::Mockito));
    assert_eq!(chain[1].receiver, Receiver::Instance(MockitoType::OngoingStubbing));
    let stubbed = chain[0].arg(0).unwrap().as_call().unwrap();
    assert_eq!(stubbed.qualifier_text(), Some("mock"));
    assert_eq!(stubbed.tail_text(), ".call()");
    assert_eq!(stubbed.receiver, Receiver::Unknown);
}

#[test]
fn test_snapshot_bdd_receivers() {
    let file = parse_body("BDDMockito.willReturn(1).given(mock).call();\nBDDMockito.then(mock).should().call();");
    let stubber = file.chain_of(file.call_at(offset_of(file.source(), "willReturn")).unwrap());
    assert_eq!(stubber[0].receiver, Receiver::Static(MockitoClass::BddMockito));
    assert_eq!(stubber[1].receiver, Receiver::Instance(MockitoType::BddStubber));
    assert_eq!(stubber[2].receiver, Receiver::Unknown);

    let then = file.chain_of(file.call_at(offset_of(file.source(), "then(")).unwrap());
    assert_eq!(then[1].receiver, Receiver::Instance(MockitoType::Then));
}

#[test]
fn test_bdd_class_sees_mockito_statics_but_not_reverse() {
    let file = parse_body("BDDMockito.verify(mock).call();\nMockito.given(mock.call());");
    let verify = file.chain_of(file.call_at(offset_of(file.source(), "verify")).unwrap());
    assert_eq!(verify[0].receiver, Receiver::Static(MockitoClass::Mockito));
    let given = file.chain_of(file.call_at(offset_of(file.source(), "given")).unwrap());
    assert_eq!(given[0].receiver, Receiver::Unknown);
}

#[test]
fn test_snapshot_argument_kinds() {
    let file = parse_body(
        "Mockito.doThrow(IOException.class, new IllegalStateException(\"x\"), new RuntimeException(), () -> {}, Util::load, \"s\", true, 1 + 2).when(mock).call();",
    );
    let chain = file.chain_of(file.call_at(offset_of(file.source(), "doThrow")).unwrap());
    let kinds: Vec<&ArgKind> = chain[0].args.iter().map(|a| &a.kind).collect();
    assert_eq!(kinds[0], &ArgKind::ClassLiteral { type_name: "IOException".to_string() });
    assert_eq!(
        kinds[1],
        &ArgKind::NewInstance { type_name: "IllegalStateException".to_string(), has_args: true }
    );
    assert_eq!(
        kinds[2],
        &ArgKind::NewInstance { type_name: "RuntimeException".to_string(), has_args: false }
    );
    assert_eq!(kinds[3], &ArgKind::Lambda);
    assert_eq!(kinds[4], &ArgKind::MethodReference);
    assert_eq!(kinds[5], &ArgKind::StringLiteral);
    assert_eq!(kinds[6], &ArgKind::BooleanLiteral { value: true });
    assert_eq!(kinds[7], &ArgKind::Other);
    assert_eq!(chain[1].args[0].kind, ArgKind::Reference);
}

#[test]
fn test_snapshot_link_keeps_formatting() {
    let file = parse_body("Mockito.when(mock.call())\n    .thenReturn(1);");
    let chain = file.chain_of(file.call_at(offset_of(file.source(), "when")).unwrap());
    assert_eq!(chain[0].link, ".");
    assert!(chain[1].link.starts_with('\n'));
    assert!(chain[1].link.ends_with('.'));
}

#[test]
fn test_argument_types_from_symbols() {
    let file = parse_body(
        "InOrder inOrder = Mockito.inOrder(mock);\nBDDMockito.then(mock).should(inOrder, Mockito.times(2)).call();",
    );
    let chain = file.chain_of(file.call_at(offset_of(file.source(), "then(")).unwrap());
    let should = &chain[1];
    assert_eq!(should.args[0].ty, Some(MockitoType::InOrder));
    assert_eq!(should.args[1].ty, Some(MockitoType::VerificationMode));
}

// ─── Selections ──────────────────────────────────────────────────────

#[test]
fn test_line_span_and_statements() {
    let source = java_test("mock.a();\nmock.b();\nmock.c();");
    let file = JavaFile::parse(source).unwrap();
    let first = file.line_of(offset_of(file.source(), "mock.a"));
    let span = file.line_span(first, first + 1).unwrap();
    let statements = file.statements_in(span);
    assert_eq!(statements.len(), 2);
    assert_eq!(file.text(statements[0]), "mock.a();");
    assert_eq!(file.text(statements[1]), "mock.b();");
    assert!(file.line_span(0, 1).is_none());
}

#[test]
fn test_statements_in_ignores_partial_overlap() {
    let file = parse_body("mock.a();\nmock.b();");
    let start = offset_of(file.source(), "a();");
    let end = offset_of(file.source(), "mock.b") + "mock.b();".len();
    let statements = file.statements_in(Span::new(start, end));
    assert_eq!(statements.len(), 1);
    assert_eq!(file.text(statements[0]), "mock.b();");
}

#[test]
fn test_call_with_span() {
    let file = parse_body("Mockito.when(mock.call()).thenReturn(1);");
    let chain = file.chain_of(file.call_at(offset_of(file.source(), "when")).unwrap());
    let node = file.call_with_span(chain.span()).unwrap();
    assert_eq!(file.text(node), "Mockito.when(mock.call()).thenReturn(1)");
    assert!(file.call_with_span(Span::new(chain.span().start, chain.span().end - 1)).is_none());
}

#[test]
fn test_revision_tracks_text() {
    let a = JavaFile::parse("class A {}").unwrap();
    let b = JavaFile::parse("class A {}").unwrap();
    let c = JavaFile::parse("class B {}").unwrap();
    assert_eq!(a.revision(), b.revision());
    assert_ne!(a.revision(), c.revision());
}
