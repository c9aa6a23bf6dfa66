use super::*;
use crate::approach::StubbingKind;
use crate::convention::Convention;
use crate::test_support::{HEADER, offset_of, parse_body, squash};

const WHEN: Target = Target::Stubbing(StubbingKind::MockitoWhen);
const DO_X: Target = Target::Stubbing(StubbingKind::MockitoDoX);
const GIVEN: Target = Target::Stubbing(StubbingKind::BddMockitoGiven);
const WILL_X: Target = Target::Stubbing(StubbingKind::BddMockitoWillX);

fn verification(target: VerificationTarget) -> Target {
    Target::Verification(target)
}

/// Start of the first body statement.
fn first_statement() -> Selection {
    Selection::Caret(HEADER.len() + 8)
}

fn whole_file(file: &JavaFile) -> Selection {
    Selection::Range(Span::new(0, file.source().len()))
}

fn rewrite(file: &JavaFile, selection: Selection, target: Target) -> Result<String, ChainError> {
    let plan = ChainRewriter::new(file, ConventionPolicy::none()).plan(selection, target)?;
    plan.preview(file.source())
}

fn rewrite_at(body: &str, needle: &str, target: Target) -> Result<String, ChainError> {
    let file = parse_body(body);
    let at = offset_of(file.source(), needle);
    rewrite(&file, Selection::Caret(at), target)
}

fn rejection(result: Result<String, ChainError>) -> Rejection {
    match result {
        Err(ChainError::Unavailable(rejection)) => rejection,
        other => panic!("expected a rejection, got {other:?}"),
    }
}

// ─── Stubbing ────────────────────────────────────────────────────────

#[test]
fn test_when_to_do_x() {
    let out = rewrite_at("Mockito.when(mock.call()).thenReturn(1).thenReturn(2);", "Mockito.when", DO_X).unwrap();
    assert!(out.contains("        Mockito.doReturn(1).doReturn(2).when(mock).call();\n"), "{out}");
}

#[test]
fn test_do_x_to_when_keeps_stubbed_arguments() {
    let out = rewrite_at("Mockito.doThrow(new IllegalStateException()).when(mock).call(1, \"a\");", "Mockito.doThrow", WHEN)
        .unwrap();
    assert!(out.contains("Mockito.when(mock.call(1, \"a\")).thenThrow(new IllegalStateException());"), "{out}");
}

#[test]
fn test_given_to_will_x() {
    let out = rewrite_at("BDDMockito.given(mock.call()).willAnswer(i -> 1).will(answer);", "BDDMockito.given", WILL_X).unwrap();
    assert!(out.contains("BDDMockito.willAnswer(i -> 1).will(answer).given(mock).call();"), "{out}");
}

#[test]
fn test_multiline_setter_links_survive() {
    let out = rewrite_at(
        "Mockito.when(mock.call())\n    .thenReturn(1)\n    .thenReturn(2);",
        "Mockito.when",
        GIVEN,
    )
    .unwrap();
    assert!(
        out.contains("BDDMockito.given(mock.call())\n            .willReturn(1)\n            .willReturn(2);"),
        "{out}"
    );
}

#[test]
fn test_multiline_to_stubber_keeps_first_setter_on_entry_line() {
    let out = rewrite_at("Mockito.when(mock.call())\n    .thenReturn(1)\n    .thenReturn(2);", "Mockito.when", DO_X)
        .unwrap();
    assert!(out.contains("Mockito.doReturn(1)\n            .doReturn(2).when(mock).call();"), "{out}");
}

#[test]
fn test_caret_inside_stubbed_call_selects_enclosing_chain() {
    let out = rewrite_at("Mockito.when(mock.call()).thenReturn(1);", "call()", DO_X).unwrap();
    assert!(out.contains("Mockito.doReturn(1).when(mock).call();"), "{out}");
}

#[test]
fn test_unsupported_setter_is_rejected() {
    let result = rewrite_at("Mockito.doNothing().when(mock).call();", "Mockito.doNothing", WHEN);
    assert_eq!(
        rejection(result),
        Rejection::UnsupportedSetter { method: "doNothing".to_string(), target: "Mockito.when()".to_string() }
    );
}

#[test]
fn test_available_targets_skip_unsupported_setters() {
    let file = parse_body("Mockito.doNothing().when(mock).call();");
    let targets = ChainRewriter::new(&file, ConventionPolicy::none()).available_targets(first_statement());
    assert_eq!(targets, vec![WILL_X]);
}

#[test]
fn test_same_dialect_is_not_a_target() {
    let result = rewrite_at("Mockito.when(mock.call()).thenReturn(1);", "Mockito.when", WHEN);
    assert!(matches!(rejection(result), Rejection::NotATarget { .. }));
}

#[test]
fn test_invalid_chain_is_rejected() {
    let result = rewrite_at("Mockito.when(mock.call());", "Mockito.when", DO_X);
    assert!(matches!(rejection(result), Rejection::Invalid { .. }));
}

#[test]
fn test_unclassified_selection_is_rejected() {
    let result = rewrite_at("mock.call().other();", "mock.call().other", DO_X);
    assert_eq!(rejection(result), Rejection::NotClassified);
}

#[test]
fn test_import_added_for_new_entry_class() {
    let source = "package p;\n\nimport org.mockito.Mockito;\n\nclass T {\n    void t() {\n        \
                  Mockito.when(mock.call()).thenReturn(1);\n    }\n}\n";
    let file = JavaFile::parse(source).unwrap();
    let out = rewrite(&file, Selection::Caret(offset_of(source, "Mockito.when")), GIVEN).unwrap();
    assert!(out.contains("import org.mockito.Mockito;\nimport org.mockito.BDDMockito;\n"), "{out}");
    assert!(out.contains("BDDMockito.given(mock.call()).willReturn(1);"), "{out}");
}

#[test]
fn test_static_import_source_is_qualified() {
    let source = "import static org.mockito.Mockito.*;\n\nclass T {\n    void t() {\n        \
                  when(mock.call()).thenReturn(1);\n    }\n}\n";
    let file = JavaFile::parse(source).unwrap();
    let out = rewrite(&file, Selection::Caret(offset_of(source, "when(")), DO_X).unwrap();
    assert!(out.contains("import static org.mockito.Mockito.*;\nimport org.mockito.Mockito;\n"), "{out}");
    assert!(out.contains("Mockito.doReturn(1).when(mock).call();"), "{out}");
}

#[test]
fn test_stubbing_round_trips() {
    let sources = [
        (StubbingKind::MockitoWhen, "Mockito.when(mock.call(1)).thenReturn(1).thenThrow(new RuntimeException());"),
        (StubbingKind::MockitoDoX, "Mockito.doReturn(1).doThrow(new RuntimeException()).when(mock).call(1);"),
        (StubbingKind::BddMockitoGiven, "BDDMockito.given(mock.call(1)).willReturn(1).willThrow(new RuntimeException());"),
        (StubbingKind::BddMockitoWillX, "BDDMockito.willReturn(1).willThrow(new RuntimeException()).given(mock).call(1);"),
    ];
    for (from, body) in sources {
        for to in stubbing_targets(from) {
            let original = parse_body(body);
            let there = rewrite(&original, first_statement(), Target::Stubbing(to)).unwrap();
            let converted = JavaFile::parse(there).unwrap();
            let back = rewrite(&converted, first_statement(), Target::Stubbing(from)).unwrap();
            assert_eq!(squash(&back), squash(original.source()), "{from} → {to} → {from}");
        }
    }
}

// ─── Verification ────────────────────────────────────────────────────

#[test]
fn test_bdd_to_in_order_declares_variable() {
    let out = rewrite_at(
        "BDDMockito.then(mock).should().call();",
        "BDDMockito.then",
        verification(VerificationTarget::InOrderVerify),
    )
    .unwrap();
    assert!(
        out.contains("        InOrder inOrder = Mockito.inOrder(mock);\n        inOrder.verify(mock).call();\n"),
        "{out}"
    );
}

#[test]
fn test_in_order_base_name_is_configurable_and_unique() {
    let file = parse_body("int order = 0;\nBDDMockito.then(mock).should(Mockito.times(2)).call();");
    let at = offset_of(file.source(), "BDDMockito.then");
    let plan = ChainRewriter::new(&file, ConventionPolicy::none())
        .with_in_order_base("order")
        .plan(Selection::Caret(at), verification(VerificationTarget::InOrderVerify))
        .unwrap();
    let out = plan.preview(file.source()).unwrap();
    assert!(
        out.contains("InOrder order2 = Mockito.inOrder(mock);\n        order2.verify(mock, Mockito.times(2)).call();"),
        "{out}"
    );
}

#[test]
fn test_bdd_with_in_order_reuses_it() {
    let out = rewrite_at(
        "InOrder io = Mockito.inOrder(mock);\nBDDMockito.then(mock).should(io, Mockito.times(2)).call();",
        "BDDMockito.then",
        verification(VerificationTarget::InOrderVerify),
    )
    .unwrap();
    assert!(out.contains("io.verify(mock, Mockito.times(2)).call();"), "{out}");
    assert_eq!(out.matches("InOrder io").count(), 1);
}

#[test]
fn test_mockito_verify_to_bdd() {
    let out = rewrite_at(
        "Mockito.verify(mock, Mockito.never()).call();",
        "Mockito.verify",
        verification(VerificationTarget::BddThenShould),
    )
    .unwrap();
    assert!(out.contains("BDDMockito.then(mock).should(Mockito.never()).call();"), "{out}");
}

#[test]
fn test_mockito_verify_to_bdd_in_order() {
    let out = rewrite_at(
        "Mockito.verify(mock).call();",
        "Mockito.verify",
        verification(VerificationTarget::BddThenShouldInOrder),
    )
    .unwrap();
    assert!(
        out.contains("InOrder inOrder = Mockito.inOrder(mock);\n        BDDMockito.then(mock).should(inOrder).call();"),
        "{out}"
    );
}

#[test]
fn test_add_in_order_to_bdd() {
    let out = rewrite_at(
        "BDDMockito.then(mock).should(Mockito.times(2)).call();",
        "BDDMockito.then",
        verification(VerificationTarget::AddInOrderToBdd),
    )
    .unwrap();
    assert!(out.contains("BDDMockito.then(mock).should(inOrder, Mockito.times(2)).call();"), "{out}");
}

#[test]
fn test_add_in_order_unavailable_when_present() {
    let result = rewrite_at(
        "InOrder io = Mockito.inOrder(mock);\nBDDMockito.then(mock).should(io).call();",
        "BDDMockito.then",
        verification(VerificationTarget::AddInOrderToBdd),
    );
    assert!(matches!(rejection(result), Rejection::Invalid { .. }));
}

#[test]
fn test_in_order_source_to_bdd_keeps_variable() {
    let out = rewrite_at(
        "InOrder inOrder = Mockito.inOrder(mock);\ninOrder.verify(mock).call();",
        "inOrder.verify",
        verification(VerificationTarget::BddThenShouldInOrder),
    )
    .unwrap();
    assert!(out.contains("BDDMockito.then(mock).should(inOrder).call();"), "{out}");
    assert_eq!(out.matches("Mockito.inOrder(").count(), 1);
}

#[test]
fn test_verify_without_verified_call_is_invalid() {
    for (body, needle) in [
        ("Mockito.verify(mock);", "Mockito.verify"),
        ("InOrder io = Mockito.inOrder(mock);\nio.verify(mock, Mockito.times(2));", "io.verify"),
    ] {
        let result = rewrite_at(body, needle, verification(VerificationTarget::BddThenShould));
        assert!(
            matches!(rejection(result), Rejection::Invalid { ref reason, .. } if reason.contains("nothing is verified")),
            "{body}"
        );
        let file = parse_body(body);
        let at = Selection::Caret(offset_of(file.source(), needle));
        assert!(ChainRewriter::new(&file, ConventionPolicy::none()).available_targets(at).is_empty(), "{body}");
    }
}

#[test]
fn test_ordered_sources_lose_order_alike_in_mockito_verify() {
    let declared = "InOrder io = Mockito.inOrder(mock);\n";
    let from_bdd = rewrite_at(
        &format!("{declared}BDDMockito.then(mock).should(io, Mockito.times(2)).call();"),
        "BDDMockito.then",
        verification(VerificationTarget::MockitoVerify),
    )
    .unwrap();
    let from_in_order = rewrite_at(
        &format!("{declared}io.verify(mock, Mockito.times(2)).call();"),
        "io.verify",
        verification(VerificationTarget::MockitoVerify),
    )
    .unwrap();
    let expected = "Mockito.verify(mock, Mockito.times(2)).call();";
    assert!(from_bdd.contains(expected), "{from_bdd}");
    assert_eq!(from_bdd, from_in_order);
}

#[test]
fn test_mocked_static_to_in_order() {
    let out = rewrite_at(
        "MockedStatic<Util> util = Mockito.mockStatic(Util.class);\nutil.verify(() -> Util.load());",
        "util.verify",
        verification(VerificationTarget::InOrderVerifyMockedStatic),
    )
    .unwrap();
    assert!(
        out.contains("InOrder inOrder = Mockito.inOrder(Util.class);\n        inOrder.verify(util, () -> Util.load());"),
        "{out}"
    );
}

#[test]
fn test_in_order_mocked_static_to_mocked_static() {
    let out = rewrite_at(
        "MockedStatic<Util> util = Mockito.mockStatic(Util.class);\n\
         InOrder inOrder = Mockito.inOrder(Util.class);\n\
         inOrder.verify(util, () -> Util.load(), Mockito.times(2));",
        "inOrder.verify",
        verification(VerificationTarget::MockedStaticVerify),
    )
    .unwrap();
    assert!(out.contains("util.verify(() -> Util.load(), Mockito.times(2));"), "{out}");
}

#[test]
fn test_unresolved_mocked_class_is_rejected() {
    let result = rewrite_at(
        "MockedStatic<Util> util = factory.create();\nutil.verify(() -> Util.load());",
        "util.verify",
        verification(VerificationTarget::InOrderVerifyMockedStatic),
    );
    assert_eq!(rejection(result), Rejection::UnresolvedMockedStatic("util".to_string()));
}

#[test]
fn test_verification_round_trips() {
    let cases = [
        (
            "Mockito.verify(mock, Mockito.times(2)).call();",
            VerificationTarget::BddThenShould,
            VerificationTarget::MockitoVerify,
            "Mockito.verify",
        ),
        (
            "InOrder inOrder = Mockito.inOrder(mock);\ninOrder.verify(mock).call(1);",
            VerificationTarget::BddThenShouldInOrder,
            VerificationTarget::InOrderVerify,
            "inOrder.verify",
        ),
    ];
    for (body, there, back, needle) in cases {
        let original = parse_body(body);
        let at = offset_of(original.source(), needle);
        let converted = JavaFile::parse(rewrite(&original, Selection::Caret(at), verification(there)).unwrap()).unwrap();
        let returned = rewrite(&converted, Selection::Caret(at), verification(back)).unwrap();
        assert_eq!(squash(&returned), squash(original.source()), "{body}");
    }
}

// ─── Bulk ────────────────────────────────────────────────────────────

#[test]
fn test_bulk_stubbing_conversion() {
    let file = parse_body(
        "Mockito.when(mock.call()).thenReturn(1);\nMockito.when(other.call()).thenThrow(new RuntimeException());",
    );
    let out = rewrite(&file, whole_file(&file), DO_X).unwrap();
    assert!(out.contains("        Mockito.doReturn(1).when(mock).call();\n"), "{out}");
    assert!(out.contains("        Mockito.doThrow(new RuntimeException()).when(other).call();\n"), "{out}");
}

#[test]
fn test_bulk_in_order_shares_one_variable() {
    let file = parse_body(
        "BDDMockito.then(mock).should().call();\nBDDMockito.then(other).should().call();\nBDDMockito.then(mock).should().done();",
    );
    let out = rewrite(&file, whole_file(&file), verification(VerificationTarget::InOrderVerify)).unwrap();
    assert!(
        out.contains(
            "        InOrder inOrder = Mockito.inOrder(mock, other);\n\
             \x20       inOrder.verify(mock).call();\n\
             \x20       inOrder.verify(other).call();\n\
             \x20       inOrder.verify(mock).done();\n"
        ),
        "{out}"
    );
}

#[test]
fn test_bulk_with_invalid_statement_is_atomic() {
    let body = "Mockito.when(mock.call()).thenReturn(1);\nMockito.when(mock.call());\nMockito.when(other.call()).thenReturn(2);";
    let mut document = Document::new(crate::test_support::java_test(body));
    let original = document.text().to_string();
    let file = JavaFile::parse(original.clone()).unwrap();
    let rewriter = ChainRewriter::new(&file, ConventionPolicy::none());
    assert!(rewriter.available_targets(whole_file(&file)).is_empty());
    assert!(!rewriter.is_available(whole_file(&file), DO_X));

    let report = convert(&mut document, whole_file(&file), DO_X, ConventionPolicy::none(), "inOrder").unwrap();
    assert_eq!(report.state, ConversionState::Rejected);
    assert_eq!(document.text(), original);
}

#[test]
fn test_bulk_mixed_approaches_rejected() {
    let file = parse_body("Mockito.when(mock.call()).thenReturn(1);\nMockito.verify(mock).call();");
    let result = rewrite(&file, whole_file(&file), DO_X);
    assert!(matches!(rejection(result), Rejection::MixedApproaches { .. }));
}

#[test]
fn test_bulk_mixed_in_order_rejected() {
    let file = parse_body(
        "InOrder io = Mockito.inOrder(mock);\nBDDMockito.then(mock).should(io).call();\nBDDMockito.then(other).should().call();",
    );
    let result = rewrite(&file, whole_file(&file), verification(VerificationTarget::InOrderVerify));
    assert_eq!(rejection(result), Rejection::MixedInOrder);
}

#[test]
fn test_empty_range_rejected() {
    let file = parse_body("int x = 1;");
    let result = rewrite(&file, whole_file(&file), DO_X);
    assert_eq!(rejection(result), Rejection::EmptySelection);
}

// ─── Policy ──────────────────────────────────────────────────────────

#[test]
fn test_policy_filters_targets() {
    let file = parse_body("Mockito.when(mock.call()).thenReturn(1);");
    let targets = |policy| ChainRewriter::new(&file, policy).available_targets(first_statement());
    assert_eq!(targets(ConventionPolicy::none()), vec![DO_X, GIVEN, WILL_X]);
    assert_eq!(targets(ConventionPolicy::enforcing(Convention::Mockito)), vec![DO_X]);
    assert_eq!(targets(ConventionPolicy::enforcing(Convention::BddMockito)), vec![GIVEN, WILL_X]);
}

#[test]
fn test_verification_targets_in_menu_order() {
    let file = parse_body("Mockito.verify(mock).call();");
    let targets = ChainRewriter::new(&file, ConventionPolicy::none()).available_targets(first_statement());
    assert_eq!(
        targets,
        vec![
            verification(VerificationTarget::InOrderVerify),
            verification(VerificationTarget::BddThenShould),
            verification(VerificationTarget::BddThenShouldInOrder),
        ]
    );
}

#[test]
fn test_disallowed_target_rejected() {
    let file = parse_body("Mockito.when(mock.call()).thenReturn(1);");
    let err = ChainRewriter::new(&file, ConventionPolicy::enforcing(Convention::Mockito))
        .plan(first_statement(), GIVEN)
        .unwrap_err();
    assert!(matches!(err, ChainError::Unavailable(Rejection::TargetNotAllowed { .. })));
}

// ─── Merge and throw arguments ───────────────────────────────────────

fn merged(body: &str, conversion: Option<TypeConversion>) -> Result<String, ChainError> {
    let file = parse_body(body);
    let plan = ChainRewriter::new(&file, ConventionPolicy::none()).plan_merge(first_statement(), conversion)?;
    plan.preview(file.source())
}

#[test]
fn test_merge_class_throw_run() {
    let out = merged("Mockito.when(mock.call()).thenThrow(A.class).thenThrow(B.class);", None).unwrap();
    assert!(out.contains("Mockito.when(mock.call()).thenThrow(A.class, B.class);"), "{out}");
}

#[test]
fn test_merge_mixed_run_with_chosen_conversion() {
    let body = "Mockito.when(mock.call()).thenThrow(A.class).thenThrow(new B());";
    let to_classes = merged(body, Some(TypeConversion::ToClasses)).unwrap();
    assert!(to_classes.contains("thenThrow(A.class, B.class);"), "{to_classes}");
    let to_throwables = merged(body, Some(TypeConversion::ToThrowables)).unwrap();
    assert!(to_throwables.contains("thenThrow(new A(), new B());"), "{to_throwables}");
}

#[test]
fn test_merge_prefers_throwables_with_constructor_arguments() {
    let out = merged(
        "Mockito.when(mock.call()).thenThrow(A.class).thenThrow(new B(\"x\"));",
        Some(TypeConversion::ToClasses),
    )
    .unwrap();
    assert!(out.contains("thenThrow(new A(), new B(\"x\"));"), "{out}");
}

#[test]
fn test_merge_return_run_in_stubber_dialect() {
    let out = merged("Mockito.doReturn(1).doReturn(2).when(mock).call();", None).unwrap();
    assert!(out.contains("Mockito.doReturn(1, 2).when(mock).call();"), "{out}");
}

#[test]
fn test_merge_is_idempotent() {
    let once = merged("BDDMockito.given(mock.call()).willReturn(1).willReturn(2).willReturn(3);", None).unwrap();
    assert!(once.contains("willReturn(1, 2, 3);"), "{once}");
    let file = JavaFile::parse(once).unwrap();
    let err = ChainRewriter::new(&file, ConventionPolicy::none())
        .plan_merge(first_statement(), None)
        .unwrap_err();
    assert!(matches!(err, ChainError::Unavailable(Rejection::NothingToMerge)));
}

#[test]
fn test_merge_runs_stubbed_through_mocked_static() {
    let file = parse_body(
        "MockedStatic<Util> util = Mockito.mockStatic(Util.class);\n\
         util.when(() -> Util.load()).thenThrow(A.class).thenThrow(B.class).thenReturn(1).thenReturn(2);",
    );
    let rewriter = ChainRewriter::new(&file, ConventionPolicy::none());
    let caret = Selection::Caret(offset_of(file.source(), "util.when"));
    let out = rewriter.plan_merge(caret, None).unwrap().preview(file.source()).unwrap();
    assert!(out.contains("util.when(() -> Util.load()).thenThrow(A.class, B.class).thenReturn(1, 2);"), "{out}");

    let inside_lambda = Selection::Caret(offset_of(file.source(), "Util.load"));
    assert_eq!(rewriter.plan_merge(inside_lambda, None).unwrap().edits.len(), 2);
    assert_eq!(rewriter.select(caret).unwrap_err(), Rejection::NotClassified);
}

#[test]
fn test_mocked_static_without_runs_has_nothing_to_merge() {
    let file = parse_body(
        "MockedStatic<Util> util = Mockito.mockStatic(Util.class);\n\
         util.when(Util::load).thenReturn(1);",
    );
    let caret = Selection::Caret(offset_of(file.source(), "util.when"));
    let err = ChainRewriter::new(&file, ConventionPolicy::none()).plan_merge(caret, None).unwrap_err();
    assert!(matches!(err, ChainError::Unavailable(Rejection::NothingToMerge)));
}

#[test]
fn test_throw_arguments_to_instances() {
    let file = parse_body("Mockito.when(mock.call()).thenThrow(A.class, B.class);");
    let plan = ChainRewriter::new(&file, ConventionPolicy::none())
        .plan_throw_arguments(first_statement())
        .unwrap();
    assert!(plan.preview(file.source()).unwrap().contains("thenThrow(new A(), new B());"));
}

#[test]
fn test_throw_arguments_to_classes_in_stubber_dialect() {
    let file = parse_body("Mockito.doThrow(new A()).when(mock).call();");
    let plan = ChainRewriter::new(&file, ConventionPolicy::none())
        .plan_throw_arguments(first_statement())
        .unwrap();
    assert!(plan.preview(file.source()).unwrap().contains("Mockito.doThrow(A.class).when(mock).call();"));
}

#[test]
fn test_throw_arguments_with_constructor_arguments_rejected() {
    let file = parse_body("Mockito.when(mock.call()).thenThrow(new A(\"boom\"));");
    let err = ChainRewriter::new(&file, ConventionPolicy::none())
        .plan_throw_arguments(first_statement())
        .unwrap_err();
    assert!(matches!(err, ChainError::Unavailable(Rejection::ArgumentsNotConvertible(_))));
}

// ─── Pipeline ────────────────────────────────────────────────────────

#[test]
fn test_convert_rewrites_document() {
    let mut document = Document::new(crate::test_support::java_test("Mockito.verify(mock).call();"));
    let report = convert(
        &mut document,
        first_statement(),
        verification(VerificationTarget::BddThenShould),
        ConventionPolicy::none(),
        "inOrder",
    )
    .unwrap();
    assert!(report.is_rewritten());
    assert_eq!(report.source, Some("mockito-verify"));
    assert_eq!(report.chains, 1);
    assert!(document.text().contains("BDDMockito.then(mock).should().call();"));
}

#[test]
fn test_convert_reports_rejection_without_touching_document() {
    let mut document = Document::new(crate::test_support::java_test("mock.call();"));
    let before = document.text().to_string();
    let report = convert(&mut document, first_statement(), DO_X, ConventionPolicy::none(), "inOrder").unwrap();
    assert_eq!(report.state, ConversionState::Rejected);
    assert!(report.reason.is_some());
    assert_eq!(document.text(), before);
}

#[test]
fn test_plan_against_changed_document_is_stale() {
    let mut document = Document::new(crate::test_support::java_test("Mockito.when(mock.call()).thenReturn(1);"));
    let file = JavaFile::parse(document.text().to_string()).unwrap();
    let plan = ChainRewriter::new(&file, ConventionPolicy::none()).plan(first_statement(), DO_X).unwrap();
    document = Document::new(format!("{}// edited\n", document.text()));
    let before = document.text().to_string();
    assert!(matches!(document.apply(&plan), Err(ChainError::StaleDocument { .. })));
    assert_eq!(document.text(), before);
}

#[test]
fn test_target_parsing() {
    assert_eq!("mockito-do-x".parse::<Target>().unwrap(), DO_X);
    assert_eq!(
        "InOrder-Verify".parse::<Target>().unwrap(),
        verification(VerificationTarget::InOrderVerify)
    );
    assert!("nonsense".parse::<Target>().is_err());
    assert_eq!(DO_X.to_string(), "mockito-do-x");
}
