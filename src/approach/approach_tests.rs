use super::*;
use crate::java::JavaFile;
use crate::test_support::{chain_at, last_chain, parse_body};

fn kind_of(body: &str) -> Option<&'static str> {
    let (_, chain) = last_chain(body);
    classify(&chain).map(|c| c.kind_str())
}

// ─── Classification ──────────────────────────────────────────────────

#[test]
fn test_classify_stubbing_dialects() {
    assert_eq!(kind_of("Mockito.when(mock.call()).thenReturn(1);"), Some("mockito-when"));
    assert_eq!(kind_of("Mockito.doReturn(1).when(mock).call();"), Some("mockito-do-x"));
    assert_eq!(kind_of("BDDMockito.given(mock.call()).willReturn(1);"), Some("bddmockito-given"));
    assert_eq!(kind_of("BDDMockito.willReturn(1).given(mock).call();"), Some("bddmockito-will-x"));
}

#[test]
fn test_classify_verification_dialects() {
    assert_eq!(kind_of("Mockito.verify(mock).call();"), Some("mockito-verify"));
    assert_eq!(kind_of("BDDMockito.then(mock).should().call();"), Some("bddmockito-then-should"));
    assert_eq!(
        kind_of("InOrder inOrder = Mockito.inOrder(mock);\ninOrder.verify(mock).call();"),
        Some("inorder-verify")
    );
    assert_eq!(
        kind_of(
            "InOrder inOrder = Mockito.inOrder(Util.class);\n\
             MockedStatic<Util> util = Mockito.mockStatic(Util.class);\n\
             inOrder.verify(util, () -> Util.load());"
        ),
        Some("inorder-verify-mocked-static")
    );
    assert_eq!(
        kind_of("MockedStatic<Util> util = Mockito.mockStatic(Util.class);\nutil.verify(Util::load, Mockito.times(2));"),
        Some("mocked-static-verify")
    );
}

#[test]
fn test_mocked_static_stubbing_is_recognized_but_not_classified() {
    let (_, chain) = last_chain("MockedStatic<Util> util = Mockito.mockStatic(Util.class);\nutil.when(() -> Util.load()).thenReturn(1);");
    assert!(is_mocked_static_stubbing(&chain));
    assert!(classify(&chain).is_none());

    let (_, chain) = last_chain("MockedStatic<Util> util = Mockito.mockStatic(Util.class);\nutil.when(value).thenReturn(1);");
    assert!(!is_mocked_static_stubbing(&chain));
    let (_, chain) = last_chain("Mockito.when(mock.call()).thenReturn(1);");
    assert!(!is_mocked_static_stubbing(&chain));
}

#[test]
fn test_classify_rejects_unrelated_chains() {
    assert_eq!(kind_of("mock.call().other();"), None);
    assert_eq!(kind_of("builder.when(x).thenReturn(1);"), None);
    // wrong arity
    assert_eq!(kind_of("Mockito.verify(mock, Mockito.times(1), extra).call();"), None);
    // when() argument must be a call
    assert_eq!(kind_of("Mockito.when(value).thenReturn(1);"), None);
}

#[test]
fn test_classify_requires_import() {
    let source = "class T {\n    void t() {\n        Mockito.when(mock.call()).thenReturn(1);\n    }\n}\n";
    let file = JavaFile::parse(source).unwrap();
    let chain = chain_at(&file, "Mockito.when");
    assert!(classify(&chain).is_none());
}

#[test]
fn test_classify_static_imports() {
    let source = "import static org.mockito.BDDMockito.*;\n\nclass T {\n    void t() {\n\
                  when(mock.call()).thenReturn(1);\n\
                  willThrow(IllegalStateException.class).given(mock).call();\n\
                  then(mock).should().call();\n    }\n}\n";
    let file = JavaFile::parse(source).unwrap();
    let kind = |needle: &str| classify(&chain_at(&file, needle)).map(|c| c.kind_str());
    assert_eq!(kind("when(mock"), Some("mockito-when"));
    assert_eq!(kind("willThrow"), Some("bddmockito-will-x"));
    assert_eq!(kind("then(mock)"), Some("bddmockito-then-should"));
}

#[test]
fn test_classification_is_exclusive() {
    let bodies = [
        "Mockito.when(mock.call()).thenReturn(1);",
        "Mockito.doReturn(1).when(mock).call();",
        "BDDMockito.given(mock.call()).willReturn(1);",
        "BDDMockito.willReturn(1).given(mock).call();",
        "Mockito.verify(mock).call();",
        "BDDMockito.then(mock).should(Mockito.times(2)).call();",
        "InOrder inOrder = Mockito.inOrder(mock);\ninOrder.verify(mock, Mockito.never()).call();",
        "InOrder inOrder = Mockito.inOrder(mock);\ninOrder.verify(util, () -> Util.load(), Mockito.times(1));",
        "MockedStatic<Util> util = Mockito.mockStatic(Util.class);\nutil.verify(Util::load);",
    ];
    for body in bodies {
        let (_, chain) = last_chain(body);
        assert_eq!(matching_approaches(&chain).len(), 1, "{body}");
    }
}

// ─── Validity ────────────────────────────────────────────────────────

#[test]
fn test_validity() {
    let valid = |body: &str| {
        let (_, chain) = last_chain(body);
        classify(&chain).map(|c| c.is_valid(&chain))
    };
    assert_eq!(valid("Mockito.when(mock.call()).thenReturn(1);"), Some(true));
    assert_eq!(valid("Mockito.when(mock.call());"), Some(false));
    assert_eq!(valid("Mockito.doReturn(1).when(mock).call();"), Some(true));
    assert_eq!(valid("Mockito.doReturn(1).when(mock);"), Some(false));
    assert_eq!(valid("Mockito.doReturn(1).when(mocks.get(0)).call();"), Some(false));
    assert_eq!(valid("BDDMockito.then(mock).should().call();"), Some(true));
    assert_eq!(valid("BDDMockito.then(mock).should();"), Some(false));
    assert_eq!(valid("Mockito.verify(mock).call();"), Some(true));
    assert_eq!(valid("Mockito.verify(mock, Mockito.never());"), Some(false));
    assert_eq!(valid("InOrder io = Mockito.inOrder(mock);\nio.verify(mock).call();"), Some(true));
    assert_eq!(valid("InOrder io = Mockito.inOrder(mock);\nio.verify(mock);"), Some(false));
}

// ─── Accessors ───────────────────────────────────────────────────────

#[test]
fn test_stubbed_call_and_mock() {
    let (_, chain) = last_chain("Mockito.when(mock.call(1)).thenReturn(1);");
    assert_eq!(MOCKITO_WHEN.stubbed_call(&chain).unwrap().name, "call");
    assert_eq!(MOCKITO_WHEN.stubbed_mock(&chain), Some("mock"));
    assert_eq!(MOCKITO_WHEN.setter_range(&chain), 1..2);

    let (_, chain) = last_chain("Mockito.doReturn(1).doThrow(new RuntimeException()).when(this.mock).call(1);");
    assert_eq!(MOCKITO_DO_X.stubbed_call(&chain).unwrap().name, "call");
    assert_eq!(MOCKITO_DO_X.stubbed_mock(&chain), Some("this.mock"));
    assert_eq!(MOCKITO_DO_X.setter_range(&chain), 0..2);
    assert!(MOCKITO_DO_X.is_any_of_stubs(&chain[0]));
    assert!(MOCKITO_DO_X.is_any_of_stubs(&chain[1]));
    assert!(MOCKITO_DO_X.is_stubbed_by(&chain[2]));
}

#[test]
fn test_setter_tables() {
    assert_eq!(MOCKITO_WHEN.setter_of("then"), Some(Setter::AnswerAlias));
    assert_eq!(MOCKITO_WHEN.setter_name(Setter::Nothing), None);
    assert_eq!(MOCKITO_DO_X.setter_name(Setter::AnswerAlias), None);
    assert_eq!(MOCKITO_DO_X.setter_of("doNothing"), Some(Setter::Nothing));
    assert_eq!(BDDMOCKITO_WILL_X.setter_name(Setter::Nothing), Some("willDoNothing"));
    assert_eq!(BDDMOCKITO_GIVEN.setter_name(Setter::Nothing), None);
    assert_eq!(BDDMOCKITO_GIVEN.stub_type(), StubType::Stubbing);
    assert_eq!(BDDMOCKITO_WILL_X.stub_type(), StubType::Stubber);
}

#[test]
fn test_verified_call_per_dialect() {
    let (_, chain) = last_chain("Mockito.verify(mock, Mockito.times(2)).call();");
    assert_eq!(MOCKITO_VERIFY.verified_call(&chain).unwrap().name, "call");
    assert_eq!(MOCKITO_VERIFY.verified_mock(&chain).unwrap().text, "mock");

    let (_, chain) = last_chain("BDDMockito.then(mock).should().call();");
    assert_eq!(BDDMOCKITO_THEN_SHOULD.verified_call(&chain).unwrap().name, "call");

    let (_, chain) = last_chain("MockedStatic<Util> util = Mockito.mockStatic(Util.class);\nutil.verify(Util::load);");
    assert!(MOCKED_STATIC_VERIFY.verified_call(&chain).is_none());
}

#[test]
fn test_bdd_in_order_specific() {
    let (_, plain) = last_chain("BDDMockito.then(mock).should(Mockito.times(2)).call();");
    assert!(!BDDMOCKITO_THEN_SHOULD.is_in_order_specific(&plain));

    let (_, ordered) = last_chain("InOrder io = Mockito.inOrder(mock);\nBDDMockito.then(mock).should(io).call();");
    assert!(BDDMOCKITO_THEN_SHOULD.is_in_order_specific(&ordered));
    let parts = BDDMOCKITO_THEN_SHOULD.parts(&ordered).unwrap();
    assert_eq!(parts.in_order.as_deref(), Some("io"));
    assert_eq!(parts.mode, None);
    assert_eq!(parts.head_len, 2);
}

#[test]
fn test_mocked_static_parts() {
    let (_, chain) = last_chain(
        "InOrder inOrder = Mockito.inOrder(Util.class);\n\
         MockedStatic<Util> util = Mockito.mockStatic(Util.class);\n\
         inOrder.verify(util, Util::load, Mockito.times(2));",
    );
    let parts = INORDER_VERIFY_MOCKED_STATIC.parts(&chain).unwrap();
    assert_eq!(parts.in_order.as_deref(), Some("inOrder"));
    assert_eq!(parts.mocked_static.as_deref(), Some("util"));
    assert_eq!(parts.verification.as_deref(), Some("Util::load"));
    assert_eq!(parts.mode.as_deref(), Some("Mockito.times(2)"));
}

// ─── Runs ────────────────────────────────────────────────────────────

#[test]
fn test_throw_runs_and_combination() {
    let (_, chain) = last_chain(
        "Mockito.when(mock.call()).thenThrow(IOException.class).thenThrow(new IllegalStateException()).thenReturn(1).thenThrow(A.class);",
    );
    let runs = throw_runs(&chain, &MOCKITO_WHEN);
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].indices, vec![1, 2]);
    assert_eq!(runs[0].mergeable(), &[2]);
    assert_eq!(runs[0].combination, Some(ParamCombination::Mixed));
    assert_eq!(runs[0].conversions(), &[TypeConversion::ToClasses, TypeConversion::ToThrowables]);
}

#[test]
fn test_throw_run_prefers_throwables_with_constructor_args() {
    let (_, chain) = last_chain(
        "Mockito.doThrow(IOException.class).doThrow(new IllegalStateException(\"boom\")).when(mock).call();",
    );
    let runs = throw_runs(&chain, &MOCKITO_DO_X);
    assert_eq!(runs[0].indices, vec![0, 1]);
    assert_eq!(runs[0].combination, Some(ParamCombination::MixedWithThrowablesPreferred));
    assert_eq!(runs[0].conversions(), &[TypeConversion::ToThrowables]);
}

#[test]
fn test_throw_runs_ignore_empty_argument_calls() {
    let (_, chain) = last_chain("BDDMockito.given(mock.call()).willThrow(A.class).willThrow();");
    assert!(throw_runs(&chain, &BDDMOCKITO_GIVEN).is_empty());
}

#[test]
fn test_return_runs() {
    let (_, chain) = last_chain("BDDMockito.willReturn(1).willReturn(2).willReturn(3).given(mock).call();");
    let runs = return_runs(&chain, &BDDMOCKITO_WILL_X);
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].indices, vec![0, 1, 2]);
    assert_eq!(mergeable_calls(&chain, &BDDMOCKITO_WILL_X), vec![1, 2]);
}

#[test]
fn test_throw_argument_conversion() {
    let file = parse_body(
        "Mockito.when(mock.a()).thenThrow(A.class, B.class);\n\
         Mockito.when(mock.b()).thenThrow(new A(), new B());\n\
         Mockito.when(mock.c()).thenThrow(new A(\"x\"));\n\
         Mockito.when(mock.d()).thenThrow(exception);",
    );
    let conversion = |needle: &str| {
        let chain = chain_at(&file, needle);
        throw_argument_conversion(&chain[1], &MOCKITO_WHEN)
    };
    assert_eq!(conversion("Mockito.when(mock.a"), Some(TypeConversion::ToThrowables));
    assert_eq!(conversion("Mockito.when(mock.b"), Some(TypeConversion::ToClasses));
    assert_eq!(conversion("Mockito.when(mock.c"), None);
    assert_eq!(conversion("Mockito.when(mock.d"), None);
}
