//! Single-file name resolution: imports, declarations and the Mockito return-type table.
//!
//! There is no classpath. A name resolves to a Mockito class only through the file's
//! own imports or its fully qualified spelling, and an expression has a known type only
//! when it is a declared variable or a call on the fixed Mockito API surface.

use serde::Serialize;
use tree_sitter::Node;

use super::{JavaFile, Span, code_children, is_call, node_text};

// ─── Mockito API surface ─────────────────────────────────────────────

/// The two static entry classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MockitoClass {
    Mockito,
    #[serde(rename = "BDDMockito")]
    BddMockito,
}

impl MockitoClass {
    pub fn simple_name(&self) -> &'static str {
        match self {
            MockitoClass::Mockito => "Mockito",
            MockitoClass::BddMockito => "BDDMockito",
        }
    }

    pub fn fqn(&self) -> &'static str {
        match self {
            MockitoClass::Mockito => "org.mockito.Mockito",
            MockitoClass::BddMockito => "org.mockito.BDDMockito",
        }
    }

    /// Whether `member`, declared on `declaring`, is callable through this class.
    /// `BDDMockito extends Mockito`, so it sees every Mockito static.
    pub fn sees(&self, declaring: MockitoClass) -> bool {
        *self == declaring || (*self == MockitoClass::BddMockito && declaring == MockitoClass::Mockito)
    }
}

impl std::fmt::Display for MockitoClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.simple_name())
    }
}

const BDD_STATICS: &[&str] = &[
    "given",
    "then",
    "will",
    "willReturn",
    "willThrow",
    "willAnswer",
    "willCallRealMethod",
    "willDoNothing",
];

/// Class declaring the static method `name`. Everything not BDD-specific is taken
/// to live on `Mockito` (or its `ArgumentMatchers` superclass).
pub fn declaring_class(name: &str) -> MockitoClass {
    if BDD_STATICS.contains(&name) {
        MockitoClass::BddMockito
    } else {
        MockitoClass::Mockito
    }
}

/// Mockito types whose methods take part in stubbing and verification chains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MockitoType {
    OngoingStubbing,
    #[serde(rename = "BDDMyOngoingStubbing")]
    BddOngoingStubbing,
    Stubber,
    #[serde(rename = "BDDStubber")]
    BddStubber,
    Then,
    InOrder,
    MockedStatic,
    VerificationMode,
    MockSettings,
}

impl MockitoType {
    pub fn simple_name(&self) -> &'static str {
        match self {
            MockitoType::OngoingStubbing => "OngoingStubbing",
            MockitoType::BddOngoingStubbing => "BDDMyOngoingStubbing",
            MockitoType::Stubber => "Stubber",
            MockitoType::BddStubber => "BDDStubber",
            MockitoType::Then => "Then",
            MockitoType::InOrder => "InOrder",
            MockitoType::MockedStatic => "MockedStatic",
            MockitoType::VerificationMode => "VerificationMode",
            MockitoType::MockSettings => "MockSettings",
        }
    }
}

impl std::fmt::Display for MockitoType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.simple_name())
    }
}

/// Types a variable can be declared with, and where they live.
const DECLARABLE_TYPES: &[(&str, MockitoType)] = &[
    ("org.mockito.InOrder", MockitoType::InOrder),
    ("org.mockito.MockedStatic", MockitoType::MockedStatic),
    ("org.mockito.verification.VerificationMode", MockitoType::VerificationMode),
    ("org.mockito.MockSettings", MockitoType::MockSettings),
];

const VERIFICATION_MODES: &[&str] =
    &["times", "never", "atLeast", "atLeastOnce", "atMost", "only", "calls", "timeout", "after"];

const SETTINGS_BUILDERS: &[&str] = &[
    "name",
    "lenient",
    "strictness",
    "mockMaker",
    "defaultAnswer",
    "serializable",
    "stubOnly",
    "extraInterfaces",
    "spiedInstance",
    "verboseLogging",
    "invocationListeners",
    "useConstructor",
    "outerInstance",
    "withoutAnnotations",
];

/// Return type of a static call, as far as chains care.
pub fn static_return_type(class: MockitoClass, name: &str) -> Option<MockitoType> {
    match (class, name) {
        (MockitoClass::Mockito, "when") => Some(MockitoType::OngoingStubbing),
        (
            MockitoClass::Mockito,
            "doReturn" | "doThrow" | "doAnswer" | "doCallRealMethod" | "doNothing",
        ) => Some(MockitoType::Stubber),
        (MockitoClass::Mockito, "inOrder") => Some(MockitoType::InOrder),
        (MockitoClass::Mockito, "mockStatic") => Some(MockitoType::MockedStatic),
        (MockitoClass::Mockito, "withSettings") => Some(MockitoType::MockSettings),
        (MockitoClass::Mockito, mode) if VERIFICATION_MODES.contains(&mode) => {
            Some(MockitoType::VerificationMode)
        }
        (MockitoClass::BddMockito, "given") => Some(MockitoType::BddOngoingStubbing),
        (MockitoClass::BddMockito, "then") => Some(MockitoType::Then),
        (MockitoClass::BddMockito, will) if will.starts_with("will") => Some(MockitoType::BddStubber),
        _ => None,
    }
}

/// Return type of an instance call on a known Mockito type.
pub fn instance_return_type(receiver: MockitoType, name: &str) -> Option<MockitoType> {
    match (receiver, name) {
        (
            MockitoType::OngoingStubbing,
            "then" | "thenReturn" | "thenThrow" | "thenAnswer" | "thenCallRealMethod",
        ) => Some(MockitoType::OngoingStubbing),
        (
            MockitoType::BddOngoingStubbing,
            "will" | "willReturn" | "willThrow" | "willAnswer" | "willCallRealMethod",
        ) => Some(MockitoType::BddOngoingStubbing),
        (MockitoType::Stubber, name) if name.starts_with("do") => Some(MockitoType::Stubber),
        (MockitoType::BddStubber, name) if name.starts_with("will") => Some(MockitoType::BddStubber),
        (MockitoType::MockSettings, name) if SETTINGS_BUILDERS.contains(&name) => {
            Some(MockitoType::MockSettings)
        }
        (MockitoType::VerificationMode, "description") => Some(MockitoType::VerificationMode),
        (MockitoType::MockedStatic, "when") => Some(MockitoType::OngoingStubbing),
        _ => None,
    }
}

// ─── Receiver ────────────────────────────────────────────────────────

/// What a call is invoked on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Receiver {
    /// Static method, resolved to its declaring class
    Static(MockitoClass),
    /// Instance method on a value of a known Mockito type
    Instance(MockitoType),
    Unknown,
}

impl Receiver {
    pub fn is_static(&self, class: MockitoClass) -> bool {
        *self == Receiver::Static(class)
    }

    pub fn is_instance(&self, ty: MockitoType) -> bool {
        *self == Receiver::Instance(ty)
    }
}

// ─── Imports ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Imports {
    /// `import a.b.C;`
    pub single: Vec<String>,
    /// `import a.b.*;` (package part only)
    pub on_demand: Vec<String>,
    /// `import static a.b.C.m;` as (class, member)
    pub static_single: Vec<(String, String)>,
    /// `import static a.b.C.*;` (class part only)
    pub static_on_demand: Vec<String>,
    /// End of the last import declaration
    pub last_import_end: Option<usize>,
    /// End of the package declaration
    pub package_end: Option<usize>,
}

impl Imports {
    pub fn collect(root: Node, source: &[u8]) -> Imports {
        let mut imports = Imports::default();
        for child in code_children(root) {
            match child.kind() {
                "package_declaration" => imports.package_end = Some(child.end_byte()),
                "import_declaration" => {
                    imports.add_declaration(node_text(child, source));
                    imports.last_import_end = Some(child.end_byte());
                }
                _ => {}
            }
        }
        imports
    }

    fn add_declaration(&mut self, text: &str) {
        let body = text.trim().trim_start_matches("import").trim_end_matches(';');
        let body = body.trim();
        let (is_static, path) = match body.strip_prefix("static") {
            Some(rest) if rest.starts_with(char::is_whitespace) => (true, rest),
            _ => (false, body),
        };
        let path: String = path.chars().filter(|c| !c.is_whitespace()).collect();
        match (is_static, path.strip_suffix(".*")) {
            (false, Some(package)) => self.on_demand.push(package.to_string()),
            (false, None) => self.single.push(path),
            (true, Some(class)) => self.static_on_demand.push(class.to_string()),
            (true, None) => {
                if let Some((class, member)) = path.rsplit_once('.') {
                    self.static_single.push((class.to_string(), member.to_string()));
                }
            }
        }
    }

    /// Whether `text` names the type `fqn` in this file.
    pub fn resolves_type(&self, text: &str, fqn: &str) -> bool {
        if text == fqn {
            return true;
        }
        let (package, simple) = fqn.rsplit_once('.').unwrap_or(("", fqn));
        text == simple
            && (self.single.iter().any(|s| s == fqn) || self.on_demand.iter().any(|p| p == package))
    }

    /// Whether `fqn` can be referred to by its simple name without adding an import.
    pub fn is_importable(&self, fqn: &str) -> bool {
        let simple = fqn.rsplit('.').next().unwrap_or(fqn);
        self.resolves_type(simple, fqn)
    }

    /// The Mockito class spelled by a qualifier, if any.
    pub fn class_named(&self, text: &str) -> Option<MockitoClass> {
        [MockitoClass::Mockito, MockitoClass::BddMockito]
            .into_iter()
            .find(|class| self.resolves_type(text, class.fqn()))
    }

    /// Declaring class of an unqualified call, via static imports.
    pub fn static_member(&self, name: &str) -> Option<MockitoClass> {
        let declaring = declaring_class(name);
        let visible = |class_fqn: &str| {
            [MockitoClass::Mockito, MockitoClass::BddMockito]
                .into_iter()
                .any(|class| class.fqn() == class_fqn && class.sees(declaring))
        };
        let single = self
            .static_single
            .iter()
            .any(|(class, member)| member == name && visible(class));
        let on_demand = self.static_on_demand.iter().any(|class| visible(class));
        (single || on_demand).then_some(declaring)
    }
}

// ─── Symbol table ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SymbolKind {
    Local,
    Field,
    Parameter,
    Resource,
}

/// One declared variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    /// Type as written, generics included
    pub declared_type: String,
    pub ty: Option<MockitoType>,
    /// `X.class` text of a `Mockito.mockStatic(X.class)` initializer
    pub mocked_class: Option<String>,
    /// Declarator value expression
    pub initializer: Option<Span>,
    /// Region in which the name is visible
    pub scope: Span,
    pub declared_at: usize,
}

#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
}

impl SymbolTable {
    pub fn collect(root: Node, source: &[u8], imports: &Imports) -> SymbolTable {
        let mut table = SymbolTable::default();
        table.walk(root, source, imports);
        table
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Symbol> {
        self.symbols.iter()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Declaration of `name` visible at byte offset `at`, innermost scope first.
    pub fn lookup(&self, name: &str, at: usize) -> Option<&Symbol> {
        self.symbols
            .iter()
            .filter(|s| s.name == name && s.scope.start <= at && at <= s.scope.end)
            .filter(|s| s.kind == SymbolKind::Field || s.declared_at <= at)
            .min_by_key(|s| s.scope.len())
    }

    fn walk(&mut self, node: Node, source: &[u8], imports: &Imports) {
        match node.kind() {
            "local_variable_declaration" | "field_declaration" => {
                let kind = if node.kind() == "field_declaration" {
                    SymbolKind::Field
                } else {
                    SymbolKind::Local
                };
                let scope = node.parent().map(Span::of).unwrap_or_else(|| Span::of(node));
                let declared_type = node
                    .child_by_field_name("type")
                    .map(|t| node_text(t, source))
                    .unwrap_or("");
                let mut cursor = node.walk();
                for declarator in node.children_by_field_name("declarator", &mut cursor) {
                    self.declare(declarator, declared_type, kind, scope, source, imports);
                }
            }
            "formal_parameter" => {
                // formal_parameter → formal_parameters → method/constructor/lambda
                let scope = node
                    .parent()
                    .and_then(|params| params.parent())
                    .map(Span::of)
                    .unwrap_or_else(|| Span::of(node));
                let declared_type = node
                    .child_by_field_name("type")
                    .map(|t| node_text(t, source))
                    .unwrap_or("");
                self.declare(node, declared_type, SymbolKind::Parameter, scope, source, imports);
            }
            "resource" => {
                let scope = node
                    .parent()
                    .and_then(|spec| spec.parent())
                    .map(Span::of)
                    .unwrap_or_else(|| Span::of(node));
                if let Some(declared_type) = node.child_by_field_name("type") {
                    let declared_type = node_text(declared_type, source);
                    self.declare(node, declared_type, SymbolKind::Resource, scope, source, imports);
                }
            }
            _ => {}
        }
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.walk(child, source, imports);
        }
    }

    /// `holder` carries `name` and optional `value` fields.
    fn declare(
        &mut self,
        holder: Node,
        declared_type: &str,
        kind: SymbolKind,
        scope: Span,
        source: &[u8],
        imports: &Imports,
    ) {
        let Some(name) = holder.child_by_field_name("name") else {
            return;
        };
        let value = holder.child_by_field_name("value");
        let ty = declared_mockito_type(declared_type, imports).or_else(|| {
            (declared_type == "var")
                .then(|| value.and_then(|v| expression_type_with(v, source, imports, None)))
                .flatten()
        });
        let mocked_class = value.and_then(|v| mocked_static_class(v, source, imports));
        self.symbols.push(Symbol {
            name: node_text(name, source).to_string(),
            kind,
            declared_type: declared_type.to_string(),
            ty,
            mocked_class,
            initializer: value.map(Span::of),
            scope,
            declared_at: name.start_byte(),
        });
    }
}

fn declared_mockito_type(declared_type: &str, imports: &Imports) -> Option<MockitoType> {
    let base = declared_type.split('<').next().unwrap_or("").trim();
    DECLARABLE_TYPES
        .iter()
        .find(|(fqn, _)| imports.resolves_type(base, fqn))
        .map(|(_, ty)| *ty)
}

/// `Foo.class` from `Mockito.mockStatic(Foo.class, ...)`.
fn mocked_static_class(value: Node, source: &[u8], imports: &Imports) -> Option<String> {
    if !is_call(value) {
        return None;
    }
    let name = value.child_by_field_name("name").map(|n| node_text(n, source))?;
    if name != "mockStatic" || !receiver_with(value, source, imports, None).is_static(MockitoClass::Mockito) {
        return None;
    }
    let args = value.child_by_field_name("arguments")?;
    let first = code_children(args).into_iter().next()?;
    (first.kind() == "class_literal").then(|| node_text(first, source).to_string())
}

// ─── Expression typing ───────────────────────────────────────────────

fn receiver_with(call: Node, source: &[u8], imports: &Imports, symbols: Option<&SymbolTable>) -> Receiver {
    let Some(name) = call.child_by_field_name("name").map(|n| node_text(n, source)) else {
        return Receiver::Unknown;
    };
    let Some(object) = call.child_by_field_name("object") else {
        return imports
            .static_member(name)
            .map(Receiver::Static)
            .unwrap_or(Receiver::Unknown);
    };
    if matches!(object.kind(), "identifier" | "field_access" | "scoped_identifier") {
        if let Some(class) = imports.class_named(node_text(object, source)) {
            let declaring = declaring_class(name);
            return if class.sees(declaring) {
                Receiver::Static(declaring)
            } else {
                Receiver::Unknown
            };
        }
    }
    expression_type_with(object, source, imports, symbols)
        .map(Receiver::Instance)
        .unwrap_or(Receiver::Unknown)
}

fn expression_type_with(
    node: Node,
    source: &[u8],
    imports: &Imports,
    symbols: Option<&SymbolTable>,
) -> Option<MockitoType> {
    match node.kind() {
        "method_invocation" => {
            let name = node.child_by_field_name("name").map(|n| node_text(n, source))?;
            match receiver_with(node, source, imports, symbols) {
                Receiver::Static(class) => static_return_type(class, name),
                Receiver::Instance(ty) => instance_return_type(ty, name),
                Receiver::Unknown => None,
            }
        }
        "identifier" => symbols?
            .lookup(node_text(node, source), node.start_byte())
            .and_then(|s| s.ty),
        "field_access" => {
            let object = node.child_by_field_name("object")?;
            if object.kind() != "this" {
                return None;
            }
            let field = node.child_by_field_name("field")?;
            symbols?
                .iter()
                .find(|s| s.kind == SymbolKind::Field && s.name == node_text(field, source))
                .and_then(|s| s.ty)
        }
        "parenthesized_expression" => {
            let inner = code_children(node).into_iter().next()?;
            expression_type_with(inner, source, imports, symbols)
        }
        _ => None,
    }
}

impl JavaFile {
    /// Resolved receiver of a `method_invocation`.
    pub fn receiver_of(&self, call: Node) -> Receiver {
        receiver_with(call, self.source.as_bytes(), &self.imports, Some(&self.symbols))
    }

    /// Statically known Mockito type of an expression.
    pub fn expression_type(&self, node: Node) -> Option<MockitoType> {
        expression_type_with(node, self.source.as_bytes(), &self.imports, Some(&self.symbols))
    }

    /// Mocked class literal behind a `MockedStatic` variable reference.
    pub fn mocked_class_of(&self, reference: &str, at: usize) -> Option<&str> {
        let name = reference.strip_prefix("this.").unwrap_or(reference);
        self.symbols.lookup(name, at)?.mocked_class.as_deref()
    }
}
