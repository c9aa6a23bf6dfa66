//! Mock configuration translator: `@Mock` attributes ↔ `Mockito.withSettings()` chains.
//!
//! Attribute values are carried as Java expression text. Unlike stubbing conversions,
//! a single unrecognized option fails the whole translation.

use serde::Serialize;
use tree_sitter::Node;

use crate::ChainError;
use crate::java::{
    Arg, ArgKind, CallChain, CallNode, JavaFile, MockitoClass, MockitoType, code_children, is_call, node_text,
};

const STRICTNESS_FQN: &str = "org.mockito.quality.Strictness";

// ─── Attributes ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Strictness {
    StrictStubs,
    Lenient,
    Warn,
}

impl Strictness {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strictness::StrictStubs => "STRICT_STUBS",
            Strictness::Lenient => "LENIENT",
            Strictness::Warn => "WARN",
        }
    }

    /// `Strictness.LENIENT`, `Mock.Strictness.LENIENT` or a static import of either.
    /// `TEST_LEVEL_DEFAULT` is the absent value.
    fn parse(text: &str) -> Result<Option<Strictness>, ChainError> {
        let constant = text.rsplit('.').next().unwrap_or(text).trim();
        match constant {
            "STRICT_STUBS" => Ok(Some(Strictness::StrictStubs)),
            "LENIENT" => Ok(Some(Strictness::Lenient)),
            "WARN" => Ok(Some(Strictness::Warn)),
            "TEST_LEVEL_DEFAULT" => Ok(None),
            _ => Err(ChainError::UnsupportedSetting(format!("strictness {text}"))),
        }
    }
}

/// Settings of one mock, each at its default unless configured.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MockAttributes {
    pub name: Option<String>,
    pub answer: Option<String>,
    pub extra_interfaces: Vec<String>,
    pub serializable: bool,
    /// `SerializableMode` argument, builder form only
    pub serializable_mode: Option<String>,
    pub stub_only: bool,
    pub lenient: bool,
    pub strictness: Option<Strictness>,
    pub mock_maker: Option<String>,
}

/// One `MockSettings` builder call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "method", content = "args", rename_all = "camelCase")]
pub enum BuilderCall {
    Lenient,
    Name(String),
    Strictness(Strictness),
    MockMaker(String),
    DefaultAnswer(String),
    Serializable(Option<String>),
    StubOnly,
    ExtraInterfaces(Vec<String>),
}

impl BuilderCall {
    pub fn method(&self) -> &'static str {
        match self {
            BuilderCall::Lenient => "lenient",
            BuilderCall::Name(_) => "name",
            BuilderCall::Strictness(_) => "strictness",
            BuilderCall::MockMaker(_) => "mockMaker",
            BuilderCall::DefaultAnswer(_) => "defaultAnswer",
            BuilderCall::Serializable(_) => "serializable",
            BuilderCall::StubOnly => "stubOnly",
            BuilderCall::ExtraInterfaces(_) => "extraInterfaces",
        }
    }

    /// `.name("x")`
    pub fn render(&self) -> String {
        let args = match self {
            BuilderCall::Lenient | BuilderCall::StubOnly | BuilderCall::Serializable(None) => String::new(),
            BuilderCall::Name(v)
            | BuilderCall::MockMaker(v)
            | BuilderCall::DefaultAnswer(v)
            | BuilderCall::Serializable(Some(v)) => v.clone(),
            BuilderCall::Strictness(s) => format!("Strictness.{}", s.as_str()),
            BuilderCall::ExtraInterfaces(types) => types.join(", "),
        };
        format!(".{}({})", self.method(), args)
    }
}

fn is_blank_string(text: &str) -> bool {
    text.replace('"', "").trim().is_empty()
}

fn is_default_answer(text: &str) -> bool {
    text.rsplit('.').next().is_some_and(|c| c.trim() == "RETURNS_DEFAULTS")
}

impl MockAttributes {
    pub fn is_default(&self) -> bool {
        *self == MockAttributes::default()
    }

    /// Builder calls in canonical order; defaults are omitted.
    pub fn to_builder_calls(&self) -> Vec<BuilderCall> {
        let mut calls = Vec::new();
        if self.lenient {
            calls.push(BuilderCall::Lenient);
        }
        if let Some(name) = &self.name {
            calls.push(BuilderCall::Name(name.clone()));
        }
        if let Some(strictness) = self.strictness {
            calls.push(BuilderCall::Strictness(strictness));
        }
        if let Some(maker) = &self.mock_maker {
            calls.push(BuilderCall::MockMaker(maker.clone()));
        }
        if let Some(answer) = &self.answer {
            calls.push(BuilderCall::DefaultAnswer(answer.clone()));
        }
        if self.serializable {
            calls.push(BuilderCall::Serializable(self.serializable_mode.clone()));
        }
        if self.stub_only {
            calls.push(BuilderCall::StubOnly);
        }
        if !self.extra_interfaces.is_empty() {
            calls.push(BuilderCall::ExtraInterfaces(self.extra_interfaces.clone()));
        }
        calls
    }

    pub fn from_builder_calls(calls: &[BuilderCall]) -> MockAttributes {
        let mut attributes = MockAttributes::default();
        for call in calls {
            match call {
                BuilderCall::Lenient => attributes.lenient = true,
                BuilderCall::Name(name) => {
                    attributes.name = (!is_blank_string(name)).then(|| name.clone());
                }
                BuilderCall::Strictness(s) => attributes.strictness = Some(*s),
                BuilderCall::MockMaker(maker) => attributes.mock_maker = Some(maker.clone()),
                BuilderCall::DefaultAnswer(answer) => {
                    attributes.answer = (!is_default_answer(answer)).then(|| answer.clone());
                }
                BuilderCall::Serializable(mode) => {
                    attributes.serializable = true;
                    attributes.serializable_mode = mode.clone();
                }
                BuilderCall::StubOnly => attributes.stub_only = true,
                BuilderCall::ExtraInterfaces(types) => attributes.extra_interfaces = types.clone(),
            }
        }
        attributes
    }

    /// `Mockito.withSettings()` followed by the canonical builder calls.
    pub fn render_settings(&self) -> String {
        let mut out = String::from("Mockito.withSettings()");
        for call in self.to_builder_calls() {
            out.push_str(&call.render());
        }
        out
    }

    /// Types the rendered settings chain and mock call refer to by simple name.
    pub fn required_imports(&self) -> Vec<&'static str> {
        let mut fqns = vec![MockitoClass::Mockito.fqn()];
        if self.strictness.is_some() {
            fqns.push(STRICTNESS_FQN);
        }
        fqns
    }

    /// Creation call for a mock of `type_name`, using the shortest overload.
    pub fn render_mock_call(&self, type_name: &str) -> String {
        let only_name = MockAttributes { name: self.name.clone(), ..MockAttributes::default() };
        let only_answer = MockAttributes { answer: self.answer.clone(), ..MockAttributes::default() };
        let extra = if self.is_default() {
            String::new()
        } else if *self == only_name {
            format!(", {}", self.name.as_deref().unwrap_or_default())
        } else if *self == only_answer {
            format!(", {}", self.answer.as_deref().unwrap_or_default())
        } else {
            format!(", {}", self.render_settings())
        };
        format!("Mockito.mock({type_name}.class{extra})")
    }

    /// `@Mock(...)` with attributes in canonical order.
    pub fn render_annotation(&self) -> Result<String, ChainError> {
        if self.serializable_mode.is_some() {
            return Err(ChainError::UnsupportedSetting("serializable(SerializableMode)".to_string()));
        }
        let mut pairs = Vec::new();
        if self.lenient {
            pairs.push("lenient = true".to_string());
        }
        if let Some(name) = &self.name {
            pairs.push(format!("name = {name}"));
        }
        if let Some(strictness) = self.strictness {
            pairs.push(format!("strictness = Mock.Strictness.{}", strictness.as_str()));
        }
        if let Some(maker) = &self.mock_maker {
            pairs.push(format!("mockMaker = {maker}"));
        }
        if let Some(answer) = &self.answer {
            pairs.push(format!("answer = {answer}"));
        }
        if self.serializable {
            pairs.push("serializable = true".to_string());
        }
        if self.stub_only {
            pairs.push("stubOnly = true".to_string());
        }
        match self.extra_interfaces.as_slice() {
            [] => {}
            [single] => pairs.push(format!("extraInterfaces = {single}")),
            many => pairs.push(format!("extraInterfaces = {{{}}}", many.join(", "))),
        }
        if pairs.is_empty() {
            Ok("@Mock".to_string())
        } else {
            Ok(format!("@Mock({})", pairs.join(", ")))
        }
    }

    // ─── Reading source ──────────────────────────────────────────────

    /// Attributes of an `annotation` or `marker_annotation` node.
    pub fn from_annotation(file: &JavaFile, node: Node) -> Result<MockAttributes, ChainError> {
        let source = file.source().as_bytes();
        let mut attributes = MockAttributes::default();
        if node.kind() == "marker_annotation" {
            return Ok(attributes);
        }
        let Some(arguments) = node.child_by_field_name("arguments") else {
            return Ok(attributes);
        };
        for pair in code_children(arguments) {
            if pair.kind() != "element_value_pair" {
                return Err(ChainError::UnsupportedSetting(node_text(pair, source).to_string()));
            }
            let key = pair.child_by_field_name("key").map(|k| node_text(k, source)).unwrap_or("");
            let Some(value) = pair.child_by_field_name("value") else {
                continue;
            };
            let text = node_text(value, source).to_string();
            match key {
                "name" => attributes.name = (!is_blank_string(&text)).then_some(text),
                "answer" => attributes.answer = (!is_default_answer(&text)).then_some(text),
                "extraInterfaces" => {
                    attributes.extra_interfaces = if value.kind() == "element_value_array_initializer" {
                        code_children(value)
                            .into_iter()
                            .map(|v| node_text(v, source).to_string())
                            .collect()
                    } else {
                        vec![text]
                    };
                }
                "serializable" => attributes.serializable = boolean_value(key, &text)?,
                "stubOnly" => attributes.stub_only = boolean_value(key, &text)?,
                "lenient" => attributes.lenient = boolean_value(key, &text)?,
                "strictness" => attributes.strictness = Strictness::parse(&text)?,
                "mockMaker" => attributes.mock_maker = Some(text),
                other => return Err(ChainError::UnsupportedSetting(other.to_string())),
            }
        }
        Ok(attributes)
    }

    /// Attributes of a chain rooted at `Mockito.withSettings()`.
    pub fn from_settings_chain(chain: &CallChain) -> Result<MockAttributes, ChainError> {
        let root = chain
            .first()
            .ok_or_else(|| ChainError::UnsupportedSetting("empty settings chain".to_string()))?;
        if root.name != "withSettings" || !root.receiver.is_static(MockitoClass::Mockito) || !root.args.is_empty() {
            return Err(ChainError::UnsupportedSetting(root.name.clone()));
        }
        let calls = chain
            .iter()
            .skip(1)
            .map(builder_call)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(MockAttributes::from_builder_calls(&calls))
    }

    /// Mocked type text and attributes of a `Mockito.mock(...)` call in `file`.
    pub fn from_mock_call(file: &JavaFile, node: Node) -> Result<(String, MockAttributes), ChainError> {
        let call = CallNode::snapshot(file, node)
            .ok_or_else(|| ChainError::UnsupportedSetting(file.text(node).to_string()))?;
        if call.name != "mock" || !call.receiver.is_static(MockitoClass::Mockito) || !(1..=2).contains(&call.args.len()) {
            return Err(ChainError::UnsupportedSetting(call.name.clone()));
        }
        let type_name = match &call.args[0].kind {
            ArgKind::ClassLiteral { type_name } => type_name.clone(),
            _ => return Err(ChainError::UnsupportedSetting(call.args[0].text.clone())),
        };
        let Some(second) = call.arg(1) else {
            return Ok((type_name, MockAttributes::default()));
        };
        let attributes = match &second.kind {
            ArgKind::Reference if second.ty == Some(MockitoType::MockSettings) => {
                MockAttributes::from_settings_chain(&settings_variable_chain(file, second)?)?
            }
            ArgKind::StringLiteral | ArgKind::Reference => {
                MockAttributes::from_builder_calls(&[overload_setting(file, second)])
            }
            ArgKind::Call(_) => {
                let settings = file
                    .call_with_span(second.span)
                    .ok_or_else(|| ChainError::UnsupportedSetting(second.text.clone()))?;
                MockAttributes::from_settings_chain(&file.chain_of(settings))?
            }
            _ => return Err(ChainError::UnsupportedSetting(second.text.clone())),
        };
        Ok((type_name, attributes))
    }

    // ─── Snippets ────────────────────────────────────────────────────

    /// Attributes of a standalone `@Mock(...)` snippet.
    pub fn parse_annotation(snippet: &str) -> Result<MockAttributes, ChainError> {
        let file = JavaFile::parse(format!("{SNIPPET_IMPORTS}class Snippet {{\n    {snippet}\n    Object field;\n}}\n"))?;
        let annotation = find_node(file.root(), &|n| {
            matches!(n.kind(), "annotation" | "marker_annotation")
        })
        .ok_or_else(|| ChainError::Parse(format!("no annotation in '{snippet}'")))?;
        let name = annotation
            .child_by_field_name("name")
            .map(|n| file.text(n))
            .unwrap_or("");
        if name != "Mock" && name != "org.mockito.Mock" {
            return Err(ChainError::UnsupportedSetting(format!("@{name}")));
        }
        MockAttributes::from_annotation(&file, annotation)
    }

    /// Mocked type and attributes of a standalone `Mockito.mock(...)` snippet.
    pub fn parse_mock_call(snippet: &str) -> Result<(String, MockAttributes), ChainError> {
        let file = JavaFile::parse(format!("{SNIPPET_IMPORTS}class Snippet {{\n    Object value = {snippet};\n}}\n"))?;
        let value = find_node(file.root(), &|n| n.kind() == "variable_declarator")
            .and_then(|d| d.child_by_field_name("value"))
            .filter(|v| is_call(*v))
            .ok_or_else(|| ChainError::Parse(format!("'{snippet}' is not a method call")))?;
        MockAttributes::from_mock_call(&file, value)
    }
}

const SNIPPET_IMPORTS: &str = "import org.mockito.*;\nimport static org.mockito.Mockito.*;\n\n";

/// Builder call matching the second argument of the two-argument `mock` overloads.
///
/// String literals and `String` variables name the mock; any other value is the default answer.
pub(crate) fn overload_setting(file: &JavaFile, arg: &Arg) -> BuilderCall {
    let is_string_variable = || {
        let name = arg.text.strip_prefix("this.").unwrap_or(&arg.text);
        file.symbols()
            .lookup(name, arg.span.start)
            .is_some_and(|s| matches!(s.declared_type.as_str(), "String" | "java.lang.String"))
    };
    if matches!(arg.kind, ArgKind::StringLiteral) || (arg.is_reference() && is_string_variable()) {
        BuilderCall::Name(arg.text.clone())
    } else {
        BuilderCall::DefaultAnswer(arg.text.clone())
    }
}

/// Initializer chain of a `MockSettings` variable. Later mutations of the variable are not followed.
fn settings_variable_chain(file: &JavaFile, arg: &Arg) -> Result<CallChain, ChainError> {
    let name = arg.text.strip_prefix("this.").unwrap_or(&arg.text);
    let initializer = file
        .symbols()
        .lookup(name, arg.span.start)
        .and_then(|symbol| symbol.initializer)
        .and_then(|span| file.call_with_span(span))
        .ok_or_else(|| ChainError::UnsupportedSetting(format!("settings variable {}", arg.text)))?;
    Ok(file.chain_of(initializer))
}

fn boolean_value(key: &str, text: &str) -> Result<bool, ChainError> {
    match text {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ChainError::UnsupportedSetting(format!("{key} = {text}"))),
    }
}

fn builder_call(call: &CallNode) -> Result<BuilderCall, ChainError> {
    let unsupported = || ChainError::UnsupportedSetting(call.name.clone());
    let first = || call.arg(0).map(|a| a.text.clone());
    let builder = match (call.name.as_str(), call.args.len()) {
        ("lenient", 0) => BuilderCall::Lenient,
        ("name", 1) => BuilderCall::Name(first().ok_or_else(unsupported)?),
        ("strictness", 1) => {
            let text = first().ok_or_else(unsupported)?;
            match Strictness::parse(&text)? {
                Some(s) => BuilderCall::Strictness(s),
                None => return Err(ChainError::UnsupportedSetting(format!("strictness {text}"))),
            }
        }
        ("mockMaker", 1) => BuilderCall::MockMaker(first().ok_or_else(unsupported)?),
        ("defaultAnswer", 1) => BuilderCall::DefaultAnswer(first().ok_or_else(unsupported)?),
        ("serializable", 0) => BuilderCall::Serializable(None),
        ("serializable", 1) => BuilderCall::Serializable(first()),
        ("stubOnly", 0) => BuilderCall::StubOnly,
        ("extraInterfaces", n) if n > 0 => {
            BuilderCall::ExtraInterfaces(call.args.iter().map(|a| a.text.clone()).collect())
        }
        _ => return Err(unsupported()),
    };
    Ok(builder)
}

fn find_node<'a>(node: Node<'a>, predicate: &dyn Fn(Node) -> bool) -> Option<Node<'a>> {
    if predicate(node) {
        return Some(node);
    }
    let mut cursor = node.walk();
    let children: Vec<Node<'a>> = node.children(&mut cursor).collect();
    children.into_iter().find_map(|child| find_node(child, predicate))
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;
