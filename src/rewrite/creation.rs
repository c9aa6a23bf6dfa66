//! Mock creation rewrites: `Mockito.mock()`/`Mockito.spy()` calls and `@Mock`/`@Spy` fields.
//!
//! Attribute translation is delegated to [`MockAttributes`]; this module only decides
//! where the declaration lives and which text moves.

use tree_sitter::Node;

use super::{RewritePlan, Selection, TextEdit, enclosing_call, fresh_name, plan_imports};
use crate::java::{
    Arg, ArgKind, CallNode, JavaFile, MockitoClass, MockitoType, Span, SymbolKind, code_children, find_child_by_kind,
    is_call,
};
use crate::settings::{MockAttributes, overload_setting};
use crate::{ChainError, Rejection};

// ─── Creation calls ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CreationKind {
    Mock,
    Spy,
}

impl CreationKind {
    fn method(&self) -> &'static str {
        match self {
            CreationKind::Mock => "mock",
            CreationKind::Spy => "spy",
        }
    }

    fn annotation(&self) -> &'static str {
        match self {
            CreationKind::Mock => "Mock",
            CreationKind::Spy => "Spy",
        }
    }

    fn annotation_fqn(&self) -> &'static str {
        match self {
            CreationKind::Mock => "org.mockito.Mock",
            CreationKind::Spy => "org.mockito.Spy",
        }
    }

    fn of_annotation(name: &str) -> Option<CreationKind> {
        match name {
            "Mock" | "org.mockito.Mock" => Some(CreationKind::Mock),
            "Spy" | "org.mockito.Spy" => Some(CreationKind::Spy),
            _ => None,
        }
    }
}

fn as_creation_call(file: &JavaFile, node: Node) -> Option<(CallNode, CreationKind)> {
    let call = CallNode::snapshot(file, node)?;
    let kind = match call.name.as_str() {
        "mock" => CreationKind::Mock,
        "spy" => CreationKind::Spy,
        _ => return None,
    };
    call.receiver.is_static(MockitoClass::Mockito).then_some((call, kind))
}

/// The creation call a selection points at.
///
/// A caret takes the innermost creation call around it, walking out through arguments;
/// a range takes the first creation call starting inside it.
fn creation_call(file: &JavaFile, selection: Selection) -> Option<(Node<'_>, CallNode, CreationKind)> {
    match selection {
        Selection::Caret(offset) => {
            let mut node = file.call_at(offset);
            while let Some(current) = node {
                if let Some((call, kind)) = as_creation_call(file, current) {
                    return Some((current, call, kind));
                }
                node = current.parent().and_then(enclosing_call);
            }
            None
        }
        Selection::Range(span) => first_creation_call_in(file, file.root(), span),
    }
}

fn first_creation_call_in<'a>(file: &JavaFile, node: Node<'a>, span: Span) -> Option<(Node<'a>, CallNode, CreationKind)> {
    if node.end_byte() <= span.start || node.start_byte() >= span.end {
        return None;
    }
    if is_call(node) && node.start_byte() >= span.start {
        if let Some((call, kind)) = as_creation_call(file, node) {
            return Some((node, call, kind));
        }
    }
    let mut cursor = node.walk();
    let children: Vec<Node<'a>> = node.children(&mut cursor).collect();
    children.into_iter().find_map(|child| first_creation_call_in(file, child, span))
}

/// Offset a field selection refers to: the caret, or the first non-blank byte of a range.
fn selected_offset(file: &JavaFile, selection: Selection) -> usize {
    match selection {
        Selection::Caret(offset) => offset,
        Selection::Range(span) => {
            let text = file.span_text(span);
            span.start + (text.len() - text.trim_start().len())
        }
    }
}

/// `Map<K, V>` → `Map`
fn raw_type(type_text: &str) -> &str {
    type_text.split('<').next().unwrap_or(type_text).trim()
}

/// `com.acme.HttpClient` → `httpClient`
fn lower_camel(type_text: &str) -> String {
    let raw = raw_type(type_text);
    let simple = raw.rsplit('.').next().unwrap_or(raw);
    let mut chars = simple.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ─── Source layout ───────────────────────────────────────────────────

fn line_start(source: &str, offset: usize) -> usize {
    source[..offset].rfind('\n').map_or(0, |i| i + 1)
}

/// Leading whitespace of the line holding `offset`.
fn indent_at(source: &str, offset: usize) -> &str {
    let line = &source[line_start(source, offset)..];
    &line[..line.len() - line.trim_start_matches([' ', '\t']).len()]
}

/// `span` widened to the full lines it occupies when nothing else shares them.
fn whole_lines(source: &str, span: Span) -> Span {
    let start = line_start(source, span.start);
    let line_end = source[span.end..].find('\n').map_or(source.len(), |i| span.end + i + 1);
    let alone = source[start..span.start].trim().is_empty() && source[span.end..line_end].trim().is_empty();
    if alone { Span::new(start, line_end) } else { span }
}

/// `lines` plus the blank line following them, if there is one.
fn with_blank_line_after(source: &str, lines: Span) -> Span {
    if !source[..lines.end].ends_with('\n') {
        return lines;
    }
    match source[lines.end..].find('\n') {
        Some(i) if source[lines.end..lines.end + i].trim().is_empty() => Span::new(lines.start, lines.end + i + 1),
        _ => lines,
    }
}

fn enclosing_of_kind<'a>(node: Node<'a>, kind: &str) -> Option<Node<'a>> {
    let mut current = Some(node);
    while let Some(n) = current {
        if n.kind() == kind {
            return Some(n);
        }
        current = n.parent();
    }
    None
}

/// First named child of `body` that starts on a line of its own.
fn first_member_line<'a>(source: &str, body: Node<'a>) -> Option<Node<'a>> {
    body.named_child(0)
        .filter(|member| line_start(source, member.start_byte()) > body.start_byte())
}

/// A field declaration ahead of the first member of `class_body`.
fn insert_field(source: &str, class_body: Node, annotation: &str, declaration: &str) -> TextEdit {
    match first_member_line(source, class_body) {
        Some(first) => {
            let indent = indent_at(source, first.start_byte());
            TextEdit::insert(
                line_start(source, first.start_byte()),
                format!("{indent}{annotation}\n{indent}{declaration}\n\n"),
            )
        }
        None => {
            let indent = format!("{}    ", indent_at(source, class_body.start_byte()));
            TextEdit::insert(class_body.start_byte() + 1, format!("\n{indent}{annotation}\n{indent}{declaration}\n"))
        }
    }
}

/// `statement` as the first statement of `block`.
fn insert_statement(source: &str, block: Node, statement: &str) -> TextEdit {
    match first_member_line(source, block) {
        Some(first) => {
            let indent = indent_at(source, first.start_byte());
            TextEdit::insert(line_start(source, first.start_byte()), format!("{indent}{statement}\n"))
        }
        None => {
            let indent = format!("{}    ", indent_at(source, block.start_byte()));
            TextEdit::insert(block.start_byte() + 1, format!("\n{indent}{statement}"))
        }
    }
}

// ─── Call to field ───────────────────────────────────────────────────

struct LocalDeclaration {
    name: String,
    declared_type: String,
    span: Span,
}

/// The single-variable local declaration that `node` initializes.
fn local_declaration(file: &JavaFile, node: Node) -> Option<LocalDeclaration> {
    let declarator = node.parent().filter(|p| p.kind() == "variable_declarator")?;
    if declarator.child_by_field_name("value") != Some(node) {
        return None;
    }
    let statement = declarator.parent().filter(|p| p.kind() == "local_variable_declaration")?;
    let mut cursor = statement.walk();
    if statement.children_by_field_name("declarator", &mut cursor).count() != 1 {
        return None;
    }
    Some(LocalDeclaration {
        name: file.text(declarator.child_by_field_name("name")?).to_string(),
        declared_type: file.text(statement.child_by_field_name("type")?).to_string(),
        span: Span::of(statement),
    })
}

fn declares_field(file: &JavaFile, class_body: Node, name: &str) -> bool {
    let scope = Span::of(class_body);
    file.symbols()
        .iter()
        .any(|s| s.kind == SymbolKind::Field && s.name == name && s.scope == scope)
}

/// Field type and initializer of a `Mockito.spy(...)` argument.
///
/// Mockito instantiates `@Spy` fields of default-constructed types itself.
fn spied_field(call: &CallNode) -> Result<(String, Option<String>), Rejection> {
    let [arg] = call.args.as_slice() else {
        return Err(Rejection::NoMockCreation);
    };
    match &arg.kind {
        ArgKind::ClassLiteral { type_name } => Ok((type_name.clone(), None)),
        ArgKind::NewInstance { type_name, has_args } => {
            let anonymous = arg.text.trim_end().ends_with('}');
            Ok((type_name.clone(), (*has_args || anonymous).then(|| arg.text.clone())))
        }
        _ => Err(Rejection::NoMockCreation),
    }
}

/// `Service s = Mockito.mock(Service.class);` → a `@Mock Service s;` field.
///
/// A call initializing a single local variable moves that variable into the class. Any
/// other call is replaced by a reference to a new field named after the mocked type.
pub fn plan_creation_to_field(file: &JavaFile, selection: Selection) -> Result<RewritePlan, ChainError> {
    let (node, call, kind) = creation_call(file, selection).ok_or(Rejection::NoMockCreation)?;
    let class_body = enclosing_of_kind(node, "class_body").ok_or(Rejection::NoMockCreation)?;
    let (type_name, annotation, initializer) = match kind {
        CreationKind::Mock => {
            let (type_name, attributes) = MockAttributes::from_mock_call(file, node)?;
            (type_name, attributes.render_annotation()?, None)
        }
        CreationKind::Spy => {
            let (type_name, initializer) = spied_field(&call)?;
            (type_name, "@Spy".to_string(), initializer)
        }
    };

    let source = file.source();
    let mut edits = Vec::new();
    let (field_type, name) = match local_declaration(file, node) {
        Some(local) => {
            if declares_field(file, class_body, &local.name) {
                return Err(Rejection::FieldNameTaken(local.name).into());
            }
            edits.push(TextEdit::replace(whole_lines(source, local.span), ""));
            let field_type = if local.declared_type == "var" { type_name } else { local.declared_type };
            (field_type, local.name)
        }
        None => {
            let name = fresh_name(file, &lower_camel(&type_name));
            edits.push(TextEdit::replace(Span::of(node), name.clone()));
            (type_name, name)
        }
    };
    let declaration = match initializer {
        Some(value) => format!("{field_type} {name} = {value};"),
        None => format!("{field_type} {name};"),
    };
    edits.push(insert_field(source, class_body, &annotation, &declaration));
    edits.extend(plan_imports(file, &[kind.annotation_fqn()]));
    let summary = format!("Mockito.{}() → @{} field '{}'", kind.method(), kind.annotation(), name);
    RewritePlan::new(file.revision(), edits, summary)
}

// ─── Field to call ───────────────────────────────────────────────────

/// The one `@Mock` or `@Spy` annotation of `field`.
fn creation_annotation<'a>(file: &JavaFile, field: Node<'a>) -> Result<(Node<'a>, CreationKind), Rejection> {
    let modifiers = find_child_by_kind(field, "modifiers").ok_or(Rejection::NoMockField)?;
    let found: Vec<(Node<'a>, CreationKind)> = code_children(modifiers)
        .into_iter()
        .filter(|m| matches!(m.kind(), "annotation" | "marker_annotation"))
        .filter_map(|m| {
            let name = m.child_by_field_name("name")?;
            CreationKind::of_annotation(file.text(name)).map(|kind| (m, kind))
        })
        .collect();
    match found.as_slice() {
        [single] => Ok(*single),
        _ => Err(Rejection::NoMockField),
    }
}

/// Body of `method`, declared in the same class as `field`.
fn target_method_body<'a>(file: &JavaFile, field: Node<'a>, method: &str) -> Result<Node<'a>, Rejection> {
    let missing = || Rejection::NoTargetMethod(method.to_string());
    let class_body = field.parent().ok_or_else(missing)?;
    code_children(class_body)
        .into_iter()
        .filter(|m| m.kind() == "method_declaration")
        .find(|m| m.child_by_field_name("name").is_some_and(|n| file.text(n) == method))
        .and_then(|m| m.child_by_field_name("body"))
        .ok_or_else(missing)
}

/// `@Mock Service s;` → `Service s = Mockito.mock(Service.class);` as the first statement of `method`.
///
/// The field is removed. Other methods still referring to it are left as they are.
pub fn plan_field_to_creation(file: &JavaFile, selection: Selection, method: &str) -> Result<RewritePlan, ChainError> {
    let offset = selected_offset(file, selection);
    let field = file
        .root()
        .descendant_for_byte_range(offset, offset)
        .and_then(|node| enclosing_of_kind(node, "field_declaration"))
        .ok_or(Rejection::NoMockField)?;
    let (annotation, kind) = creation_annotation(file, field)?;
    let mut cursor = field.walk();
    let declarators: Vec<Node> = field.children_by_field_name("declarator", &mut cursor).collect();
    let [declarator] = declarators.as_slice() else {
        return Err(Rejection::NoMockField.into());
    };
    let name = declarator.child_by_field_name("name").map(|n| file.text(n)).ok_or(Rejection::NoMockField)?;
    let field_type = field.child_by_field_name("type").map(|t| file.text(t)).ok_or(Rejection::NoMockField)?;

    let (creation, imports) = match kind {
        CreationKind::Mock => {
            let attributes = MockAttributes::from_annotation(file, annotation)?;
            (attributes.render_mock_call(raw_type(field_type)), attributes.required_imports())
        }
        CreationKind::Spy => {
            let spied = declarator
                .child_by_field_name("value")
                .map(|v| file.text(v).to_string())
                .unwrap_or_else(|| format!("{}.class", raw_type(field_type)));
            (format!("Mockito.spy({spied})"), vec![MockitoClass::Mockito.fqn()])
        }
    };
    let block = target_method_body(file, field, method)?;

    let source = file.source();
    let removed = with_blank_line_after(source, whole_lines(source, Span::of(field)));
    let mut edits = vec![
        TextEdit::replace(removed, ""),
        insert_statement(source, block, &format!("{field_type} {name} = {creation};")),
    ];
    edits.extend(plan_imports(file, &imports));
    let summary = format!("@{} field '{}' → Mockito.{}() in {}()", kind.annotation(), name, kind.method(), method);
    RewritePlan::new(file.revision(), edits, summary)
}

// ─── Expanded creation ───────────────────────────────────────────────

/// Raw type of a spied instance: the constructed type, or the declared type of a variable.
fn spied_type(file: &JavaFile, spied: &Arg) -> Option<String> {
    match &spied.kind {
        ArgKind::NewInstance { type_name, .. } => Some(raw_type(type_name).to_string()),
        ArgKind::Reference => {
            let name = spied.text.strip_prefix("this.").unwrap_or(&spied.text);
            let symbol = file.symbols().lookup(name, spied.span.start)?;
            (symbol.declared_type != "var").then(|| raw_type(&symbol.declared_type).to_string())
        }
        _ => None,
    }
}

/// Spell a creation call through `Mockito.withSettings()`.
///
/// `mock(X.class, "name")` and `mock(X.class, answer)` move their second argument into a
/// settings chain. `spy(instance)` becomes a mock of the instance's type that keeps the
/// spy's real-method default answer.
pub fn plan_expand_creation(file: &JavaFile, selection: Selection) -> Result<RewritePlan, ChainError> {
    let (_, call, kind) = creation_call(file, selection).ok_or(Rejection::NoMockCreation)?;
    let edit = match (kind, call.args.as_slice()) {
        (CreationKind::Mock, [mocked, second])
            if mocked.is_class_literal()
                && matches!(second.kind, ArgKind::StringLiteral | ArgKind::Reference)
                && second.ty != Some(MockitoType::MockSettings) =>
        {
            let setting = overload_setting(file, second);
            TextEdit::replace(second.span, format!("Mockito.withSettings(){}", setting.render()))
        }
        (CreationKind::Spy, [spied]) => {
            let type_name = spied_type(file, spied).ok_or(Rejection::NoMockCreation)?;
            TextEdit::replace(
                call.span,
                format!(
                    "Mockito.mock({type_name}.class, Mockito.withSettings().spiedInstance({}).defaultAnswer(Mockito.CALLS_REAL_METHODS))",
                    spied.text
                ),
            )
        }
        _ => return Err(Rejection::NoMockCreation.into()),
    };
    let mut edits = vec![edit];
    edits.extend(plan_imports(file, &[MockitoClass::Mockito.fqn()]));
    RewritePlan::new(file.revision(), edits, format!("expanded Mockito.{}()", kind.method()))
}

#[cfg(test)]
#[path = "creation_tests.rs"]
mod tests;
