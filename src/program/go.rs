//! Go declaration extraction
//!
//! Uses tree-sitter-go crate's LANGUAGE constant (converted via .into()).
//! Produces one [`Decl`] per top-level function, method, type, const and var,
//! including the substructure the resolver descends into.

use crate::error::LoadError;
use crate::program::decl::{
    Decl, Embed, Field, FuncShape, InterfaceMethod, Param, Shape, Snippet, Tag, TypeParam,
    TypeShape, TypeStructure, ValueShape,
};
use crate::types::{FileId, Kind, Span};
use std::collections::BTreeSet;
use tree_sitter::{Node, Parser};

/// Declarations extracted from one file.
#[derive(Debug, Clone)]
pub struct ExtractedFile {
    pub package_name: String,
    pub decls: Vec<Decl>,
    pub has_errors: bool,
}

/// Go declaration extractor. One instance per thread.
pub struct GoExtractor {
    parser: Parser,
}

impl GoExtractor {
    /// Create a new Go extractor
    pub fn new() -> Result<Self, LoadError> {
        let mut parser = Parser::new();
        let lang = tree_sitter_go::LANGUAGE;
        parser
            .set_language(&lang.into())
            .map_err(|e| LoadError::ParserInit {
                reason: format!("Failed to set Go language: {e}"),
            })?;

        Ok(Self { parser })
    }

    /// Parse Go source code and extract all top-level declarations.
    ///
    /// Returns `None` only when tree-sitter produces no tree at all.
    pub fn extract(&mut self, code: &str, file: FileId) -> Option<ExtractedFile> {
        let tree = self.parser.parse(code, None)?;
        let root = tree.root_node();
        let cx = Extraction { code, file };

        let mut package_name = String::new();
        let mut decls = Vec::new();

        for child in root.children(&mut root.walk()) {
            match child.kind() {
                "package_clause" => {
                    if let Some(name) = child
                        .named_children(&mut child.walk())
                        .find(|n| n.kind() == "package_identifier")
                    {
                        package_name = cx.text(name).to_string();
                    }
                }
                "function_declaration" | "method_declaration" => {
                    if let Some(decl) = cx.function(child) {
                        decls.push(decl);
                    }
                }
                "type_declaration" => cx.type_declaration(child, &mut decls),
                "const_declaration" => cx.value_declaration(child, Kind::Const, &mut decls),
                "var_declaration" => cx.value_declaration(child, Kind::Var, &mut decls),
                _ => {}
            }
        }

        Some(ExtractedFile {
            package_name,
            decls,
            has_errors: root.has_error(),
        })
    }
}

struct Extraction<'a> {
    code: &'a str,
    file: FileId,
}

impl<'a> Extraction<'a> {
    fn text(&self, node: Node) -> &'a str {
        &self.code[node.byte_range()]
    }

    fn span(&self, node: Node) -> Span {
        Span::new(
            self.file,
            node.start_byte(),
            node.end_byte(),
            node.start_position().row as u32,
            node.end_position().row as u32,
        )
    }

    fn snippet(&self, node: Node) -> Snippet {
        Snippet::new(self.text(node), self.span(node))
    }

    /// Names attached to a `name` field, skipping separators.
    fn names<'t>(&self, node: Node<'t>) -> Vec<Node<'t>> {
        node.children_by_field_name("name", &mut node.walk())
            .filter(|n| {
                matches!(
                    n.kind(),
                    "identifier" | "field_identifier" | "type_identifier"
                )
            })
            .collect()
    }

    fn function(&self, node: Node) -> Option<Decl> {
        let name_node = node.child_by_field_name("name")?;
        let shape = self.func_shape(node);
        let kind = if shape.receiver.is_some() {
            Kind::Method
        } else {
            Kind::Func
        };

        Some(Decl {
            name: self.text(name_node).to_string(),
            kind,
            span: self.span(node),
            doc: self.doc_comment(node),
            shape: Shape::Func(shape),
            references: self.references(node),
        })
    }

    fn func_shape(&self, node: Node) -> FuncShape {
        let body = node.child_by_field_name("body");
        let signature_end = body.map(|b| b.start_byte()).unwrap_or(node.end_byte());
        let signature = self.code[node.start_byte()..signature_end]
            .trim_end()
            .to_string();

        let receiver = node
            .child_by_field_name("receiver")
            .and_then(|r| self.params(r).into_iter().next());
        let receiver_type = receiver.as_ref().map(|r| base_type_name(&r.ty.text));

        FuncShape {
            signature,
            receiver,
            receiver_type,
            type_params: node
                .child_by_field_name("type_parameters")
                .map(|n| self.type_params(n))
                .unwrap_or_default(),
            params: node
                .child_by_field_name("parameters")
                .map(|n| self.params(n))
                .unwrap_or_default(),
            results: node
                .child_by_field_name("result")
                .map(|n| self.results(n))
                .unwrap_or_default(),
            body: body.map(|b| self.span(b)),
        }
    }

    /// Expands a parameter_list; `a, b int` yields two params.
    fn params(&self, list: Node) -> Vec<Param> {
        let mut params = Vec::new();

        for child in list.named_children(&mut list.walk()) {
            let variadic = match child.kind() {
                "parameter_declaration" => false,
                "variadic_parameter_declaration" => true,
                _ => continue,
            };
            let Some(ty) = child.child_by_field_name("type") else {
                continue;
            };

            let names = self.names(child);
            if names.is_empty() {
                params.push(Param {
                    name: None,
                    ty: self.snippet(ty),
                    variadic,
                    span: self.span(child),
                });
            }
            for name in names {
                params.push(Param {
                    name: Some(self.text(name).to_string()),
                    ty: self.snippet(ty),
                    variadic,
                    span: self.span(child),
                });
            }
        }

        params
    }

    /// A result is either a parameter_list or a single bare type.
    fn results(&self, node: Node) -> Vec<Param> {
        if node.kind() == "parameter_list" {
            self.params(node)
        } else {
            vec![Param {
                name: None,
                ty: self.snippet(node),
                variadic: false,
                span: self.span(node),
            }]
        }
    }

    fn type_params(&self, list: Node) -> Vec<TypeParam> {
        let mut out = Vec::new();
        for child in list.named_children(&mut list.walk()) {
            if child.kind() != "type_parameter_declaration" {
                continue;
            }
            let Some(constraint) = child.child_by_field_name("type") else {
                continue;
            };
            for name in self.names(child) {
                out.push(TypeParam {
                    name: self.text(name).to_string(),
                    constraint: self.snippet(constraint),
                    span: self.span(child),
                });
            }
        }
        out
    }

    fn type_declaration(&self, node: Node, decls: &mut Vec<Decl>) {
        // type_declaration contains type_spec / type_alias nodes
        for child in node.named_children(&mut node.walk()) {
            if matches!(child.kind(), "type_spec" | "type_alias") {
                if let Some(decl) = self.type_spec(child) {
                    decls.push(decl);
                }
            }
        }
    }

    fn type_spec(&self, spec: Node) -> Option<Decl> {
        let name = self.text(spec.child_by_field_name("name")?).to_string();
        let ty = spec.child_by_field_name("type")?;

        let structure = match ty.kind() {
            "struct_type" => self.struct_structure(ty),
            "interface_type" => self.interface_structure(ty),
            _ => TypeStructure::Other,
        };
        let kind = match structure {
            TypeStructure::Interface { .. } => Kind::Interface,
            _ => Kind::Type,
        };
        let outer = self.outer_node(spec);

        Some(Decl {
            name,
            kind,
            span: self.span(outer),
            doc: self.doc_comment(outer),
            shape: Shape::Type(TypeShape {
                type_params: spec
                    .child_by_field_name("type_parameters")
                    .map(|n| self.type_params(n))
                    .unwrap_or_default(),
                underlying: self.snippet(ty),
                alias: spec.kind() == "type_alias",
                structure,
            }),
            references: self.references(spec),
        })
    }

    fn struct_structure(&self, ty: Node) -> TypeStructure {
        let mut fields = Vec::new();
        let mut embeds = Vec::new();

        let list = ty
            .named_children(&mut ty.walk())
            .find(|c| c.kind() == "field_declaration_list");

        if let Some(list) = list {
            for decl in list.named_children(&mut list.walk()) {
                if decl.kind() != "field_declaration" {
                    continue;
                }
                let Some(field_type) = decl.child_by_field_name("type") else {
                    continue;
                };
                let tag = decl.child_by_field_name("tag").map(|t| self.tag(t));
                let doc = self.doc_comment(decl);
                let names = self.names(decl);

                if names.is_empty() {
                    // Embedded member; keep a leading '*' in the type text.
                    let text = &self.code[decl.start_byte()..field_type.end_byte()];
                    let ty_span = Span::new(
                        self.file,
                        decl.start_byte(),
                        field_type.end_byte(),
                        decl.start_position().row as u32,
                        field_type.end_position().row as u32,
                    );
                    embeds.push(Embed {
                        name: embedded_name(text),
                        ty: Snippet::new(text, ty_span),
                        tag,
                        doc,
                        span: self.span(decl),
                    });
                    continue;
                }

                for name in names {
                    fields.push(Field {
                        name: self.text(name).to_string(),
                        ty: self.snippet(field_type),
                        tag: tag.clone(),
                        doc: doc.clone(),
                        span: self.span(decl),
                    });
                }
            }
        }

        TypeStructure::Struct { fields, embeds }
    }

    fn interface_structure(&self, ty: Node) -> TypeStructure {
        let mut methods = Vec::new();
        let mut embeds = Vec::new();

        for child in ty.named_children(&mut ty.walk()) {
            match child.kind() {
                "method_elem" | "method_spec" => {
                    let Some(name) = child.child_by_field_name("name") else {
                        continue;
                    };
                    methods.push(InterfaceMethod {
                        name: self.text(name).to_string(),
                        params: child
                            .child_by_field_name("parameters")
                            .map(|n| self.params(n))
                            .unwrap_or_default(),
                        results: child
                            .child_by_field_name("result")
                            .map(|n| self.results(n))
                            .unwrap_or_default(),
                        doc: self.doc_comment(child),
                        span: self.span(child),
                    });
                }
                "type_elem" | "constraint_elem" | "interface_type_name" | "qualified_type"
                | "type_identifier" => {
                    embeds.push(Embed {
                        name: embedded_name(self.text(child)),
                        ty: self.snippet(child),
                        tag: None,
                        doc: self.doc_comment(child),
                        span: self.span(child),
                    });
                }
                _ => {}
            }
        }

        TypeStructure::Interface { methods, embeds }
    }

    fn tag(&self, node: Node) -> Tag {
        let text = self.text(node);
        let raw = if text.len() >= 2 {
            &text[1..text.len() - 1]
        } else {
            text
        };
        Tag {
            raw: raw.to_string(),
            span: self.span(node),
        }
    }

    fn value_declaration(&self, node: Node, kind: Kind, decls: &mut Vec<Decl>) {
        let spec_kind = match kind {
            Kind::Const => "const_spec",
            _ => "var_spec",
        };

        for spec in self.specs(node, spec_kind) {
            let ty = spec.child_by_field_name("type").map(|t| self.snippet(t));
            let value_node = spec.child_by_field_name("value");
            let values: Vec<Node> = value_node
                .map(|v| {
                    v.named_children(&mut v.walk())
                        .filter(|n| n.kind() != "comment")
                        .collect()
                })
                .unwrap_or_default();
            let names = self.names(spec);
            let outer = self.outer_node(spec);
            let doc = self.doc_comment(outer);
            let references = self.references(spec);

            for (i, name) in names.iter().enumerate() {
                // `a, b = 1, 2` pairs values by position; otherwise keep the whole list.
                let value = if values.len() == names.len() {
                    Some(self.snippet(values[i]))
                } else {
                    value_node.map(|v| self.snippet(v))
                };

                decls.push(Decl {
                    name: self.text(*name).to_string(),
                    kind,
                    span: self.span(outer),
                    doc: doc.clone(),
                    shape: Shape::Value(ValueShape {
                        ty: ty.clone(),
                        value,
                    }),
                    references: references.clone(),
                });
            }
        }
    }

    /// Spec children of a declaration, looking through `*_spec_list` wrappers.
    fn specs<'t>(&self, node: Node<'t>, spec_kind: &str) -> Vec<Node<'t>> {
        let mut specs = Vec::new();
        for child in node.named_children(&mut node.walk()) {
            if child.kind() == spec_kind {
                specs.push(child);
            } else if child.kind().ends_with("_list") {
                for inner in child.named_children(&mut child.walk()) {
                    if inner.kind() == spec_kind {
                        specs.push(inner);
                    }
                }
            }
        }
        specs
    }

    /// The enclosing declaration when it holds a single spec, else the spec.
    fn outer_node<'t>(&self, spec: Node<'t>) -> Node<'t> {
        let Some(parent) = spec.parent() else {
            return spec;
        };
        if !parent.kind().ends_with("_declaration") {
            return spec;
        }
        let spec_count = parent
            .named_children(&mut parent.walk())
            .filter(|c| c.kind() != "comment")
            .count();
        if spec_count == 1 { parent } else { spec }
    }

    /// Consecutive line comments directly above `node`.
    fn doc_comment(&self, node: Node) -> Option<Snippet> {
        let mut lines = Vec::new();
        let mut first: Option<Node> = None;
        let mut last: Option<Node> = None;
        let mut expected_row = node.start_position().row;
        let mut current = node.prev_sibling();

        while let Some(sibling) = current {
            if sibling.kind() != "comment" || sibling.end_position().row + 1 != expected_row {
                break;
            }
            // A comment trailing code on the same line documents that code.
            if let Some(before) = sibling.prev_sibling() {
                if before.kind() != "comment"
                    && before.end_position().row == sibling.start_position().row
                {
                    break;
                }
            }

            let text = self.text(sibling);
            let content = match text.strip_prefix("//") {
                Some(line) => line.trim().to_string(),
                None => text
                    .trim_start_matches("/*")
                    .trim_end_matches("*/")
                    .trim()
                    .to_string(),
            };
            lines.insert(0, content);

            if last.is_none() {
                last = Some(sibling);
            }
            first = Some(sibling);
            expected_row = sibling.start_position().row;
            current = sibling.prev_sibling();
        }

        let (first, last) = (first?, last?);
        let span = Span::new(
            self.file,
            first.start_byte(),
            last.end_byte(),
            first.start_position().row as u32,
            last.end_position().row as u32,
        );
        Some(Snippet::new(lines.join("\n").trim().to_string(), span))
    }

    fn references(&self, node: Node) -> Vec<String> {
        let mut seen = BTreeSet::new();
        let mut cursor = node.walk();
        let mut stack = vec![node];

        while let Some(current) = stack.pop() {
            match current.kind() {
                "identifier" | "field_identifier" | "type_identifier" => {
                    seen.insert(self.text(current).to_string());
                }
                _ => stack.extend(current.named_children(&mut cursor)),
            }
        }

        seen.into_iter().collect()
    }
}

/// `*pkg.List[T]` -> `List`.
pub(crate) fn base_type_name(text: &str) -> String {
    let trimmed = text
        .trim()
        .trim_start_matches('(')
        .trim_end_matches(')')
        .trim()
        .trim_start_matches('*')
        .trim();
    let without_args = trimmed.split('[').next().unwrap_or(trimmed);
    without_args
        .rsplit('.')
        .next()
        .unwrap_or(without_args)
        .trim()
        .to_string()
}

/// Implicit field name of an embedded member; `None` for unions and literals.
fn embedded_name(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.contains(['|', '~', '(', '{', ' ']) {
        return None;
    }
    let name = base_type_name(trimmed);
    let mut chars = name.chars();
    let valid = chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_');
    valid.then_some(name)
}
