//! Turning addresses into nodes of the loaded program.
//!
//! Resolution runs in stages: package, symbol (through the [`SymbolIndex`]),
//! optional method, then one subpath segment at a time. Every node kind has a
//! fixed table of categories it accepts; [`Resolver::children`] walks the same
//! table, so whatever the enumerator emits resolves again.

use crate::diagnostics::Diagnostics;
use crate::error::{ResolveError, ResolveResult};
use crate::program::{
    Decl, Embed, Field, InterfaceMethod, Package, Param, Program, Shape, Snippet, Tag, TypeParam,
};
use crate::spath::path::{Category, Path, Segment, Selector, is_identifier};
use crate::symbol::{Symbol, SymbolIndex};
use crate::types::{Kind, Span};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamRole {
    Param,
    Return,
    Receiver,
}

/// How a category uses its selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorRule {
    Required,
    Forbidden,
    Optional,
}

/// A node reached by resolution.
#[derive(Debug, Clone)]
pub enum Node<'p> {
    Package(&'p Package),
    Decl(&'p Decl),
    InterfaceMethod(&'p InterfaceMethod),
    Field(&'p Field),
    Embed(&'p Embed),
    Param(&'p Param, ParamRole),
    TypeParam(&'p TypeParam),
    Body(Span),
    Doc(&'p Snippet),
    /// A whole tag, or one `key:"value"` pair of it.
    Tag {
        tag: &'p Tag,
        entry: Option<(String, String)>,
    },
    TypeExpr(&'p Snippet),
    Name(&'p str, Span),
    Constraint(&'p Snippet),
    Value(&'p Snippet),
}

use Category as C;
use SelectorRule::{Forbidden, Optional, Required};

const FUNC: &[(Category, SelectorRule)] = &[
    (C::Params, Required),
    (C::Returns, Required),
    (C::TypeParams, Required),
    (C::Body, Forbidden),
    (C::Doc, Forbidden),
];
const METHOD: &[(Category, SelectorRule)] = &[
    (C::Receiver, Forbidden),
    (C::Params, Required),
    (C::Returns, Required),
    (C::TypeParams, Required),
    (C::Body, Forbidden),
    (C::Doc, Forbidden),
];
const STRUCT: &[(Category, SelectorRule)] = &[
    (C::Fields, Required),
    (C::Embeds, Required),
    (C::Methods, Required),
    (C::TypeParams, Required),
    (C::Type, Forbidden),
    (C::Doc, Forbidden),
];
const INTERFACE: &[(Category, SelectorRule)] = &[
    (C::Methods, Required),
    (C::Embeds, Required),
    (C::TypeParams, Required),
    (C::Type, Forbidden),
    (C::Doc, Forbidden),
];
const NAMED_TYPE: &[(Category, SelectorRule)] = &[
    (C::Methods, Required),
    (C::TypeParams, Required),
    (C::Type, Forbidden),
    (C::Doc, Forbidden),
];
const VALUE: &[(Category, SelectorRule)] = &[
    (C::Type, Forbidden),
    (C::Value, Forbidden),
    (C::Doc, Forbidden),
];
const INTERFACE_METHOD: &[(Category, SelectorRule)] = &[
    (C::Params, Required),
    (C::Returns, Required),
    (C::Doc, Forbidden),
];
const FIELD: &[(Category, SelectorRule)] = &[
    (C::Name, Forbidden),
    (C::Type, Forbidden),
    (C::Tag, Optional),
    (C::Doc, Forbidden),
];
const EMBED: &[(Category, SelectorRule)] = &[
    (C::Type, Forbidden),
    (C::Tag, Optional),
    (C::Doc, Forbidden),
];
const PARAM: &[(Category, SelectorRule)] = &[(C::Name, Forbidden), (C::Type, Forbidden)];
const TYPE_PARAM: &[(Category, SelectorRule)] =
    &[(C::Name, Forbidden), (C::Constraint, Forbidden)];

impl<'p> Node<'p> {
    /// Entry kind label.
    pub fn kind_label(&self) -> &'static str {
        match self {
            Node::Package(_) => "package",
            Node::Decl(decl) => decl.kind.as_str(),
            Node::InterfaceMethod(_) => "method",
            Node::Field(_) => "field",
            Node::Embed(_) => "embed",
            Node::Param(_, ParamRole::Param) => "param",
            Node::Param(_, ParamRole::Return) => "return",
            Node::Param(_, ParamRole::Receiver) => "receiver",
            Node::TypeParam(_) => "typeparam",
            Node::Body(_) => "body",
            Node::Doc(_) => "doc",
            Node::Tag { .. } => "tag",
            Node::TypeExpr(_) => "type-expr",
            Node::Name(..) => "name",
            Node::Constraint(_) => "constraint",
            Node::Value(_) => "value",
        }
    }

    /// Categories this node accepts, in enumeration order.
    pub fn categories(&self) -> &'static [(Category, SelectorRule)] {
        match self {
            Node::Decl(decl) => match &decl.shape {
                Shape::Func(_) if decl.kind == Kind::Method => METHOD,
                Shape::Func(_) => FUNC,
                Shape::Type(t) if t.is_struct() => STRUCT,
                Shape::Type(t) if t.is_interface() => INTERFACE,
                Shape::Type(_) => NAMED_TYPE,
                Shape::Value(_) => VALUE,
            },
            Node::InterfaceMethod(_) => INTERFACE_METHOD,
            Node::Field(_) => FIELD,
            Node::Embed(_) => EMBED,
            Node::Param(..) => PARAM,
            Node::TypeParam(_) => TYPE_PARAM,
            _ => &[],
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            Node::Package(_) => None,
            Node::Decl(decl) => Some(decl.span),
            Node::InterfaceMethod(m) => Some(m.span),
            Node::Field(f) => Some(f.span),
            Node::Embed(e) => Some(e.span),
            Node::Param(p, _) => Some(p.span),
            Node::TypeParam(tp) => Some(tp.span),
            Node::Body(span) | Node::Name(_, span) => Some(*span),
            Node::Doc(s) | Node::TypeExpr(s) | Node::Constraint(s) | Node::Value(s) => {
                Some(s.span)
            }
            Node::Tag { tag, .. } => Some(tag.span),
        }
    }

    /// Short type information shown next to an address.
    pub fn annotation(&self) -> Option<String> {
        match self {
            Node::Package(p) => Some(format!("package {}", p.name)),
            Node::Decl(decl) => decl.annotation(),
            Node::InterfaceMethod(m) => Some(format!(
                "{}({}){}",
                m.name,
                param_list(&m.params),
                results_suffix(&m.results)
            )),
            Node::Field(f) => Some(f.ty.text.clone()),
            Node::Embed(e) => Some(e.ty.text.clone()),
            Node::Param(p, _) => Some(p.type_text()),
            Node::TypeParam(tp) => Some(tp.constraint.text.clone()),
            Node::Tag { tag, entry } => Some(match entry {
                Some((_, value)) => value.clone(),
                None => tag.raw.clone(),
            }),
            Node::TypeExpr(s) | Node::Constraint(s) | Node::Value(s) => Some(s.text.clone()),
            Node::Body(_) | Node::Doc(_) | Node::Name(..) => None,
        }
    }
}

/// The path its rendered address parses back to.
fn read_back(path: Path) -> Path {
    Path::parse(&path.to_string()).unwrap_or(path)
}

fn param_list(params: &[Param]) -> String {
    params
        .iter()
        .map(|p| match &p.name {
            Some(name) => format!("{name} {}", p.type_text()),
            None => p.type_text(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn results_suffix(results: &[Param]) -> String {
    match results {
        [] => String::new(),
        [single] if single.name.is_none() => format!(" {}", single.type_text()),
        many => format!(" ({})", param_list(many)),
    }
}

/// Children of one category.
enum Members<'p> {
    /// Selectable children, each with its name when it has one.
    List(Vec<(Option<&'p str>, Node<'p>)>),
    Single(Option<Node<'p>>),
}

/// The outcome of resolving an address.
#[derive(Debug, Clone)]
pub struct Resolution<'p> {
    path: Path,
    node: Node<'p>,
    package: &'p Package,
}

impl<'p> Resolution<'p> {
    /// Canonical path, with the package in full import form.
    ///
    /// This is how [`Resolution::address`] reads back, so for a dotted module
    /// path such as `gopkg.in/yaml.v3` the package split may differ from
    /// [`Resolution::package`].
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn address(&self) -> String {
        self.path.to_string()
    }

    pub fn node(&self) -> &Node<'p> {
        &self.node
    }

    pub fn package(&self) -> &'p Package {
        self.package
    }

    pub fn kind(&self) -> &'static str {
        self.node.kind_label()
    }

    pub fn annotation(&self) -> Option<String> {
        self.node.annotation()
    }

    pub fn span(&self) -> Option<Span> {
        self.node.span()
    }

    /// Text of the resolved node. Names, tag values and docs render as their
    /// content; everything else as the spanned source.
    pub fn source(&self, program: &Program) -> Option<String> {
        match &self.node {
            Node::Name(name, _) => Some(name.to_string()),
            Node::Tag {
                entry: Some((_, value)),
                ..
            } => Some(value.clone()),
            Node::Doc(doc) => Some(doc.text.clone()),
            node => node
                .span()
                .and_then(|span| program.text(span))
                .map(str::to_string),
        }
    }

    pub fn location(&self, program: &Program) -> Option<String> {
        self.span().map(|span| program.location(span))
    }
}

/// Resolves addresses against one program snapshot.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'p> {
    program: &'p Program,
    index: &'p SymbolIndex,
}

impl<'p> Resolver<'p> {
    pub fn new(program: &'p Program, index: &'p SymbolIndex) -> Self {
        Self { program, index }
    }

    pub fn program(&self) -> &'p Program {
        self.program
    }

    pub fn index(&self) -> &'p SymbolIndex {
        self.index
    }

    /// Resolve a user-supplied string: a bare name goes through
    /// [`SymbolIndex::lookup`], anything else is parsed as an address.
    pub fn resolve_address(
        &self,
        input: &str,
        diagnostics: &mut Diagnostics,
    ) -> ResolveResult<Resolution<'p>> {
        let input = input.trim();
        if is_identifier(input) && self.program.package(input).is_none() {
            return self.resolve_bare(input, diagnostics);
        }
        let path = Path::parse(input)?;
        self.resolve(&path, diagnostics)
    }

    pub fn resolve(
        &self,
        path: &Path,
        diagnostics: &mut Diagnostics,
    ) -> ResolveResult<Resolution<'p>> {
        for candidate in std::iter::once(path.clone()).chain(path.alternatives()) {
            if let Some(package) = self.program.package(&candidate.package) {
                tracing::debug!("resolving {candidate} in {}", package.path());
                return self.resolve_in(package, candidate, diagnostics);
            }
        }
        Err(ResolveError::PackageNotFound {
            package: path.package.clone(),
        })
    }

    fn resolve_bare(
        &self,
        name: &str,
        diagnostics: &mut Diagnostics,
    ) -> ResolveResult<Resolution<'p>> {
        let matches = self.index.lookup(name);
        match matches.as_slice() {
            [] => Err(ResolveError::SymbolNotFound {
                package: "*".to_string(),
                symbol: name.to_string(),
            }),
            [only] => {
                let path = Path::parse(&only.address())?;
                self.resolve(&path, diagnostics)
            }
            many => {
                let mut candidates: Vec<String> = many.iter().map(|s| s.address()).collect();
                candidates.sort();
                candidates.dedup();
                diagnostics.ambiguous(name, candidates.clone());
                Err(ResolveError::Ambiguous {
                    name: name.to_string(),
                    candidates,
                })
            }
        }
    }

    fn resolve_in(
        &self,
        package: &'p Package,
        path: Path,
        diagnostics: &mut Diagnostics,
    ) -> ResolveResult<Resolution<'p>> {
        let path = path.with_package(package.path());
        let Some(symbol_name) = path.symbol.clone() else {
            return Ok(Resolution {
                path: read_back(path),
                node: Node::Package(package),
                package,
            });
        };

        let symbols = self.index.find(package.path(), &symbol_name);
        let symbol = match symbols.as_slice() {
            [] => {
                return Err(ResolveError::SymbolNotFound {
                    package: package.path().to_string(),
                    symbol: symbol_name.clone(),
                });
            }
            [only] => *only,
            [first, ..] => {
                // Several `init` functions, or a broken package: take the first.
                let candidates = symbols
                    .iter()
                    .map(|s| format!("{} ({})", s.address(), self.program.location(s.span)))
                    .collect();
                diagnostics.ambiguous(&first.address(), candidates);
                *first
            }
        };
        let decl = symbol
            .decl(self.program)
            .ok_or_else(|| ResolveError::SymbolNotFound {
                package: package.path().to_string(),
                symbol: symbol_name.clone(),
            })?;

        let mut resolved = format!("{}.{symbol_name}", package.path());
        let mut node = Node::Decl(decl);

        if let Some(method) = path.method.as_deref() {
            node = self
                .method_of(symbol, decl, method)
                .ok_or_else(|| ResolveError::MethodNotFound {
                    resolved: resolved.clone(),
                    method: method.to_string(),
                })?;
            resolved = format!("{resolved}.{method}");
        }

        for segment in &path.subpath {
            node = self.child(package, &node, segment, &resolved)?;
            resolved = format!("{resolved}/{segment}");
        }

        Ok(Resolution {
            path: read_back(path),
            node,
            package,
        })
    }

    /// `Type.Method`: a concrete method on `Type`, or an element of interface `Type`.
    fn method_of(&self, symbol: &Symbol, decl: &'p Decl, method: &str) -> Option<Node<'p>> {
        if !decl.kind.is_type() {
            return None;
        }
        if let Some(found) = self
            .index
            .methods_of(symbol)
            .find(|m| m.name == method)
            .and_then(|m| m.decl(self.program))
        {
            return Some(Node::Decl(found));
        }
        decl.type_shape()?
            .interface_methods()
            .iter()
            .find(|m| m.name == method)
            .map(Node::InterfaceMethod)
    }

    /// Descend one segment from `node`.
    pub fn child(
        &self,
        package: &'p Package,
        node: &Node<'p>,
        segment: &Segment,
        resolved: &str,
    ) -> ResolveResult<Node<'p>> {
        let category = segment.category;
        let Some(&(_, rule)) = node.categories().iter().find(|(c, _)| *c == category) else {
            return Err(ResolveError::InvalidCategory {
                resolved: resolved.to_string(),
                node: node.kind_label(),
                category: category.to_string(),
            });
        };

        match (rule, &segment.selector) {
            (SelectorRule::Required, None) => {
                return Err(ResolveError::MissingSelector {
                    resolved: resolved.to_string(),
                    category: category.to_string(),
                });
            }
            (SelectorRule::Forbidden, Some(_)) => {
                return Err(ResolveError::UnexpectedSelector {
                    resolved: resolved.to_string(),
                    category: category.to_string(),
                });
            }
            _ => {}
        }

        let missing = || ResolveError::MissingChild {
            resolved: resolved.to_string(),
            category: category.to_string(),
        };
        let not_found = |selector: &Selector| ResolveError::ChildNotFound {
            resolved: resolved.to_string(),
            category: category.to_string(),
            selector: selector.to_string(),
        };

        if category == Category::Tag {
            let tag = tag_of(node).ok_or_else(missing)?;
            return match &segment.selector {
                None => Ok(Node::Tag { tag, entry: None }),
                Some(selector) => {
                    let pairs = tag.pairs();
                    let entry = match selector {
                        Selector::Name(key) => pairs.into_iter().find(|(k, _)| k == key),
                        Selector::Index(i) => pairs.into_iter().nth(*i),
                    };
                    entry
                        .map(|entry| Node::Tag {
                            tag,
                            entry: Some(entry),
                        })
                        .ok_or_else(|| not_found(selector))
                }
            };
        }

        match self.members(package, node, category) {
            Members::Single(child) => child.ok_or_else(missing),
            Members::List(children) => {
                let Some(selector) = &segment.selector else {
                    return Err(missing());
                };
                let found = match selector {
                    Selector::Name(name) => children
                        .into_iter()
                        .find(|(n, _)| *n == Some(name.as_str())),
                    Selector::Index(i) => children.into_iter().nth(*i),
                };
                found.map(|(_, child)| child).ok_or_else(|| not_found(selector))
            }
        }
    }

    /// Every valid child of `node` with the segment that addresses it.
    ///
    /// Named children are addressed by name unless the name is `_` or shared
    /// with a sibling, in which case the index is used.
    pub fn children(&self, package: &'p Package, node: &Node<'p>) -> Vec<(Segment, Node<'p>)> {
        let mut out = Vec::new();

        for &(category, _) in node.categories() {
            if category == Category::Tag {
                let Some(tag) = tag_of(node) else { continue };
                out.push((Segment::new(category), Node::Tag { tag, entry: None }));
                let pairs = tag.pairs();
                let keys: Vec<Option<&str>> = pairs.iter().map(|(k, _)| Some(k.as_str())).collect();
                for (i, entry) in pairs.iter().enumerate() {
                    out.push((
                        selector_segment(category, &keys, i),
                        Node::Tag {
                            tag,
                            entry: Some(entry.clone()),
                        },
                    ));
                }
                continue;
            }

            match self.members(package, node, category) {
                Members::Single(Some(child)) => out.push((Segment::new(category), child)),
                Members::Single(None) => {}
                Members::List(children) => {
                    let names: Vec<Option<&str>> = children.iter().map(|(n, _)| *n).collect();
                    for (i, (_, child)) in children.into_iter().enumerate() {
                        out.push((selector_segment(category, &names, i), child));
                    }
                }
            }
        }

        out
    }

    fn members(&self, package: &'p Package, node: &Node<'p>, category: Category) -> Members<'p> {
        use Members::{List, Single};

        match node {
            Node::Decl(decl) => match (&decl.shape, category) {
                (Shape::Func(f), C::Params) => List(params(&f.params, ParamRole::Param)),
                (Shape::Func(f), C::Returns) => List(params(&f.results, ParamRole::Return)),
                (Shape::Func(f), C::TypeParams) => List(type_params(&f.type_params)),
                (Shape::Func(f), C::Receiver) => {
                    Single(f.receiver.as_ref().map(|r| Node::Param(r, ParamRole::Receiver)))
                }
                (Shape::Func(f), C::Body) => Single(f.body.map(Node::Body)),
                (Shape::Type(t), C::Fields) => List(
                    t.fields()
                        .iter()
                        .map(|f| (Some(f.name.as_str()), Node::Field(f)))
                        .collect(),
                ),
                (Shape::Type(t), C::Embeds) => List(
                    t.embeds()
                        .iter()
                        .map(|e| (e.name.as_deref(), Node::Embed(e)))
                        .collect(),
                ),
                (Shape::Type(t), C::Methods) => List(
                    t.interface_methods()
                        .iter()
                        .map(|m| (Some(m.name.as_str()), Node::InterfaceMethod(m)))
                        .chain(
                            package
                                .methods_of(&decl.name)
                                .map(|m| (Some(m.name.as_str()), Node::Decl(m))),
                        )
                        .collect(),
                ),
                (Shape::Type(t), C::TypeParams) => List(type_params(&t.type_params)),
                (Shape::Type(t), C::Type) => Single(Some(Node::TypeExpr(&t.underlying))),
                (Shape::Value(v), C::Type) => Single(v.ty.as_ref().map(Node::TypeExpr)),
                (Shape::Value(v), C::Value) => Single(v.value.as_ref().map(Node::Value)),
                (_, C::Doc) => Single(decl.doc.as_ref().map(Node::Doc)),
                _ => Single(None),
            },
            Node::InterfaceMethod(m) => match category {
                C::Params => List(params(&m.params, ParamRole::Param)),
                C::Returns => List(params(&m.results, ParamRole::Return)),
                C::Doc => Single(m.doc.as_ref().map(Node::Doc)),
                _ => Single(None),
            },
            Node::Field(f) => match category {
                C::Name => Single(Some(Node::Name(&f.name, f.span))),
                C::Type => Single(Some(Node::TypeExpr(&f.ty))),
                C::Doc => Single(f.doc.as_ref().map(Node::Doc)),
                _ => Single(None),
            },
            Node::Embed(e) => match category {
                C::Type => Single(Some(Node::TypeExpr(&e.ty))),
                C::Doc => Single(e.doc.as_ref().map(Node::Doc)),
                _ => Single(None),
            },
            Node::Param(p, _) => match category {
                C::Name => Single(p.name.as_deref().map(|n| Node::Name(n, p.span))),
                C::Type => Single(Some(Node::TypeExpr(&p.ty))),
                _ => Single(None),
            },
            Node::TypeParam(tp) => match category {
                C::Name => Single(Some(Node::Name(&tp.name, tp.span))),
                C::Constraint => Single(Some(Node::Constraint(&tp.constraint))),
                _ => Single(None),
            },
            _ => Single(None),
        }
    }
}

fn params(list: &[Param], role: ParamRole) -> Vec<(Option<&str>, Node<'_>)> {
    list.iter()
        .map(|p| (p.name.as_deref(), Node::Param(p, role)))
        .collect()
}

fn type_params(list: &[TypeParam]) -> Vec<(Option<&str>, Node<'_>)> {
    list.iter()
        .map(|tp| (Some(tp.name.as_str()), Node::TypeParam(tp)))
        .collect()
}

fn tag_of<'p>(node: &Node<'p>) -> Option<&'p Tag> {
    match node {
        Node::Field(f) => f.tag.as_ref(),
        Node::Embed(e) => e.tag.as_ref(),
        _ => None,
    }
}

fn selector_segment(category: Category, names: &[Option<&str>], i: usize) -> Segment {
    match names[i] {
        Some(name)
            if name != "_"
                && is_identifier(name)
                && names.iter().filter(|n| **n == Some(name)).count() == 1 =>
        {
            Segment::named(category, name)
        }
        _ => Segment::indexed(category, i),
    }
}
