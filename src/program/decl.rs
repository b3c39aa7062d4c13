//! Declaration shapes produced by the loader and navigated by the resolver.

use crate::types::{Kind, Span};
use serde::Serialize;

/// A piece of source text together with its extent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snippet {
    pub text: String,
    pub span: Span,
}

impl Snippet {
    pub fn new(text: impl Into<String>, span: Span) -> Self {
        Self {
            text: text.into(),
            span,
        }
    }
}

/// Raw struct tag, without the surrounding quotes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tag {
    pub raw: String,
    pub span: Span,
}

impl Tag {
    /// Parses the conventional `key:"value" key2:"value2"` layout.
    ///
    /// Malformed trailing content is ignored, the same way `reflect.StructTag`
    /// stops at the first pair it cannot read.
    pub fn pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        let mut rest = self.raw.trim_start();

        while !rest.is_empty() {
            let key_len = rest
                .find(|c: char| c == ':' || c == '"' || c.is_whitespace() || c.is_control())
                .unwrap_or(rest.len());
            if key_len == 0 || !rest[key_len..].starts_with(":\"") {
                break;
            }
            let key = &rest[..key_len];
            let after = &rest[key_len + 2..];

            let mut end = None;
            let mut escaped = false;
            for (i, c) in after.char_indices() {
                match c {
                    '\\' if !escaped => escaped = true,
                    '"' if !escaped => {
                        end = Some(i);
                        break;
                    }
                    _ => escaped = false,
                }
            }
            let Some(end) = end else { break };

            pairs.push((key.to_string(), after[..end].replace("\\\"", "\"")));
            rest = after[end + 1..].trim_start();
        }

        pairs
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.pairs()
            .into_iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn keys(&self) -> Vec<String> {
        self.pairs().into_iter().map(|(k, _)| k).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Param {
    pub name: Option<String>,
    pub ty: Snippet,
    pub variadic: bool,
    pub span: Span,
}

impl Param {
    pub fn type_text(&self) -> String {
        if self.variadic {
            format!("...{}", self.ty.text)
        } else {
            self.ty.text.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeParam {
    pub name: String,
    pub constraint: Snippet,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    pub name: String,
    pub ty: Snippet,
    pub tag: Option<Tag>,
    pub doc: Option<Snippet>,
    pub span: Span,
}

/// Embedded struct member or embedded interface element.
///
/// `name` is the implicit field name (`Reader` for `*io.Reader`); union
/// constraint elements such as `~int | ~string` have none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Embed {
    pub name: Option<String>,
    pub ty: Snippet,
    pub tag: Option<Tag>,
    pub doc: Option<Snippet>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterfaceMethod {
    pub name: String,
    pub params: Vec<Param>,
    pub results: Vec<Param>,
    pub doc: Option<Snippet>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FuncShape {
    /// Declaration text up to the body.
    pub signature: String,
    pub receiver: Option<Param>,
    /// Receiver base type name, without pointer or type arguments.
    pub receiver_type: Option<String>,
    pub type_params: Vec<TypeParam>,
    pub params: Vec<Param>,
    pub results: Vec<Param>,
    pub body: Option<Span>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "structure", rename_all = "lowercase")]
pub enum TypeStructure {
    Struct {
        fields: Vec<Field>,
        embeds: Vec<Embed>,
    },
    Interface {
        methods: Vec<InterfaceMethod>,
        embeds: Vec<Embed>,
    },
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeShape {
    pub type_params: Vec<TypeParam>,
    pub underlying: Snippet,
    pub alias: bool,
    pub structure: TypeStructure,
}

impl TypeShape {
    pub fn fields(&self) -> &[Field] {
        match &self.structure {
            TypeStructure::Struct { fields, .. } => fields,
            _ => &[],
        }
    }

    pub fn embeds(&self) -> &[Embed] {
        match &self.structure {
            TypeStructure::Struct { embeds, .. } | TypeStructure::Interface { embeds, .. } => {
                embeds
            }
            TypeStructure::Other => &[],
        }
    }

    pub fn interface_methods(&self) -> &[InterfaceMethod] {
        match &self.structure {
            TypeStructure::Interface { methods, .. } => methods,
            _ => &[],
        }
    }

    pub fn is_struct(&self) -> bool {
        matches!(self.structure, TypeStructure::Struct { .. })
    }

    pub fn is_interface(&self) -> bool {
        matches!(self.structure, TypeStructure::Interface { .. })
    }

    pub fn structure_label(&self) -> &'static str {
        match self.structure {
            TypeStructure::Struct { .. } => "struct",
            TypeStructure::Interface { .. } => "interface",
            TypeStructure::Other => "type",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValueShape {
    pub ty: Option<Snippet>,
    pub value: Option<Snippet>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "shape", rename_all = "lowercase")]
pub enum Shape {
    Func(FuncShape),
    Type(TypeShape),
    Value(ValueShape),
}

/// One top-level declaration or method of a package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Decl {
    pub name: String,
    pub kind: Kind,
    pub span: Span,
    pub doc: Option<Snippet>,
    pub shape: Shape,
    /// Identifiers mentioned anywhere in the declaration, sorted and unique.
    pub references: Vec<String>,
}

impl Decl {
    pub fn func(&self) -> Option<&FuncShape> {
        match &self.shape {
            Shape::Func(f) => Some(f),
            _ => None,
        }
    }

    pub fn type_shape(&self) -> Option<&TypeShape> {
        match &self.shape {
            Shape::Type(t) => Some(t),
            _ => None,
        }
    }

    pub fn value(&self) -> Option<&ValueShape> {
        match &self.shape {
            Shape::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn receiver_type(&self) -> Option<&str> {
        self.func().and_then(|f| f.receiver_type.as_deref())
    }

    /// Go exports identifiers that start with an upper-case letter.
    pub fn is_exported(&self) -> bool {
        is_exported(&self.name)
    }

    /// Short type annotation shown next to enumerated addresses.
    pub fn annotation(&self) -> Option<String> {
        match &self.shape {
            Shape::Func(f) => Some(f.signature.clone()),
            Shape::Type(t) => Some(if t.alias {
                format!("= {}", t.underlying.text)
            } else {
                t.structure_label().to_string()
            }),
            Shape::Value(v) => v.ty.as_ref().map(|t| t.text.clone()),
        }
    }
}

pub fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}
