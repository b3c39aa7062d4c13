//! Address grammar: `pkg.Symbol[.Method][/category[selector]...]`.
//!
//! [`Path::parse`] and the `Display` impl are inverses on valid input:
//! rendering a parsed address reproduces it byte for byte.

use crate::error::{ParseError, ParseResult};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Subpath vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Fields,
    Methods,
    Embeds,
    Params,
    Returns,
    Receiver,
    TypeParams,
    Body,
    Doc,
    Tag,
    Type,
    Name,
    Constraint,
    Value,
}

impl Category {
    pub const ALL: [Category; 14] = [
        Category::Fields,
        Category::Methods,
        Category::Embeds,
        Category::Params,
        Category::Returns,
        Category::Receiver,
        Category::TypeParams,
        Category::Body,
        Category::Doc,
        Category::Tag,
        Category::Type,
        Category::Name,
        Category::Constraint,
        Category::Value,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Fields => "fields",
            Category::Methods => "methods",
            Category::Embeds => "embeds",
            Category::Params => "params",
            Category::Returns => "returns",
            Category::Receiver => "receiver",
            Category::TypeParams => "typeparams",
            Category::Body => "body",
            Category::Doc => "doc",
            Category::Tag => "tag",
            Category::Type => "type",
            Category::Name => "name",
            Category::Constraint => "constraint",
            Category::Value => "value",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == name)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A declared name or a zero-based position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Selector {
    Name(String),
    Index(usize),
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Name(name) => f.write_str(name),
            Selector::Index(i) => write!(f, "{i}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Segment {
    pub category: Category,
    pub selector: Option<Selector>,
}

impl Segment {
    pub fn new(category: Category) -> Self {
        Self {
            category,
            selector: None,
        }
    }

    pub fn named(category: Category, name: impl Into<String>) -> Self {
        Self {
            category,
            selector: Some(Selector::Name(name.into())),
        }
    }

    pub fn indexed(category: Category, index: usize) -> Self {
        Self {
            category,
            selector: Some(Selector::Index(index)),
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.category.as_str())?;
        if let Some(selector) = &self.selector {
            write!(f, "[{selector}]")?;
        }
        Ok(())
    }
}

/// Parsed address. A non-empty subpath always comes with a symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Path {
    pub package: String,
    pub symbol: Option<String>,
    pub method: Option<String>,
    pub subpath: Vec<Segment>,
}

impl Path {
    pub fn package(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            symbol: None,
            method: None,
            subpath: Vec::new(),
        }
    }

    pub fn symbol(package: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            symbol: Some(symbol.into()),
            ..Self::package(package)
        }
    }

    pub fn method(
        package: impl Into<String>,
        symbol: impl Into<String>,
        method: impl Into<String>,
    ) -> Self {
        Self {
            method: Some(method.into()),
            ..Self::symbol(package, symbol)
        }
    }

    /// This path extended by one segment.
    pub fn child(&self, segment: Segment) -> Self {
        let mut path = self.clone();
        path.subpath.push(segment);
        path
    }

    pub fn is_package_only(&self) -> bool {
        self.symbol.is_none()
    }

    /// Same address with the package rewritten, e.g. to its short form.
    pub fn with_package(&self, package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            ..self.clone()
        }
    }

    /// Other readings of the same string, tried when the package misses.
    ///
    /// `gopkg.in/yaml.v3.Marshal` first parses as package `gopkg.in/yaml`,
    /// symbol `v3`, method `Marshal`; the alternative lets the package absorb
    /// one more dotted part.
    pub fn alternatives(&self) -> Vec<Path> {
        match (&self.symbol, &self.method) {
            (Some(symbol), Some(method)) => vec![Path {
                package: format!("{}.{symbol}", self.package),
                symbol: Some(method.clone()),
                method: None,
                subpath: self.subpath.clone(),
            }],
            (Some(symbol), None) if self.subpath.is_empty() => {
                vec![Path::package(format!("{}.{symbol}", self.package))]
            }
            _ => Vec::new(),
        }
    }

    pub fn parse(input: &str) -> ParseResult<Self> {
        Parser { input }.parse()
    }
}

impl FromStr for Path {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Path::parse(s)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.package)?;
        if let Some(symbol) = &self.symbol {
            write!(f, ".{symbol}")?;
        }
        if let Some(method) = &self.method {
            write!(f, ".{method}")?;
        }
        for segment in &self.subpath {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

impl Serialize for Path {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

struct Parser<'a> {
    input: &'a str,
}

impl Parser<'_> {
    fn parse(&self) -> ParseResult<Path> {
        let input = self.input;
        if input.is_empty() {
            return Err(ParseError::Empty);
        }
        if input.starts_with('.') {
            return Err(ParseError::MissingPackage {
                input: input.to_string(),
            });
        }
        self.check_brackets()?;
        for delimiter in ["//", ".."] {
            if input.contains(delimiter) {
                return Err(ParseError::DoubledDelimiter {
                    input: input.to_string(),
                    delimiter,
                });
            }
        }
        if input.starts_with('/') || input.ends_with('/') {
            return Err(ParseError::EmptyComponent {
                input: input.to_string(),
            });
        }
        if input.ends_with('.') {
            return Err(ParseError::MissingSymbol {
                input: input.to_string(),
            });
        }

        let components: Vec<&str> = input.split('/').collect();
        let Some(split) = components.iter().rposition(|c| c.contains('.')) else {
            return self.package_only(&components);
        };
        // `gopkg.in/yaml.v3/parser` is an import path: nothing after the last
        // dotted component reads as a segment.
        let rest = &components[split + 1..];
        if !rest.is_empty() && !rest.iter().any(|c| looks_like_segment(c)) {
            return self.package_only(&components);
        }

        let symbol_component = components[split];
        if symbol_component.contains('[') {
            return Err(self.missing_category());
        }

        let parts: Vec<&str> = symbol_component.split('.').collect();
        if parts[0].is_empty() {
            return Err(ParseError::EmptyComponent {
                input: input.to_string(),
            });
        }
        if parts.last().is_some_and(|p| p.is_empty()) {
            return Err(ParseError::MissingSymbol {
                input: input.to_string(),
            });
        }

        let n = parts.len();
        let (tail, symbol, method) = if n == 2 {
            (parts[0].to_string(), parts[1], None)
        } else {
            (parts[..n - 2].join("."), parts[n - 2], Some(parts[n - 1]))
        };

        for ident in std::iter::once(symbol).chain(method) {
            if !is_identifier(ident) {
                return Err(ParseError::InvalidIdentifier {
                    input: input.to_string(),
                    ident: ident.to_string(),
                });
            }
        }

        let mut package_components: Vec<&str> = components[..split].to_vec();
        package_components.push(&tail);
        for component in &package_components {
            self.check_package_component(component)?;
        }

        let subpath = components[split + 1..]
            .iter()
            .map(|c| self.segment(c))
            .collect::<ParseResult<Vec<_>>>()?;

        Ok(Path {
            package: package_components.join("/"),
            symbol: Some(symbol.to_string()),
            method: method.map(str::to_string),
            subpath,
        })
    }

    fn package_only(&self, components: &[&str]) -> ParseResult<Path> {
        for component in components {
            self.check_package_component(component)?;
        }
        Ok(Path::package(self.input))
    }

    fn check_package_component(&self, component: &str) -> ParseResult<()> {
        if component.contains('[') || component.contains(']') {
            return Err(self.missing_category());
        }
        let valid = !component.is_empty()
            && component
                .chars()
                .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | '~'));
        if valid {
            Ok(())
        } else {
            Err(ParseError::InvalidComponent {
                input: self.input.to_string(),
                component: component.to_string(),
            })
        }
    }

    /// Selectors do not nest; every `[` must close before the next one opens.
    fn check_brackets(&self) -> ParseResult<()> {
        let mut open = false;
        for c in self.input.chars() {
            match c {
                '[' if open => {
                    return Err(ParseError::UnclosedBracket {
                        input: self.input.to_string(),
                    });
                }
                '[' => open = true,
                ']' if !open => {
                    return Err(ParseError::UnmatchedBracket {
                        input: self.input.to_string(),
                    });
                }
                ']' => open = false,
                _ => {}
            }
        }
        if open {
            return Err(ParseError::UnclosedBracket {
                input: self.input.to_string(),
            });
        }
        Ok(())
    }

    fn segment(&self, component: &str) -> ParseResult<Segment> {
        let (name, selector) = match component.find('[') {
            None => (component, None),
            Some(0) => return Err(self.missing_category()),
            Some(open) => {
                let Some(inner) = component[open + 1..].strip_suffix(']') else {
                    return Err(ParseError::InvalidSelector {
                        input: self.input.to_string(),
                        selector: component[open..].to_string(),
                    });
                };
                if inner.is_empty() {
                    return Err(ParseError::EmptySelector {
                        input: self.input.to_string(),
                    });
                }
                (&component[..open], Some(self.selector(inner)?))
            }
        };

        let category = Category::from_name(name).ok_or_else(|| ParseError::UnknownCategory {
            input: self.input.to_string(),
            category: name.to_string(),
        })?;

        Ok(Segment { category, selector })
    }

    fn selector(&self, inner: &str) -> ParseResult<Selector> {
        let invalid = || ParseError::InvalidSelector {
            input: self.input.to_string(),
            selector: inner.to_string(),
        };

        if inner.chars().all(|c| c.is_ascii_digit()) {
            // Canonical integers only, so rendering reproduces the input.
            if inner.len() > 1 && inner.starts_with('0') {
                return Err(invalid());
            }
            return inner.parse().map(Selector::Index).map_err(|_| invalid());
        }
        if is_identifier(inner) {
            Ok(Selector::Name(inner.to_string()))
        } else {
            Err(invalid())
        }
    }

    fn missing_category(&self) -> ParseError {
        ParseError::MissingCategory {
            input: self.input.to_string(),
        }
    }
}

fn looks_like_segment(component: &str) -> bool {
    component.contains('[') || Category::from_name(component).is_some()
}

/// Go identifier: a letter or `_`, then letters, digits or `_`.
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}
