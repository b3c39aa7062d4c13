use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Index of a source file inside a loaded [`Program`](crate::program::Program).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FileId(pub u32);

impl FileId {
    pub fn new(index: usize) -> Self {
        Self(index as u32)
    }

    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Byte and line extent of a syntax node. Lines are zero-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub file: FileId,
    pub start_byte: usize,
    pub end_byte: usize,
    pub start_line: u32,
    pub end_line: u32,
}

impl Span {
    pub fn new(
        file: FileId,
        start_byte: usize,
        end_byte: usize,
        start_line: u32,
        end_line: u32,
    ) -> Self {
        Self {
            file,
            start_byte,
            end_byte,
            start_line,
            end_line,
        }
    }

    pub fn contains_line(&self, line: u32) -> bool {
        line >= self.start_line && line <= self.end_line
    }

    pub fn byte_range(&self) -> std::ops::Range<usize> {
        self.start_byte..self.end_byte
    }

    pub fn len(&self) -> usize {
        self.end_byte.saturating_sub(self.start_byte)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Declaration kind of an indexed symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Func,
    Method,
    Type,
    Interface,
    Const,
    Var,
}

impl Kind {
    pub const ALL: [Kind; 6] = [
        Kind::Func,
        Kind::Method,
        Kind::Type,
        Kind::Interface,
        Kind::Const,
        Kind::Var,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Func => "func",
            Kind::Method => "method",
            Kind::Type => "type",
            Kind::Interface => "interface",
            Kind::Const => "const",
            Kind::Var => "var",
        }
    }

    /// Types and interfaces can own methods.
    pub fn is_type(&self) -> bool {
        matches!(self, Kind::Type | Kind::Interface)
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, Kind::Func | Kind::Method)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Kind {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "func" | "function" => Ok(Kind::Func),
            "method" => Ok(Kind::Method),
            "type" | "struct" => Ok(Kind::Type),
            "interface" => Ok(Kind::Interface),
            "const" | "constant" => Ok(Kind::Const),
            "var" | "variable" => Ok(Kind::Var),
            _ => Err("Unknown symbol kind"),
        }
    }
}
