//! Semantic paths: the address grammar, resolution, enumeration and globbing.

pub mod enumerate;
pub mod glob;
pub mod path;
pub mod resolve;

pub use enumerate::{SpathEntry, enumerate_all, enumerate_where};
pub use glob::{MatchResult, Pattern, is_pattern, match_entries};
pub use path::{Category, Path, Segment, Selector};
pub use resolve::{Node, ParamRole, Resolution, Resolver};
