//! Wildcard patterns over addresses.
//!
//! `*` stays inside one segment (it never crosses `.`, `/`, `[` or `]`), `**`
//! crosses everything, and `**/` / `/**` are an optional prefix and suffix.
//! Patterns compile to an anchored [`Regex`]: wildcard markers are first
//! swapped for placeholders, the rest is escaped, then the placeholders expand.

use crate::error::PatternError;
use crate::spath::enumerate::SpathEntry;
use crate::spath::path::Path;
use rayon::prelude::*;
use regex::Regex;
use serde::Serialize;

const PREFIX: char = '\u{E000}';
const SUFFIX: char = '\u{E001}';
const DOUBLE: char = '\u{E002}';
const SINGLE: char = '\u{E003}';

/// True when `s` should be treated as a pattern rather than an address.
pub fn is_pattern(s: &str) -> bool {
    s.contains('*')
}

#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    pub fn compile(pattern: &str) -> Result<Self, PatternError> {
        validate(pattern)?;

        let marked = pattern
            .replace("**/", &PREFIX.to_string())
            .replace("/**", &SUFFIX.to_string())
            .replace("**", &DOUBLE.to_string())
            .replace('*', &SINGLE.to_string());

        let mut expr = String::with_capacity(marked.len() * 2 + 2);
        expr.push('^');
        for c in regex::escape(&marked).chars() {
            match c {
                PREFIX => expr.push_str("(?:.*/)?"),
                SUFFIX => expr.push_str("(?:/.*)?"),
                DOUBLE => expr.push_str(".*"),
                SINGLE => expr.push_str(r"[^./\[\]]*"),
                c => expr.push(c),
            }
        }
        expr.push('$');

        let regex = Regex::new(&expr).map_err(|e| PatternError::Compile {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        tracing::debug!("compiled pattern '{pattern}' to {expr}");

        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Regex match only, with no address validation. Used for package paths.
    pub fn is_match_raw(&self, candidate: &str) -> bool {
        self.regex.is_match(candidate)
    }

    /// Whole-address match. Strings that are not valid addresses never match.
    pub fn matches(&self, candidate: &str) -> bool {
        self.regex.is_match(candidate) && Path::parse(candidate).is_ok()
    }

    /// Match an entry by its canonical address or its short form.
    pub fn matches_entry(&self, entry: &SpathEntry) -> bool {
        self.matches(&entry.path)
            || entry
                .short_form()
                .is_some_and(|short| self.matches(&short))
    }
}

fn validate(pattern: &str) -> Result<(), PatternError> {
    if pattern.trim().is_empty() {
        return Err(PatternError::Empty);
    }

    let mut run = 0;
    let mut depth: i32 = 0;
    for c in pattern.chars() {
        if c == '*' {
            run += 1;
            if run > 2 {
                return Err(PatternError::StarRun {
                    pattern: pattern.to_string(),
                });
            }
        } else {
            run = 0;
        }
        match c {
            '[' => depth += 1,
            ']' => depth -= 1,
            _ => {}
        }
        if !(0..=1).contains(&depth) {
            return Err(PatternError::UnbalancedBrackets {
                pattern: pattern.to_string(),
            });
        }
    }
    if depth != 0 {
        return Err(PatternError::UnbalancedBrackets {
            pattern: pattern.to_string(),
        });
    }
    Ok(())
}

/// Matches of one pattern. `total` counts every match, even past the limit.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MatchResult {
    pub matches: Vec<SpathEntry>,
    pub total: usize,
}

impl MatchResult {
    pub fn is_truncated(&self) -> bool {
        self.matches.len() < self.total
    }
}

/// Filter `universe` by `pattern`, sorted by address, truncated to `limit`.
pub fn match_entries(
    pattern: &Pattern,
    universe: &[SpathEntry],
    limit: Option<usize>,
) -> MatchResult {
    let mut matches: Vec<SpathEntry> = universe
        .par_iter()
        .filter(|entry| pattern.matches_entry(entry))
        .cloned()
        .collect();
    matches.sort_by(|a, b| a.path.cmp(&b.path));
    matches.dedup_by(|a, b| a.path == b.path);

    let total = matches.len();
    if let Some(limit) = limit {
        matches.truncate(limit);
    }
    MatchResult { matches, total }
}
