//! Canonical form of registry syntax grammars.
//!
//! Registry grammars are free text such as `1setOf (type2 keyword | name(MAX))`.
//! Normalization strips noise, lifts the `1setOf` multiplicity marker into a
//! flag and sorts alternations so equivalent grammars compare equal.

use crate::overrides;
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// Bracketed qualifiers such as `[PWG5100.13]`
static BRACKETED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[[^\]]*\]").unwrap());

/// Upper bound on normalization rounds; every round only ever shortens the text
const MAX_ROUNDS: usize = 8;

/// A normalized syntax grammar
#[derive(Debug, Clone, Default, Serialize)]
pub struct Syntax {
    /// Grammar as written in the registry
    raw: String,
    text: String,
    is_set: bool,
    /// Alternatives of an alternation, sorted; empty otherwise
    #[serde(skip_serializing_if = "Vec::is_empty")]
    alternatives: Vec<String>,
}

impl PartialEq for Syntax {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text && self.is_set == other.is_set
    }
}

impl Eq for Syntax {}

impl Syntax {
    /// Normalize a grammar string
    pub fn normalize(raw: &str) -> Self {
        let mut is_set = false;
        let mut text = raw.to_string();
        for _ in 0..MAX_ROUNDS {
            let next = normalize_once(&text, &mut is_set);
            if next == text {
                break;
            }
            text = next;
        }

        let alternatives = if text.contains(" | ") {
            text.split(" | ").map(str::to_string).collect()
        } else {
            Vec::new()
        };

        Self {
            raw: raw.to_string(),
            text,
            is_set,
            alternatives,
        }
    }

    /// Normalize the grammar of the named attribute, applying known corrections first
    pub fn normalize_for(name: &str, raw: &str) -> Self {
        match overrides::syntax_override(name) {
            Some(corrected) => {
                let mut syntax = Self::normalize(corrected);
                syntax.raw = raw.to_string();
                syntax
            }
            None => Self::normalize(raw),
        }
    }

    /// Build from text already in normal form
    pub fn from_normalized(text: impl Into<String>, is_set: bool) -> Self {
        let text = text.into();
        let mut syntax = Self::normalize(&text);
        syntax.is_set = syntax.is_set || is_set;
        syntax
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_set(&self) -> bool {
        self.is_set
    }

    pub fn alternatives(&self) -> &[String] {
        &self.alternatives
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn is_collection(&self) -> bool {
        self.text == "collection"
    }

    /// Same grammar with the multiplicity flag replaced
    pub fn with_set(mut self, is_set: bool) -> Self {
        self.is_set = is_set;
        self
    }
}

fn normalize_once(input: &str, is_set: &mut bool) -> String {
    let mut text = input.to_string();
    for (from, to) in overrides::SYNTAX_CORRECTIONS {
        text = text.replace(from, to);
    }

    text = BRACKETED.replace_all(&text, "").into_owned();
    for noise in overrides::SYNTAX_NOISE {
        text = text.replace(noise, "");
    }

    if text.contains(overrides::SET_MARKER) {
        text = text.replace(overrides::SET_MARKER, "");
        *is_set = true;
    }

    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");

    if let Some(inner) = strip_outer_parens(&text) {
        return inner.trim().to_string();
    }

    if text.contains('|') {
        let mut parts: Vec<String> = text
            .split('|')
            .map(|part| {
                // Inner alternatives cannot carry their own multiplicity
                let mut ignored = false;
                let mut part = part.trim().to_string();
                for _ in 0..MAX_ROUNDS {
                    let next = normalize_once(&part, &mut ignored);
                    if next == part {
                        break;
                    }
                    part = next;
                }
                part
            })
            .filter(|part| !part.is_empty() && !overrides::IGNORED_ALTERNATIVES.contains(&part.as_str()))
            .collect();
        parts.sort();
        parts.dedup();
        return parts.join(" | ");
    }

    text
}

/// Strip one layer of enclosing parentheses, tolerating a missing final paren
fn strip_outer_parens(text: &str) -> Option<&str> {
    let body = text.strip_prefix('(')?;

    let opens = text.matches('(').count();
    let closes = text.matches(')').count();
    if opens > closes {
        return Some(body);
    }

    let inner = body.strip_suffix(')')?;
    let mut depth = 0usize;
    for c in inner.chars() {
        match c {
            '(' => depth += 1,
            ')' => {
                if depth == 0 {
                    // The leading paren closes before the end
                    return None;
                }
                depth -= 1;
            }
            _ => {}
        }
    }
    Some(inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: &[&str] = &[
        "type2 keyword",
        "1setOf type2 keyword",
        "1setOf (type2 keyword | name(MAX))",
        "(name(MAX)",
        "type1 enum",
        "1setOf type2 num",
        "integer(1:MAX)",
        "rangeOfInteger(0:MAX) | integer(0:MAX)",
        "b | a | no-value",
        "(uri | unknown) [PWG5100.13]",
        "text(MAX)",
        "collection",
        "(a) | (b)",
        "1set Of keyword",
        "",
    ];

    #[test]
    fn test_normalize_is_idempotent() {
        for sample in SAMPLES {
            let once = Syntax::normalize(sample);
            let twice = Syntax::normalize(once.text());
            assert_eq!(once.text(), twice.text(), "sample {sample:?}");
        }
    }

    #[test]
    fn test_alternation_is_order_independent() {
        let a = Syntax::normalize("b | a | no-value");
        let b = Syntax::normalize("a | b");
        assert_eq!(a, b);
        assert_eq!(a.text(), "a | b");
        assert_eq!(a.alternatives(), ["a", "b"]);
    }

    #[test]
    fn test_set_marker_is_lifted() {
        let syntax = Syntax::normalize("1setOf (type2 keyword | name(MAX))");
        assert!(syntax.is_set());
        assert_eq!(syntax.text(), "keyword | name");
        assert_eq!(syntax.raw(), "1setOf (type2 keyword | name(MAX))");

        let syntax = Syntax::normalize("1set Of keyword");
        assert!(syntax.is_set());
        assert_eq!(syntax.text(), "keyword");
    }

    #[test]
    fn test_noise_is_stripped() {
        assert_eq!(Syntax::normalize("type1 enum").text(), "enum");
        assert_eq!(Syntax::normalize("type2 num").text(), "enum");
        assert_eq!(Syntax::normalize("text(MAX)").text(), "text");
        assert_eq!(Syntax::normalize("(name(MAX)").text(), "name");
        assert_eq!(Syntax::normalize("uri [PWG5100.13] [obsolete]").text(), "uri");
        assert_eq!(Syntax::normalize("integer(1:MAX)").text(), "integer(1:MAX)");
    }

    #[test]
    fn test_unmatched_parens_are_kept_as_alternation() {
        let syntax = Syntax::normalize("(b) | (a)");
        assert_eq!(syntax.text(), "a | b");
    }

    #[test]
    fn test_single_remaining_alternative_is_not_an_alternation() {
        let syntax = Syntax::normalize("keyword | no-value");
        assert_eq!(syntax.text(), "keyword");
        assert!(syntax.alternatives().is_empty());
    }

    #[test]
    fn test_name_override_replaces_grammar() {
        let syntax = Syntax::normalize_for("input-orientation-requested", "type2 keyword");
        assert_eq!(syntax.text(), "enum");
        assert_eq!(syntax.raw(), "type2 keyword");
    }

    #[test]
    fn test_equality_ignores_raw_text() {
        assert_eq!(Syntax::normalize("type2 keyword"), Syntax::normalize("keyword"));
        assert_ne!(Syntax::normalize("1setOf keyword"), Syntax::normalize("keyword"));
    }
}
