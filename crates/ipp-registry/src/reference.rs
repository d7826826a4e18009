//! Resolution of the registry's free-text cross-references.
//!
//! Keyword and enum records often say what their legal values are in prose
//! ("< any "media" keyword value >", "< Any Job Template attribute keyword
//! name >"). [`parse_reference_phrase`] turns that prose into a [`Reference`].
//! [`fuzzy_lookup`] resolves a name against a table, falling back through the
//! registry's naming conventions when no entry matches directly.
//!
//! Both are driven by ordered rule tables. Order is significant: earlier rules
//! are more specific and must win over the looser ones that follow.

use crate::model::{EntityTable, NamedEntity, Reference};
use crate::overrides;
use indexmap::IndexSet;
use regex::{Captures, Regex};
use smol_str::SmolStr;
use std::collections::HashSet;
use std::sync::LazyLock;

/// Fuzzy lookup never follows more redirects than this
pub const MAX_LOOKUP_DEPTH: usize = 16;

static PHRASE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^<? ?(any|Any|all|All)? ?").unwrap());
static PHRASE_SUFFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" ?>?$").unwrap());

static ENUM_VALUE_PHRASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<? ?(?:[aA]ny |all )"?([a-z-]+)"?( enum)? (values?|names?) ?>?"#).unwrap()
});
static ENUM_SAME_AS_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"are the same.*"([a-z-]+)""#).unwrap());

static PHRASE_CORRECTIONS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    overrides::PHRASE_CORRECTIONS
        .iter()
        .map(|(pattern, replacement)| (Regex::new(pattern).unwrap(), *replacement))
        .collect()
});

/// One template for reference prose
struct PhraseRule {
    name: &'static str,
    pattern: &'static str,
    build: fn(&Captures<'_>) -> Option<Reference>,
}

const PHRASE_RULES: &[PhraseRule] = &[
    // "media-color" keyword values
    PhraseRule {
        name: "keyword-values",
        pattern: r#"^"?([a-z-]+)"?( keyword)? (values?|names?)$"#,
        build: capture_by_name,
    },
    // "finishings" attribute keyword name
    PhraseRule {
        name: "attribute-keyword-name",
        pattern: r#"^"?([a-z-]+)"? attribute keyword name$"#,
        build: capture_by_name,
    },
    // Job Template attribute keyword name
    PhraseRule {
        name: "family-keyword-name",
        pattern: r#"^"?([A-Z a-z-]+)"? attribute keyword name$"#,
        build: capture_by_family,
    },
    // media-col member attribute name
    PhraseRule {
        name: "member-attribute-name",
        pattern: r#"^"?([a-z-]+)"? member attribute names?$"#,
        build: capture_by_members,
    },
    // "cover-back" Job Template attribute
    PhraseRule {
        name: "quoted-name",
        pattern: r#"^"([a-z-]+)"( .* attribute)?$"#,
        build: capture_by_name,
    },
    PhraseRule {
        name: "collection-alias",
        pattern: r#"^Member attributes are the same as the "([a-z-]+)" (.*) attribute$"#,
        build: capture_collection_alias,
    },
    // Job Template attribute, matched anywhere in the phrase
    PhraseRule {
        name: "family-attribute",
        pattern: r"([A-Za-z ]+) attribute",
        build: capture_loose_family,
    },
];

static COMPILED_PHRASE_RULES: LazyLock<Vec<(Regex, &'static PhraseRule)>> = LazyLock::new(|| {
    PHRASE_RULES
        .iter()
        .map(|rule| (Regex::new(rule.pattern).unwrap(), rule))
        .collect()
});

fn capture_by_name(caps: &Captures<'_>) -> Option<Reference> {
    Some(Reference::by_name(&caps[1]))
}

fn capture_by_family(caps: &Captures<'_>) -> Option<Reference> {
    Some(Reference::by_group(overrides::family_alias(caps[1].trim())))
}

fn capture_by_members(caps: &Captures<'_>) -> Option<Reference> {
    Some(Reference::by_members(&caps[1]))
}

fn capture_collection_alias(caps: &Captures<'_>) -> Option<Reference> {
    Some(Reference::ByCollectionAlias {
        collection: caps[1].into(),
        family: Some(caps[2].trim().into()),
    })
}

fn capture_loose_family(caps: &Captures<'_>) -> Option<Reference> {
    // A single word is a name, not a family
    let family = caps[1].trim();
    family
        .contains(' ')
        .then(|| Reference::by_group(family))
}

/// Strip the `< any ... >` wrapper and apply known corrections
fn clean_phrase(phrase: &str) -> String {
    let phrase = PHRASE_PREFIX.replace(phrase, "");
    let mut phrase = PHRASE_SUFFIX.replace(&phrase, "").into_owned();
    for (pattern, replacement) in PHRASE_CORRECTIONS.iter() {
        phrase = pattern.replace(&phrase, *replacement).into_owned();
    }
    phrase
}

/// Parse reference prose into a [`Reference`], trying each template in order
pub fn parse_reference_phrase(phrase: &str) -> Option<Reference> {
    let cleaned = clean_phrase(phrase);

    if overrides::MEDIA_PHRASES.contains(&cleaned.as_str()) {
        return Some(Reference::by_name("media"));
    }

    for (regex, rule) in COMPILED_PHRASE_RULES.iter() {
        if let Some(reference) = regex.captures(&cleaned).and_then(|caps| (rule.build)(&caps)) {
            tracing::trace!(rule = rule.name, phrase, "matched reference phrase");
            return Some(reference);
        }
    }
    None
}

/// Parse reference prose onto `target`, returning whether any template matched
pub fn assign_reference(phrase: &str, target: &mut NamedEntity) -> bool {
    match parse_reference_phrase(phrase) {
        Some(reference) => {
            target.reference = Some(reference);
            true
        }
        None => false,
    }
}

/// Parse an enum value column such as `< any "printer-state" value >`
pub fn parse_enum_reference(value: &str) -> Option<Reference> {
    ENUM_VALUE_PHRASE
        .captures(value)
        .map(|caps| Reference::by_name(&caps[1]))
}

/// The enumeration an enum value label defers to, as in `Values are the same as "finishings"`
pub fn enum_label_reference(label: &str) -> Option<SmolStr> {
    ENUM_SAME_AS_LABEL
        .captures(label)
        .map(|caps| SmolStr::from(&caps[1]))
}

/// Names of collections known to the caller
pub trait CollectionIndex {
    fn has_collection(&self, name: &str) -> bool;
}

impl CollectionIndex for IndexSet<SmolStr> {
    fn has_collection(&self, name: &str) -> bool {
        self.contains(name)
    }
}

impl CollectionIndex for Vec<&str> {
    fn has_collection(&self, name: &str) -> bool {
        self.contains(&name)
    }
}

/// No collections at all
impl CollectionIndex for () {
    fn has_collection(&self, _: &str) -> bool {
        false
    }
}

/// Result of a successful [`fuzzy_lookup`]
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved<'t> {
    /// A concrete entry of the table
    Entity(&'t NamedEntity),
    /// The member names of a collection
    Members(SmolStr),
}

impl<'t> Resolved<'t> {
    pub fn entity(&self) -> Option<&'t NamedEntity> {
        match self {
            Resolved::Entity(entity) => Some(entity),
            Resolved::Members(_) => None,
        }
    }
}

/// What a fallback rule asks the lookup to try next
enum Fallback {
    /// Look up a different name, with all fallbacks
    Retry(String),
    /// Resolve to the member names of this collection
    Members(SmolStr),
    /// Take this exact entry if present, without further fallback
    Entry(String),
}

struct FallbackContext<'t, 'c> {
    table: &'t EntityTable,
    collections: &'c dyn CollectionIndex,
}

struct FallbackRule {
    name: &'static str,
    apply: fn(&str, &FallbackContext<'_, '_>) -> Option<Fallback>,
}

/// Fallbacks tried in order when a name has no entry of its own
const FALLBACK_RULES: &[FallbackRule] = &[
    FallbackRule {
        name: "strip-default",
        apply: strip_default,
    },
    FallbackRule {
        name: "strip-supported",
        apply: strip_supported,
    },
    FallbackRule {
        name: "strip-actual",
        apply: strip_actual,
    },
    FallbackRule {
        name: "strip-supplied",
        apply: strip_supplied,
    },
    FallbackRule {
        name: "document-state-reasons",
        apply: document_state_reasons,
    },
    FallbackRule {
        name: "document-state",
        apply: document_state,
    },
    FallbackRule {
        name: "plural-state",
        apply: plural_state,
    },
    FallbackRule {
        name: "strip-output-device",
        apply: strip_output_device,
    },
    FallbackRule {
        name: "redirect",
        apply: redirect,
    },
    FallbackRule {
        name: "supported-entry",
        apply: supported_entry,
    },
];

fn strip_default(name: &str, _: &FallbackContext<'_, '_>) -> Option<Fallback> {
    name.strip_suffix("-default")
        .map(|base| Fallback::Retry(base.to_string()))
}

/// `x-supported` lists the member names of collection `x`, else the values of `x`
fn strip_supported(name: &str, ctx: &FallbackContext<'_, '_>) -> Option<Fallback> {
    let base = name.strip_suffix("-supported")?;
    if ctx.collections.has_collection(base) {
        Some(Fallback::Members(base.into()))
    } else {
        Some(Fallback::Retry(base.to_string()))
    }
}

fn strip_actual(name: &str, _: &FallbackContext<'_, '_>) -> Option<Fallback> {
    name.strip_suffix("-actual")
        .map(|base| Fallback::Retry(base.to_string()))
}

fn strip_supplied(name: &str, _: &FallbackContext<'_, '_>) -> Option<Fallback> {
    name.strip_suffix("-supplied")
        .map(|base| Fallback::Retry(base.to_string()))
}

fn document_state_reasons(name: &str, _: &FallbackContext<'_, '_>) -> Option<Fallback> {
    name.ends_with("-document-state-reasons")
        .then(|| Fallback::Retry("document-state-reasons".to_string()))
}

fn document_state(name: &str, _: &FallbackContext<'_, '_>) -> Option<Fallback> {
    name.ends_with("-document-state")
        .then(|| Fallback::Retry("document-state".to_string()))
}

fn plural_state(name: &str, _: &FallbackContext<'_, '_>) -> Option<Fallback> {
    name.ends_with("-state")
        .then(|| Fallback::Retry(format!("{name}s")))
}

fn strip_output_device(name: &str, _: &FallbackContext<'_, '_>) -> Option<Fallback> {
    name.strip_prefix("output-device-")
        .map(|rest| Fallback::Retry(rest.to_string()))
}

fn redirect(name: &str, _: &FallbackContext<'_, '_>) -> Option<Fallback> {
    overrides::FALLBACK_REDIRECTS
        .iter()
        .find(|(from, _)| *from == name)
        .map(|(_, to)| Fallback::Retry(to.to_string()))
}

fn supported_entry(name: &str, ctx: &FallbackContext<'_, '_>) -> Option<Fallback> {
    let supported = format!("{name}-supported");
    ctx.table
        .contains_key(supported.as_str())
        .then_some(Fallback::Entry(supported))
}

/// Resolve `name` against `table`.
///
/// An exact entry wins; an entry that is itself a by-name reference is
/// followed. Otherwise each fallback rule that applies is tried in order and
/// the first one that resolves is returned. Names are never revisited, so
/// reference cycles resolve to `None`.
pub fn fuzzy_lookup<'t>(
    table: &'t EntityTable,
    name: &str,
    collections: &dyn CollectionIndex,
) -> Option<Resolved<'t>> {
    let ctx = FallbackContext { table, collections };
    let mut visited = HashSet::new();
    lookup(&ctx, name, &mut visited, 0)
}

fn lookup<'t>(
    ctx: &FallbackContext<'t, '_>,
    name: &str,
    visited: &mut HashSet<String>,
    depth: usize,
) -> Option<Resolved<'t>> {
    if depth > MAX_LOOKUP_DEPTH || !visited.insert(name.to_string()) {
        tracing::debug!(name, "lookup cycle or depth limit");
        return None;
    }

    if let Some(entity) = ctx.table.get(name) {
        if let Some(target) = entity.reference.as_ref().and_then(Reference::name) {
            return lookup(ctx, target, visited, depth + 1);
        }
        return settle(entity);
    }

    for rule in FALLBACK_RULES {
        let Some(fallback) = (rule.apply)(name, ctx) else {
            continue;
        };
        tracing::trace!(rule = rule.name, name, "trying lookup fallback");
        let found = match fallback {
            Fallback::Retry(next) => lookup(ctx, &next, visited, depth + 1),
            Fallback::Members(collection) => return Some(Resolved::Members(collection)),
            Fallback::Entry(entry) => ctx.table.get(entry.as_str()).and_then(settle),
        };
        if found.is_some() {
            return found;
        }
    }
    None
}

/// A found entry with no by-name reference left to follow
fn settle(entity: &NamedEntity) -> Option<Resolved<'_>> {
    if entity.bad {
        return None;
    }
    match &entity.reference {
        Some(Reference::ByMembers { collection }) => Some(Resolved::Members(collection.clone())),
        _ => Some(Resolved::Entity(entity)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::Syntax;

    fn keyword(name: &str) -> NamedEntity {
        let mut entity = NamedEntity::new(name, Syntax::normalize("keyword"));
        entity.values.insert_keyword("value");
        entity
    }

    fn table(entities: impl IntoIterator<Item = NamedEntity>) -> EntityTable {
        entities
            .into_iter()
            .map(|entity| (entity.name.clone(), entity))
            .collect()
    }

    fn resolved_name(resolved: Option<Resolved<'_>>) -> Option<String> {
        resolved.and_then(|r| r.entity()).map(|e| e.name.to_string())
    }

    #[test]
    fn test_keyword_value_phrase() {
        assert_eq!(
            parse_reference_phrase("< any \"media\" keyword value >"),
            Some(Reference::by_name("media"))
        );
        assert_eq!(
            parse_reference_phrase("<Any \"job-state-reasons\" values>"),
            Some(Reference::by_name("job-state-reasons"))
        );
    }

    #[test]
    fn test_family_keyword_name_phrase_uses_alias() {
        assert_eq!(
            parse_reference_phrase("< any Printer attribute keyword name >"),
            Some(Reference::by_group("Printer Description"))
        );
        assert_eq!(
            parse_reference_phrase("< any Job Template attribute keyword name >"),
            Some(Reference::by_group("Job Template"))
        );
    }

    #[test]
    fn test_specific_templates_win_over_loose_family() {
        // Would also match the loose "... attribute" template
        assert_eq!(
            parse_reference_phrase("< any \"cover-back\" Job Template attribute >"),
            Some(Reference::by_name("cover-back"))
        );
        assert_eq!(
            parse_reference_phrase("< any media-col member attribute name >"),
            Some(Reference::by_members("media-col"))
        );
        assert_eq!(
            parse_reference_phrase("< Any Job Template attribute >"),
            Some(Reference::by_group("Job Template"))
        );
    }

    #[test]
    fn test_collection_alias_phrase() {
        assert_eq!(
            parse_reference_phrase(
                "<Member attributes are the same as the \"media-col\" Job Template attribute>"
            ),
            Some(Reference::ByCollectionAlias {
                collection: "media-col".into(),
                family: Some("Job Template".into()),
            })
        );
    }

    #[test]
    fn test_corrections_and_media_phrases() {
        assert_eq!(
            parse_reference_phrase("< any \"media\" color name >"),
            Some(Reference::by_name("media-color"))
        );
        assert_eq!(
            parse_reference_phrase("< any media size name value >"),
            Some(Reference::by_name("media"))
        );
        assert_eq!(
            parse_reference_phrase("< any \"job-default-output-until\" keyword value >"),
            Some(Reference::by_name("job-delay-output-until"))
        );
        assert_eq!(
            parse_reference_phrase("< Member attributes are the same as the \"media-col\" >"),
            Some(Reference::ByCollectionAlias {
                collection: "media-col".into(),
                family: Some("Job Template".into()),
            })
        );
        assert_eq!(
            parse_reference_phrase("<Any \"cover-front\">"),
            Some(Reference::by_name("cover-front"))
        );
    }

    #[test]
    fn test_unparseable_phrase() {
        assert_eq!(parse_reference_phrase("see the printer documentation"), None);

        let mut target = keyword("x");
        assert!(!assign_reference("see the printer documentation", &mut target));
        assert!(target.reference.is_none());
        assert!(assign_reference("< any \"media\" keyword value >", &mut target));
        assert_eq!(target.reference, Some(Reference::by_name("media")));
    }

    #[test]
    fn test_enum_reference_phrases() {
        assert_eq!(
            parse_enum_reference("< any \"finishings\" enum value >"),
            Some(Reference::by_name("finishings"))
        );
        assert_eq!(parse_enum_reference("3"), None);
        assert_eq!(
            enum_label_reference("Values are the same as the \"printer-state\" attribute"),
            Some("printer-state".into())
        );
    }

    #[test]
    fn test_fuzzy_lookup_exact_and_followed() {
        let mut alias = keyword("output-bin-default");
        alias.reference = Some(Reference::by_name("output-bin"));
        let table = table([keyword("output-bin"), alias]);

        assert_eq!(resolved_name(fuzzy_lookup(&table, "output-bin", &())), Some("output-bin".into()));
        assert_eq!(
            resolved_name(fuzzy_lookup(&table, "output-bin-default", &())),
            Some("output-bin".into())
        );
    }

    #[test]
    fn test_fuzzy_lookup_name_override() {
        let table = table([keyword("media")]);
        assert_eq!(
            resolved_name(fuzzy_lookup(&table, "media-size-name", &())),
            Some("media".into())
        );
    }

    #[test]
    fn test_supported_prefers_collection_members() {
        let with_collection = table([keyword("job-sheets-type")]);
        let collections = vec!["job-sheets"];

        assert_eq!(
            fuzzy_lookup(&with_collection, "job-sheets-supported", &collections),
            Some(Resolved::Members("job-sheets".into()))
        );

        // Without the collection the base name is looked up instead
        let plain = table([keyword("job-sheets")]);
        assert_eq!(
            resolved_name(fuzzy_lookup(&plain, "job-sheets-supported", &())),
            Some("job-sheets".into())
        );
    }

    #[test]
    fn test_fuzzy_lookup_suffix_chain() {
        let table = table([
            keyword("job-states"),
            keyword("document-state-reasons"),
            keyword("media-type"),
            keyword("print-quality-supported"),
            keyword("job-error-sheet-type"),
        ]);

        let cases = [
            ("job-state", "job-states"),
            ("job-state-actual", "job-states"),
            ("output-document-state-reasons", "document-state-reasons"),
            ("output-device-media-type-supplied", "media-type"),
            ("print-quality", "print-quality-supported"),
            ("job-error-sheet-supported", "job-error-sheet-type"),
        ];
        for (name, expected) in cases {
            assert_eq!(
                resolved_name(fuzzy_lookup(&table, name, &())),
                Some(expected.to_string()),
                "{name}"
            );
        }
        assert!(fuzzy_lookup(&table, "no-such-attribute", &()).is_none());
    }

    #[test]
    fn test_fuzzy_lookup_rejects_cycles_and_bad_entries() {
        let mut a = keyword("a");
        a.reference = Some(Reference::by_name("b"));
        let mut b = keyword("b");
        b.reference = Some(Reference::by_name("a"));
        let mut broken = keyword("broken");
        broken.bad = true;
        let table = table([a, b, broken]);

        assert!(fuzzy_lookup(&table, "a", &()).is_none());
        assert!(fuzzy_lookup(&table, "broken", &()).is_none());
        assert!(fuzzy_lookup(&table, "broken-default", &()).is_none());
    }

    #[test]
    fn test_fuzzy_lookup_depth_limit() {
        let hops = MAX_LOOKUP_DEPTH + 4;
        let mut chain: Vec<NamedEntity> = (0..hops)
            .map(|i| {
                let mut link = keyword(&format!("link-{i}"));
                link.reference = Some(Reference::by_name(format!("link-{}", i + 1)));
                link
            })
            .collect();
        chain.push(keyword(&format!("link-{hops}")));
        let table = table(chain);

        assert!(fuzzy_lookup(&table, "link-0", &()).is_none());
        // Close enough to the end of the chain to stay under the limit
        assert_eq!(
            resolved_name(fuzzy_lookup(&table, &format!("link-{}", hops - 3), &())),
            Some(format!("link-{hops}"))
        );
    }

    #[test]
    fn test_members_reference_resolves_to_collection() {
        let mut ready = NamedEntity::new("media-col-ready-names", Syntax::normalize("keyword"));
        assert!(assign_reference("< any media-col member attribute name >", &mut ready));
        let mut alias = keyword("media-col-ready-names-default");
        alias.reference = Some(Reference::by_name("media-col-ready-names"));
        let table = table([ready, alias]);

        assert_eq!(
            fuzzy_lookup(&table, "media-col-ready-names", &()),
            Some(Resolved::Members("media-col".into()))
        );
        assert_eq!(
            fuzzy_lookup(&table, "media-col-ready-names-default", &()),
            Some(Resolved::Members("media-col".into()))
        );
    }
}
