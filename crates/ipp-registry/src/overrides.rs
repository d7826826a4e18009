//! Known irregularities of the IANA IPP registry.
//!
//! The registry is edited by hand and carries typos, missing entries and
//! phrasing that the general rules cannot handle. Every correction lives in
//! one of the tables below so it can be audited apart from the algorithms
//! that consult it.

/// Grammars that are simply wrong in the registry, replaced by attribute name
pub const SYNTAX_OVERRIDES: &[(&str, &str)] = &[("input-orientation-requested", "enum")];

/// Textual fixes applied to every grammar before normalization
pub const SYNTAX_CORRECTIONS: &[(&str, &str)] = &[("type2 num", "type2 enum"), ("1set Of", "1setOf")];

/// Tokens removed from grammars wherever they occur
pub const SYNTAX_NOISE: &[&str] = &["(MAX)", "type1", "type2", "type3"];

/// Multiplicity marker
pub const SET_MARKER: &str = "1setOf";

/// Alternatives accepted everywhere, dropped from alternations
pub const IGNORED_ALTERNATIVES: &[&str] = &["no-value", "unknown"];

pub fn syntax_override(name: &str) -> Option<&'static str> {
    SYNTAX_OVERRIDES
        .iter()
        .find(|(attribute, _)| *attribute == name)
        .map(|(_, syntax)| *syntax)
}

/// Reference phrases that all mean "any media keyword"
pub const MEDIA_PHRASES: &[&str] = &[
    "\"media\" media or size keyword value",
    "\"media\" input tray keyword value",
    "media size name value",
];

/// Regex substitutions applied to reference prose before matching
pub const PHRASE_CORRECTIONS: &[(&str, &str)] = &[
    (r#""media" color name$"#, "media-color name"),
    ("job-default-output-until", "job-delay-output-until"),
    (r#" the "media-col"$"#, r#" the "media-col" Job Template attribute"#),
    (r#" the "separator-sheets"$"#, r#" the "separator-sheets" Job Template attribute"#),
    (r#" the "cover-back"$"#, r#" the "cover-back" Job Template attribute"#),
    (r#" the "cover-front"$"#, r#" the "cover-front" Job Template attribute"#),
];

/// Family names used in prose that differ from the registry family title
pub const FAMILY_ALIASES: &[(&str, &str)] = &[("Printer", "Printer Description")];

pub fn family_alias(family: &str) -> &str {
    FAMILY_ALIASES
        .iter()
        .find(|(alias, _)| *alias == family)
        .map_or(family, |(_, real)| *real)
}

/// How an enumeration is redirected by name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumRedirect {
    /// Enumerations named with this prefix share the target's values
    Prefix(&'static str, &'static str),
    /// This enumeration is the target; its own records are ignored
    Exact(&'static str, &'static str),
}

pub const ENUM_REDIRECTS: &[EnumRedirect] = &[
    EnumRedirect::Prefix("job-finishings", "finishings"),
    EnumRedirect::Exact("fetch-status-code", "status"),
];

/// Name of the synthetic enumeration holding status codes
pub const STATUS_ENUM: &str = "status";

/// Last-resort redirects tried by fuzzy lookup after every other fallback
pub const FALLBACK_REDIRECTS: &[(&str, &str)] = &[
    ("job-error-sheet", "job-error-sheet-type"),
    ("separator-sheets", "separator-sheets-type"),
    ("job-accounting-sheets", "job-accounting-sheets-type"),
    ("notify-status-code", STATUS_ENUM),
    ("media-key", "media"),
    ("media-size-name", "media"),
];

/// Attributes whose keywords are a subset of another keyword, looked up under that name
pub const LOOKUP_ALIASES: &[(&str, &str)] = &[
    ("media-key", "media"),
    ("media-key-supported", "media"),
    ("media-size-name", "media"),
];

pub fn lookup_alias(name: &str) -> &str {
    LOOKUP_ALIASES
        .iter()
        .find(|(alias, _)| *alias == name)
        .map_or(name, |(_, real)| *real)
}

/// Grammars corrected at type inference time: (attribute, documented, actual)
pub const INFERENCE_SYNTAX_OVERRIDES: &[(&str, &str, &str)] =
    &[("job-collation-type-actual", "keyword", "enum")];

/// Attributes modeled as opaque key/value blocks
pub const KEY_VALUE_TYPE_NAMES: &[&str] = &[
    "document-metadata",
    "printer-alert",
    "printer-finisher",
    "printer-finisher-supplies",
    "printer-input-tray",
    "printer-output-tray",
    "printer-supply",
];

/// Collections with too many possible members to model
pub const UNTYPED_COLLECTIONS: &[&str] = &["destination-attributes", "preferred-attributes"];

/// Names ending in `s` that are not plurals
pub const NONPLURALS: &[&str] = &["sides", "status", "print-supports", "details", "which-jobs"];

/// A keyword missing from the registry listing
#[derive(Debug, Clone, Copy)]
pub struct SyntheticKeyword {
    pub name: &'static str,
    pub spec: &'static str,
    pub syntax: &'static str,
    pub values: &'static [&'static str],
    pub empty_ok: bool,
    /// Legal values are the member names of this collection
    pub members_of: Option<&'static str>,
}

pub const SYNTHETIC_KEYWORDS: &[SyntheticKeyword] = &[
    SyntheticKeyword {
        name: "printer-kind",
        spec: "PWG5100.16",
        syntax: "keyword",
        values: &[
            "disc",
            "document",
            "envelope",
            "label",
            "large-format",
            "photo",
            "postcard",
            "receipt",
            "roll",
        ],
        empty_ok: false,
        members_of: None,
    },
    // No values are registered, only names
    SyntheticKeyword {
        name: "preset-name",
        spec: "IPPPRESET",
        syntax: "keyword | name",
        values: &[],
        empty_ok: true,
        members_of: None,
    },
    SyntheticKeyword {
        name: "destination-mandatory-access-attributes",
        spec: "PWG5100.17",
        syntax: "keyword",
        values: &[],
        empty_ok: false,
        members_of: Some("destination-accesses"),
    },
    // Also every settable printer attribute name
    SyntheticKeyword {
        name: "printer-settable-attributes-supported",
        spec: "RFC3380",
        syntax: "keyword",
        values: &["none"],
        empty_ok: false,
        members_of: None,
    },
    // Also every attribute settable on a job operation
    SyntheticKeyword {
        name: "job-settable-attributes-supported",
        spec: "RFC3380",
        syntax: "keyword",
        values: &["none"],
        empty_ok: false,
        members_of: None,
    },
];

/// A member that the registry omits but documents elsewhere
#[derive(Debug, Clone, Copy)]
pub struct MemberPatch {
    pub family: &'static str,
    pub collection: &'static str,
    pub member: &'static str,
    /// Collection in the same family to copy the member from
    pub source: &'static str,
}

pub const MEMBER_PATCHES: &[MemberPatch] = &[MemberPatch {
    family: "Job Template",
    collection: "finishings-col",
    member: "media-size",
    source: "media-col",
}];

/// Memberless collections whose name starts with a prefix share the members of a root collection
pub const COLLECTION_PREFIX_ALIASES: &[(&str, &str)] = &[
    ("materials-col-", "materials-col"),
    ("finishings-col-", "finishings-col"),
];

/// What to do with a collection that has no members and no alias
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberlessException {
    /// Kept as-is and typed as an untyped collection
    Keep,
    /// Obsolete; dropped without a warning
    DropSilently,
}

pub const MEMBERLESS_EXCEPTIONS: &[(&str, MemberlessException)] = &[
    ("preferred-attributes", MemberlessException::Keep),
    ("document-overrides-actual", MemberlessException::DropSilently),
];

pub fn memberless_exception(name: &str) -> Option<MemberlessException> {
    MEMBERLESS_EXCEPTIONS
        .iter()
        .find(|(attribute, _)| *attribute == name)
        .map(|(_, exception)| *exception)
}

/// Syntax disagreements between families that unify instead of conflicting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxUnion {
    /// These two grammars unify to `result`
    Pair {
        a: &'static str,
        b: &'static str,
        result: &'static str,
    },
    /// A bounded variant such as `uri(45)` unifies with the bare base
    Bounded { base: &'static str },
    /// Single-valued and `1setOf` of the same grammar unify as a set
    SetWidening,
}

pub const SYNTAX_UNIONS: &[SyntaxUnion] = &[
    SyntaxUnion::Pair {
        a: "name",
        b: "keyword | name",
        result: "keyword | name",
    },
    SyntaxUnion::Bounded { base: "uri" },
    SyntaxUnion::Bounded { base: "integer" },
    SyntaxUnion::SetWidening,
];

/// Base of the URI for a cited RFC
pub const RFC_URI_BASE: &str = "http://www.iana.org/go/";
