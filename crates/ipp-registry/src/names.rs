//! Output names for resolved enumerations and keywords.

use crate::overrides::NONPLURALS;
use heck::ToPascalCase;

/// Drop a trailing plural `s`, unless the name ends in a known non-plural word
///
/// - `job-states` → `job-state`
/// - `sides` → `sides`
pub fn depluralize(name: &str) -> &str {
    if NONPLURALS.iter().any(|word| name.ends_with(word)) {
        return name;
    }
    name.strip_suffix('s').unwrap_or(name)
}

/// Name an enumeration is emitted under
///
/// `-supported` and `-requested` variants share one type with the base attribute.
pub fn enum_type_name(name: &str) -> String {
    let base = name
        .strip_suffix("-supported")
        .or_else(|| name.strip_suffix("-requested"))
        .unwrap_or(name);
    depluralize(base).to_string()
}

/// Name a keyword is emitted under
pub fn keyword_type_name(name: &str) -> String {
    depluralize(name).to_string()
}

/// Type name used when prose refers to an emitted definition, e.g. `JobState`
pub fn type_ref(name: &str) -> String {
    name.to_pascal_case()
}

/// Type name of an attribute family group, e.g. `JobTemplateGroup`
pub fn group_ref(family: &str) -> String {
    format!("{}Group", family.to_pascal_case())
}
