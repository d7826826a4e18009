use crate::error::{RegistryError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Settings read from an `ipp-typegen.kdl` file
///
/// ```kdl
/// input "build/ipp-registrations.json"
/// output "build/ipp-model.json"
/// deny-warnings #false
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub deny_warnings: bool,
}

impl Config {
    pub fn from_kdl(text: &str) -> Result<Self> {
        let doc = text
            .parse::<kdl::KdlDocument>()
            .map_err(|e| RegistryError::config(format!("Failed to parse KDL: {e}")))?;

        let mut config = Config::default();
        for node in doc.nodes() {
            match node.name().value() {
                "input" => config.input = Some(PathBuf::from(string_arg(node)?)),
                "output" => config.output = Some(PathBuf::from(string_arg(node)?)),
                "deny-warnings" => config.deny_warnings = bool_arg(node)?,
                other => {
                    return Err(RegistryError::config(format!("Unknown config node: {other}")));
                }
            }
        }
        Ok(config)
    }

    /// Read and parse a config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(RegistryError::config(format!(
                "config file {} not found",
                path.display()
            )));
        }
        let text = fs::read_to_string(path)?;
        Self::from_kdl(&text)
    }
}

fn string_arg(node: &kdl::KdlNode) -> Result<&str> {
    node.entries()
        .first()
        .and_then(|e| e.value().as_string())
        .ok_or_else(|| {
            RegistryError::config(format!("{} expects a string value", node.name().value()))
        })
}

fn bool_arg(node: &kdl::KdlNode) -> Result<bool> {
    match node.entries().first() {
        None => Ok(true),
        Some(entry) => entry.value().as_bool().ok_or_else(|| {
            RegistryError::config(format!("{} expects a boolean value", node.name().value()))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config = Config::from_kdl(
            r#"
            input "build/ipp-registrations.json"
            output "build/ipp-model.json"
            deny-warnings #true
            "#,
        )
        .unwrap();
        assert_eq!(config.input, Some(PathBuf::from("build/ipp-registrations.json")));
        assert_eq!(config.output, Some(PathBuf::from("build/ipp-model.json")));
        assert!(config.deny_warnings);
    }

    #[test]
    fn test_bare_flag_and_defaults() {
        let config = Config::from_kdl("deny-warnings").unwrap();
        assert!(config.deny_warnings);
        assert_eq!(config.input, None);

        assert_eq!(Config::from_kdl("").unwrap(), Config::default());
    }

    #[test]
    fn test_rejects_unknown_nodes_and_bad_values() {
        let err = Config::from_kdl(r#"templates "templates/""#).unwrap_err();
        assert!(err.to_string().contains("Unknown config node: templates"));

        let err = Config::from_kdl("input 42").unwrap_err();
        assert!(err.to_string().contains("input expects a string value"));

        assert!(Config::from_kdl("input \"unterminated").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ipp-typegen.kdl");
        fs::write(&path, "output \"model.json\"\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.output, Some(PathBuf::from("model.json")));
        assert!(!config.deny_warnings);

        assert!(Config::load(dir.path().join("missing.kdl")).is_err());
    }
}
