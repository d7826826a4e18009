use crate::error::{Warning, WarningKind};
use std::fmt::Debug;

/// Accumulates warnings raised while resolving one registry run
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a warning, attaching a pretty-printed subject
    pub fn warn<S: Debug + ?Sized>(
        &mut self,
        kind: WarningKind,
        message: impl Into<String>,
        subject: Option<&S>,
    ) {
        let message = message.into();
        let subject = subject.map(|s| format!("{s:#?}"));
        tracing::warn!(kind = ?kind, "{}", message);
        self.warnings.push(Warning::new(kind, message, subject));
    }

    /// Record a warning with no subject
    pub fn note(&mut self, kind: WarningKind, message: impl Into<String>) {
        self.warn::<()>(kind, message, None);
    }

    /// Append warnings collected elsewhere, keeping their order
    pub fn extend(&mut self, other: Diagnostics) {
        self.warnings.extend(other.warnings);
    }

    pub fn len(&self) -> usize {
        self.warnings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn count(&self, kind: WarningKind) -> usize {
        self.warnings.iter().filter(|w| w.kind() == kind).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Warning> {
        self.warnings.iter()
    }

    pub fn into_warnings(self) -> Vec<Warning> {
        self.warnings
    }
}
