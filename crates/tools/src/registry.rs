//! Tool registry: name → typed handler dispatch table.

use std::collections::HashMap;

use crate::builtin::sql;
use crate::{Error, Result, ToolKind, ToolSettings, ToolSpec};

/// The fixed set of tools available to one session.
///
/// Lookups are by name; registration order only decides catalogue order.
#[derive(Debug, Default)]
pub struct ToolRegistry {
    specs: Vec<ToolSpec>,
    kinds: Vec<ToolKind>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the four built-in tools.
    ///
    /// Fails if `execute_sql` has no usable database configured.
    pub fn builtin(settings: &ToolSettings) -> Result<Self> {
        match settings.database_url.as_deref() {
            Some(url) if !url.is_empty() => {
                sql::database_path(url).map_err(Error::Config)?;
            }
            _ => {
                return Err(Error::Config(
                    "database_url is required for execute_sql".into(),
                ));
            }
        }

        let mut registry = Self::new();
        for kind in ToolKind::ALL {
            registry.register(kind.spec(settings), kind)?;
        }
        Ok(registry)
    }

    /// Register a tool under `spec.name`.
    pub fn register(&mut self, spec: ToolSpec, kind: ToolKind) -> Result<()> {
        if self.index.contains_key(&spec.name) {
            return Err(Error::DuplicateTool(spec.name));
        }
        self.index.insert(spec.name.clone(), self.specs.len());
        self.specs.push(spec);
        self.kinds.push(kind);
        Ok(())
    }

    /// The model-facing catalogue, in registration order.
    pub fn describe(&self) -> &[ToolSpec] {
        &self.specs
    }

    /// Find a tool by name.
    pub fn lookup(&self, name: &str) -> Option<(&ToolSpec, ToolKind)> {
        let i = *self.index.get(name)?;
        Some((&self.specs[i], self.kinds[i]))
    }

    /// Registered names, in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.specs.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_registers_all_tools_in_order() {
        let registry = ToolRegistry::builtin(&ToolSettings::with_database("app.db")).unwrap();
        assert_eq!(
            registry.names(),
            ["run_command", "read_file", "write_file", "execute_sql"]
        );
        let (spec, kind) = registry.lookup("write_file").unwrap();
        assert_eq!(kind, ToolKind::WriteFile);
        assert_eq!(spec.fields.len(), 2);
    }

    #[test]
    fn builtin_requires_database() {
        let err = ToolRegistry::builtin(&ToolSettings::default()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn builtin_rejects_non_sqlite_urls() {
        let settings = ToolSettings::with_database("postgresql://postgres:pw@db.example.co:5432/postgres");
        let err = ToolRegistry::builtin(&settings).unwrap_err();
        assert!(matches!(err, Error::Config(msg) if msg.contains("only SQLite")));

        assert!(ToolRegistry::builtin(&ToolSettings::with_database("sqlite://app.db")).is_ok());
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let settings = ToolSettings::with_database("app.db");
        let mut registry = ToolRegistry::new();
        registry
            .register(ToolKind::ReadFile.spec(&settings), ToolKind::ReadFile)
            .unwrap();
        let err = registry
            .register(ToolKind::ReadFile.spec(&settings), ToolKind::ReadFile)
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateTool(name) if name == "read_file"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn unknown_lookup_is_none() {
        let registry = ToolRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.lookup("rm_rf").is_none());
    }
}
