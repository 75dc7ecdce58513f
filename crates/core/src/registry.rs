// SPDX-License-Identifier: GPL-3.0-or-later

// src/registry.rs
//
// Named experiment configs. Listing and building a config never builds its model.
//
use crate::config::{hello_world, ExperimentConfig};
use crate::error::{MedimgError, Result};

/// One registered experiment.
#[derive(Debug, Clone, Copy)]
pub struct ConfigEntry {
    pub name: &'static str,
    pub description: &'static str,
    build: fn() -> ExperimentConfig,
}

impl ConfigEntry {
    pub const fn new(
        name: &'static str,
        description: &'static str,
        build: fn() -> ExperimentConfig,
    ) -> Self {
        Self { name, description, build }
    }

    pub fn build(&self) -> ExperimentConfig {
        (self.build)()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConfigRegistry {
    entries: Vec<ConfigEntry>,
}

impl ConfigRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every experiment shipped with this crate.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(ConfigEntry::new(
            hello_world::NAME,
            "Dummy MedMNIST classifier for debugging",
            hello_world::hello_world_classification,
        ));
        registry
    }

    /// Add an entry. A later entry with the same name replaces the earlier one.
    pub fn register(&mut self, entry: ConfigEntry) {
        self.entries.retain(|e| e.name != entry.name);
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[ConfigEntry] {
        &self.entries
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|e| e.name).collect()
    }

    /// Build and validate the named config.
    pub fn create(&self, name: &str) -> Result<ExperimentConfig> {
        let entry = self
            .entries
            .iter()
            .find(|e| e.name == name)
            .ok_or_else(|| MedimgError::UnknownConfig(name.to_string()))?;
        let cfg = entry.build();
        cfg.validate()?;
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_lists_hello_world() {
        let registry = ConfigRegistry::builtin();
        assert_eq!(registry.names(), vec!["HelloWorldClassification"]);
        let cfg = registry.create("HelloWorldClassification").unwrap();
        assert_eq!(cfg.name, "HelloWorldClassification");
    }

    #[test]
    fn test_unknown_config() {
        let registry = ConfigRegistry::builtin();
        match registry.create("NoSuchConfig") {
            Err(MedimgError::UnknownConfig(name)) => assert_eq!(name, "NoSuchConfig"),
            other => panic!("expected UnknownConfig, got {:?}", other),
        }
    }

    #[test]
    fn test_register_replaces_same_name() {
        fn custom() -> ExperimentConfig {
            let mut cfg = hello_world::hello_world_classification();
            cfg.base.num_epochs = 10;
            cfg
        }
        let mut registry = ConfigRegistry::builtin();
        registry.register(ConfigEntry::new(hello_world::NAME, "longer run", custom));
        assert_eq!(registry.entries().len(), 1);
        assert_eq!(registry.create(hello_world::NAME).unwrap().base.num_epochs, 10);
    }

    #[test]
    fn test_invalid_entry_fails_on_create() {
        fn broken() -> ExperimentConfig {
            let mut cfg = hello_world::hello_world_classification();
            cfg.base.subject_column.clear();
            cfg
        }
        let mut registry = ConfigRegistry::new();
        registry.register(ConfigEntry::new("Broken", "", broken));
        assert!(matches!(
            registry.create("Broken"),
            Err(MedimgError::InvalidConfiguration(_))
        ));
    }
}
