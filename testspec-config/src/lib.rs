//! Shared configuration loader for the testspec toolchain.
//!
//! `defaults/testspec.default.toml` is embedded into every binary so that docs and
//! runtime behavior stay in sync. Applications layer user-specific files on top
//! of those defaults via [`Loader`] before deserializing into [`TestspecConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::Path;
use testspec_babel::common::grid::SheetLayout;
use testspec_babel::error::GrammarError;
use testspec_babel::format::ReadOptions;
use testspec_babel::grammar::{Grammar, GrammarSpec};

const DEFAULT_TOML: &str = include_str!("../defaults/testspec.default.toml");

/// Top-level configuration consumed by testspec applications.
#[derive(Debug, Clone, Deserialize)]
pub struct TestspecConfig {
    /// The Markdown dialect: column names, read patterns, write markers.
    pub markdown: GrammarSpec,
    pub sheet: SheetConfig,
}

impl TestspecConfig {
    /// Compile the configured dialect.
    pub fn grammar(&self) -> Result<Grammar, GrammarError> {
        Grammar::try_from(self.markdown.clone())
    }
}

/// Where things live on a sheet and which sheets to skip.
#[derive(Debug, Clone, Deserialize)]
pub struct SheetConfig {
    pub summary_column: usize,
    pub min_offset_rows: usize,
    pub ignored_sheets: Vec<String>,
    pub cover_sheet: String,
    /// Category used when neither the command line nor a cover sheet provides one
    pub default_category: String,
}

impl From<&SheetConfig> for SheetLayout {
    fn from(config: &SheetConfig) -> Self {
        SheetLayout {
            summary_column: config.summary_column,
            min_offset_rows: config.min_offset_rows,
        }
    }
}

impl From<&SheetConfig> for ReadOptions {
    fn from(config: &SheetConfig) -> Self {
        ReadOptions {
            ignored_sheets: config.ignored_sheets.clone(),
            cover_sheet: config.cover_sheet.clone(),
        }
    }
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (useful for CLI settings).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<TestspecConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<TestspecConfig, ConfigError> {
    Loader::new().build()
}
