//! Per-source listing layout, loaded from `config/sources.yaml`.
//!
//! Each bank lays out its partner listing differently, so the extractor is
//! driven by CSS selectors declared here rather than by per-bank code.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Where to read one field from inside an entry element.
///
/// A bare string is a CSS selector whose element text is used; the map form
/// reads an attribute of the matched element instead. A map without a
/// `selector` reads the attribute from the entry element itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldSelector {
    Text(String),
    Attr {
        #[serde(default)]
        selector: Option<String>,
        attr: String,
    },
}

impl FieldSelector {
    /// The CSS selector, or `None` when the entry element itself is read.
    #[must_use]
    pub fn selector(&self) -> Option<&str> {
        match self {
            FieldSelector::Text(selector) => Some(selector),
            FieldSelector::Attr { selector, .. } => selector.as_deref(),
        }
    }

    #[must_use]
    pub fn attr(&self) -> Option<&str> {
        match self {
            FieldSelector::Text(_) => None,
            FieldSelector::Attr { attr, .. } => Some(attr),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSelectors {
    pub name: FieldSelector,
    pub phone: Option<FieldSelector>,
    pub address: Option<FieldSelector>,
    pub city: Option<FieldSelector>,
    pub category: Option<FieldSelector>,
    pub cashback: Option<FieldSelector>,
    pub miles: Option<FieldSelector>,
    /// May match several elements; every term found in any of them is kept.
    pub installments: Option<FieldSelector>,
    pub popularity: Option<FieldSelector>,
}

impl FieldSelectors {
    /// All configured selectors with their field names, for validation and
    /// compilation.
    #[must_use]
    pub fn configured(&self) -> Vec<(&'static str, &FieldSelector)> {
        let mut out = vec![("name", &self.name)];
        let optional = [
            ("phone", &self.phone),
            ("address", &self.address),
            ("city", &self.city),
            ("category", &self.category),
            ("cashback", &self.cashback),
            ("miles", &self.miles),
            ("installments", &self.installments),
            ("popularity", &self.popularity),
        ];
        out.extend(
            optional
                .into_iter()
                .filter_map(|(field, sel)| sel.as_ref().map(|s| (field, s))),
        );
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Short identifier, also used as the per-source table file stem.
    pub name: String,
    /// `http(s)://` URL, `file://` URL, or a filesystem path to a saved page.
    pub url: String,
    /// Selector for one repeated partner entry.
    pub entry_selector: String,
    pub fields: FieldSelectors,
    /// Selector for the "next page" link; its `href` is followed.
    pub next_page_selector: Option<String>,
    /// Overrides the global pagination ceiling for this source.
    pub max_pages: Option<usize>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SourcesFile {
    pub sources: Vec<SourceConfig>,
}

impl SourcesFile {
    /// Finds a source by case-insensitive name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&SourceConfig> {
        self.sources
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name))
    }
}

/// Load and validate the source definitions from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_sources(path: &Path) -> Result<SourcesFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SourcesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let sources_file: SourcesFile =
        serde_yaml::from_str(&content).map_err(ConfigError::SourcesFileParse)?;

    validate_sources(&sources_file)?;

    Ok(sources_file)
}

fn validate_sources(sources_file: &SourcesFile) -> Result<(), ConfigError> {
    if sources_file.sources.is_empty() {
        return Err(ConfigError::Validation(
            "at least one source must be configured".to_string(),
        ));
    }

    let mut seen_names = HashSet::new();

    for source in &sources_file.sources {
        let name = source.name.trim();
        if name.is_empty() {
            return Err(ConfigError::Validation(
                "source name must be non-empty".to_string(),
            ));
        }

        if !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ConfigError::Validation(format!(
                "source name '{name}' may only contain ASCII letters, digits, '-' and '_'"
            )));
        }

        if !seen_names.insert(name.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate source name: '{name}'"
            )));
        }

        if source.url.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "source '{name}' has an empty url"
            )));
        }

        if source.entry_selector.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "source '{name}' has an empty entry_selector"
            )));
        }

        for (field, selector) in source.fields.configured() {
            if selector.selector().is_some_and(|s| s.trim().is_empty()) {
                return Err(ConfigError::Validation(format!(
                    "source '{name}' has an empty selector for field '{field}'"
                )));
            }
            if selector.attr().is_some_and(|a| a.trim().is_empty()) {
                return Err(ConfigError::Validation(format!(
                    "source '{name}' has an empty attribute name for field '{field}'"
                )));
            }
        }

        if source.max_pages == Some(0) {
            return Err(ConfigError::Validation(format!(
                "source '{name}' has max_pages 0; must be at least 1"
            )));
        }
    }

    Ok(())
}
