//! Pattern catalog
//!
//! The ordered list of target patterns. It is read once at startup from a
//! JSON file of the form `{"models": [{"name": "...", "grid": [[0, 1], ...]}]}`
//! and never changes afterwards, so it is shared behind a plain `Arc`.

use crate::error::CatalogError;
use log::info;
use serde::Deserialize;
use shared::Pattern;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct CatalogFile {
    models: Vec<PatternDef>,
}

#[derive(Debug, Deserialize)]
struct PatternDef {
    #[serde(default)]
    name: String,
    grid: Pattern,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedPattern {
    pub name: String,
    pub pattern: Pattern,
}

impl NamedPattern {
    pub fn new(name: impl Into<String>, pattern: Pattern) -> Self {
        Self {
            name: name.into(),
            pattern,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PatternCatalog {
    patterns: Vec<NamedPattern>,
}

impl PatternCatalog {
    /// Builds a catalog, rejecting empty catalogs and empty or ragged patterns.
    pub fn new(patterns: Vec<NamedPattern>) -> Result<Self, CatalogError> {
        if patterns.is_empty() {
            return Err(CatalogError::Empty);
        }

        for (index, named) in patterns.iter().enumerate() {
            if named.pattern.height() == 0 || named.pattern.width() == 0 {
                return Err(CatalogError::EmptyPattern {
                    index,
                    name: named.name.clone(),
                });
            }
            if let Some(row) = named.pattern.ragged_row() {
                return Err(CatalogError::Ragged {
                    index,
                    name: named.name.clone(),
                    row,
                });
            }
        }

        Ok(Self { patterns })
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        Self::new(
            file.models
                .into_iter()
                .map(|def| NamedPattern::new(def.name, def.grid))
                .collect(),
        )
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let catalog = Self::from_json(&json)?;
        info!(
            "Loaded {} patterns from {}",
            catalog.len(),
            path.display()
        );
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&NamedPattern> {
        self.patterns.get(index)
    }

    /// The pattern at `index`.
    ///
    /// Panics if `index` is out of range; the engine only holds indices it
    /// got from this catalog.
    pub fn pattern(&self, index: usize) -> &Pattern {
        &self.patterns[index].pattern
    }

    pub fn iter(&self) -> impl Iterator<Item = &NamedPattern> {
        self.patterns.iter()
    }

    /// Index of the pattern after `index`, wrapping at the end.
    pub fn next_index(&self, index: usize) -> usize {
        (index + 1) % self.patterns.len()
    }
}
