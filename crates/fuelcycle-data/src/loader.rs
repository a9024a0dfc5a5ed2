//! Reads a facility data directory and builds validated reactor configs.
//!
//! Provides format detection (RON/JSON/TOML), file discovery, deserialization
//! helpers, and [`load_facility_data`], which ties them together:
//!
//! - `reactors.{ron,toml,json}` (required): a list of [`ReactorData`].
//! - `recipes.{ron,toml,json}` (optional): a list of [`RecipeData`]. When
//!   present, every recipe a reactor names must be defined here.

use crate::schema::{ReactorData, RecipeData};
use fuelcycle_reactor::{ConfigError, Reactor, ReactorConfig};
use serde::de::DeserializeOwned;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

// ===========================================================================
// Errors
// ===========================================================================

/// Errors that can occur during data loading.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// A required data file was not found in the given directory.
    #[error("required file '{file}' not found in {dir}")]
    MissingRequired { file: &'static str, dir: PathBuf },

    /// The file has an extension we don't support.
    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// Two files with the same base name but different formats exist.
    #[error("conflicting formats: {a} and {b}")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    /// A deserialization error occurred.
    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// A name reference could not be resolved.
    #[error("unresolved {expected_kind} reference '{name}' in {file}")]
    UnresolvedRef {
        file: PathBuf,
        name: String,
        expected_kind: &'static str,
    },

    /// A duplicate name was found.
    #[error("duplicate name '{name}' in {file}")]
    DuplicateName { file: PathBuf, name: String },

    /// A reactor definition failed validation.
    #[error("invalid reactor '{name}' in {file}: {source}")]
    InvalidReactor {
        file: PathBuf,
        name: String,
        source: ConfigError,
    },

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Format detection
// ===========================================================================

/// Supported data file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

/// Detect the format of a file based on its extension.
pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => Ok(Format::Ron),
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        _ => Err(DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

// ===========================================================================
// File discovery
// ===========================================================================

/// Look for `{base_name}.ron`, `.toml` or `.json` in `dir`.
///
/// Returns `Ok(None)` if none exists and `Err(ConflictingFormats)` if more
/// than one does.
pub fn find_data_file(dir: &Path, base_name: &str) -> Result<Option<PathBuf>, DataLoadError> {
    let mut found: Option<PathBuf> = None;
    for ext in ["ron", "toml", "json"] {
        let candidate = dir.join(format!("{base_name}.{ext}"));
        if !candidate.exists() {
            continue;
        }
        if let Some(existing) = found {
            return Err(DataLoadError::ConflictingFormats {
                a: existing,
                b: candidate,
            });
        }
        found = Some(candidate);
    }
    Ok(found)
}

/// Like [`find_data_file`], but a missing file is an error.
pub fn require_data_file(dir: &Path, base_name: &'static str) -> Result<PathBuf, DataLoadError> {
    find_data_file(dir, base_name)?.ok_or_else(|| DataLoadError::MissingRequired {
        file: base_name,
        dir: dir.to_path_buf(),
    })
}

// ===========================================================================
// Deserialization
// ===========================================================================

fn parse_error(path: &Path, e: impl std::fmt::Display) -> DataLoadError {
    DataLoadError::Parse {
        file: path.to_path_buf(),
        detail: e.to_string(),
    }
}

/// Read a file and deserialize it according to its extension.
pub fn deserialize_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    match format {
        Format::Ron => ron::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Json => serde_json::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Toml => toml::from_str(&content).map_err(|e| parse_error(path, e)),
    }
}

/// Deserialize a list. RON and JSON files hold the array at top level; TOML
/// files hold it under `toml_key`.
pub fn deserialize_list<T: DeserializeOwned>(
    path: &Path,
    toml_key: &str,
) -> Result<Vec<T>, DataLoadError> {
    if detect_format(path)? != Format::Toml {
        return deserialize_file(path);
    }
    let content = std::fs::read_to_string(path)?;
    let mut table: toml::Table = toml::from_str(&content).map_err(|e| parse_error(path, e))?;
    let array = table
        .remove(toml_key)
        .ok_or_else(|| parse_error(path, format!("missing key '{toml_key}' in TOML file")))?;
    array
        .try_into()
        .map_err(|e: toml::de::Error| parse_error(path, e))
}

// ===========================================================================
// Name resolution helpers
// ===========================================================================

/// Look up a name, returning `UnresolvedRef` if absent.
pub fn resolve_name<'a, V>(
    map: &'a HashMap<String, V>,
    name: &str,
    file: &Path,
    expected_kind: &'static str,
) -> Result<&'a V, DataLoadError> {
    map.get(name).ok_or_else(|| DataLoadError::UnresolvedRef {
        file: file.to_path_buf(),
        name: name.to_string(),
        expected_kind,
    })
}

/// Fail with `DuplicateName` if `name` is already present.
pub fn check_duplicate<V>(
    map: &HashMap<String, V>,
    name: &str,
    file: &Path,
) -> Result<(), DataLoadError> {
    if map.contains_key(name) {
        return Err(DataLoadError::DuplicateName {
            file: file.to_path_buf(),
            name: name.to_string(),
        });
    }
    Ok(())
}

// ===========================================================================
// Loading pipeline
// ===========================================================================

/// Everything read from a facility data directory.
#[derive(Debug, Clone, Default)]
pub struct FacilityData {
    /// Validated reactor configs, in file order.
    pub reactors: Vec<ReactorConfig>,
    /// Recipe table by name. Empty when no recipe file exists.
    pub recipes: HashMap<String, RecipeData>,
}

impl FacilityData {
    /// Build every reactor. Configs were validated on load.
    pub fn build_reactors(&self) -> Result<Vec<Reactor>, ConfigError> {
        self.reactors.iter().cloned().map(Reactor::new).collect()
    }
}

/// Load and validate the facility definitions in `dir`.
pub fn load_facility_data(dir: &Path) -> Result<FacilityData, DataLoadError> {
    let mut recipes: HashMap<String, RecipeData> = HashMap::new();
    let recipe_file = find_data_file(dir, "recipes")?;
    if let Some(path) = &recipe_file {
        for recipe in deserialize_list::<RecipeData>(path, "recipes")? {
            check_duplicate(&recipes, &recipe.name, path)?;
            recipes.insert(recipe.name.clone(), recipe);
        }
        tracing::debug!(file = %path.display(), count = recipes.len(), "loaded recipes");
    }

    let reactor_path = require_data_file(dir, "reactors")?;
    let defs: Vec<ReactorData> = deserialize_list(&reactor_path, "reactors")?;

    let mut seen: HashSet<&str> = HashSet::new();
    let mut reactors = Vec::with_capacity(defs.len());
    for def in &defs {
        if !seen.insert(def.name.as_str()) {
            return Err(DataLoadError::DuplicateName {
                file: reactor_path.clone(),
                name: def.name.clone(),
            });
        }

        if recipe_file.is_some() {
            for name in def.recipe_names() {
                resolve_name(&recipes, name, &reactor_path, "recipe")?;
            }
        }

        let config = def.to_config();
        config
            .validate()
            .map_err(|source| DataLoadError::InvalidReactor {
                file: reactor_path.clone(),
                name: def.name.clone(),
                source,
            })?;
        reactors.push(config);
    }
    tracing::info!(
        dir = %dir.display(),
        reactors = reactors.len(),
        recipes = recipes.len(),
        "loaded facility data"
    );

    Ok(FacilityData { reactors, recipes })
}

// ===========================================================================
// Tests
// ===========================================================================
