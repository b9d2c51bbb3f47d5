//! Content domain: reads the RON catalog and tuning files from disk.

use ron::Options;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

use super::data::*;
use super::registry::ContentRegistry;

pub const TEMPLATES_FILE: &str = "task_templates.ron";
pub const COSMETICS_FILE: &str = "cosmetics.ron";
pub const DEFAULTS_FILE: &str = "gameplay_defaults.ron";

#[derive(Debug, Error)]
#[error("Failed to load {file}: {message}")]
pub struct ContentLoadError {
    pub file: String,
    pub message: String,
}

impl ContentLoadError {
    fn new(file: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            message: message.into(),
        }
    }
}

/// `IMPLICIT_SOME` lets optional fields be written without `Some(..)`.
pub(crate) fn ron_options() -> Options {
    Options::default().with_default_extension(ron::extensions::Extensions::IMPLICIT_SOME)
}

/// Parses a `DataFile<T>` document and returns its items.
pub(crate) fn parse_data_file<T>(file: &str, contents: &str) -> Result<Vec<T>, ContentLoadError>
where
    T: for<'de> serde::Deserialize<'de>,
{
    let data: DataFile<T> = ron_options()
        .from_str(contents)
        .map_err(|e| ContentLoadError::new(file, format!("Parse error: {}", e)))?;
    Ok(data.items)
}

fn read(path: &Path) -> Result<String, ContentLoadError> {
    fs::read_to_string(path)
        .map_err(|e| ContentLoadError::new(path.display().to_string(), format!("IO error: {}", e)))
}

/// Loads a catalog file keyed by `id_of`. Later duplicates replace earlier ones.
fn load_catalog<T, F>(path: &Path, id_of: F) -> Result<HashMap<String, T>, ContentLoadError>
where
    T: for<'de> serde::Deserialize<'de>,
    F: Fn(&T) -> &str,
{
    let items: Vec<T> = parse_data_file(&path.display().to_string(), &read(path)?)?;
    Ok(items
        .into_iter()
        .map(|item| (id_of(&item).to_string(), item))
        .collect())
}

fn load_defaults(path: &Path) -> Result<GameplayDefaults, ContentLoadError> {
    let contents = read(path)?;
    ron_options()
        .from_str(&contents)
        .map_err(|e| ContentLoadError::new(path.display().to_string(), format!("Parse error: {}", e)))
}

/// Loads every data file under `base_path`, collecting all failures.
pub fn load_all_content(
    base_path: &Path,
) -> Result<(ContentRegistry, GameplayDefaults), Vec<ContentLoadError>> {
    let mut errors = Vec::new();

    let templates = load_catalog(&base_path.join(TEMPLATES_FILE), |t: &SessionTemplate| t.id.as_str())
        .map_err(|e| errors.push(e))
        .unwrap_or_default();
    let cosmetics = load_catalog(&base_path.join(COSMETICS_FILE), |c: &CosmeticDef| c.id.as_str())
        .map_err(|e| errors.push(e))
        .unwrap_or_default();
    let defaults = load_defaults(&base_path.join(DEFAULTS_FILE)).map_err(|e| errors.push(e));

    match defaults {
        Ok(defaults) if errors.is_empty() => Ok((
            ContentRegistry {
                templates,
                cosmetics,
            },
            defaults,
        )),
        _ => Err(errors),
    }
}
