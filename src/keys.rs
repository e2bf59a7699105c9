//! Provider credential loading.
//!
//! Keys live in a JSON file keyed by provider name. A provider entry is
//! either one settings object or a list of them, in which case one is
//! picked at random per lookup to spread load across accounts:
//!
//! ```json
//! {
//!   "klippa": { "subscription_key": "..." },
//!   "google": { "genai_api_key": "...", "access_token": "..." },
//!   "ollama": [
//!     { "api_key": "...", "org_key": "..." },
//!     { "api_key": "...", "org_key": "..." }
//!   ]
//! }
//! ```

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use rand::seq::IndexedRandom;
use serde_json::Value;

use crate::error::{Error, Result};

/// Credentials for every provider, as read from the keys file.
#[derive(Debug, Clone, Default)]
pub struct ProviderKeys {
    entries: HashMap<String, Value>,
}

impl ProviderKeys {
    /// Read a keys file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            let name = path.file_name().map_or_else(
                || path.display().to_string(),
                |n| n.to_string_lossy().into_owned(),
            );
            Error::Configuration(format!("file {name} was not found: {e}"))
        })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let entries: HashMap<String, Value> = serde_json::from_str(text)?;
        Ok(Self { entries })
    }

    pub fn contains(&self, provider: &str) -> bool {
        self.entries.contains_key(provider)
    }

    /// Settings for `provider`, checked for every `required` key.
    pub fn settings(&self, provider: &str, required: &[&str]) -> Result<HashMap<String, String>> {
        let entry = self.entries.get(provider).ok_or_else(|| {
            Error::Configuration(format!("No keys configured for provider {provider}"))
        })?;

        let chosen = match entry {
            Value::Array(candidates) => candidates.choose(&mut rand::rng()).ok_or_else(|| {
                Error::Configuration(format!("Empty key list for provider {provider}"))
            })?,
            other => other,
        };

        let settings: HashMap<String, String> = chosen
            .as_object()
            .ok_or_else(|| {
                Error::Configuration(format!("Keys for provider {provider} must be an object"))
            })?
            .iter()
            .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
            .collect();

        check_missing_keys(required, &settings)?;
        Ok(settings)
    }
}

/// Fail when any `required` key is absent from `settings`.
fn check_missing_keys(required: &[&str], settings: &HashMap<String, String>) -> Result<()> {
    let missing: BTreeSet<&str> = required
        .iter()
        .copied()
        .filter(|k| !settings.contains_key(*k))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(Error::Configuration(format!(
            "Setting keys missing: {}",
            missing.into_iter().collect::<Vec<_>>().join(", ")
        )))
    }
}
