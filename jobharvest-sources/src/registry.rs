//! Source registry.
//!
//! Built-in descriptors live in a lazily initialized static. A
//! [`SourceRegistry`] starts from them and may add custom descriptors
//! loaded from the configuration file.

use std::collections::HashMap;
use std::sync::OnceLock;

use tracing::info;

use crate::builtin::builtin_descriptors;
use crate::descriptor::SourceDescriptor;
use crate::error::SourceError;
use crate::json_adapter::JsonSourceAdapter;

// ============================================================================
// Static Registry
// ============================================================================

/// Static storage for the built-in descriptors.
static BUILTINS: OnceLock<Vec<SourceDescriptor>> = OnceLock::new();

/// Returns the built-in descriptors.
pub fn builtins() -> &'static [SourceDescriptor] {
    BUILTINS.get_or_init(builtin_descriptors)
}

/// Lookup keys are case-insensitive.
fn key(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}

// ============================================================================
// Source Registry
// ============================================================================

/// Descriptors addressable by id or alias.
#[derive(Debug, Clone)]
pub struct SourceRegistry {
    descriptors: Vec<SourceDescriptor>,
    names: HashMap<String, usize>,
}

impl SourceRegistry {
    /// Creates a registry holding the built-in sources.
    pub fn new() -> Self {
        let descriptors = builtins().to_vec();
        let names = build_name_map(&descriptors).unwrap_or_default();
        Self { descriptors, names }
    }

    /// Creates a registry of built-in plus custom sources.
    ///
    /// A custom descriptor whose id matches a built-in replaces it.
    pub fn with_custom(custom: Vec<SourceDescriptor>) -> Result<Self, SourceError> {
        let mut descriptors = builtins().to_vec();

        for desc in custom {
            desc.validate()?;
            if let Some(existing) = descriptors.iter_mut().find(|d| key(&d.id) == key(&desc.id)) {
                info!(source = %desc.id, "Custom descriptor replaces built-in");
                *existing = desc;
            } else {
                descriptors.push(desc);
            }
        }

        let names = build_name_map(&descriptors)?;
        Ok(Self { descriptors, names })
    }

    /// Returns all descriptors.
    pub fn all(&self) -> &[SourceDescriptor] {
        &self.descriptors
    }

    /// Returns all source ids.
    pub fn ids(&self) -> Vec<&str> {
        self.descriptors.iter().map(|d| d.id.as_str()).collect()
    }

    /// Looks up a descriptor by id or alias.
    pub fn get(&self, name: &str) -> Option<&SourceDescriptor> {
        let index = self.names.get(&key(name))?;
        self.descriptors.get(*index)
    }

    /// Looks up a descriptor and builds its adapter.
    pub fn adapter(&self, name: &str) -> Result<JsonSourceAdapter, SourceError> {
        let desc = self
            .get(name)
            .ok_or_else(|| SourceError::UnknownSource(name.to_string()))?;
        JsonSourceAdapter::new(desc.clone())
    }

    /// Returns the number of registered sources.
    pub fn count(&self) -> usize {
        self.descriptors.len()
    }
}

impl Default for SourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds the name to descriptor index mapping.
fn build_name_map(descriptors: &[SourceDescriptor]) -> Result<HashMap<String, usize>, SourceError> {
    let mut map: HashMap<String, usize> = HashMap::new();

    for (index, desc) in descriptors.iter().enumerate() {
        for name in desc.names() {
            if let Some(&other) = map.get(&key(name)) {
                if other != index {
                    return Err(SourceError::DuplicateName {
                        name: name.to_string(),
                        first: descriptors[other].id.clone(),
                        second: desc.id.clone(),
                    });
                }
            }
            map.insert(key(name), index);
        }
    }

    Ok(map)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{ListingTemplate, RequestTemplate};
    use jobharvest_core::SourceConfig;
    use jobharvest_fetch::SourceAdapter;

    fn custom(id: &str, aliases: &[&str]) -> SourceDescriptor {
        SourceDescriptor {
            id: id.to_string(),
            display_name: id.to_uppercase(),
            aliases: aliases.iter().map(|a| (*a).to_string()).collect(),
            config: SourceConfig::new(30),
            listing: ListingTemplate {
                request: RequestTemplate::get(format!("https://{id}.test/jobs?page={{page}}")),
                total_pointer: "/total".to_string(),
                items_pointer: "/jobs".to_string(),
                facets_pointer: None,
            },
            detail: None,
        }
    }

    #[test]
    fn test_builtin_sources() {
        let registry = SourceRegistry::new();
        assert_eq!(registry.ids(), vec!["microsoft", "google", "amazon", "netflix"]);
        assert_eq!(registry.count(), 4);
    }

    #[test]
    fn test_lookup_by_alias() {
        let registry = SourceRegistry::new();

        assert_eq!(registry.get("msft").unwrap().id, "microsoft");
        assert_eq!(registry.get("AWS").unwrap().id, "amazon");
        assert_eq!(registry.get(" Google ").unwrap().id, "google");
        assert!(registry.get("apple").is_none());
    }

    #[test]
    fn test_adapter_for_unknown_source() {
        let registry = SourceRegistry::new();
        assert!(matches!(
            registry.adapter("meta"),
            Err(SourceError::UnknownSource(name)) if name == "meta"
        ));

        let adapter = registry.adapter("microsoft").unwrap();
        assert!(adapter.supports_details());
    }

    #[test]
    fn test_custom_sources() {
        let registry =
            SourceRegistry::with_custom(vec![custom("startup", &["su"]), custom("google", &[])])
                .unwrap();

        assert_eq!(registry.count(), 5);
        assert_eq!(registry.get("su").unwrap().id, "startup");
        assert_eq!(registry.get("google").unwrap().config.page_size, 30);
        // Aliases of the replaced built-in go with it.
        assert!(registry.get("alphabet").is_none());
    }

    #[test]
    fn test_alias_collision() {
        let result = SourceRegistry::with_custom(vec![custom("microsoft-us", &["msft"])]);
        assert!(matches!(
            result,
            Err(SourceError::DuplicateName { ref name, .. }) if name == "msft"
        ));
    }

    #[test]
    fn test_invalid_custom_source() {
        let mut bad = custom("broken", &[]);
        bad.listing.request.url = "https://broken.test/jobs".to_string();
        assert!(SourceRegistry::with_custom(vec![bad]).is_err());
    }
}
