//! View Registry - Load list view definitions from JSON
//!
//! Table columns, facets and color maps for each list view are embedded
//! at compile time and looked up by view key.

use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

/// Embedded view JSON files (compiled into the binary)
const RESOURCE_FILES: &[&str] = &[
    include_str!("../resources/common.json"),
    include_str!("../resources/files.json"),
    include_str!("../resources/vector_stores.json"),
];

/// The two list views of the console
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum View {
    Files,
    #[default]
    VectorStores,
}

impl View {
    pub const ALL: [View; 2] = [View::Files, View::VectorStores];

    /// Registry and config key
    pub fn key(&self) -> &'static str {
        match self {
            Self::Files => "files",
            Self::VectorStores => "vector_stores",
        }
    }

    /// Parse a view name as typed on the command line or stored in config
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "files" | "file" | "f" => Some(Self::Files),
            "vector_stores" | "vector-stores" | "vectorstores" | "stores" | "vs" => {
                Some(Self::VectorStores)
            }
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Files => Self::VectorStores,
            Self::VectorStores => Self::Files,
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Color definition from JSON
#[derive(Debug, Clone, Deserialize)]
pub struct ColorDef {
    pub value: String,
    pub color: [u8; 3],
}

fn default_hideable() -> bool {
    true
}

/// Column definition from JSON
#[derive(Debug, Clone, Deserialize)]
pub struct ColumnDef {
    /// Stable id, used for persisted visibility
    pub id: String,
    pub header: String,
    pub json_path: String,
    /// Raw value to sort by when the display value is formatted
    #[serde(default)]
    pub sort_path: Option<String>,
    pub width: u16,
    #[serde(default)]
    pub color_map: Option<String>,
    #[serde(default = "default_hideable")]
    pub hideable: bool,
}

impl ColumnDef {
    pub fn sort_key(&self) -> &str {
        self.sort_path.as_deref().unwrap_or(&self.json_path)
    }
}

/// One selectable value of a facet
#[derive(Debug, Clone, Deserialize)]
pub struct FacetValue {
    pub value: String,
    pub label: String,
}

/// Multi-select filter over one field
#[derive(Debug, Clone, Deserialize)]
pub struct FacetDef {
    pub id: String,
    pub label: String,
    pub json_path: String,
    pub values: Vec<FacetValue>,
}

/// List view definition from JSON
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceDef {
    pub display_name: String,
    pub id_field: String,
    pub name_field: String,
    /// Fields matched by the search box
    pub search_fields: Vec<String>,
    pub columns: Vec<ColumnDef>,
    #[serde(default)]
    pub facets: Vec<FacetDef>,
}

/// Root structure of resources/*.json
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceConfig {
    #[serde(default)]
    pub color_maps: HashMap<String, Vec<ColorDef>>,
    #[serde(default)]
    pub resources: HashMap<String, ResourceDef>,
}

/// Global registry loaded from JSON
static REGISTRY: OnceLock<ResourceConfig> = OnceLock::new();

/// Get the view registry (loads from embedded JSON on first access)
pub fn get_registry() -> &'static ResourceConfig {
    REGISTRY.get_or_init(|| {
        let mut final_config = ResourceConfig {
            color_maps: HashMap::new(),
            resources: HashMap::new(),
        };

        for content in RESOURCE_FILES {
            match serde_json::from_str::<ResourceConfig>(content) {
                Ok(partial) => {
                    final_config.color_maps.extend(partial.color_maps);
                    final_config.resources.extend(partial.resources);
                }
                Err(e) => tracing::error!("Failed to parse embedded view JSON: {}", e),
            }
        }

        final_config
    })
}

/// Get a view definition by key
pub fn get_resource(key: &str) -> Option<&'static ResourceDef> {
    get_registry().resources.get(key)
}

/// Get a color map by name
pub fn get_color_map(name: &str) -> Option<&'static Vec<ColorDef>> {
    get_registry().color_maps.get(name)
}

/// Get color for a value based on color map name
pub fn get_color_for_value(color_map_name: &str, value: &str) -> Option<[u8; 3]> {
    get_color_map(color_map_name)?
        .iter()
        .find(|c| c.value == value)
        .map(|c| c.color)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_view_has_a_definition() {
        for view in View::ALL {
            let def = get_resource(view.key());
            assert!(def.is_some(), "missing definition for {}", view);
        }
    }

    #[test]
    fn test_id_column_cannot_be_hidden() {
        for view in View::ALL {
            let def = get_resource(view.key()).unwrap();
            let id = def.columns.iter().find(|c| c.id == "id").unwrap();
            assert!(!id.hideable);
        }
    }

    #[test]
    fn test_files_columns_and_facets() {
        let def = get_resource("files").unwrap();
        let headers: Vec<&str> = def.columns.iter().map(|c| c.header.as_str()).collect();
        assert_eq!(
            headers,
            vec!["ID", "Filename", "Purpose", "Status", "Size", "Created"]
        );
        let facets: Vec<&str> = def.facets.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(facets, vec!["purpose", "status"]);
    }

    #[test]
    fn test_formatted_columns_sort_by_raw_value() {
        let def = get_resource("files").unwrap();
        let size = def.columns.iter().find(|c| c.id == "bytes").unwrap();
        assert_eq!(size.sort_key(), "bytes");
    }

    #[test]
    fn test_color_lookup() {
        assert_eq!(
            get_color_for_value("store_type", "text"),
            Some([100, 180, 240])
        );
        assert!(get_color_for_value("store_type", "audio").is_none());
    }

    #[test]
    fn test_view_parse() {
        assert_eq!(View::parse("vs"), Some(View::VectorStores));
        assert_eq!(View::parse("Files"), Some(View::Files));
        assert_eq!(View::parse("buckets"), None);
        assert_eq!(View::default(), View::VectorStores);
    }
}
