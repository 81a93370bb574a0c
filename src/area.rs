//! Area definitions: the pixel grid and projection an area name refers to.

use std::{collections::HashMap, fs::File, io::BufReader, path::Path};

use anyhow::Context;

use crate::foundation::error::{SwathError, SwathResult};

/// Projected pixel grid for a named area.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AreaDefinition {
    /// Identifier matched against the profile's `areaname`.
    pub area_id: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Projection description (e.g. a PROJ string). Opaque to this crate.
    #[serde(default)]
    pub projection: String,
    /// Grid width in pixels.
    pub width: u32,
    /// Grid height in pixels.
    pub height: u32,
    /// Projected extent `[x_min, y_min, x_max, y_max]`.
    #[serde(default)]
    pub area_extent: [f64; 4],
}

/// Lookup of area definitions by name.
pub trait AreaRegistry: Send + Sync {
    /// Definition for `area_id`, if known.
    fn lookup(&self, area_id: &str) -> Option<AreaDefinition>;
}

/// In-memory registry, typically loaded from a JSON list of [`AreaDefinition`]s.
#[derive(Clone, Debug, Default)]
pub struct StaticAreaRegistry {
    areas: HashMap<String, AreaDefinition>,
}

impl StaticAreaRegistry {
    /// Registry holding `areas`; later duplicates replace earlier ones.
    pub fn new(areas: impl IntoIterator<Item = AreaDefinition>) -> Self {
        Self {
            areas: areas
                .into_iter()
                .map(|a| (a.area_id.clone(), a))
                .collect(),
        }
    }

    /// Parse a JSON array of area definitions.
    pub fn from_json_str(json: &str) -> SwathResult<Self> {
        let areas: Vec<AreaDefinition> = serde_json::from_str(json)
            .map_err(|e| SwathError::config(format!("invalid area definitions: {e}")))?;
        Ok(Self::new(areas))
    }

    /// Load a JSON array of area definitions from a file.
    pub fn from_json_file(path: &Path) -> SwathResult<Self> {
        let f = File::open(path)
            .with_context(|| format!("open area definitions '{}'", path.display()))?;
        let areas: Vec<AreaDefinition> = serde_json::from_reader(BufReader::new(f))
            .with_context(|| format!("parse area definitions '{}'", path.display()))?;
        Ok(Self::new(areas))
    }

    /// Number of known areas.
    pub fn len(&self) -> usize {
        self.areas.len()
    }

    /// Whether no area is known.
    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }
}

impl AreaRegistry for StaticAreaRegistry {
    fn lookup(&self, area_id: &str) -> Option<AreaDefinition> {
        self.areas.get(area_id).cloned()
    }
}

#[cfg(test)]
#[path = "../tests/unit/area.rs"]
mod tests;
