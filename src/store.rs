//! Read access to the shared configuration: box inventory, guidelines and preferences.
//!
//! Keeping, editing and syncing this data belongs to other services. Requests only
//! read a snapshot through [`ConfigStore`], so the solver never touches global state.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::guidelines::Guideline;
use crate::model::ShippingBox;

/// Errors while loading a configuration snapshot.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("could not read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Per-store packer preferences.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Preferences {
    /// Extra padding per side for basic items, in inches
    #[serde(default)]
    pub basic_extra_padding: f64,
}

/// Read port for everything the recommendation layer needs besides the item.
pub trait ConfigStore: Send + Sync {
    fn boxes(&self) -> Vec<ShippingBox>;
    fn guidelines(&self) -> Vec<Guideline>;
    fn preferences(&self) -> Preferences;
}

/// Immutable in-memory configuration, optionally loaded from a JSON file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StaticStore {
    #[serde(default)]
    pub boxes: Vec<ShippingBox>,
    #[serde(default)]
    pub guidelines: Vec<Guideline>,
    #[serde(default)]
    pub preferences: Preferences,
}

impl StaticStore {
    pub fn new(boxes: Vec<ShippingBox>) -> Self {
        Self {
            boxes,
            ..Self::default()
        }
    }

    pub fn from_json_str(raw: &str, path: &Path) -> Result<Self, StoreError> {
        serde_json::from_str(raw).map_err(|source| StoreError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads a snapshot written as `{ "boxes": [...], "guidelines": [...], "preferences": {...} }`.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let raw = fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw, path)
    }
}

impl ConfigStore for StaticStore {
    fn boxes(&self) -> Vec<ShippingBox> {
        self.boxes.clone()
    }

    fn guidelines(&self) -> Vec<Guideline> {
        self.guidelines.clone()
    }

    fn preferences(&self) -> Preferences {
        self.preferences.clone()
    }
}
