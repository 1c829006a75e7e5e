//! Build manifest describing the client bundles of one build.
//!
//! The orchestrator never looks inside a manifest; it is produced by the asset
//! compiler, read by the server compiler and returned to the caller.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{from_str, to_string_pretty};

use crate::error::Result;

/// Client entry module and its static imports.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryManifest {
    /// Public URL of the entry module
    pub module: String,
    /// Modules the entry imports
    pub imports: Vec<String>,
}

/// One route's client bundle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteManifestEntry {
    /// Route id, unique within the manifest
    pub id: String,
    /// Id of the parent route, `None` for the root route
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    /// URL path segment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Whether this is an index route
    #[serde(default)]
    pub index: bool,
    /// Public URL of the route module
    pub module: String,
    /// Modules the route imports
    #[serde(default)]
    pub imports: Vec<String>,
    /// Whether the route exports a loader
    #[serde(default)]
    pub has_loader: bool,
    /// Whether the route exports an action
    #[serde(default)]
    pub has_action: bool,
}

impl RouteManifestEntry {
    /// Creates an entry for `id` served at `path` from `module`.
    pub fn new(id: impl Into<String>, path: impl Into<String>, module: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            path: Some(path.into()),
            module: module.into(),
            ..Self::default()
        }
    }
}

/// Output descriptor of the asset compiler.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// Fingerprint of the build
    pub version: String,
    /// Public URL the manifest is served from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Client entry
    pub entry: EntryManifest,
    /// Route bundles keyed by route id
    pub routes: BTreeMap<String, RouteManifestEntry>,
}

impl Manifest {
    /// Creates an empty manifest with the given version.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            ..Self::default()
        }
    }

    /// Sets the client entry.
    #[must_use]
    pub fn with_entry(mut self, entry: EntryManifest) -> Self {
        self.entry = entry;
        self
    }

    /// Adds a route, replacing any route with the same id.
    #[must_use]
    pub fn with_route(mut self, route: RouteManifestEntry) -> Self {
        self.routes.insert(route.id.clone(), route);
        self
    }

    /// Looks up a route by id.
    pub fn route(&self, id: &str) -> Option<&RouteManifestEntry> {
        self.routes.get(id)
    }

    /// URL paths of every route that has one, in route id order.
    pub fn route_paths(&self) -> Vec<&str> {
        self.routes
            .values()
            .filter_map(|route| route.path.as_deref())
            .collect()
    }

    /// Encodes the manifest as pretty-printed JSON.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(to_string_pretty(self)?)
    }

    /// Decodes a manifest from JSON.
    ///
    /// # Errors
    /// Returns an error if the JSON is not a valid manifest.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(from_str(json)?)
    }
}
