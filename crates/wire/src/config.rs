use std::collections::HashMap;

use fleetd_core::config::fields;
use fleetd_core::{FieldKind, FieldValue, ServerConfig};
use serde::{Deserialize, Serialize};

/// One `ConfigField` descriptor paired with its current value on a given
/// Server, for `GET /api/v1/servers/{id}/config`. `ConfigField` itself isn't
/// serializable (its `get`/`set` pair are function pointers), so this is the
/// wire-facing projection of it.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigFieldView {
    pub key: &'static str,
    pub env: Option<&'static str>,
    pub kind: FieldKind,
    pub required: bool,
    pub system: bool,
    pub ephemeral: bool,
    pub default: Option<&'static str>,
    pub label: &'static str,
    pub description: &'static str,
    pub options: &'static [&'static str],
    pub value: Option<FieldValue>,
}

/// A named group of fields, e.g. "JVM", "World", "RCON".
#[derive(Debug, Clone, Serialize)]
pub struct ConfigCategoryView {
    pub name: &'static str,
    pub fields: Vec<ConfigFieldView>,
}

/// `GET /api/v1/servers/{id}/config` response: the field catalog grouped by
/// category, each carrying the Server's current value.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigResponse {
    pub categories: Vec<ConfigCategoryView>,
}

impl ConfigResponse {
    pub fn build(config: &ServerConfig) -> Self {
        let mut categories: Vec<ConfigCategoryView> = Vec::new();
        for field in fields() {
            let category = category_for_key(field.key);
            let view = ConfigFieldView {
                key: field.key,
                env: field.env,
                kind: field.kind,
                required: field.required,
                system: field.system,
                ephemeral: field.ephemeral,
                default: field.default,
                label: field.label,
                description: field.desc,
                options: field.options,
                value: (field.get)(config),
            };
            match categories.iter_mut().find(|c| c.name == category) {
                Some(existing) => existing.fields.push(view),
                None => categories.push(ConfigCategoryView { name: category, fields: vec![view] }),
            }
        }
        ConfigResponse { categories }
    }
}

/// Maps a field key to its display category. The catalog in
/// `fleetd_core::config` orders fields by category but doesn't carry the
/// grouping as data, so the boundaries are inferred from the key prefixes
/// established there (jvm_*, rcon_*, level_*/generate_structures/
/// max_world_size, resource_pack_*, auto_*, modpack_*; everything else is
/// "Game").
fn category_for_key(key: &str) -> &'static str {
    if key.starts_with("jvm_") {
        "JVM"
    } else if key.starts_with("rcon_") {
        "RCON"
    } else if key.starts_with("level_") || key == "generate_structures" || key == "max_world_size" {
        "World"
    } else if key.starts_with("resource_pack_") {
        "Resource pack"
    } else if key.starts_with("auto_") {
        "Auto-pause / auto-stop"
    } else if key.starts_with("modpack_") {
        "Modpack source"
    } else {
        "Game"
    }
}

/// Body for `PUT /api/v1/servers/{id}/config`: a sparse patch where `null`
/// clears a field and an absent key leaves it untouched (mirrors
/// `ServerConfig::update`'s `HashMap<String, Option<FieldValue>>` contract).
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigPatchRequest {
    #[serde(flatten)]
    pub fields: HashMap<String, Option<FieldValue>>,
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
