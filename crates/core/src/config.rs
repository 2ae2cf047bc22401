//! The typed configuration catalog (`ServerConfig`) and its static field
//! descriptor table.
//!
//! The catalog is declared as a fixed `const FIELDS: &[ConfigField]` array
//! rather than derived through runtime reflection: each descriptor carries
//! a `get`/`set` function-pointer pair alongside its metadata, so `Update`,
//! `Project`, and `SyncServerConfigWithServer` are plain loops over
//! `FIELDS` with no macro-generated reflection layer.

use crate::server::Server;
use serde::{Deserialize, Serialize};

/// The four UI input kinds a `ServerConfig` field can present as, plus the
/// Rust-side value representation each maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Number,
    Checkbox,
    Select,
    Password,
}

/// A field's value, independent of how it is declared null/non-null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Number(i64),
    Bool(bool),
}

impl FieldValue {
    /// Projects the value to its environment-variable string form:
    /// integers in base 10, booleans as `"true"`/`"false"`, strings
    /// verbatim.
    pub fn stringify(&self) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Number(n) => n.to_string(),
            FieldValue::Bool(b) => b.to_string(),
        }
    }

    fn coerce(&self, kind: FieldKind) -> Option<FieldValue> {
        match (kind, self) {
            (FieldKind::Text | FieldKind::Select | FieldKind::Password, FieldValue::Text(s)) => {
                Some(FieldValue::Text(s.clone()))
            }
            (FieldKind::Number, FieldValue::Number(n)) => Some(FieldValue::Number(*n)),
            (FieldKind::Number, FieldValue::Text(s)) => s.parse::<i64>().ok().map(FieldValue::Number),
            (FieldKind::Checkbox, FieldValue::Bool(b)) => Some(FieldValue::Bool(*b)),
            _ => None,
        }
    }
}

/// A static descriptor for one `ServerConfig` field.
///
/// `get`/`set` close over the concrete struct field so `Update`/`Project`
/// never need per-field match arms outside this module.
pub struct ConfigField {
    /// The patch/projection key, e.g. `"jvm_max_heap_mb"`.
    pub key: &'static str,
    /// Target environment variable name; `None` means metadata-only (never
    /// projected), per spec.md §4.3.
    pub env: Option<&'static str>,
    pub kind: FieldKind,
    pub required: bool,
    /// Auto-populated, read-only from the Facade's perspective.
    pub system: bool,
    /// Cleared after the first successful start of the owning Server.
    pub ephemeral: bool,
    pub default: Option<&'static str>,
    pub label: &'static str,
    pub desc: &'static str,
    pub options: &'static [&'static str],
    pub get: fn(&ServerConfig) -> Option<FieldValue>,
    pub set: fn(&mut ServerConfig, Option<FieldValue>),
}

impl std::fmt::Debug for ConfigField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigField").field("key", &self.key).finish_non_exhaustive()
    }
}

/// The typed projection catalog: shares its id 1:1 with the owning Server.
/// Fields are grouped by category (JVM, game, RCON, world, resource-pack,
/// auto-pause/stop, modpack source); every field not explicitly listed here
/// was judged out of scope for this pass and is fair game to add alongside
/// new `FIELDS` entries later.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    pub server_id: String,

    // JVM
    pub jvm_max_heap_mb: Option<i64>,
    pub jvm_init_heap_mb: Option<i64>,
    pub jvm_extra_args: Option<String>,

    // Game
    pub motd: Option<String>,
    pub difficulty: Option<String>,
    pub gamemode: Option<String>,
    pub pvp: Option<bool>,
    pub whitelist_enabled: Option<bool>,
    pub view_distance: Option<i64>,

    // RCON
    pub rcon_enabled: Option<bool>,
    pub rcon_password: Option<String>,
    pub rcon_port: Option<i64>,

    // World
    pub level_seed: Option<String>,
    pub level_type: Option<String>,
    pub generate_structures: Option<bool>,
    pub max_world_size: Option<i64>,

    // Resource pack
    pub resource_pack_url: Option<String>,
    pub resource_pack_sha1: Option<String>,
    pub resource_pack_enforce: Option<bool>,

    // Auto-pause / auto-stop
    pub auto_pause_enabled: Option<bool>,
    pub auto_stop_timeout_min: Option<i64>,

    // Modpack source
    pub modpack_id: Option<String>,
    pub modpack_version: Option<String>,
}

macro_rules! field_accessors {
    (text, $field:ident) => {
        (
            (|c: &ServerConfig| c.$field.clone().map(FieldValue::Text)) as fn(&ServerConfig) -> Option<FieldValue>,
            (|c: &mut ServerConfig, v: Option<FieldValue>| {
                c.$field = v.map(|v| v.stringify());
            }) as fn(&mut ServerConfig, Option<FieldValue>),
        )
    };
    (number, $field:ident) => {
        (
            (|c: &ServerConfig| c.$field.map(FieldValue::Number)) as fn(&ServerConfig) -> Option<FieldValue>,
            (|c: &mut ServerConfig, v: Option<FieldValue>| {
                c.$field = v.and_then(|v| match v {
                    FieldValue::Number(n) => Some(n),
                    _ => None,
                });
            }) as fn(&mut ServerConfig, Option<FieldValue>),
        )
    };
    (bool, $field:ident) => {
        (
            (|c: &ServerConfig| c.$field.map(FieldValue::Bool)) as fn(&ServerConfig) -> Option<FieldValue>,
            (|c: &mut ServerConfig, v: Option<FieldValue>| {
                c.$field = v.and_then(|v| match v {
                    FieldValue::Bool(b) => Some(b),
                    _ => None,
                });
            }) as fn(&mut ServerConfig, Option<FieldValue>),
        )
    };
}

fn jvm_max_heap_mb_accessors() -> (fn(&ServerConfig) -> Option<FieldValue>, fn(&mut ServerConfig, Option<FieldValue>)) {
    field_accessors!(number, jvm_max_heap_mb)
}
fn jvm_init_heap_mb_accessors() -> (fn(&ServerConfig) -> Option<FieldValue>, fn(&mut ServerConfig, Option<FieldValue>)) {
    field_accessors!(number, jvm_init_heap_mb)
}
fn jvm_extra_args_accessors() -> (fn(&ServerConfig) -> Option<FieldValue>, fn(&mut ServerConfig, Option<FieldValue>)) {
    field_accessors!(text, jvm_extra_args)
}
fn motd_accessors() -> (fn(&ServerConfig) -> Option<FieldValue>, fn(&mut ServerConfig, Option<FieldValue>)) {
    field_accessors!(text, motd)
}
fn difficulty_accessors() -> (fn(&ServerConfig) -> Option<FieldValue>, fn(&mut ServerConfig, Option<FieldValue>)) {
    field_accessors!(text, difficulty)
}
fn gamemode_accessors() -> (fn(&ServerConfig) -> Option<FieldValue>, fn(&mut ServerConfig, Option<FieldValue>)) {
    field_accessors!(text, gamemode)
}
fn pvp_accessors() -> (fn(&ServerConfig) -> Option<FieldValue>, fn(&mut ServerConfig, Option<FieldValue>)) {
    field_accessors!(bool, pvp)
}
fn whitelist_enabled_accessors() -> (fn(&ServerConfig) -> Option<FieldValue>, fn(&mut ServerConfig, Option<FieldValue>)) {
    field_accessors!(bool, whitelist_enabled)
}
fn view_distance_accessors() -> (fn(&ServerConfig) -> Option<FieldValue>, fn(&mut ServerConfig, Option<FieldValue>)) {
    field_accessors!(number, view_distance)
}
fn rcon_enabled_accessors() -> (fn(&ServerConfig) -> Option<FieldValue>, fn(&mut ServerConfig, Option<FieldValue>)) {
    field_accessors!(bool, rcon_enabled)
}
fn rcon_password_accessors() -> (fn(&ServerConfig) -> Option<FieldValue>, fn(&mut ServerConfig, Option<FieldValue>)) {
    field_accessors!(text, rcon_password)
}
fn rcon_port_accessors() -> (fn(&ServerConfig) -> Option<FieldValue>, fn(&mut ServerConfig, Option<FieldValue>)) {
    field_accessors!(number, rcon_port)
}
fn level_seed_accessors() -> (fn(&ServerConfig) -> Option<FieldValue>, fn(&mut ServerConfig, Option<FieldValue>)) {
    field_accessors!(text, level_seed)
}
fn level_type_accessors() -> (fn(&ServerConfig) -> Option<FieldValue>, fn(&mut ServerConfig, Option<FieldValue>)) {
    field_accessors!(text, level_type)
}
fn generate_structures_accessors() -> (fn(&ServerConfig) -> Option<FieldValue>, fn(&mut ServerConfig, Option<FieldValue>)) {
    field_accessors!(bool, generate_structures)
}
fn max_world_size_accessors() -> (fn(&ServerConfig) -> Option<FieldValue>, fn(&mut ServerConfig, Option<FieldValue>)) {
    field_accessors!(number, max_world_size)
}
fn resource_pack_url_accessors() -> (fn(&ServerConfig) -> Option<FieldValue>, fn(&mut ServerConfig, Option<FieldValue>)) {
    field_accessors!(text, resource_pack_url)
}
fn resource_pack_sha1_accessors() -> (fn(&ServerConfig) -> Option<FieldValue>, fn(&mut ServerConfig, Option<FieldValue>)) {
    field_accessors!(text, resource_pack_sha1)
}
fn resource_pack_enforce_accessors() -> (fn(&ServerConfig) -> Option<FieldValue>, fn(&mut ServerConfig, Option<FieldValue>)) {
    field_accessors!(bool, resource_pack_enforce)
}
fn auto_pause_enabled_accessors() -> (fn(&ServerConfig) -> Option<FieldValue>, fn(&mut ServerConfig, Option<FieldValue>)) {
    field_accessors!(bool, auto_pause_enabled)
}
fn auto_stop_timeout_min_accessors() -> (fn(&ServerConfig) -> Option<FieldValue>, fn(&mut ServerConfig, Option<FieldValue>)) {
    field_accessors!(number, auto_stop_timeout_min)
}
fn modpack_id_accessors() -> (fn(&ServerConfig) -> Option<FieldValue>, fn(&mut ServerConfig, Option<FieldValue>)) {
    field_accessors!(text, modpack_id)
}
fn modpack_version_accessors() -> (fn(&ServerConfig) -> Option<FieldValue>, fn(&mut ServerConfig, Option<FieldValue>)) {
    field_accessors!(text, modpack_version)
}

// The full field catalog is built lazily because function items can't be
// named in a `const`/`static` initializer without the accessor helpers
// above; a `std::sync::OnceLock` gives `fields()` the "static table"
// semantics the projector relies on without paying reflection cost per
// call. `Update`/`Project`/`SyncServerConfigWithServer` are plain loops
// over this array; adding a field means adding one row here plus one
// struct field above, nothing else.
static FIELDS_CELL: std::sync::OnceLock<Vec<ConfigField>> = std::sync::OnceLock::new();

/// Returns the field catalog, building it once on first access.
pub fn fields() -> &'static [ConfigField] {
    FIELDS_CELL
        .get_or_init(|| {
            let mut v = Vec::new();

            macro_rules! push {
                ($key:expr, $env:expr, $kind:expr, $required:expr, $system:expr, $ephemeral:expr, $default:expr, $label:expr, $desc:expr, $options:expr, $accessors:expr) => {{
                    let (get, set) = $accessors;
                    v.push(ConfigField {
                        key: $key,
                        env: $env,
                        kind: $kind,
                        required: $required,
                        system: $system,
                        ephemeral: $ephemeral,
                        default: $default,
                        label: $label,
                        desc: $desc,
                        options: $options,
                        get,
                        set,
                    });
                }};
            }

            push!(
                "jvm_max_heap_mb", Some("MAX_MEMORY"), FieldKind::Number, false, true, false,
                None, "Max heap (MiB)", "Maximum JVM heap size, synced from the Server's memory budget.",
                &[], jvm_max_heap_mb_accessors()
            );
            push!(
                "jvm_init_heap_mb", Some("INIT_MEMORY"), FieldKind::Number, false, true, false,
                None, "Initial heap (MiB)", "Initial JVM heap size, synced from the Server's memory budget.",
                &[], jvm_init_heap_mb_accessors()
            );
            push!(
                "jvm_extra_args", Some("JVM_OPTS"), FieldKind::Text, false, false, false,
                None, "Extra JVM arguments", "Additional flags appended to the JVM command line.",
                &[], jvm_extra_args_accessors()
            );
            push!(
                "motd", Some("MOTD"), FieldKind::Text, false, false, false,
                None, "MOTD", "Message of the day shown in the server list.",
                &[], motd_accessors()
            );
            push!(
                "difficulty", Some("DIFFICULTY"), FieldKind::Select, false, false, false,
                Some("normal"), "Difficulty", "World difficulty.",
                &["peaceful", "easy", "normal", "hard"], difficulty_accessors()
            );
            push!(
                "gamemode", Some("MODE"), FieldKind::Select, false, false, false,
                Some("survival"), "Game mode", "Default game mode for new players.",
                &["survival", "creative", "adventure", "spectator"], gamemode_accessors()
            );
            push!(
                "pvp", Some("PVP"), FieldKind::Checkbox, false, false, false,
                Some("true"), "PvP", "Whether players can damage each other.",
                &[], pvp_accessors()
            );
            push!(
                "whitelist_enabled", Some("WHITELIST"), FieldKind::Checkbox, false, false, false,
                Some("false"), "Whitelist", "Restrict joins to the whitelist.",
                &[], whitelist_enabled_accessors()
            );
            push!(
                "view_distance", Some("VIEW_DISTANCE"), FieldKind::Number, false, false, false,
                Some("10"), "View distance", "Server view distance in chunks.",
                &[], view_distance_accessors()
            );
            push!(
                "rcon_enabled", Some("ENABLE_RCON"), FieldKind::Checkbox, false, false, false,
                Some("true"), "Enable RCON", "Enables the RCON remote console.",
                &[], rcon_enabled_accessors()
            );
            push!(
                "rcon_password", Some("RCON_PASSWORD"), FieldKind::Password, false, true, true,
                None, "RCON password", "Auto-generated RCON password; cleared once the container has started.",
                &[], rcon_password_accessors()
            );
            push!(
                "rcon_port", Some("RCON_PORT"), FieldKind::Number, false, true, false,
                Some("25575"), "RCON port", "Container-internal RCON port.",
                &[], rcon_port_accessors()
            );
            push!(
                "level_seed", Some("SEED"), FieldKind::Text, false, false, false,
                None, "World seed", "Seed used when generating a new world.",
                &[], level_seed_accessors()
            );
            push!(
                "level_type", Some("LEVEL_TYPE"), FieldKind::Select, false, false, false,
                Some("default"), "World type", "World generator type.",
                &["default", "flat", "large_biomes", "amplified"], level_type_accessors()
            );
            push!(
                "generate_structures", Some("GENERATE_STRUCTURES"), FieldKind::Checkbox, false, false, false,
                Some("true"), "Generate structures", "Whether villages, strongholds, etc. generate.",
                &[], generate_structures_accessors()
            );
            push!(
                "max_world_size", Some("MAX_WORLD_SIZE"), FieldKind::Number, false, false, false,
                None, "Max world size", "Radius in blocks beyond which terrain will not generate.",
                &[], max_world_size_accessors()
            );
            push!(
                "resource_pack_url", Some("RESOURCE_PACK"), FieldKind::Text, false, false, false,
                None, "Resource pack URL", "URL of a resource pack offered to joining clients.",
                &[], resource_pack_url_accessors()
            );
            push!(
                "resource_pack_sha1", Some("RESOURCE_PACK_SHA1"), FieldKind::Text, false, false, false,
                None, "Resource pack SHA1", "SHA-1 of the resource pack, required by some clients.",
                &[], resource_pack_sha1_accessors()
            );
            push!(
                "resource_pack_enforce", Some("RESOURCE_PACK_ENFORCE"), FieldKind::Checkbox, false, false, false,
                Some("false"), "Enforce resource pack", "Disconnect clients who decline the resource pack.",
                &[], resource_pack_enforce_accessors()
            );
            push!(
                "auto_pause_enabled", Some("ENABLE_AUTOPAUSE"), FieldKind::Checkbox, false, false, false,
                Some("false"), "Auto-pause", "Pause the server process while no players are online.",
                &[], auto_pause_enabled_accessors()
            );
            push!(
                "auto_stop_timeout_min", Some("AUTOSTOP_TIMEOUT_EST"), FieldKind::Number, false, false, false,
                None, "Auto-stop timeout (min)", "Stop the container after this many idle minutes.",
                &[], auto_stop_timeout_min_accessors()
            );
            push!(
                "modpack_id", None, FieldKind::Text, false, true, false,
                None, "Modpack id", "Identifier of the modpack source this Server was created from.",
                &[], modpack_id_accessors()
            );
            push!(
                "modpack_version", None, FieldKind::Text, false, true, false,
                None, "Modpack version", "Pinned modpack version string.",
                &[], modpack_version_accessors()
            );

            v
        })
        .as_slice()
}

impl ServerConfig {
    pub fn new(server_id: String) -> Self {
        Self { server_id, ..Default::default() }
    }

    /// `CreateDefaultServerConfig`: instantiates the schema with schema
    /// defaults; all non-required optional fields stay null.
    pub fn with_defaults(server_id: String) -> Self {
        let mut cfg = Self::new(server_id);
        for field in fields() {
            if let Some(default) = field.default {
                let value = match field.kind {
                    FieldKind::Number => default.parse::<i64>().ok().map(FieldValue::Number),
                    FieldKind::Checkbox => default.parse::<bool>().ok().map(FieldValue::Bool),
                    _ => Some(FieldValue::Text(default.to_string())),
                };
                (field.set)(&mut cfg, value);
            }
        }
        cfg
    }

    /// `Update(config, patch)`: unrecognized keys are skipped; `null`
    /// clears the field; type mismatches are silently ignored per §4.3
    /// (the Facade is expected to pre-validate required fields).
    pub fn update(&mut self, patch: &std::collections::HashMap<String, Option<FieldValue>>) {
        for field in fields() {
            let Some(raw) = patch.get(field.key) else { continue };
            match raw {
                None => (field.set)(self, None),
                Some(value) => {
                    if let Some(coerced) = value.coerce(field.kind) {
                        (field.set)(self, Some(coerced));
                    }
                }
            }
        }
    }

    /// `Project(config) -> env-map`: non-null fields with an `env` tag are
    /// emitted as `env = stringify(value)`.
    pub fn project(&self) -> std::collections::HashMap<String, String> {
        let mut env = std::collections::HashMap::new();
        for field in fields() {
            let Some(env_key) = field.env else { continue };
            if let Some(value) = (field.get)(self) {
                env.insert(env_key.to_string(), Self::render(field.key, &value));
            }
        }
        env
    }

    /// Most fields stringify as-is (§4.3's "Integer values use base-10").
    /// The JVM heap fields are the one exception: `itzg/minecraft-server`
    /// (and the `"<N>M"` form spec.md §6.3 calls for) expects a unit
    /// suffix, not a bare megabyte count.
    fn render(key: &str, value: &FieldValue) -> String {
        match key {
            "jvm_max_heap_mb" | "jvm_init_heap_mb" => format!("{}M", value.stringify()),
            _ => value.stringify(),
        }
    }

    /// Ensures system-tagged fields reflect the owning Server's current
    /// mutable attributes. Called before every container recreation.
    pub fn sync_with_server(&mut self, server: &Server) {
        self.jvm_max_heap_mb = Some((server.memory_mib as i64 * 75) / 100);
        self.jvm_init_heap_mb = Some((server.memory_mib as i64 * 45) / 100);
    }

    /// Nulls every field tagged `ephemeral`, called after the first
    /// successful start of the owning Server.
    pub fn clear_ephemeral(&mut self) {
        for field in fields() {
            if field.ephemeral {
                (field.set)(self, None);
            }
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
