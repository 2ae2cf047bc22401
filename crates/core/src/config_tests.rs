use super::*;
use std::collections::HashMap;

#[test]
fn with_defaults_populates_only_fields_with_declared_defaults() {
    let cfg = ServerConfig::with_defaults("srv-abc".to_string());
    assert_eq!(cfg.difficulty.as_deref(), Some("normal"));
    assert_eq!(cfg.pvp, Some(true));
    assert_eq!(cfg.rcon_port, Some(25575));
    assert!(cfg.motd.is_none());
    assert!(cfg.level_seed.is_none());
}

#[test]
fn update_sets_recognized_key() {
    let mut cfg = ServerConfig::new("srv-abc".to_string());
    let mut patch = HashMap::new();
    patch.insert("motd".to_string(), Some(FieldValue::Text("Welcome!".to_string())));
    cfg.update(&patch);
    assert_eq!(cfg.motd.as_deref(), Some("Welcome!"));
}

#[test]
fn update_ignores_unrecognized_key() {
    let mut cfg = ServerConfig::new("srv-abc".to_string());
    let mut patch = HashMap::new();
    patch.insert("not_a_field".to_string(), Some(FieldValue::Text("x".to_string())));
    cfg.update(&patch);
    // No panic, no corresponding struct field to check; absence of a crash
    // and an unchanged config is the assertion.
    assert!(cfg.motd.is_none());
}

#[test]
fn update_null_clears_field() {
    let mut cfg = ServerConfig::new("srv-abc".to_string());
    cfg.motd = Some("old".to_string());
    let mut patch = HashMap::new();
    patch.insert("motd".to_string(), None);
    cfg.update(&patch);
    assert!(cfg.motd.is_none());
}

#[test]
fn update_silently_ignores_type_mismatch() {
    let mut cfg = ServerConfig::new("srv-abc".to_string());
    let mut patch = HashMap::new();
    patch.insert("pvp".to_string(), Some(FieldValue::Text("not-a-bool".to_string())));
    cfg.update(&patch);
    assert!(cfg.pvp.is_none());
}

#[test]
fn update_coerces_numeric_string_for_number_field() {
    let mut cfg = ServerConfig::new("srv-abc".to_string());
    let mut patch = HashMap::new();
    patch.insert("view_distance".to_string(), Some(FieldValue::Text("12".to_string())));
    cfg.update(&patch);
    assert_eq!(cfg.view_distance, Some(12));
}

#[test]
fn project_emits_only_non_null_env_tagged_fields() {
    let mut cfg = ServerConfig::new("srv-abc".to_string());
    cfg.motd = Some("hi".to_string());
    cfg.pvp = Some(false);
    let env = cfg.project();
    assert_eq!(env.get("MOTD"), Some(&"hi".to_string()));
    assert_eq!(env.get("PVP"), Some(&"false".to_string()));
    assert!(!env.contains_key("DIFFICULTY"));
}

#[test]
fn project_suffixes_jvm_heap_fields_with_megabyte_unit() {
    let mut cfg = ServerConfig::new("srv-abc".to_string());
    cfg.jvm_max_heap_mb = Some(1536);
    cfg.jvm_init_heap_mb = Some(921);
    let env = cfg.project();
    assert_eq!(env.get("MAX_MEMORY"), Some(&"1536M".to_string()));
    assert_eq!(env.get("INIT_MEMORY"), Some(&"921M".to_string()));
}

#[test]
fn project_never_emits_metadata_only_fields() {
    let mut cfg = ServerConfig::new("srv-abc".to_string());
    cfg.modpack_id = Some("ftb-direwolf20".to_string());
    let env = cfg.project();
    assert!(env.values().all(|v| v != "ftb-direwolf20"));
}

#[test]
fn sync_with_server_derives_heap_sizes_from_memory_budget() {
    let mut cfg = ServerConfig::new("srv-abc".to_string());
    let server = Server::test_fixture(crate::server::ServerId::from_string("srv-abc"));
    cfg.sync_with_server(&server);
    assert_eq!(cfg.jvm_max_heap_mb, Some((server.memory_mib as i64 * 75) / 100));
    assert_eq!(cfg.jvm_init_heap_mb, Some((server.memory_mib as i64 * 45) / 100));
}

#[test]
fn clear_ephemeral_nulls_only_ephemeral_fields() {
    let mut cfg = ServerConfig::new("srv-abc".to_string());
    cfg.rcon_password = Some("hunter2".to_string());
    cfg.motd = Some("keep me".to_string());
    cfg.clear_ephemeral();
    assert!(cfg.rcon_password.is_none());
    assert_eq!(cfg.motd.as_deref(), Some("keep me"));
}

#[test]
fn fields_catalog_keys_are_unique() {
    let mut seen = std::collections::HashSet::new();
    for field in fields() {
        assert!(seen.insert(field.key), "duplicate field key: {}", field.key);
    }
}
