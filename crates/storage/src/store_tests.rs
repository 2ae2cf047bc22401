use super::*;
use fleetd_core::{FakeClock, ProxyListenerId, Server};
use tempfile::tempdir;

fn open_store() -> (Store<FakeClock>, tempfile::TempDir) {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("state.json");
    let store = Store::open(path, FakeClock::new()).expect("open");
    (store, dir)
}

#[test]
fn create_then_get_server_round_trips() {
    let (store, _dir) = open_store();
    let server = Server::test_fixture(ServerId::new());
    let id = server.id;
    store.create_server(server).expect("create");
    let fetched = store.get_server(id).expect("get");
    assert_eq!(fetched.id, id);
}

#[test]
fn get_server_not_found_returns_error() {
    let (store, _dir) = open_store();
    let err = store.get_server(ServerId::new()).unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[test]
fn update_server_persists_across_reopen() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("state.json");
    let id;
    {
        let store = Store::open(path.clone(), FakeClock::new()).expect("open");
        let mut server = Server::test_fixture(ServerId::new());
        id = server.id;
        store.create_server(server.clone()).expect("create");
        server.name = "renamed".to_string();
        store.update_server(server).expect("update");
    }
    let reopened = Store::open(path, FakeClock::new()).expect("reopen");
    let server = reopened.get_server(id).expect("get");
    assert_eq!(server.name, "renamed");
}

#[test]
fn delete_server_removes_server_and_config() {
    let (store, _dir) = open_store();
    let server = Server::test_fixture(ServerId::new());
    let id = server.id;
    store.create_server(server).expect("create");
    store.create_default_server_config(id).expect("config");
    store.delete_server(id).expect("delete");
    assert!(store.get_server(id).is_err());
    assert!(store.get_server_config(id).is_err());
}

#[test]
fn get_server_by_port_ignores_proxied_servers() {
    let (store, _dir) = open_store();
    let mut proxied = Server::test_fixture(ServerId::new());
    proxied.proxy_hostname = Some("play.example.com".into());
    proxied.proxy_listener_id = Some(ProxyListenerId::new());
    proxied.external_port = 25565;
    store.create_server(proxied).expect("create proxied");

    let mut direct = Server::test_fixture(ServerId::new());
    direct.external_port = 25566;
    let direct_id = direct.id;
    store.create_server(direct).expect("create direct");

    let found = store.get_server_by_port(25566).expect("found");
    assert_eq!(found.id, direct_id);
    assert!(store.get_server_by_port(25565).is_none());
}

#[test]
fn clear_ephemeral_config_fields_nulls_rcon_password() {
    let (store, _dir) = open_store();
    let server = Server::test_fixture(ServerId::new());
    let id = server.id;
    store.create_server(server).expect("create");
    let mut config = store.create_default_server_config(id).expect("config");
    config.rcon_password = Some("secret".into());
    store.save_server_config(config).expect("save");

    store.clear_ephemeral_config_fields(id).expect("clear");
    let config = store.get_server_config(id).expect("get");
    assert!(config.rcon_password.is_none());
}

#[test]
fn delete_proxy_listener_rejected_while_referenced() {
    let (store, _dir) = open_store();
    let listener = ProxyListener {
        id: ProxyListenerId::new(),
        name: "default".into(),
        port: 25565,
        enabled: true,
        is_default: true,
    };
    store.create_proxy_listener(listener.clone()).expect("create listener");

    let mut server = Server::test_fixture(ServerId::new());
    server.proxy_hostname = Some("play.example.com".into());
    server.proxy_listener_id = Some(listener.id);
    store.create_server(server).expect("create server");

    let err = store.delete_proxy_listener(listener.id).unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)));
}

#[test]
fn delete_proxy_listener_succeeds_when_unreferenced() {
    let (store, _dir) = open_store();
    let listener = ProxyListener {
        id: ProxyListenerId::new(),
        name: "default".into(),
        port: 25565,
        enabled: true,
        is_default: true,
    };
    store.create_proxy_listener(listener.clone()).expect("create listener");
    store.delete_proxy_listener(listener.id).expect("delete");
    assert!(store.get_proxy_listener(listener.id).is_err());
}

#[test]
fn save_proxy_config_updates_global_settings() {
    let (store, _dir) = open_store();
    let cfg = ProxyConfig { enabled: true, base_dns_suffix: Some("play.example.com".into()) };
    store.save_proxy_config(cfg.clone()).expect("save");
    let fetched = store.get_proxy_config();
    assert_eq!(fetched.enabled, cfg.enabled);
    assert_eq!(fetched.base_dns_suffix, cfg.base_dns_suffix);
}

#[test]
fn server_lock_returns_same_handle_for_same_id() {
    let (store, _dir) = open_store();
    let id = ServerId::new();
    let a = store.server_lock(id);
    let b = store.server_lock(id);
    assert!(Arc::ptr_eq(&a, &b));
}
