use super::*;
use fleetd_core::{FakeClock, ProxyConfig, ProxyListener, ProxyListenerId};
use fleetd_driver::{ContainerDriver, FakeDriver};
use fleetd_storage::Store;
use std::sync::Arc;
use tempfile::TempDir;

fn controller() -> (Controller<FakeDriver, FakeClock>, TempDir, Arc<Store<FakeClock>>, Arc<FakeDriver>) {
    let dir = TempDir::new().expect("tempdir");
    let clock = FakeClock::new();
    let store = Arc::new(Store::open(dir.path().join("state.json"), clock.clone()).expect("open store"));
    let driver = Arc::new(FakeDriver::new());
    let logs = Arc::new(LogStreamer::new(driver.clone(), clock.clone()));
    let routes = Arc::new(fleetd_proxy::RouteTable::new());
    let controller = Controller::new(store.clone(), driver.clone(), logs, routes, clock, dir.path().to_path_buf());
    (controller, dir, store, driver)
}

fn base_request(name: &str, port: u16) -> CreateRequest {
    CreateRequest {
        name: name.to_string(),
        description: String::new(),
        mod_loader: "vanilla".to_string(),
        mc_version: "1.20.1".to_string(),
        port: Some(port),
        max_players: 20,
        memory_mib: 2048,
        docker_image: "itzg/minecraft-server:latest".to_string(),
        auto_start: true,
        start_immediately: true,
        modpack_id: None,
        proxy_hostname: None,
        proxy_listener_id: None,
        use_base_url: false,
    }
}

async fn wait_until<F: Fn(&Server) -> bool>(controller: &Controller<FakeDriver, FakeClock>, id: ServerId, pred: F) -> Server {
    for _ in 0..200 {
        let server = controller.get_server(id, false).await.expect("get_server");
        if pred(&server) {
            return server;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition never became true for server {id}");
}

#[tokio::test]
async fn create_non_proxied_and_start_reaches_running_with_projected_env() {
    // S1
    let (controller, _dir, store, _driver) = controller();
    let server = controller.create(base_request("alpha", 25565)).await.expect("create");
    assert_eq!(server.status, ServerStatus::Creating);

    let server = wait_until(&controller, server.id, |s| s.status.is_running()).await;
    assert_eq!(server.external_port, 25565);
    assert!(server.container_id.is_some());

    let config = store.get_server_config(server.id).expect("config");
    assert_eq!(config.jvm_max_heap_mb, Some(1536));
}

#[tokio::test]
async fn create_rejects_port_already_in_use_by_another_server() {
    // S2
    let (controller, _dir, store, _driver) = controller();
    let first = controller.create(base_request("alpha", 25565)).await.expect("create alpha");
    wait_until(&controller, first.id, |s| !matches!(s.status, ServerStatus::Creating)).await;

    let err = controller.create(base_request("collider", 25565)).await.expect_err("must conflict");
    assert!(matches!(err, Error::Conflict(_)));
    assert!(!store.list_servers().iter().any(|s| s.name == "collider"));
}

#[tokio::test]
async fn create_proxied_resolves_default_listener_and_installs_route_on_start() {
    // S3
    let (controller, _dir, store, _driver) = controller();
    let listener = ProxyListener { id: ProxyListenerId::new(), name: "default".to_string(), port: 25565, enabled: true, is_default: true };
    store.create_proxy_listener(listener.clone()).expect("create listener");
    store.save_proxy_config(ProxyConfig { enabled: true, base_dns_suffix: None }).expect("save config");

    let mut req = base_request("bravo", 0);
    req.port = None;
    req.proxy_hostname = Some("bravo.test".to_string());

    let server = controller.create(req).await.expect("create");
    assert_eq!(server.internal_port, 25565);
    assert_eq!(server.external_port, listener.port);

    let server = wait_until(&controller, server.id, |s| s.status.is_running()).await;

    let routes = controller.routes().snapshot();
    let (hostname, route) = routes.iter().find(|(_, r)| r.server_id == server.id).expect("route installed");
    assert_eq!(hostname, "bravo.test");
    assert!(route.active);
}

#[tokio::test]
async fn use_base_url_derives_hostname_from_name_and_dns_suffix() {
    let (controller, _dir, store, _driver) = controller();
    let listener = ProxyListener { id: ProxyListenerId::new(), name: "default".to_string(), port: 25565, enabled: true, is_default: true };
    store.create_proxy_listener(listener).expect("create listener");
    store.save_proxy_config(ProxyConfig { enabled: true, base_dns_suffix: Some("example.com".to_string()) }).expect("save config");

    let mut req = base_request("Charlie Server", 0);
    req.port = None;
    req.use_base_url = true;

    let server = controller.create(req).await.expect("create");
    assert_eq!(server.proxy_hostname.as_deref(), Some("charlie_server.example.com"));
}

#[tokio::test]
async fn update_memory_forces_recreate_and_rebinds_env() {
    // S5
    let (controller, _dir, store, _driver) = controller();
    let server = controller.create(base_request("alpha", 25565)).await.expect("create");
    let server = wait_until(&controller, server.id, |s| s.status.is_running()).await;
    let old_container_id = server.container_id.clone().expect("container id");

    let update = UpdateRequest { memory_mib: Some(4096), ..Default::default() };
    let updated = controller.update(server.id, update).await.expect("update");

    assert_ne!(updated.container_id, Some(old_container_id));
    assert_eq!(updated.status, ServerStatus::Running);

    let config = store.get_server_config(server.id).expect("config");
    assert_eq!(config.jvm_max_heap_mb, Some(3072));
}

#[tokio::test]
async fn container_id_survives_a_missing_container_until_user_action() {
    // Invariant 1
    let (controller, _dir, _store, driver) = controller();
    let server = controller.create(base_request("alpha", 25565)).await.expect("create");
    let server = wait_until(&controller, server.id, |s| s.status.is_running()).await;
    let container_id = server.container_id.clone().expect("container id");

    // The runtime loses track of the container out-of-band (e.g. removed
    // directly via the Docker CLI). A reconciling read must normalize the
    // status to Stopped without clearing container_id.
    driver.remove(&container_id).await.expect("simulate out-of-band removal");

    let reconciled = controller.get_server(server.id, false).await.expect("get_server");
    assert_eq!(reconciled.status, ServerStatus::Stopped);
    assert_eq!(reconciled.container_id, Some(container_id), "container_id must survive until explicit user action");
}

#[tokio::test]
async fn proxied_server_invariant_holds() {
    // Invariant 2
    let (controller, _dir, store, _driver) = controller();
    let listener = ProxyListener { id: ProxyListenerId::new(), name: "default".to_string(), port: 30000, enabled: true, is_default: true };
    store.create_proxy_listener(listener.clone()).expect("create listener");

    let mut req = base_request("bravo", 0);
    req.port = None;
    req.proxy_hostname = Some("bravo.test".to_string());
    let server = controller.create(req).await.expect("create");

    assert_eq!(server.internal_port, 25565);
    assert!(server.proxy_listener_id.is_some());
    assert_eq!(server.external_port, listener.port);
}

#[tokio::test]
async fn two_non_proxied_servers_never_share_an_external_port() {
    // Invariant 3
    let (controller, _dir, _store, _driver) = controller();
    let first = controller.create(base_request("alpha", 25565)).await.expect("create alpha");
    wait_until(&controller, first.id, |s| !matches!(s.status, ServerStatus::Creating)).await;

    let err = controller.create(base_request("beta", 25565)).await.expect_err("must conflict");
    assert!(matches!(err, Error::Conflict(_)));
}

#[tokio::test]
async fn start_on_running_server_is_a_no_op() {
    // Invariant 9
    let (controller, _dir, _store, _driver) = controller();
    let server = controller.create(base_request("alpha", 25565)).await.expect("create");
    let server = wait_until(&controller, server.id, |s| s.status.is_running()).await;
    let container_id = server.container_id.clone();

    let again = controller.start(server.id).await.expect("start again");
    assert_eq!(again.status, ServerStatus::Running);
    assert_eq!(again.container_id, container_id);
}

#[tokio::test]
async fn stop_then_stop_is_idempotent() {
    // Invariant 10
    let (controller, _dir, _store, _driver) = controller();
    let server = controller.create(base_request("alpha", 25565)).await.expect("create");
    let server = wait_until(&controller, server.id, |s| s.status.is_running()).await;

    let first = controller.stop(server.id).await.expect("first stop");
    assert_eq!(first.status, ServerStatus::Stopped);
    let second = controller.stop(server.id).await.expect("second stop");
    assert_eq!(second.status, ServerStatus::Stopped);
}

#[tokio::test]
async fn restart_without_container_creates_then_starts() {
    let (controller, _dir, store, _driver) = controller();
    let mut req = base_request("alpha", 25565);
    req.start_immediately = false;
    let server = controller.create(req).await.expect("create");
    let server = wait_until(&controller, server.id, |s| !matches!(s.status, ServerStatus::Creating)).await;

    // Force the server back to container-less, as if creation had never
    // produced one (e.g. a prior failed async create that the user retries
    // via restart).
    let mut stripped = store.get_server(server.id).expect("get");
    stripped.container_id = None;
    stripped.status = ServerStatus::Stopped;
    store.update_server(stripped).expect("update");

    let restarted = controller.restart(server.id).await.expect("restart");
    assert_eq!(restarted.status, ServerStatus::Running);
    assert!(restarted.container_id.is_some());
}

#[tokio::test]
async fn delete_removes_server_record_and_data_directory() {
    let (controller, _dir, store, _driver) = controller();
    let server = controller.create(base_request("alpha", 25565)).await.expect("create");
    let server = wait_until(&controller, server.id, |s| s.status.is_running()).await;
    std::fs::create_dir_all(&server.data_dir).expect("seed data dir");

    controller.delete(server.id).await.expect("delete");
    assert!(store.get_server(server.id).is_err());
    assert!(!std::path::Path::new(&server.data_dir).exists());
}

#[tokio::test]
async fn command_interleaves_with_container_output_in_log_order() {
    // S6
    let (controller, _dir, _store, driver) = controller();
    let server = controller.create(base_request("alpha", 25565)).await.expect("create");
    let server = wait_until(&controller, server.id, |s| s.status.is_running()).await;
    let container_id = server.container_id.clone().expect("container id");
    driver.set_exec_output(&container_id, "OK");

    let output = controller.run_command(server.id, "say hello").await.expect("run_command");
    assert_eq!(output, "OK");

    let entries = controller.get_logs(server.id, 0).expect("get_logs");
    assert_eq!(entries[0].kind, fleetd_core::LogEntryKind::Command);
    assert_eq!(entries[0].content, "say hello");
    assert_eq!(entries[1].kind, fleetd_core::LogEntryKind::CommandOutput);
    assert_eq!(entries[1].content, "OK");
    assert!(entries[0].timestamp <= entries[1].timestamp);
}
