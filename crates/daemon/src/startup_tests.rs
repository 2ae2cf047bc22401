use super::*;
use fleetd_driver::FakeDriver;

fn config_in(dir: &std::path::Path) -> Config {
    Config {
        lock_path: dir.join("fleetd.pid"),
        snapshot_path: dir.join("snapshot.json"),
        state_dir: dir.to_path_buf(),
        bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
        drain_timeout: Duration::from_millis(50),
        log_ring_capacity: None,
    }
}

#[tokio::test]
async fn startup_succeeds_and_binds_ephemeral_port() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = config_in(dir.path());

    let result = startup_with_driver(config, Arc::new(FakeDriver::new())).await;
    let started = match result {
        Ok(started) => started,
        Err(err) => panic!("startup should succeed: {err}"),
    };

    assert!(started.listener.local_addr().is_ok());
    assert!(dir.path().join("fleetd.pid").exists());
}

#[tokio::test]
async fn startup_with_custom_ring_capacity_is_accepted() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut config = config_in(dir.path());
    config.log_ring_capacity = Some(128);

    let result = startup_with_driver(config, Arc::new(FakeDriver::new())).await;
    assert!(result.is_ok(), "startup with a ring capacity override should succeed");
}

#[tokio::test]
async fn second_startup_against_same_lock_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = config_in(dir.path());

    let first = startup_with_driver(config.clone(), Arc::new(FakeDriver::new()))
        .await
        .expect("first startup should succeed");

    let second = startup_with_driver(config.clone(), Arc::new(FakeDriver::new())).await;
    match second {
        Err(StartupError::LockFailed(_)) => {}
        Err(other) => panic!("expected LockFailed, got {other}"),
        Ok(_) => panic!("second startup against a held lock should fail"),
    }

    // Lock file must survive a LockFailed error so a legitimate running
    // daemon's PID file isn't clobbered by the failed contender.
    assert!(config.lock_path.exists());
    drop(first);
}

#[tokio::test]
async fn lock_is_released_after_shutdown_handle_runs() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = config_in(dir.path());

    let first = startup_with_driver(config.clone(), Arc::new(FakeDriver::new()))
        .await
        .expect("first startup should succeed");
    let proxy = first.proxy.clone();
    let lock_path = config.lock_path.clone();
    drop(first);

    ShutdownHandle { proxy, lock_path: lock_path.clone() }.shutdown().await;
    assert!(!lock_path.exists());

    let second = startup_with_driver(config, Arc::new(FakeDriver::new())).await;
    assert!(second.is_ok(), "startup should succeed once the prior lock is released");
}

#[tokio::test]
async fn bind_failure_cleans_up_the_lock_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut config = config_in(dir.path());

    // Bind a throwaway listener first, then point the daemon at the exact
    // same address so its own bind step fails.
    let busy = tokio::net::TcpListener::bind(config.bind_addr).await.expect("bind throwaway listener");
    config.bind_addr = busy.local_addr().expect("local_addr");

    let result = startup_with_driver(config.clone(), Arc::new(FakeDriver::new())).await;
    match result {
        Err(StartupError::BindFailed(..)) => {}
        Err(other) => panic!("expected BindFailed, got {other}"),
        Ok(_) => panic!("startup should not succeed when the bind address is already in use"),
    }
    assert!(!config.lock_path.exists(), "lock file should be cleaned up on a non-lock startup failure");
}
