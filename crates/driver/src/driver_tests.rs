use super::*;
use crate::fake::FakeDriver;
use crate::types::ContainerState;
use std::collections::HashMap;

fn spec() -> CreateSpec {
    CreateSpec {
        image: "itzg/minecraft-server:latest".to_string(),
        env: HashMap::new(),
        port_bindings: vec![(25565, 25565)],
        binds: vec![],
        labels: HashMap::new(),
    }
}

#[tokio::test]
async fn create_then_inspect_reports_created_state() {
    let driver = FakeDriver::new();
    let id = driver.create(&spec()).await.expect("create");
    let status = driver.inspect(&id).await.expect("inspect");
    assert_eq!(status.state, ContainerState::Created);
}

#[tokio::test]
async fn start_transitions_to_running() {
    let driver = FakeDriver::new();
    let id = driver.create(&spec()).await.expect("create");
    driver.start(&id).await.expect("start");
    let status = driver.inspect(&id).await.expect("inspect");
    assert_eq!(status.state, ContainerState::Running);
}

#[tokio::test]
async fn stop_transitions_to_exited() {
    let driver = FakeDriver::new();
    let id = driver.create(&spec()).await.expect("create");
    driver.start(&id).await.expect("start");
    driver.stop(&id).await.expect("stop");
    let status = driver.inspect(&id).await.expect("inspect");
    assert_eq!(status.state, ContainerState::Exited);
}

#[tokio::test]
async fn remove_then_inspect_returns_not_found() {
    let driver = FakeDriver::new();
    let id = driver.create(&spec()).await.expect("create");
    driver.remove(&id).await.expect("remove");
    let err = driver.inspect(&id).await.unwrap_err();
    assert!(matches!(err, crate::error::DriverError::NotFound(_)));
}

#[tokio::test]
async fn stats_are_zeroed_when_not_running() {
    let driver = FakeDriver::new();
    let id = driver.create(&spec()).await.expect("create");
    let stats = driver.stats(&id).await.expect("stats");
    assert_eq!(stats.memory_usage_bytes, 0);
    assert_eq!(stats.cpu_percent, 0.0);
}

#[tokio::test]
async fn inject_image_pull_failure() {
    let driver = FakeDriver::new();
    driver.fail_next_create_with(crate::error::DriverError::ImagePullFailed("no such image".into()));
    let err = driver.create(&spec()).await.unwrap_err();
    assert!(matches!(err, crate::error::DriverError::ImagePullFailed(_)));
}
