use super::*;

#[test]
fn default_state_is_empty() {
    let state = MaterializedState::default();
    assert!(state.servers.is_empty());
    assert!(state.server_configs.is_empty());
    assert!(state.proxy_listeners.is_empty());
    assert!(!state.proxy_config.enabled);
}

#[test]
fn state_round_trips_through_json() {
    let mut state = MaterializedState::default();
    let server = Server::test_fixture(ServerId::new());
    state.server_configs.insert(server.id, ServerConfig::with_defaults(server.id.to_string()));
    state.servers.insert(server.id, server);

    let json = serde_json::to_string(&state).expect("serialize");
    let back: MaterializedState = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back.servers.len(), 1);
    assert_eq!(back.server_configs.len(), 1);
}
