use super::*;

#[test]
fn listener_id_has_expected_prefix() {
    let id = ProxyListenerId::new();
    assert!(id.as_str().starts_with("lst-"));
}

#[test]
fn route_round_trips_through_json() {
    let route = Route {
        server_id: ServerId::new(),
        backend_host: "fleetd-srv-abc".to_string(),
        backend_port: 25565,
        active: true,
    };
    let json = serde_json::to_string(&route).expect("serialize");
    let back: Route = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, route);
}

#[test]
fn proxy_config_default_is_disabled_with_no_suffix() {
    let cfg = ProxyConfig::default();
    assert!(!cfg.enabled);
    assert!(cfg.base_dns_suffix.is_none());
}
