use super::*;
use fleetd_core::ServerId;

#[test]
fn create_listener_request_defaults_enabled_true_and_default_false() {
    let json = r#"{"name": "default", "port": 25565}"#;
    let req: CreateProxyListenerRequest = serde_json::from_str(json).expect("deserialize failed");
    assert!(req.enabled);
    assert!(!req.is_default);
}

#[test]
fn route_view_flattens_hostname_alongside_route_fields() {
    let route = Route { server_id: ServerId::new(), backend_host: "127.0.0.1".to_string(), backend_port: 30000, active: true };
    let view = RouteView { hostname: "bravo.test".to_string(), route };

    let json = serde_json::to_value(&view).expect("serialize failed");
    assert_eq!(json["hostname"], "bravo.test");
    assert_eq!(json["backend_port"], 30000);
    assert_eq!(json["active"], true);
}
