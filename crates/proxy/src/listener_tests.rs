use super::*;
use fleetd_core::{ProxyListener, ProxyListenerId, Route, ServerId};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener as TokioTcpListener;

fn build_handshake_bytes(address: &str, next_state: i32) -> Vec<u8> {
    let mut body = Vec::new();
    crate::varint::encode_var_int(0x00, &mut body);
    crate::varint::encode_var_int(763, &mut body);
    crate::varint::encode_var_int(address.len() as i32, &mut body);
    body.extend_from_slice(address.as_bytes());
    body.extend_from_slice(&25565u16.to_be_bytes());
    crate::varint::encode_var_int(next_state, &mut body);

    let mut frame = Vec::new();
    crate::varint::encode_var_int(body.len() as i32, &mut frame);
    frame.extend_from_slice(&body);
    frame
}

async fn free_port() -> u16 {
    let l = TokioTcpListener::bind("127.0.0.1:0").await.expect("bind ephemeral");
    l.local_addr().expect("addr").port()
}

#[tokio::test]
async fn routes_to_backend_and_replays_handshake_bytes() {
    let backend_port = free_port().await;
    let backend = TokioTcpListener::bind(("127.0.0.1", backend_port)).await.expect("bind backend");
    let backend_task = tokio::spawn(async move {
        let (mut sock, _) = backend.accept().await.expect("accept");
        let mut buf = vec![0u8; 256];
        let n = sock.read(&mut buf).await.expect("read");
        sock.write_all(b"ack").await.expect("write");
        buf.truncate(n);
        buf
    });

    let routes = Arc::new(RouteTable::new());
    let server_id = ServerId::new();
    routes.update_server_route(
        "bravo.test",
        Route { server_id, backend_host: "127.0.0.1".to_string(), backend_port, active: true },
    );

    let manager = ProxyManager::new(routes.clone());
    let proxy_port = free_port().await;
    let listener = ProxyListener { id: ProxyListenerId::new(), name: "default".to_string(), port: proxy_port, enabled: true, is_default: true };
    manager.start(&[listener]).await.expect("start");
    assert!(manager.is_running());

    let handshake_bytes = build_handshake_bytes("bravo.test\0FML\0", 2);
    let mut client = TcpStream::connect(("127.0.0.1", proxy_port)).await.expect("connect");
    client.write_all(&handshake_bytes).await.expect("write handshake");

    let forwarded = backend_task.await.expect("backend task");
    assert_eq!(forwarded, handshake_bytes);

    let mut ack = [0u8; 3];
    client.read_exact(&mut ack).await.expect("read ack");
    assert_eq!(&ack, b"ack");

    manager.stop().await;
    assert!(!manager.is_running());
}

#[tokio::test]
async fn unknown_hostname_closes_without_dialing() {
    let routes = Arc::new(RouteTable::new());
    let manager = ProxyManager::new(routes);
    let proxy_port = free_port().await;
    let listener = ProxyListener { id: ProxyListenerId::new(), name: "default".to_string(), port: proxy_port, enabled: true, is_default: true };
    manager.start(&[listener]).await.expect("start");

    let handshake_bytes = build_handshake_bytes("nowhere.test", 1);
    let mut client = TcpStream::connect(("127.0.0.1", proxy_port)).await.expect("connect");
    client.write_all(&handshake_bytes).await.expect("write handshake");

    let mut buf = [0u8; 1];
    let n = client.read(&mut buf).await.expect("read after close");
    assert_eq!(n, 0, "connection should be closed with no bytes sent");

    manager.stop().await;
}

#[tokio::test]
async fn disabled_listener_is_not_started() {
    let routes = Arc::new(RouteTable::new());
    let manager = ProxyManager::new(routes);
    let proxy_port = free_port().await;
    let listener = ProxyListener { id: ProxyListenerId::new(), name: "disabled".to_string(), port: proxy_port, enabled: false, is_default: false };
    manager.start(&[listener]).await.expect("start");
    assert!(!manager.is_running());
}
