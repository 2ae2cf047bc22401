use super::*;
use crate::varint::encode_var_int;
use std::io::Cursor;

fn build_handshake_bytes(protocol_version: i32, address: &str, port: u16, next_state: i32) -> Vec<u8> {
    let mut body = Vec::new();
    encode_var_int(0x00, &mut body); // packet id
    encode_var_int(protocol_version, &mut body);
    encode_var_int(address.len() as i32, &mut body);
    body.extend_from_slice(address.as_bytes());
    body.extend_from_slice(&port.to_be_bytes());
    encode_var_int(next_state, &mut body);

    let mut frame = Vec::new();
    encode_var_int(body.len() as i32, &mut frame);
    frame.extend_from_slice(&body);
    frame
}

#[tokio::test]
async fn parses_well_formed_login_handshake() {
    let bytes = build_handshake_bytes(763, "play.example.com", 25565, 2);
    let mut cursor = Cursor::new(bytes.clone());
    let mut peeked = Vec::new();
    let handshake = read_handshake(&mut cursor, &mut peeked).await.expect("parse");

    assert_eq!(handshake.protocol_version, 763);
    assert_eq!(handshake.server_address, "play.example.com");
    assert_eq!(handshake.server_port, 25565);
    assert_eq!(handshake.next_state, HandshakeIntent::Login);
    assert_eq!(peeked, bytes);
}

#[tokio::test]
async fn status_handshake_decodes_intent_status() {
    let bytes = build_handshake_bytes(763, "play.example.com", 25565, 1);
    let mut cursor = Cursor::new(bytes);
    let mut peeked = Vec::new();
    let handshake = read_handshake(&mut cursor, &mut peeked).await.expect("parse");
    assert_eq!(handshake.next_state, HandshakeIntent::Status);
}

#[tokio::test]
async fn address_is_lowercased() {
    let bytes = build_handshake_bytes(763, "Play.Example.COM", 25565, 1);
    let mut cursor = Cursor::new(bytes);
    let mut peeked = Vec::new();
    let handshake = read_handshake(&mut cursor, &mut peeked).await.expect("parse");
    assert_eq!(handshake.server_address, "play.example.com");
}

#[tokio::test]
async fn fml_marker_is_stripped_from_address() {
    let bytes = build_handshake_bytes(763, "play.example.com\0FML\0", 25565, 2);
    let mut cursor = Cursor::new(bytes);
    let mut peeked = Vec::new();
    let handshake = read_handshake(&mut cursor, &mut peeked).await.expect("parse");
    assert_eq!(handshake.server_address, "play.example.com");
}

#[tokio::test]
async fn fml2_marker_is_stripped_from_address() {
    let bytes = build_handshake_bytes(763, "play.example.com\0FML2\0", 25565, 2);
    let mut cursor = Cursor::new(bytes);
    let mut peeked = Vec::new();
    let handshake = read_handshake(&mut cursor, &mut peeked).await.expect("parse");
    assert_eq!(handshake.server_address, "play.example.com");
}

#[tokio::test]
async fn rejects_unexpected_packet_id() {
    let mut body = Vec::new();
    encode_var_int(0x01, &mut body);
    let mut frame = Vec::new();
    encode_var_int(body.len() as i32, &mut frame);
    frame.extend_from_slice(&body);

    let mut cursor = Cursor::new(frame);
    let mut peeked = Vec::new();
    let err = read_handshake(&mut cursor, &mut peeked).await.unwrap_err();
    assert!(matches!(err, ProxyError::MalformedHandshake(_)));
}

#[tokio::test]
async fn rejects_declared_length_over_32kib() {
    let mut frame = Vec::new();
    encode_var_int(64 * 1024, &mut frame);
    let mut cursor = Cursor::new(frame);
    let mut peeked = Vec::new();
    let err = read_handshake(&mut cursor, &mut peeked).await.unwrap_err();
    assert!(matches!(err, ProxyError::PacketTooLarge(_)));
}

#[tokio::test]
async fn rejects_unknown_next_state() {
    let bytes = build_handshake_bytes(763, "play.example.com", 25565, 3);
    let mut cursor = Cursor::new(bytes);
    let mut peeked = Vec::new();
    let err = read_handshake(&mut cursor, &mut peeked).await.unwrap_err();
    assert!(matches!(err, ProxyError::MalformedHandshake(_)));
}
