use super::*;

fn frame(stream_type: u8, payload: &[u8]) -> Vec<u8> {
    let mut out = vec![stream_type, 0, 0, 0];
    out.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    out.extend_from_slice(payload);
    out
}

#[test]
fn decodes_single_stdout_frame() {
    let mut demux = Demuxer::new();
    demux.feed(&frame(1, b"hello\n"));
    let (kind, payload) = demux.next_frame().expect("frame");
    assert_eq!(kind, StreamKind::Stdout);
    assert_eq!(&payload[..], b"hello\n");
    assert!(demux.next_frame().is_none());
}

#[test]
fn decodes_stderr_frame() {
    let mut demux = Demuxer::new();
    demux.feed(&frame(2, b"oops\n"));
    let (kind, _) = demux.next_frame().expect("frame");
    assert_eq!(kind, StreamKind::Stderr);
}

#[test]
fn handles_split_header_across_feeds() {
    let full = frame(1, b"partial\n");
    let mut demux = Demuxer::new();
    demux.feed(&full[..3]);
    assert!(demux.next_frame().is_none());
    demux.feed(&full[3..]);
    let (kind, payload) = demux.next_frame().expect("frame");
    assert_eq!(kind, StreamKind::Stdout);
    assert_eq!(&payload[..], b"partial\n");
}

#[test]
fn handles_multiple_frames_in_one_feed() {
    let mut bytes = frame(1, b"one\n");
    bytes.extend(frame(2, b"two\n"));
    let mut demux = Demuxer::new();
    demux.feed(&bytes);

    let (kind1, p1) = demux.next_frame().expect("frame 1");
    assert_eq!(kind1, StreamKind::Stdout);
    assert_eq!(&p1[..], b"one\n");

    let (kind2, p2) = demux.next_frame().expect("frame 2");
    assert_eq!(kind2, StreamKind::Stderr);
    assert_eq!(&p2[..], b"two\n");
}

#[test]
fn incomplete_body_waits_for_more_data() {
    let full = frame(1, b"abcdefgh");
    let mut demux = Demuxer::new();
    demux.feed(&full[..10]);
    assert!(demux.next_frame().is_none());
    demux.feed(&full[10..]);
    assert!(demux.next_frame().is_some());
}
