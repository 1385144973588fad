//! Integration tests for the TCP transport.
//!
//! These spin up a raw TCP listener on a random port and talk to the
//! client side through the length-delimited framing, byte by byte where
//! it matters.

use std::time::Duration;

use chesslink_transport::{TransportError, connect};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Binds a listener on a random port and returns it with its port.
async fn listener() -> (TcpListener, u16) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("should bind");
    let port = listener.local_addr().expect("local addr").port();
    (listener, port)
}

fn frame(payload: &[u8]) -> Vec<u8> {
    let mut out = (payload.len() as u32).to_be_bytes().to_vec();
    out.extend_from_slice(payload);
    out
}

async fn read_frame(stream: &mut TcpStream) -> Vec<u8> {
    let mut len = [0u8; 4];
    stream.read_exact(&mut len).await.expect("read length");
    let mut payload = vec![0u8; u32::from_be_bytes(len) as usize];
    stream.read_exact(&mut payload).await.expect("read payload");
    payload
}

#[tokio::test]
async fn test_send_and_receive_frames() {
    let (listener, port) = listener().await;
    let server = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.expect("accept");
        stream.write_all(&frame(b"hello from server")).await.unwrap();
        read_frame(&mut stream).await
    });

    let conn = connect("127.0.0.1", port).await.expect("should connect");
    assert!(conn.id().into_inner() > 0);
    let (mut reader, mut writer) = conn.into_split();

    let received = reader
        .recv()
        .await
        .expect("recv should succeed")
        .expect("should have data");
    assert_eq!(received, b"hello from server");

    writer.send(b"hello from client").await.expect("send");
    let echoed = server.await.expect("server task");
    assert_eq!(echoed, b"hello from client");
}

#[tokio::test]
async fn test_recv_returns_none_when_peer_closes() {
    let (listener, port) = listener().await;
    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.expect("accept");
        drop(stream);
    });

    let conn = connect("127.0.0.1", port).await.expect("should connect");
    server.await.unwrap();
    let (mut reader, _writer) = conn.into_split();

    let result = reader.recv().await.expect("clean close is not an error");
    assert!(result.is_none());
}

#[tokio::test]
async fn test_connect_refused_is_connect_failed() {
    // Bind and immediately drop to get a port nobody listens on.
    let (listener, port) = listener().await;
    drop(listener);

    let result = connect("127.0.0.1", port).await;
    assert!(matches!(result, Err(TransportError::ConnectFailed { .. })));
}

#[tokio::test]
async fn test_cancelled_recv_keeps_partial_frame() {
    let (listener, port) = listener().await;
    let (tx, rx) = tokio::sync::oneshot::channel::<()>();
    let server = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.expect("accept");
        let bytes = frame(b"split across a cancel");
        stream.write_all(&bytes[..7]).await.unwrap();
        // Wait until the client has abandoned its first read.
        rx.await.unwrap();
        stream.write_all(&bytes[7..]).await.unwrap();
        stream
    });

    let conn = connect("127.0.0.1", port).await.expect("should connect");
    let (mut reader, _writer) = conn.into_split();

    let first =
        tokio::time::timeout(Duration::from_millis(100), reader.recv()).await;
    assert!(first.is_err(), "partial frame must not resolve");

    tx.send(()).unwrap();
    let frame = reader.recv().await.unwrap().unwrap();
    assert_eq!(frame, b"split across a cancel");
    drop(server.await.unwrap());
}

#[tokio::test]
async fn test_close_is_idempotent_and_blocks_further_sends() {
    let (listener, port) = listener().await;
    let server = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.expect("accept");
        let mut buf = Vec::new();
        // Reads until the client shuts its write side down.
        stream.read_to_end(&mut buf).await.unwrap();
        buf
    });

    let conn = connect("127.0.0.1", port).await.expect("should connect");
    let (_reader, mut writer) = conn.into_split();
    writer.close().await.expect("first close");
    writer.close().await.expect("second close is a no-op");
    assert!(matches!(
        writer.send(b"late").await,
        Err(TransportError::ConnectionClosed(_))
    ));

    let seen = server.await.unwrap();
    assert!(seen.is_empty());
}

#[tokio::test]
async fn test_oversized_frame_is_receive_error() {
    let (listener, port) = listener().await;
    let server = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.expect("accept");
        let len = (chesslink_transport::MAX_FRAME_LEN as u32) + 1;
        stream.write_all(&len.to_be_bytes()).await.unwrap();
        stream
    });

    let conn = connect("127.0.0.1", port).await.expect("should connect");
    let (mut reader, _writer) = conn.into_split();
    let result = reader.recv().await;
    assert!(matches!(result, Err(TransportError::ReceiveFailed(_))));
    drop(server.await.unwrap());
}
