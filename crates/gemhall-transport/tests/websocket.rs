//! Integration tests for the WebSocket transport over real sockets.

#[cfg(feature = "websocket")]
mod websocket {
    use futures_util::{SinkExt, StreamExt};
    use gemhall_transport::{Connection, Transport, WebSocketConnection, WebSocketTransport};
    use tokio_tungstenite::tungstenite::Message;

    type ClientWs = tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >;

    /// Binds on an OS-assigned port, connects one client to `path`, and
    /// returns both ends.
    async fn connected_pair(path: &str) -> (WebSocketConnection, ClientWs) {
        let mut transport = WebSocketTransport::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = transport.local_addr().expect("bound address");

        let server = tokio::spawn(async move { transport.accept().await.expect("should accept") });
        let (client, _) = tokio_tungstenite::connect_async(format!("ws://{addr}{path}"))
            .await
            .expect("client should connect");
        let conn = server.await.expect("accept task");
        (conn, client)
    }

    #[tokio::test]
    async fn test_websocket_send_uses_text_frames() {
        let (conn, mut client) = connected_pair("/").await;
        assert!(conn.id().into_inner() > 0);

        conn.send(br#"{"type":"pong"}"#).await.expect("send");
        let msg = client.next().await.unwrap().unwrap();
        assert_eq!(msg, Message::Text(r#"{"type":"pong"}"#.to_string().into()));
    }

    #[tokio::test]
    async fn test_websocket_recv_accepts_text_and_binary() {
        let (conn, mut client) = connected_pair("/").await;

        client
            .send(Message::Text("hello".to_string().into()))
            .await
            .unwrap();
        client
            .send(Message::Binary(b"raw".to_vec().into()))
            .await
            .unwrap();

        assert_eq!(conn.recv().await.unwrap().unwrap(), b"hello");
        assert_eq!(conn.recv().await.unwrap().unwrap(), b"raw");
    }

    #[tokio::test]
    async fn test_websocket_send_while_recv_pending() {
        let (conn, mut client) = connected_pair("/").await;
        let conn = std::sync::Arc::new(conn);

        let reader = {
            let conn = std::sync::Arc::clone(&conn);
            tokio::spawn(async move { conn.recv().await })
        };
        tokio::task::yield_now().await;

        conn.send(b"pushed").await.expect("send is not blocked by recv");
        assert!(client.next().await.unwrap().unwrap().is_text());

        client.send(Message::Close(None)).await.unwrap();
        assert!(reader.await.unwrap().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_websocket_captures_handshake_query() {
        let (conn, _client) = connected_pair("/ws?roomId=tiger&playerId=K7M2QX9A").await;
        assert_eq!(conn.query_param("roomId"), Some("tiger"));
        assert_eq!(conn.query_param("playerId"), Some("K7M2QX9A"));
        assert_eq!(conn.query_param("missing"), None);
    }

    #[tokio::test]
    async fn test_websocket_recv_returns_none_on_client_close() {
        let (conn, mut client) = connected_pair("/").await;
        client.send(Message::Close(None)).await.unwrap();
        assert!(conn.recv().await.expect("clean close").is_none());
    }

    #[tokio::test]
    async fn test_websocket_pong_counts_as_activity() {
        let (conn, mut client) = connected_pair("/").await;
        let conn = std::sync::Arc::new(conn);

        let reader = {
            let conn = std::sync::Arc::clone(&conn);
            tokio::spawn(async move { conn.recv().await })
        };
        tokio::time::sleep(std::time::Duration::from_millis(150)).await;
        assert!(conn.idle_for() >= std::time::Duration::from_millis(150));

        conn.ping().await.expect("ping");
        let frame = client.next().await.unwrap().unwrap();
        assert!(frame.is_ping());
        // Reading the ping queued a pong; flushing puts it on the wire.
        client.flush().await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(30)).await;

        assert!(conn.idle_for() < std::time::Duration::from_millis(150));
        reader.abort();
    }
}
