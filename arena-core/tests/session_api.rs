//! Opening arena sessions against a loopback API responder.

use arena_api::{ApiConfig, ArenaApi, TokenStore};
use arena_core::testing::ScriptedRoller;
use arena_core::{ArenaSession, Level, Pacing, Phase, SessionConfig, SessionError};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

async fn serve_once(status_line: &str, body: &str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let response = format!(
        "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
            if request.windows(4).any(|w| w == b"\r\n\r\n") {
                break;
            }
        }
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        String::from_utf8_lossy(&request).to_string()
    });

    (format!("http://{addr}"), handle)
}

fn api(base_url: &str) -> ArenaApi {
    ArenaApi::new(ApiConfig::new(base_url))
        .unwrap()
        .with_token("jwt-abc")
}

#[tokio::test]
async fn test_open_loads_character_and_builds_fight() {
    let body = r#"{"id":4,"name":"Iron Vex","strength":55,"speed":45,"durability":20,"power":35,"combat":60,"user":2,"image":null}"#;
    let (url, server) = serve_once("200 OK", body).await;
    let dir = tempfile::tempdir().unwrap();
    let tokens = TokenStore::new(dir.path().join("token"));

    let config = SessionConfig::new(Level::new(3).unwrap())
        .with_character(4)
        .with_pacing(Pacing::instant());
    let session = ArenaSession::open_with_roller(&api(&url), &tokens, config, ScriptedRoller::new())
        .await
        .unwrap();

    assert_eq!(session.character().name, "Iron Vex");
    assert_eq!(session.combat().player().max_health(), 140);
    assert_eq!(session.combat().enemy().max_health(), 160);
    assert_eq!(session.phase(), Phase::NotStarted);
    assert_eq!(session.arena().pacing(), Pacing::instant());

    let request = server.await.unwrap().to_ascii_lowercase();
    assert!(request.starts_with("get /api/characters/4 "));
    assert!(request.contains("authorization: bearer jwt-abc"));
}

#[tokio::test]
async fn test_unauthorized_clears_token() {
    let (url, server) = serve_once("401 Unauthorized", r#"{"message":"Invalid JWT Token"}"#).await;
    let dir = tempfile::tempdir().unwrap();
    let tokens = TokenStore::new(dir.path().join("token"));
    tokens.save("jwt-abc").await.unwrap();

    let config = SessionConfig::new(Level::FIRST).with_character(4);
    let result = ArenaSession::open(&api(&url), &tokens, config).await;

    assert!(matches!(result, Err(SessionError::NotAuthenticated)));
    assert_eq!(tokens.load().await.unwrap(), None);
    server.await.unwrap();
}

#[tokio::test]
async fn test_server_error_is_load_failure() {
    let (url, server) = serve_once("500 Internal Server Error", r#"{"error":"database down"}"#).await;
    let dir = tempfile::tempdir().unwrap();
    let tokens = TokenStore::new(dir.path().join("token"));
    tokens.save("jwt-abc").await.unwrap();

    let config = SessionConfig::new(Level::FIRST).with_character(4);
    match ArenaSession::open(&api(&url), &tokens, config).await {
        Err(SessionError::Load(arena_api::Error::Api { status, message })) => {
            assert_eq!(status, 500);
            assert_eq!(message, "database down");
        }
        other => panic!("expected load failure, got {:?}", other.err()),
    }
    // other failures leave the token alone
    assert_eq!(tokens.load().await.unwrap().as_deref(), Some("jwt-abc"));
    server.await.unwrap();
}

#[tokio::test]
async fn test_missing_selection_makes_no_request() {
    let dir = tempfile::tempdir().unwrap();
    let tokens = TokenStore::new(dir.path().join("token"));
    let result = ArenaSession::open(&api("http://127.0.0.1:9"), &tokens, SessionConfig::new(Level::FIRST)).await;
    assert!(matches!(result, Err(SessionError::NoCharacterSelected)));
}
