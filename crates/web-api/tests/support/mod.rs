use std::net::SocketAddr;
use std::time::Duration;

use config::{AppConfig, Tier};
use futures_util::StreamExt;
use infrastructure::Infrastructure;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::Value;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message as TungsteniteMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;
use web_api::{router, AppState, Claims};

pub const SECRET: &str = "e2e-test-secret-with-at-least-32-characters";

pub type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// 运行中的测试服务，使用内存队列与缩短的节拍
pub struct TestServer {
    pub addr: SocketAddr,
    pub state: AppState,
}

impl TestServer {
    pub fn ws_url(&self, path: &str) -> String {
        format!("ws://{}{}", self.addr, path)
    }

    pub fn http_url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig {
        tier: Tier::Test,
        ..AppConfig::default()
    };
    config.jwt.secret = SECRET.to_string();
    config.chat.tick_interval_ms = 50;
    config.chat.idle_deadline_ms = 400;
    config.notifier.poll_interval_ms = 50;
    config.notifier.tries_limit = 4;
    config
}

pub async fn spawn_server() -> TestServer {
    let config = test_config();
    let infra = Infrastructure::connect(&config.storage)
        .await
        .expect("memory backend");
    let state = AppState::new(
        &config,
        infra.message_queue,
        infra.event_queue,
        CancellationToken::new(),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let app = router(state.clone());
    tokio::spawn(async move {
        axum::serve(listener, app.into_make_service()).await.ok();
    });

    TestServer { addr, state }
}

pub fn token_for(user_id: i64) -> String {
    let claims = Claims {
        user_id,
        exp: chrono::Utc::now().timestamp() + 3600,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .expect("encode token")
}

/// 读取下一帧 JSON；连接关闭时返回 None
pub async fn next_json(client: &mut Client) -> Option<Value> {
    loop {
        let message = tokio::time::timeout(Duration::from_secs(5), client.next())
            .await
            .expect("timed out waiting for frame")?;
        match message.expect("websocket error") {
            TungsteniteMessage::Text(text) => {
                return Some(serde_json::from_str(text.as_str()).expect("json frame"))
            }
            TungsteniteMessage::Close(_) => return None,
            _ => continue,
        }
    }
}
