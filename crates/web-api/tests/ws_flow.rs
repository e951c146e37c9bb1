mod support;

use domain::{NoteId, UserId};
use futures_util::SinkExt;
use reqwest::StatusCode;
use serde_json::json;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::{Error as WsError, Message as TungsteniteMessage};

use support::{next_json, spawn_server, token_for};

async fn send(client: &mut support::Client, frame: serde_json::Value) {
    client
        .send(TungsteniteMessage::Text(frame.to_string().into()))
        .await
        .expect("send frame");
}

#[tokio::test]
async fn health_check_returns_ok() {
    let server = spawn_server().await;
    let response = reqwest::get(server.http_url("/health")).await.expect("health");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn chat_session_round_trip() {
    let server = spawn_server().await;
    let (mut client, _) = connect_async(server.ws_url("/api/v1/chat/dispatch"))
        .await
        .expect("connect chat");

    send(
        &mut client,
        json!({"message": {"header": {"correlation_id": "c-1"}, "text": "hello"}}),
    )
    .await;
    let frame = next_json(&mut client).await.expect("processed frame");
    assert_eq!(
        frame,
        json!({"message": {"header": {"correlation_id": "c-1"}, "text": "processed: hello"}})
    );

    // 校验失败只产生内联状态，会话继续
    send(&mut client, json!({"message": {"text": "oh"}})).await;
    let frame = next_json(&mut client).await.expect("validation frame");
    assert_eq!(frame["status"]["code"], 3);
    assert_eq!(frame["status"]["details"][0]["code"], "INVALID_TEXT");

    send(
        &mut client,
        json!({"message": {"header": {"correlation_id": "c-2"}, "text": "error"}}),
    )
    .await;
    let frame = next_json(&mut client).await.expect("business frame");
    assert_eq!(frame["status"]["code"], 2);
    assert_eq!(frame["status"]["message"], "error");
    assert_eq!(frame["status"]["details"][0]["code"], "BUSINESS");
    assert_eq!(
        frame["status"]["details"][0]["reason"],
        "some business issues"
    );

    // 空闲期过后服务端正常关闭
    assert_eq!(next_json(&mut client).await, None);
}

#[tokio::test]
async fn concurrent_chat_clients_only_get_their_own_messages() {
    let server = spawn_server().await;
    let url = server.ws_url("/api/v1/chat/dispatch");
    let (mut alice, _) = connect_async(url.as_str()).await.expect("connect alice");
    let (mut bob, _) = connect_async(url.as_str()).await.expect("connect bob");

    send(
        &mut alice,
        json!({"message": {"header": {"correlation_id": "same"}, "text": "from alice"}}),
    )
    .await;
    send(
        &mut bob,
        json!({"message": {"header": {"correlation_id": "same"}, "text": "from bob"}}),
    )
    .await;

    let frame = next_json(&mut alice).await.expect("alice frame");
    assert_eq!(frame["message"]["text"], "processed: from alice");
    let frame = next_json(&mut bob).await.expect("bob frame");
    assert_eq!(frame["message"]["text"], "processed: from bob");

    // 各自只收到一帧，随后空闲关闭
    assert_eq!(next_json(&mut alice).await, None);
    assert_eq!(next_json(&mut bob).await, None);
}

#[tokio::test]
async fn undecodable_chat_frame_ends_session_with_error() {
    let server = spawn_server().await;
    let (mut client, _) = connect_async(server.ws_url("/api/v1/chat/dispatch"))
        .await
        .expect("connect chat");

    client
        .send(TungsteniteMessage::Text("{not json".into()))
        .await
        .expect("send");

    let frame = next_json(&mut client).await.expect("error frame");
    assert_eq!(frame["error"]["code"], 14);
    assert_eq!(frame["error"]["message"], "stream unavailable");
    assert_eq!(next_json(&mut client).await, None);
}

#[tokio::test]
async fn events_require_authentication() {
    let server = spawn_server().await;

    match connect_async(server.ws_url("/api/v1/notes/events")).await {
        Err(WsError::Http(response)) => {
            assert_eq!(response.status().as_u16(), 401);
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("upgrade must be rejected without a token"),
    }

    let url = server.ws_url("/api/v1/notes/events?token=not-a-jwt");
    assert!(matches!(connect_async(url).await, Err(WsError::Http(_))));
}

#[tokio::test]
async fn published_note_events_reach_owner_stream() {
    let server = spawn_server().await;
    // 外部写侧用例提交笔记后经 AppState 的发布入口推送事件
    let publisher = server.state.publisher.clone();
    publisher.note_created(UserId::new(5), NoteId::new(1)).await;
    publisher.note_deleted(UserId::new(5), NoteId::new(1)).await;
    publisher.note_created(UserId::new(6), NoteId::new(2)).await;

    let url = server.ws_url(&format!("/api/v1/notes/events?token={}", token_for(5)));
    let (mut client, _) = connect_async(url).await.expect("connect events");

    assert_eq!(
        next_json(&mut client).await,
        Some(json!({"unread": {"events": 2}}))
    );

    let first = next_json(&mut client).await.expect("first event");
    assert_eq!(first["event"]["type"], "CREATED");
    assert_eq!(first["event"]["note_id"]["value"], 1);
    let second = next_json(&mut client).await.expect("second event");
    assert_eq!(second["event"]["type"], "DELETED");

    // 连续空轮询达到上限后正常关闭
    assert_eq!(next_json(&mut client).await, None);
}

#[tokio::test]
async fn shutdown_cancels_live_sessions() {
    let server = spawn_server().await;

    let request = {
        use tokio_tungstenite::tungstenite::client::IntoClientRequest;
        let mut request = server
            .ws_url("/api/v1/notes/events")
            .into_client_request()
            .expect("request");
        request.headers_mut().insert(
            "authorization",
            format!("Bearer {}", token_for(8)).parse().expect("header"),
        );
        request
    };
    let (mut client, _) = connect_async(request).await.expect("connect events");

    assert_eq!(
        next_json(&mut client).await,
        Some(json!({"unread": {"events": 0}}))
    );
    server.state.shutdown.cancel();

    let frame = next_json(&mut client).await.expect("error frame");
    assert_eq!(frame["error"]["code"], 1);
    assert_eq!(frame["error"]["message"], "request cancelled");
}
