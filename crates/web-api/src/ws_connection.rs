//! WebSocket 会话适配
//!
//! 把 WebSocket 连接拆成读、写两半，并转接到应用层的会话服务：
//! - 读任务把客户端帧解码后送入入站通道
//! - 写任务把出站通道中的帧编码为 JSON 文本
//! - 会话结束后写出终止帧并关闭连接

use application::{ApplicationError, DispatchRequest, Status};
use axum::extract::ws::{close_code, CloseFrame, Message as WsMessage, WebSocket};
use domain::Principal;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;

use crate::state::AppState;

type WsSink = SplitSink<WebSocket, WsMessage>;

/// 会话以错误结束时的最后一帧
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
enum TerminalFrame<'a> {
    Error(&'a Status),
}

/// 双向聊天会话
pub async fn run_chat_session(socket: WebSocket, state: AppState) {
    let (sink, incoming) = socket.split();
    let lifetime = state.shutdown.child_token();

    let (in_tx, in_rx) = mpsc::channel(state.channel_capacity);
    let (out_tx, out_rx) = mpsc::channel(state.channel_capacity);

    let reader = tokio::spawn(read_requests(incoming, in_tx));
    let writer = tokio::spawn(write_frames(sink, out_rx));

    let result = state
        .dispatcher
        .dispatch(ReceiverStream::new(in_rx), out_tx, lifetime)
        .await;

    reader.abort();
    finish(writer, result).await;
}

/// 事件推送会话；调用主体已在升级前解析
pub async fn run_notes_session(socket: WebSocket, state: AppState, principal: Principal) {
    let (sink, incoming) = socket.split();
    let lifetime = state.shutdown.child_token();

    let (out_tx, out_rx) = mpsc::channel(state.channel_capacity);

    // 客户端断开即取消订阅
    let watcher = tokio::spawn(watch_disconnect(incoming, lifetime.clone()));
    let writer = tokio::spawn(write_frames(sink, out_rx));

    let result = state
        .notifier
        .subscribe(principal, out_tx, lifetime)
        .await;

    watcher.abort();
    finish(writer, result).await;
}

async fn read_requests(
    mut incoming: SplitStream<WebSocket>,
    inbound: mpsc::Sender<Result<DispatchRequest, ApplicationError>>,
) {
    while let Some(message) = incoming.next().await {
        let item = match message {
            Ok(WsMessage::Text(text)) => decode(text.as_bytes()),
            Ok(WsMessage::Binary(bytes)) => decode(&bytes),
            Ok(WsMessage::Close(_)) => {
                tracing::debug!("WebSocket收到关闭消息");
                break;
            }
            Ok(WsMessage::Ping(_)) | Ok(WsMessage::Pong(_)) => continue,
            Err(err) => Err(ApplicationError::transport(err.to_string())),
        };

        // 读错误是致命的，送出后不再继续读
        let fatal = item.is_err();
        if inbound.send(item).await.is_err() || fatal {
            break;
        }
    }
}

fn decode(payload: &[u8]) -> Result<DispatchRequest, ApplicationError> {
    serde_json::from_slice(payload)
        .map_err(|err| ApplicationError::transport(format!("undecodable frame: {err}")))
}

async fn watch_disconnect(mut incoming: SplitStream<WebSocket>, lifetime: CancellationToken) {
    while let Some(message) = incoming.next().await {
        match message {
            Ok(WsMessage::Close(_)) | Err(_) => break,
            Ok(_) => {}
        }
    }
    tracing::debug!("订阅端已断开");
    lifetime.cancel();
}

/// 写任务结束时交还写半边，用于发送终止帧
async fn write_frames<T: Serialize>(mut sink: WsSink, mut outbound: mpsc::Receiver<T>) -> Option<WsSink> {
    while let Some(frame) = outbound.recv().await {
        let payload = match serde_json::to_string(&frame) {
            Ok(json) => json,
            Err(err) => {
                tracing::warn!(error = %err, "failed to serialize websocket payload");
                continue;
            }
        };
        if sink.send(WsMessage::Text(payload.into())).await.is_err() {
            tracing::warn!("Failed to send text message");
            return None;
        }
    }
    Some(sink)
}

async fn finish(writer: tokio::task::JoinHandle<Option<WsSink>>, result: Result<(), Status>) {
    let Ok(Some(mut sink)) = writer.await else {
        return;
    };

    let close = match &result {
        Ok(()) => CloseFrame {
            code: close_code::NORMAL,
            reason: "".into(),
        },
        Err(status) => {
            match serde_json::to_string(&TerminalFrame::Error(status)) {
                Ok(json) => {
                    if sink.send(WsMessage::Text(json.into())).await.is_err() {
                        return;
                    }
                }
                Err(err) => tracing::warn!(error = %err, "failed to serialize terminal frame"),
            }
            CloseFrame {
                code: close_code::ERROR,
                reason: "".into(),
            }
        }
    };

    if let Err(err) = sink.send(WsMessage::Close(Some(close))).await {
        tracing::debug!(error = %err, "关闭帧发送失败");
    }
}
