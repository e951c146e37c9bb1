use std::sync::Arc;
use std::time::Duration;

use domain::{ChatMessage, SessionId};
use tokio::sync::mpsc;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_stream::{Stream, StreamExt};
use tokio_util::sync::CancellationToken;
use validator::Validate;

use super::frames::{DispatchRequest, DispatchResponse, MessagePayload};
use super::simulation::{BusinessFailureSimulation, SIMULATED_REASON};
use crate::classifier::ErrorClassifier;
use crate::error::ApplicationError;
use crate::ids::IdGenerator;
use crate::queue::MessageQueue;
use crate::status::Status;
use crate::stream::{emit, guarded};

#[derive(Debug, Clone)]
pub struct ChatSettings {
    /// 出站节拍
    pub tick: Duration,
    /// 没有任何投递时会话的最长存活时间
    pub idle_deadline: Duration,
    pub simulation: BusinessFailureSimulation,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            tick: Duration::from_secs(1),
            idle_deadline: Duration::from_secs(4),
            simulation: BusinessFailureSimulation::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Open,
    Closing,
    Closed,
}

pub struct ChatDispatcherDependencies {
    pub message_queue: Arc<dyn MessageQueue>,
    pub id_generator: Arc<dyn IdGenerator>,
    pub classifier: Arc<ErrorClassifier>,
    pub settings: ChatSettings,
}

/// 双向聊天会话
///
/// 每个会话内并发运行两个循环：Intake 校验并保存入站消息，Drain 按节拍读取发件箱
/// 并回写出站帧。两者共享同一个可取消的生命周期，任意一方的致命错误都会取消另一方。
/// 每个会话有自己的发件箱命名空间，消息只回写给发送它的客户端。
pub struct ChatDispatcher {
    message_queue: Arc<dyn MessageQueue>,
    id_generator: Arc<dyn IdGenerator>,
    classifier: Arc<ErrorClassifier>,
    settings: ChatSettings,
}

impl ChatDispatcher {
    pub fn new(deps: ChatDispatcherDependencies) -> Self {
        Self {
            message_queue: deps.message_queue,
            id_generator: deps.id_generator,
            classifier: deps.classifier,
            settings: deps.settings,
        }
    }

    /// 运行一个会话直到结束
    ///
    /// 正常结束返回 `Ok(())`；否则返回经过分类的终止状态，且只分类一次。
    pub async fn dispatch<S>(
        &self,
        inbound: S,
        outbound: mpsc::Sender<DispatchResponse>,
        lifetime: CancellationToken,
    ) -> Result<(), Status>
    where
        S: Stream<Item = Result<DispatchRequest, ApplicationError>> + Send + Unpin,
    {
        let session = lifetime.child_token();
        let session_id = self.id_generator.session_id();
        tracing::info!(session_id = %session_id, state = ?SessionState::Open, "聊天会话开始");

        let intake = self.intake(&session_id, inbound, &outbound, &session);
        let drain = self.drain(&session_id, &outbound, &session);
        tokio::pin!(intake, drain);

        // 输入结束后仍需把发件箱排空；Drain 正常结束则整个会话结束
        let result = tokio::select! {
            result = &mut intake => match result {
                Ok(()) => drain.await,
                Err(err) => Err(err),
            },
            result = &mut drain => result,
        };

        tracing::debug!(session_id = %session_id, state = ?SessionState::Closing, "聊天会话收尾");
        session.cancel();

        // 未投递的消息随会话一起丢弃
        if let Err(err) = self.message_queue.clear(&session_id).await {
            tracing::warn!(session_id = %session_id, error = %err, "清理会话发件箱失败");
        }

        let outcome = result.map_err(|err| {
            let status = self.classifier.classify(&err);
            tracing::warn!(session_id = %session_id, error = %err, code = ?status.code(), "聊天会话异常结束");
            status
        });
        tracing::info!(
            session_id = %session_id,
            state = ?SessionState::Closed,
            ok = outcome.is_ok(),
            "聊天会话结束"
        );
        outcome
    }

    async fn intake<S>(
        &self,
        session_id: &SessionId,
        mut inbound: S,
        outbound: &mpsc::Sender<DispatchResponse>,
        lifetime: &CancellationToken,
    ) -> Result<(), ApplicationError>
    where
        S: Stream<Item = Result<DispatchRequest, ApplicationError>> + Send + Unpin,
    {
        let result = self.intake_loop(session_id, &mut inbound, outbound, lifetime).await;
        if result.is_err() {
            lifetime.cancel();
        }
        result
    }

    async fn intake_loop<S>(
        &self,
        session_id: &SessionId,
        inbound: &mut S,
        outbound: &mpsc::Sender<DispatchResponse>,
        lifetime: &CancellationToken,
    ) -> Result<(), ApplicationError>
    where
        S: Stream<Item = Result<DispatchRequest, ApplicationError>> + Send + Unpin,
    {
        loop {
            let request = match guarded(lifetime, inbound.next()).await? {
                Some(request) => request?,
                None => {
                    tracing::debug!("客户端输入结束");
                    return Ok(());
                }
            };

            match self.accept(request) {
                Ok(message) => {
                    guarded(lifetime, self.message_queue.save(session_id, &message)).await??;
                    tracing::debug!(correlation_id = %message.correlation_id(), "消息已进入发件箱");
                }
                Err(err) if err.is_recoverable() => {
                    tracing::debug!(error = %err, "入站消息被拒绝");
                    let status = self.classifier.classify(&err);
                    emit(outbound, DispatchResponse::Status(status), lifetime).await?;
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn accept(&self, request: DispatchRequest) -> Result<ChatMessage, ApplicationError> {
        request.validate()?;
        let message = request
            .message
            .into_message(self.id_generator.as_ref())?;
        Ok(message)
    }

    async fn drain(
        &self,
        session_id: &SessionId,
        outbound: &mpsc::Sender<DispatchResponse>,
        lifetime: &CancellationToken,
    ) -> Result<(), ApplicationError> {
        let result = self.drain_loop(session_id, outbound, lifetime).await;
        if result.is_err() {
            lifetime.cancel();
        }
        result
    }

    async fn drain_loop(
        &self,
        session_id: &SessionId,
        outbound: &mpsc::Sender<DispatchResponse>,
        lifetime: &CancellationToken,
    ) -> Result<(), ApplicationError> {
        let tick = self.settings.tick;
        let idle = self.settings.idle_deadline;

        let mut ticker = time::interval_at(Instant::now() + tick, tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut deadline = Instant::now() + idle;

        loop {
            let messages = guarded(lifetime, self.message_queue.fetch_all(session_id)).await??;

            if messages.is_empty() {
                if Instant::now() >= deadline {
                    tracing::debug!("发件箱空闲超时");
                    return Ok(());
                }
                guarded(lifetime, ticker.tick()).await?;
                continue;
            }

            for message in messages {
                guarded(lifetime, ticker.tick()).await?;
                emit(outbound, self.render(&message), lifetime).await?;

                if let Err(err) = guarded(lifetime, self.message_queue.delete(session_id, &message)).await? {
                    tracing::warn!(
                        correlation_id = %message.correlation_id(),
                        error = %err,
                        "删除已投递消息失败"
                    );
                }
                deadline = Instant::now() + idle;
            }
        }
    }

    fn render(&self, message: &ChatMessage) -> DispatchResponse {
        if self.settings.simulation.triggers(message.text()) {
            let err = ApplicationError::business(message.text(), SIMULATED_REASON);
            return DispatchResponse::Status(self.classifier.classify(&err));
        }
        DispatchResponse::Message(MessagePayload::from(&message.processed()))
    }
}
