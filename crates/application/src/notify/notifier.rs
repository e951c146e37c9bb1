use std::sync::Arc;
use std::time::Duration;

use domain::Principal;
use tokio::sync::mpsc;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::frames::NotificationFrame;
use crate::classifier::ErrorClassifier;
use crate::error::ApplicationError;
use crate::queue::EventQueue;
use crate::status::Status;
use crate::stream::{emit, guarded};

#[derive(Debug, Clone)]
pub struct NotifierSettings {
    pub poll_interval: Duration,
    /// 连续空轮询达到该次数后会话正常结束
    pub tries_limit: u32,
}

impl Default for NotifierSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(500),
            tries_limit: 10,
        }
    }
}

/// 事件推送会话
///
/// 先推送未读数快照，再按固定节拍弹出事件；单循环，不与自身并发。
pub struct EventNotifier {
    event_queue: Arc<dyn EventQueue>,
    classifier: Arc<ErrorClassifier>,
    settings: NotifierSettings,
}

impl EventNotifier {
    pub fn new(
        event_queue: Arc<dyn EventQueue>,
        classifier: Arc<ErrorClassifier>,
        settings: NotifierSettings,
    ) -> Self {
        Self {
            event_queue,
            classifier,
            settings,
        }
    }

    pub async fn subscribe(
        &self,
        principal: Principal,
        outbound: mpsc::Sender<NotificationFrame>,
        lifetime: CancellationToken,
    ) -> Result<(), Status> {
        let user_id = principal.user_id();
        tracing::info!(user_id = %user_id, "事件订阅开始");

        match self.deliver(principal, &outbound, &lifetime).await {
            Ok(delivered) => {
                tracing::info!(user_id = %user_id, delivered, "事件订阅结束");
                Ok(())
            }
            Err(err) => {
                let status = self.classifier.classify(&err);
                tracing::warn!(user_id = %user_id, error = %err, code = ?status.code(), "事件订阅异常结束");
                Err(status)
            }
        }
    }

    async fn deliver(
        &self,
        principal: Principal,
        outbound: &mpsc::Sender<NotificationFrame>,
        lifetime: &CancellationToken,
    ) -> Result<u64, ApplicationError> {
        let user_id = principal.user_id();

        let unread = guarded(lifetime, self.event_queue.count(user_id)).await??;
        emit(outbound, NotificationFrame::unread(unread), lifetime).await?;

        let period = self.settings.poll_interval;
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut tries = 0;
        let mut delivered = 0;
        while tries < self.settings.tries_limit {
            guarded(lifetime, ticker.tick()).await?;

            match guarded(lifetime, self.event_queue.pop(user_id)).await?? {
                Some(event) => {
                    emit(outbound, NotificationFrame::from(&event), lifetime).await?;
                    tracing::debug!(user_id = %user_id, event_id = %event.id(), "事件已推送");
                    delivered += 1;
                    tries = 0;
                }
                None => tries += 1,
            }
        }

        Ok(delivered)
    }
}
