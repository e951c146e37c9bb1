use std::sync::Arc;

use application::{
    BusinessFailureSimulation, ChatDispatcher, ChatDispatcherDependencies, ChatSettings, Clock,
    ErrorClassifier, EventNotifier, EventQueue, IdGenerator, MessageQueue, NoteEventPublisher,
    NotifierSettings, SystemClock, UuidGenerator,
};
use config::AppConfig;
use tokio_util::sync::CancellationToken;

use crate::JwtService;

#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<ChatDispatcher>,
    pub notifier: Arc<EventNotifier>,
    /// 写侧接入点
    ///
    /// 本服务不暴露笔记写接口；笔记的创建、删除由外部写侧用例完成，
    /// 它在写入提交后通过这里调用 `note_created` / `note_deleted`，
    /// 事件进入所有者的队列，再由 `/api/v1/notes/events` 推送。
    pub publisher: Arc<NoteEventPublisher>,
    pub classifier: Arc<ErrorClassifier>,
    pub jwt_service: Arc<JwtService>,
    /// 所有会话生命周期的根，关闭服务时取消
    pub shutdown: CancellationToken,
    pub channel_capacity: usize,
}

impl AppState {
    pub fn new(
        config: &AppConfig,
        message_queue: Arc<dyn MessageQueue>,
        event_queue: Arc<dyn EventQueue>,
        shutdown: CancellationToken,
    ) -> Self {
        let classifier = Arc::new(ErrorClassifier::default());
        let ids: Arc<dyn IdGenerator> = Arc::new(UuidGenerator);
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        let simulation = match config.chat.simulated_failure_text.as_deref() {
            Some(text) => BusinessFailureSimulation::on_text(text),
            None => BusinessFailureSimulation::disabled(),
        };

        let dispatcher = ChatDispatcher::new(ChatDispatcherDependencies {
            message_queue,
            id_generator: ids.clone(),
            classifier: classifier.clone(),
            settings: ChatSettings {
                tick: config.chat.tick_interval(),
                idle_deadline: config.chat.idle_deadline(),
                simulation,
            },
        });

        let notifier = EventNotifier::new(
            event_queue.clone(),
            classifier.clone(),
            NotifierSettings {
                poll_interval: config.notifier.poll_interval(),
                tries_limit: config.notifier.tries_limit,
            },
        );

        Self {
            dispatcher: Arc::new(dispatcher),
            notifier: Arc::new(notifier),
            publisher: Arc::new(NoteEventPublisher::new(event_queue, ids, clock)),
            classifier,
            jwt_service: Arc::new(JwtService::new(&config.jwt)),
            shutdown,
            channel_capacity: config.chat.channel_capacity,
        }
    }
}
