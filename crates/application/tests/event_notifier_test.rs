//! 事件推送会话测试

use std::sync::Arc;
use std::time::Duration;

use application::notify::EventKind;
use application::{
    Code, ErrorClassifier, EventNotifier, EventQueue, InMemoryEventQueue, NoteEventPublisher,
    NotificationFrame, NotifierSettings, QueueError, Status, SystemClock, UuidGenerator,
};
use async_trait::async_trait;
use domain::{DomainEvent, NoteId, Principal, UserId};
use mockall::mock;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

mock! {
    Events {}

    #[async_trait]
    impl EventQueue for Events {
        async fn push(&self, event: &DomainEvent) -> Result<(), QueueError>;
        async fn pop(&self, recipient: UserId) -> Result<Option<DomainEvent>, QueueError>;
        async fn count(&self, recipient: UserId) -> Result<u64, QueueError>;
    }
}

fn subscribe(
    queue: Arc<dyn EventQueue>,
    user: i64,
    lifetime: CancellationToken,
) -> (
    mpsc::Receiver<NotificationFrame>,
    JoinHandle<Result<(), Status>>,
) {
    let notifier = EventNotifier::new(
        queue,
        Arc::new(ErrorClassifier::default()),
        NotifierSettings::default(),
    );
    let (tx, rx) = mpsc::channel(16);
    let handle = tokio::spawn(async move {
        notifier
            .subscribe(Principal::new(UserId::new(user)), tx, lifetime)
            .await
    });
    (rx, handle)
}

async fn collect(mut rx: mpsc::Receiver<NotificationFrame>) -> Vec<NotificationFrame> {
    let mut frames = Vec::new();
    while let Some(frame) = rx.recv().await {
        frames.push(frame);
    }
    frames
}

fn publisher(queue: Arc<InMemoryEventQueue>) -> NoteEventPublisher {
    NoteEventPublisher::new(queue, Arc::new(UuidGenerator), Arc::new(SystemClock))
}

fn note_of(frame: &NotificationFrame) -> i64 {
    match frame {
        NotificationFrame::Event { note_id, .. } => note_id.value,
        other => panic!("expected event frame, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_unread_snapshot_then_events_in_fifo_order() {
    let queue = Arc::new(InMemoryEventQueue::new());
    let publisher = publisher(queue.clone());
    publisher.note_created(UserId::new(1), NoteId::new(11)).await;
    publisher.note_deleted(UserId::new(1), NoteId::new(12)).await;
    publisher.note_created(UserId::new(1), NoteId::new(13)).await;
    // 其他用户的事件不可见
    publisher.note_created(UserId::new(2), NoteId::new(99)).await;

    let started = Instant::now();
    let (rx, handle) = subscribe(queue.clone(), 1, CancellationToken::new());
    let frames = collect(rx).await;
    assert!(handle.await.unwrap().is_ok());

    assert_eq!(frames.len(), 4);
    assert_eq!(frames[0], NotificationFrame::Unread { events: 3 });
    let notes: Vec<_> = frames[1..].iter().map(note_of).collect();
    assert_eq!(notes, vec![11, 12, 13]);
    match &frames[2] {
        NotificationFrame::Event { kind, .. } => assert_eq!(*kind, EventKind::Deleted),
        other => panic!("unexpected frame {other:?}"),
    }

    // 3 次投递后再经过 10 次空轮询
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_millis(500 * 13), "{elapsed:?}");
    assert!(elapsed < Duration::from_millis(500 * 14), "{elapsed:?}");
    assert_eq!(queue.count(UserId::new(2)).await.unwrap(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_ten_empty_polls_end_cleanly() {
    let queue = Arc::new(InMemoryEventQueue::new());
    let started = Instant::now();

    let (rx, handle) = subscribe(queue, 5, CancellationToken::new());
    let frames = collect(rx).await;

    assert!(handle.await.unwrap().is_ok());
    assert_eq!(frames, vec![NotificationFrame::Unread { events: 0 }]);
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_secs(5), "{elapsed:?}");
    assert!(elapsed < Duration::from_millis(5500), "{elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn test_late_event_resets_empty_poll_counter() {
    let queue = Arc::new(InMemoryEventQueue::new());
    let started = Instant::now();
    let (rx, handle) = subscribe(queue.clone(), 1, CancellationToken::new());

    // 第 8 次空轮询之后到达
    let late = publisher(queue.clone());
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(4200)).await;
        late.note_created(UserId::new(1), NoteId::new(7)).await;
    });

    let frames = collect(rx).await;
    assert!(handle.await.unwrap().is_ok());
    assert_eq!(frames.len(), 2);
    assert_eq!(note_of(&frames[1]), 7);
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_millis(9500), "{elapsed:?}");
    assert!(elapsed < Duration::from_secs(10), "{elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn test_cancellation_ends_with_cancelled_status() {
    let queue = Arc::new(InMemoryEventQueue::new());
    let lifetime = CancellationToken::new();
    let (rx, handle) = subscribe(queue, 1, lifetime.clone());

    tokio::time::sleep(Duration::from_millis(1200)).await;
    lifetime.cancel();

    let frames = collect(rx).await;
    assert_eq!(frames, vec![NotificationFrame::Unread { events: 0 }]);
    let status = handle.await.unwrap().unwrap_err();
    assert_eq!(status.code(), Code::Cancelled);
    assert_eq!(status.message(), "request cancelled");
}

#[tokio::test(start_paused = true)]
async fn test_pop_failure_ends_with_masked_status() {
    let mut events = MockEvents::new();
    events.expect_count().returning(|_| Ok(2));
    events
        .expect_pop()
        .times(1)
        .returning(|_| Err(QueueError::codec("bad json at offset 3")));

    let (rx, handle) = subscribe(Arc::new(events), 1, CancellationToken::new());
    let frames = collect(rx).await;

    assert_eq!(frames, vec![NotificationFrame::Unread { events: 2 }]);
    let status = handle.await.unwrap().unwrap_err();
    assert_eq!(status.code(), Code::Internal);
    assert_eq!(status.message(), "internal error");
}

#[tokio::test(start_paused = true)]
async fn test_count_failure_sends_nothing() {
    let mut events = MockEvents::new();
    events
        .expect_count()
        .returning(|_| Err(QueueError::unavailable("down")));
    events.expect_pop().never();

    let (rx, handle) = subscribe(Arc::new(events), 1, CancellationToken::new());
    assert!(collect(rx).await.is_empty());
    assert_eq!(handle.await.unwrap().unwrap_err().code(), Code::Internal);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_pushes_for_two_recipients_do_not_block_each_other() {
    let queue = Arc::new(InMemoryEventQueue::new());

    let tasks: Vec<_> = [1_i64, 2]
        .into_iter()
        .map(|user| {
            let publisher = publisher(queue.clone());
            tokio::spawn(async move {
                for note in 0..200 {
                    assert!(publisher
                        .note_created(UserId::new(user), NoteId::new(note))
                        .await
                        .is_some());
                }
            })
        })
        .collect();

    tokio::time::timeout(Duration::from_secs(2), async {
        for task in tasks {
            task.await.unwrap();
        }
    })
    .await
    .expect("pushes should complete promptly");

    assert_eq!(queue.count(UserId::new(1)).await.unwrap(), 200);
    assert_eq!(queue.count(UserId::new(2)).await.unwrap(), 200);
}
