//! Chat service driven end to end against a real SQLite file.

use std::time::Duration;

use chrono::Utc;
use parley_core::chat::service::ChatService;
use parley_core::lifecycle::manager::LifecycleManager;
use parley_core::lifecycle::metrics::MetricsWorker;
use parley_core::repository::chat::ChatRepository;
use parley_types::chat::ChatId;
use parley_types::error::ErrorKind;
use parley_types::filter::FilterParam;

use super::chat::SqliteChatRepository;
use super::message::SqliteMessageRepository;
use super::pool::tests::test_pool;

type SqliteChatService = ChatService<SqliteChatRepository, SqliteMessageRepository>;

async fn service() -> SqliteChatService {
    let pool = test_pool().await;
    ChatService::new(
        SqliteChatRepository::new(pool.clone()),
        SqliteMessageRepository::new(pool),
    )
}

#[tokio::test]
async fn test_team_standup_walkthrough() {
    let svc = service().await;
    let before = Utc::now() - chrono::Duration::seconds(1);

    let chat = svc.create_chat("Team Standup").await.unwrap();
    assert_eq!(chat.id, ChatId(1));
    assert_eq!(chat.title, "Team Standup");
    assert!(chat.created_at >= before);

    let err = svc.create_chat("Team Standup").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyExists);

    let message = svc.send_message(ChatId(1), "hi").await.unwrap();
    assert_eq!(message.id.0, 1);
    assert_eq!(message.chat_id, ChatId(1));
    assert_eq!(message.text, "hi");
    assert!(message.created_at >= before);

    let loaded = svc.get_chat_by_id(ChatId(1), Some(20)).await.unwrap();
    assert_eq!(loaded.title, "Team Standup");
    assert_eq!(loaded.messages.len(), 1);
    assert_eq!(loaded.messages[0].text, "hi");

    svc.delete_chat_by_id(ChatId(1)).await.unwrap();

    let err = svc.get_chat_by_id(ChatId(1), Some(20)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_send_after_delete_is_not_found() {
    let svc = service().await;
    let chat = svc.create_chat("gone soon").await.unwrap();
    svc.delete_chat_by_id(chat.id).await.unwrap();

    let err = svc.send_message(chat.id, "anyone?").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err = svc.delete_chat_by_id(chat.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_title_freed_by_delete() {
    let svc = service().await;
    let first = svc.create_chat("recycled").await.unwrap();
    svc.delete_chat_by_id(first.id).await.unwrap();

    let second = svc.create_chat("recycled").await.unwrap();
    assert_ne!(second.id, first.id);
    assert!(svc.chat_exists(&FilterParam::by_title("recycled")).await.unwrap());
}

#[tokio::test]
async fn test_concurrent_creates_admit_one_title() {
    let svc = std::sync::Arc::new(service().await);

    let mut handles = Vec::new();
    for _ in 0..8 {
        let svc = svc.clone();
        handles.push(tokio::spawn(async move { svc.create_chat("contested").await }));
    }

    let mut created = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => created += 1,
            Err(e) => assert_eq!(e.kind(), ErrorKind::AlreadyExists),
        }
    }

    assert_eq!(created, 1);
    assert_eq!(svc.chat_repo().count_chats().await.unwrap(), 1);
}

#[tokio::test]
async fn test_metrics_worker_counts_sqlite_rows() {
    let svc = service().await;
    let chat = svc.create_chat("measured").await.unwrap();
    svc.send_message(chat.id, "one").await.unwrap();
    svc.send_message(chat.id, "two").await.unwrap();

    let worker = MetricsWorker::new(
        svc.chat_repo().clone(),
        svc.message_repo().clone(),
        Duration::from_millis(20),
    );
    let mut rx = worker.subscribe();

    let mut manager = LifecycleManager::new();
    manager.register(worker).unwrap();
    manager.start().unwrap();

    tokio::time::timeout(Duration::from_secs(2), rx.changed())
        .await
        .unwrap()
        .unwrap();
    let snapshot = rx.borrow().unwrap();
    assert_eq!(snapshot.chats_total, 1);
    assert_eq!(snapshot.messages_total, 2);

    let report = manager.stop(Duration::from_secs(1)).await.unwrap();
    assert!(report.is_clean());
}
