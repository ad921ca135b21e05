//! In-memory store used by unit tests across the crate.
//!
//! Clones share state, so a test can hand one copy to the service under test
//! and keep another to inspect call counters afterwards.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{SubsecRound, Utc};
use parley_types::chat::{Chat, ChatId, Message, MessageId};
use parley_types::error::RepositoryError;
use parley_types::filter::{FilterField, FilterParam, FilterValue};

use crate::repository::chat::ChatRepository;
use crate::repository::message::MessageRepository;

#[derive(Default)]
struct Tables {
    chats: Vec<Chat>,
    messages: Vec<Message>,
    next_chat_id: i64,
    next_message_id: i64,
}

#[derive(Default)]
pub struct Calls {
    pub exists: AtomicUsize,
    pub create_chat: AtomicUsize,
    pub find_chat: AtomicUsize,
    pub delete_chat: AtomicUsize,
    pub create_message: AtomicUsize,
    pub list_messages: AtomicUsize,
    pub count: AtomicUsize,
}

impl Calls {
    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
struct Faults {
    fail_writes: AtomicBool,
    fail_counts: AtomicBool,
    /// Fixed answer for existence checks, simulating a writer racing the check.
    forced_exists: Mutex<Option<bool>>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
    faults: Arc<Faults>,
    pub calls: Arc<Calls>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_writes(&self) {
        self.faults.fail_writes.store(true, Ordering::SeqCst);
    }

    pub fn fail_counts(&self, fail: bool) {
        self.faults.fail_counts.store(fail, Ordering::SeqCst);
    }

    pub fn force_exists(&self, answer: bool) {
        *self.faults.forced_exists.lock().unwrap() = Some(answer);
    }

    /// Remove a chat behind the service's back.
    pub fn remove_chat(&self, id: ChatId) {
        let mut tables = self.tables.lock().unwrap();
        tables.chats.retain(|c| c.id != id);
        tables.messages.retain(|m| m.chat_id != id);
    }

    fn check_writes(&self) -> Result<(), RepositoryError> {
        if self.faults.fail_writes.load(Ordering::SeqCst) {
            return Err(RepositoryError::Query("disk I/O error".to_string()));
        }
        Ok(())
    }

    fn check_counts(&self) -> Result<(), RepositoryError> {
        if self.faults.fail_counts.load(Ordering::SeqCst) {
            return Err(RepositoryError::Connection);
        }
        Ok(())
    }
}

fn matches(chat: &Chat, filter: &FilterParam) -> bool {
    match (filter.field(), filter.value()) {
        (FilterField::Id, FilterValue::Int(id)) => chat.id.0 == *id,
        (FilterField::Title, FilterValue::Text(title)) => &chat.title == title,
        (FilterField::CreatedAt, FilterValue::Timestamp(ts)) => &chat.created_at == ts,
        _ => false,
    }
}

impl ChatRepository for MemoryStore {
    async fn create_chat(&self, title: &str) -> Result<Chat, RepositoryError> {
        self.calls.create_chat.fetch_add(1, Ordering::SeqCst);
        self.check_writes()?;
        let mut tables = self.tables.lock().unwrap();
        if tables.chats.iter().any(|c| c.title == title) {
            return Err(RepositoryError::Conflict(format!("title '{title}' already exists")));
        }
        tables.next_chat_id += 1;
        let chat = Chat {
            id: ChatId(tables.next_chat_id),
            title: title.to_string(),
            created_at: Utc::now().trunc_subsecs(6),
            messages: Vec::new(),
        };
        tables.chats.push(chat.clone());
        Ok(chat)
    }

    async fn find_chat_by_id(&self, id: ChatId) -> Result<Option<Chat>, RepositoryError> {
        self.calls.find_chat.fetch_add(1, Ordering::SeqCst);
        let tables = self.tables.lock().unwrap();
        Ok(tables.chats.iter().find(|c| c.id == id).cloned())
    }

    async fn delete_chat(&self, id: ChatId) -> Result<(), RepositoryError> {
        self.calls.delete_chat.fetch_add(1, Ordering::SeqCst);
        self.check_writes()?;
        let mut tables = self.tables.lock().unwrap();
        let before = tables.chats.len();
        tables.chats.retain(|c| c.id != id);
        if tables.chats.len() == before {
            return Err(RepositoryError::NotFound);
        }
        tables.messages.retain(|m| m.chat_id != id);
        Ok(())
    }

    async fn exists_where(&self, filter: &FilterParam) -> Result<bool, RepositoryError> {
        self.calls.exists.fetch_add(1, Ordering::SeqCst);
        if let Some(answer) = *self.faults.forced_exists.lock().unwrap() {
            return Ok(answer);
        }
        let tables = self.tables.lock().unwrap();
        Ok(tables.chats.iter().any(|c| matches(c, filter)))
    }

    async fn count_chats(&self) -> Result<u64, RepositoryError> {
        self.calls.count.fetch_add(1, Ordering::SeqCst);
        self.check_counts()?;
        Ok(self.tables.lock().unwrap().chats.len() as u64)
    }
}

impl MessageRepository for MemoryStore {
    async fn create_message(&self, chat_id: ChatId, text: &str) -> Result<Message, RepositoryError> {
        self.calls.create_message.fetch_add(1, Ordering::SeqCst);
        self.check_writes()?;
        let mut tables = self.tables.lock().unwrap();
        if !tables.chats.iter().any(|c| c.id == chat_id) {
            return Err(RepositoryError::NotFound);
        }
        tables.next_message_id += 1;
        let message = Message {
            id: MessageId(tables.next_message_id),
            chat_id,
            text: text.to_string(),
            created_at: Utc::now().trunc_subsecs(6),
        };
        tables.messages.push(message.clone());
        Ok(message)
    }

    async fn list_messages(&self, chat_id: ChatId, limit: i64) -> Result<Vec<Message>, RepositoryError> {
        self.calls.list_messages.fetch_add(1, Ordering::SeqCst);
        let tables = self.tables.lock().unwrap();
        let mut messages: Vec<Message> = tables
            .messages
            .iter()
            .filter(|m| m.chat_id == chat_id)
            .cloned()
            .collect();
        messages.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        messages.truncate(limit.max(0) as usize);
        Ok(messages)
    }

    async fn count_messages(&self) -> Result<u64, RepositoryError> {
        self.calls.count.fetch_add(1, Ordering::SeqCst);
        self.check_counts()?;
        Ok(self.tables.lock().unwrap().messages.len() as u64)
    }
}
