//! In-memory session provider and post store.
//!
//! Both mirror the hosted backend's observable behavior closely enough to drive
//! the screens without a network: the session provider announces its own
//! sign-ins and sign-outs, and the store hands rows back in the order it holds
//! them. Failures can be switched on per operation.

use crate::blog::{
    backend::{PostStore, SessionProvider},
    error::BackendError,
    model::{NewPost, Post, PostId, Session},
    session::{SessionEvent, SessionHandler, SessionHub, Subscription},
};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Mutex, MutexGuard, PoisonError,
    },
};

const MIN_PASSWORD_CHARS: usize = 6;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

struct Account {
    id: String,
    password: String,
}

#[derive(Default)]
pub struct MemorySessions {
    hub: SessionHub,
    accounts: Mutex<HashMap<String, Account>>,
    current: Mutex<Option<Session>>,
    fail_lookups: AtomicBool,
    fail_sign_outs: AtomicBool,
    fail_sign_ins: Mutex<Option<String>>,
    sign_in_calls: AtomicUsize,
    sign_up_calls: AtomicUsize,
    sign_out_calls: AtomicUsize,
}

impl MemorySessions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with `session` already held, as if restored from a previous visit.
    #[must_use]
    pub fn with_session(self, session: Session) -> Self {
        *lock(&self.current) = Some(session);
        self
    }

    #[must_use]
    pub fn with_account(self, email: &str, password: &str) -> Self {
        self.insert_account(email, password);
        self
    }

    fn insert_account(&self, email: &str, password: &str) -> String {
        let mut accounts = lock(&self.accounts);
        let id = format!("user-{}", accounts.len() + 1);
        accounts.insert(
            email.to_string(),
            Account {
                id: id.clone(),
                password: password.to_string(),
            },
        );
        id
    }

    pub fn fail_lookups(&self, fail: bool) {
        self.fail_lookups.store(fail, Ordering::SeqCst);
    }

    pub fn fail_sign_outs(&self, fail: bool) {
        self.fail_sign_outs.store(fail, Ordering::SeqCst);
    }

    /// Makes every sign-in fail with `message` until cleared with `None`.
    pub fn fail_sign_ins(&self, message: Option<&str>) {
        *lock(&self.fail_sign_ins) = message.map(ToString::to_string);
    }

    /// Simulates a sign-in from another tab or device.
    pub fn sign_in_elsewhere(&self, session: Session) {
        *lock(&self.current) = Some(session.clone());
        self.hub.notify(&SessionEvent::signed_in(session));
    }

    /// Simulates external revocation or expiry.
    pub fn expire_session(&self) {
        lock(&self.current).take();
        self.hub.notify(&SessionEvent::signed_out());
    }

    /// Fires an arbitrary change event without touching the held session.
    pub fn notify(&self, event: &SessionEvent) {
        self.hub.notify(event);
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.hub.listener_count()
    }

    #[must_use]
    pub fn current(&self) -> Option<Session> {
        lock(&self.current).clone()
    }

    #[must_use]
    pub fn sign_in_calls(&self) -> usize {
        self.sign_in_calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn sign_up_calls(&self) -> usize {
        self.sign_up_calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn sign_out_calls(&self) -> usize {
        self.sign_out_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionProvider for MemorySessions {
    async fn get_current_session(&self) -> Result<Option<Session>, BackendError> {
        if self.fail_lookups.load(Ordering::SeqCst) {
            return Err(BackendError::Network("session lookup unavailable".to_string()));
        }
        Ok(self.current())
    }

    fn subscribe_to_changes(&self, handler: SessionHandler) -> Subscription {
        self.hub.subscribe(handler)
    }

    async fn sign_up(&self, email: &str, password: &SecretString) -> Result<(), BackendError> {
        self.sign_up_calls.fetch_add(1, Ordering::SeqCst);
        let password = password.expose_secret();
        if password.chars().count() < MIN_PASSWORD_CHARS {
            return Err(BackendError::Provider(
                "Password should be at least 6 characters.".to_string(),
            ));
        }
        if lock(&self.accounts).contains_key(email) {
            return Err(BackendError::Provider("User already registered".to_string()));
        }
        self.insert_account(email, password);
        Ok(())
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<Session, BackendError> {
        self.sign_in_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = lock(&self.fail_sign_ins).clone() {
            return Err(BackendError::Provider(message));
        }

        let id = lock(&self.accounts)
            .get(email)
            .filter(|account| account.password == password.expose_secret())
            .map(|account| account.id.clone())
            .ok_or_else(|| BackendError::Provider("Invalid login credentials".to_string()))?;

        let session = Session {
            id,
            email: email.to_string(),
        };
        *lock(&self.current) = Some(session.clone());
        self.hub.notify(&SessionEvent::signed_in(session.clone()));
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        self.sign_out_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_sign_outs.load(Ordering::SeqCst) {
            return Err(BackendError::Network("sign-out unavailable".to_string()));
        }
        lock(&self.current).take();
        self.hub.notify(&SessionEvent::signed_out());
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryPosts {
    rows: Mutex<Vec<Post>>,
    next_id: AtomicUsize,
    fail_reads: AtomicBool,
    fail_inserts: AtomicBool,
    empty_inserts: AtomicBool,
    select_calls: AtomicUsize,
    insert_calls: AtomicUsize,
}

impl MemoryPosts {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the table. Rows are returned by reads exactly in this order.
    #[must_use]
    pub fn with_rows(rows: Vec<Post>) -> Self {
        let store = Self::default();
        store.next_id.store(rows.len(), Ordering::SeqCst);
        *lock(&store.rows) = rows;
        store
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }

    /// Makes inserts succeed without returning the stored row.
    pub fn return_no_rows(&self, empty: bool) {
        self.empty_inserts.store(empty, Ordering::SeqCst);
    }

    #[must_use]
    pub fn rows(&self) -> Vec<Post> {
        lock(&self.rows).clone()
    }

    #[must_use]
    pub fn select_calls(&self) -> usize {
        self.select_calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn insert_calls(&self) -> usize {
        self.insert_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PostStore for MemoryPosts {
    async fn select_all(&self) -> Result<Vec<Post>, BackendError> {
        self.select_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(BackendError::Http {
                status: 503,
                message: "posts unavailable".to_string(),
            });
        }
        Ok(self.rows())
    }

    async fn insert_one(&self, record: &NewPost) -> Result<Vec<Post>, BackendError> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(BackendError::Http {
                status: 401,
                message: "new row violates row-level security policy".to_string(),
            });
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let post = record.clone().into_post(PostId::Number(id as i64));
        lock(&self.rows).insert(0, post.clone());

        if self.empty_inserts.load(Ordering::SeqCst) {
            return Ok(Vec::new());
        }
        Ok(vec![post])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blog::model::Category;

    fn secret(value: &str) -> SecretString {
        SecretString::from(value.to_string())
    }

    #[tokio::test]
    async fn sign_up_then_sign_in() {
        let sessions = MemorySessions::new();
        sessions
            .sign_up("ada@example.com", &secret("hunter22"))
            .await
            .unwrap();
        assert_eq!(sessions.current(), None);

        let session = sessions
            .sign_in_with_password("ada@example.com", &secret("hunter22"))
            .await
            .unwrap();
        assert_eq!(session.email, "ada@example.com");
        assert_eq!(sessions.current(), Some(session));
    }

    #[tokio::test]
    async fn duplicate_and_short_sign_ups_are_rejected() {
        let sessions = MemorySessions::new().with_account("ada@example.com", "hunter22");
        let err = sessions
            .sign_up("ada@example.com", &secret("hunter22"))
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "User already registered");

        let err = sessions
            .sign_up("bob@example.com", &secret("abc"))
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "Password should be at least 6 characters.");
    }

    #[tokio::test]
    async fn insert_prepends_and_assigns_ids() {
        let store = MemoryPosts::new();
        let record = NewPost {
            title: "First".to_string(),
            content: "c".to_string(),
            category: Category::Life,
            date: "2026-01-01".to_string(),
            tags: Vec::new(),
        };
        store.insert_one(&record).await.unwrap();
        let second = NewPost {
            title: "Second".to_string(),
            ..record
        };
        let inserted = store.insert_one(&second).await.unwrap();

        assert_eq!(inserted[0].id, PostId::Number(2));
        let titles: Vec<_> = store.rows().into_iter().map(|post| post.title).collect();
        assert_eq!(titles, vec!["Second", "First"]);
    }
}
