//! Backend collaborator seams. Screens only ever see these traits, injected
//! through a [`Backend`] built once at startup.

use crate::blog::{
    error::BackendError,
    model::{NewPost, Post, Session},
    session::{SessionHandler, Subscription},
};
use async_trait::async_trait;
use secrecy::SecretString;
use std::sync::Arc;

/// Hosted identity service. Implementations own the single process-wide session
/// and announce every change to subscribers.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Returns the held session, if any.
    async fn get_current_session(&self) -> Result<Option<Session>, BackendError>;

    /// Registers `handler` for every provider-originated change. Dropping the
    /// returned guard unregisters it.
    fn subscribe_to_changes(&self, handler: SessionHandler) -> Subscription;

    /// Creates an account. Never grants a session.
    async fn sign_up(&self, email: &str, password: &SecretString) -> Result<(), BackendError>;

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<Session, BackendError>;

    async fn sign_out(&self) -> Result<(), BackendError>;
}

/// Hosted `posts` table.
#[async_trait]
pub trait PostStore: Send + Sync {
    /// All posts ordered by `created_at` descending, ties in store order.
    async fn select_all(&self) -> Result<Vec<Post>, BackendError>;

    /// Inserts one row and returns the inserted row(s) as stored.
    async fn insert_one(&self, record: &NewPost) -> Result<Vec<Post>, BackendError>;
}

/// Shared read-only handle to both collaborators.
#[derive(Clone)]
pub struct Backend {
    pub sessions: Arc<dyn SessionProvider>,
    pub posts: Arc<dyn PostStore>,
}

impl Backend {
    #[must_use]
    pub fn new(sessions: Arc<dyn SessionProvider>, posts: Arc<dyn PostStore>) -> Self {
        Self { sessions, posts }
    }
}
