//! Admin screen: the auth gate in front of a feed that can publish.

use crate::blog::{
    backend::{Backend, PostStore},
    error::BackendError,
    feed::PostFeed,
    form::CredentialForm,
    gate::{AuthGate, AuthStatus, StatusWatch},
    model::{Draft, Post},
};
use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, instrument};

/// Alert shown when the store refuses an insert.
pub const PUBLISH_FAILED_ALERT: &str = "Failed to create post. Please try again.";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PublishError {
    /// Title or content is empty; nothing was sent.
    #[error("title and content are required")]
    IncompleteDraft,
    #[error("insert failed: {0}")]
    Store(BackendError),
    #[error("insert returned no rows")]
    NothingReturned,
}

impl PublishError {
    /// Blocking alert text, or `None` when the failure is silent.
    #[must_use]
    pub fn alert(&self) -> Option<&'static str> {
        match self {
            Self::IncompleteDraft => None,
            Self::Store(_) | Self::NothingReturned => Some(PUBLISH_FAILED_ALERT),
        }
    }
}

/// Feed with the creation panel. Only reachable while authenticated.
pub struct AdminFeed {
    store: Arc<dyn PostStore>,
    feed: PostFeed,
    draft: Draft,
    creating: bool,
}

impl AdminFeed {
    #[must_use]
    pub fn new(store: Arc<dyn PostStore>) -> Self {
        Self {
            store,
            feed: PostFeed::new(),
            draft: Draft::default(),
            creating: false,
        }
    }

    pub async fn load(&mut self) {
        self.feed.load(self.store.as_ref()).await;
    }

    #[must_use]
    pub fn feed(&self) -> &PostFeed {
        &self.feed
    }

    pub fn feed_mut(&mut self) -> &mut PostFeed {
        &mut self.feed
    }

    #[must_use]
    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut Draft {
        &mut self.draft
    }

    #[must_use]
    pub fn is_creating(&self) -> bool {
        self.creating
    }

    /// Opens or closes the creation panel. The draft is left as is.
    pub fn toggle_creating(&mut self) {
        self.creating = !self.creating;
    }

    /// Publishes the draft dated today (UTC).
    ///
    /// # Errors
    /// See [`Self::publish_on`].
    pub async fn publish(&mut self) -> Result<&Post, PublishError> {
        self.publish_on(Utc::now().date_naive()).await
    }

    /// Publishes the draft with `date` as its creation date. On success the
    /// stored row goes to the top of the feed, the draft resets and the panel
    /// closes.
    ///
    /// # Errors
    /// Returns [`PublishError::IncompleteDraft`] without contacting the store
    /// when title or content is empty; otherwise a store failure. The draft is
    /// kept on every error.
    #[instrument(skip(self))]
    pub async fn publish_on(&mut self, date: NaiveDate) -> Result<&Post, PublishError> {
        if !self.draft.is_complete() {
            return Err(PublishError::IncompleteDraft);
        }

        let record = self.draft.to_new_post(date);
        let rows = self.store.insert_one(&record).await.map_err(|err| {
            error!("Error creating post: {err}");
            PublishError::Store(err)
        })?;

        let Some(post) = rows.into_iter().next() else {
            error!("Error creating post: insert returned no rows");
            return Err(PublishError::NothingReturned);
        };

        info!(id = %post.id, "post published");
        self.feed.prepend(post);
        self.draft = Draft::default();
        self.creating = false;

        self.feed
            .posts()
            .first()
            .ok_or(PublishError::NothingReturned)
    }
}

/// The admin route: gate, credential form and, once authenticated, the feed.
pub struct AdminScreen {
    gate: AuthGate,
    form: CredentialForm,
    store: Arc<dyn PostStore>,
    feed: Option<AdminFeed>,
}

impl AdminScreen {
    /// Mounts the gate (subscribing to session changes) in the `Checking` state.
    #[must_use]
    pub fn mount(backend: &Backend) -> Self {
        let gate = AuthGate::mount(Arc::clone(&backend.sessions));
        let form = CredentialForm::new(
            Arc::clone(&backend.sessions),
            Arc::new(gate.login_handler()),
        );
        Self {
            gate,
            form,
            store: Arc::clone(&backend.posts),
            feed: None,
        }
    }

    /// Resolves the initial session, then loads posts if authenticated.
    pub async fn resolve(&mut self) -> AuthStatus {
        self.gate.resolve_initial_session().await;
        self.sync().await
    }

    /// Brings the protected content in line with the gate: mounts and loads the
    /// feed on entering `Authenticated`, drops it on leaving.
    pub async fn sync(&mut self) -> AuthStatus {
        let status = self.gate.status();
        match status {
            AuthStatus::Authenticated(_) => {
                if self.feed.is_none() {
                    let mut feed = AdminFeed::new(Arc::clone(&self.store));
                    feed.load().await;
                    self.feed = Some(feed);
                }
            }
            AuthStatus::Anonymous | AuthStatus::Checking => self.feed = None,
        }
        status
    }

    #[must_use]
    pub fn status(&self) -> AuthStatus {
        self.gate.status()
    }

    #[must_use]
    pub fn watch(&self) -> StatusWatch {
        self.gate.watch()
    }

    #[must_use]
    pub fn form(&self) -> &CredentialForm {
        &self.form
    }

    /// Protected content; `None` unless authenticated and synced.
    #[must_use]
    pub fn feed(&self) -> Option<&AdminFeed> {
        self.feed.as_ref()
    }

    pub fn feed_mut(&mut self) -> Option<&mut AdminFeed> {
        self.feed.as_mut()
    }

    pub async fn sign_out(&mut self) -> AuthStatus {
        self.gate.sign_out().await;
        self.sync().await
    }

    /// Releases the session subscription and discards all screen state.
    pub fn unmount(self) {
        self.gate.unmount();
    }
}
