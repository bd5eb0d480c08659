//! Blog core: the auth gate, credential form, feeds and post creation.
//!
//! Everything here is written against the [`SessionProvider`] and [`PostStore`]
//! traits so screens can be driven by the Supabase client in production and by
//! the in-memory fakes in `memory` in tests.

pub mod admin;
pub mod backend;
pub mod error;
pub mod feed;
pub mod form;
pub mod gate;
// Test fakes, shared with the integration tests under `tests/`.
#[doc(hidden)]
pub mod memory;
pub mod model;
pub mod render;
pub mod session;

pub use self::admin::{AdminFeed, AdminScreen, PublishError};
pub use self::backend::{Backend, PostStore, SessionProvider};
pub use self::error::BackendError;
pub use self::feed::{filter_by_category, load_all_posts, PostFeed, PublicFeed};
pub use self::form::{CredentialForm, FormMessage, FormMode, SubmitOutcome};
pub use self::gate::{AuthGate, AuthStatus};
pub use self::model::{Category, CategoryFilter, Draft, NewPost, Post, PostId, Session};
pub use self::session::{SessionEvent, SessionEventKind, SessionHub, Subscription};
