//! Supabase-backed implementations of the blog's backend seams.

pub mod api;
pub mod auth;
pub mod posts;

use crate::blog::{Backend, BackendError, PostStore, SessionProvider};
use secrecy::SecretString;
use std::{sync::Arc, time::Duration};
use url::Url;

pub use self::{api::ApiClient, auth::SupabaseAuth, posts::SupabasePosts};

/// Project coordinates. The anon key is public but still kept out of
/// logs.
#[derive(Clone, Debug)]
pub struct SupabaseConfig {
    pub url: Url,
    pub anon_key: SecretString,
    pub request_timeout: Duration,
}

/// Builds the process-wide backend handle: one auth client holding the session,
/// and a post store that makes its requests as that session.
///
/// # Errors
/// Returns [`BackendError::Config`] if the HTTP client cannot be built.
pub fn connect(config: &SupabaseConfig) -> Result<Backend, BackendError> {
    let api = ApiClient::new(
        config.url.clone(),
        config.anon_key.clone(),
        config.request_timeout,
    )?;

    let auth = Arc::new(SupabaseAuth::new(api.clone()));
    let posts = SupabasePosts::new(api, Arc::clone(&auth));

    Ok(Backend::new(
        auth as Arc<dyn SessionProvider>,
        Arc::new(posts) as Arc<dyn PostStore>,
    ))
}
