//! `posts` table over the Supabase REST (PostgREST) API.

use crate::{
    blog::{BackendError, NewPost, Post, PostStore},
    supabase::{api::ApiClient, auth::SupabaseAuth},
};
use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use std::sync::Arc;
use tracing::{instrument, warn};

const SELECT_ALL_PATH: &str = "/rest/v1/posts?select=*&order=created_at.desc";
const INSERT_PATH: &str = "/rest/v1/posts";

pub struct SupabasePosts {
    api: ApiClient,
    auth: Arc<SupabaseAuth>,
}

impl SupabasePosts {
    /// Requests are made as the signed-in user when `auth` holds a session, so
    /// row-level security applies to them. An expired token is refreshed first.
    #[must_use]
    pub fn new(api: ApiClient, auth: Arc<SupabaseAuth>) -> Self {
        Self { api, auth }
    }
}

/// Decodes rows one by one; a row that does not fit [`Post`] is skipped.
fn decode_rows(rows: Vec<Value>) -> Vec<Post> {
    rows.into_iter()
        .filter_map(|row| {
            let id = row.get("id").cloned().unwrap_or_default();
            match serde_json::from_value::<Post>(row) {
                Ok(post) => Some(post),
                Err(err) => {
                    warn!(%id, "Skipping undecodable post: {err}");
                    None
                }
            }
        })
        .collect()
}

#[async_trait]
impl PostStore for SupabasePosts {
    #[instrument(skip(self))]
    async fn select_all(&self) -> Result<Vec<Post>, BackendError> {
        let token = self.auth.valid_access_token().await?;
        let request = self
            .api
            .request(Method::GET, SELECT_ALL_PATH, token.as_ref())?;
        let rows: Vec<Value> = self.api.send_json("posts.select_all", request).await?;
        Ok(decode_rows(rows))
    }

    #[instrument(skip_all)]
    async fn insert_one(&self, record: &NewPost) -> Result<Vec<Post>, BackendError> {
        let token = self.auth.valid_access_token().await?;
        let request = self
            .api
            .request(Method::POST, INSERT_PATH, token.as_ref())?
            .header("Prefer", "return=representation")
            .json(&[record]);
        let rows: Vec<Value> = self.api.send_json("posts.insert_one", request).await?;
        Ok(decode_rows(rows))
    }
}
