//! `reflections feed`: prints the public feed once and exits.

use crate::{
    blog::{
        CategoryFilter, PostStore, PublicFeed,
        render::{self, EmptyHint},
    },
    supabase::{self, SupabaseConfig},
};
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::debug;

#[derive(Debug)]
pub struct Args {
    pub config: SupabaseConfig,
    pub category: CategoryFilter,
}

/// Execute the feed action.
/// # Errors
/// Returns an error if the backend cannot be configured or stdout fails.
pub async fn execute(args: Args) -> Result<()> {
    debug!(
        supabase_url = %args.config.url,
        request_timeout = ?args.config.request_timeout,
        category = %args.category,
        "starting public feed"
    );

    let backend = supabase::connect(&args.config).context("failed to configure Supabase client")?;
    run(backend.posts, args.category, tokio::io::stdout()).await
}

/// Loads every post, applies `category` and writes the rendered feed. A failed
/// read renders the empty state.
///
/// # Errors
/// Returns an error if writing to `out` fails.
pub async fn run<W>(posts: Arc<dyn PostStore>, category: CategoryFilter, mut out: W) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut screen = PublicFeed::mount(posts).await;
    screen.select(category);

    out.write_all(render::feed(screen.feed(), EmptyHint::Public).as_bytes())
        .await
        .context("failed to write feed")?;
    out.flush().await.context("failed to flush output")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blog::{Category, Post, PostId, memory::MemoryPosts};

    fn post(id: i64, title: &str, category: Category) -> Post {
        Post {
            id: PostId::Number(id),
            title: title.to_string(),
            content: format!("{title} body"),
            category,
            date: "2026-03-01".to_string(),
            tags: Vec::new(),
        }
    }

    #[tokio::test]
    async fn prints_the_selected_category() {
        let store = Arc::new(MemoryPosts::with_rows(vec![
            post(2, "Borrowing", Category::Technology),
            post(1, "Mornings", Category::Life),
        ]));
        let mut out = Vec::new();

        run(
            store,
            CategoryFilter::Only(Category::Technology),
            &mut out,
        )
        .await
        .unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Thoughts & Reflections"));
        assert!(text.contains("[Technology]"));
        assert!(text.contains("Borrowing"));
        assert!(!text.contains("Mornings"));
    }

    #[tokio::test]
    async fn read_failure_prints_the_empty_state() {
        let store = Arc::new(MemoryPosts::with_rows(vec![post(
            1,
            "Hidden",
            Category::Life,
        )]));
        store.fail_reads(true);
        let mut out = Vec::new();

        run(store, CategoryFilter::All, &mut out).await.unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("No posts yet in this category"));
        assert!(text.contains("Check back soon"));
    }
}
