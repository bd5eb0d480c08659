//! Post feed: one fail-soft load per mount and an in-memory category projection.

use crate::blog::{
    backend::PostStore,
    model::{CategoryFilter, Post},
};
use std::sync::Arc;
use tracing::{debug, error, instrument};

/// Reads every post, newest first, keeping the store's order exactly.
/// A failed read is logged and yields an empty feed so the screen always renders.
#[instrument(skip(store))]
pub async fn load_all_posts(store: &dyn PostStore) -> Vec<Post> {
    match store.select_all().await {
        Ok(posts) => {
            debug!(count = posts.len(), "posts loaded");
            posts
        }
        Err(err) => {
            error!("Error fetching posts: {err}");
            Vec::new()
        }
    }
}

/// Order-preserving projection of `posts` onto `filter`. `All` is the identity.
#[must_use]
pub fn filter_by_category(posts: &[Post], filter: CategoryFilter) -> Vec<&Post> {
    posts
        .iter()
        .filter(|post| filter.matches(post.category))
        .collect()
}

/// Posts held by a mounted screen together with the selected filter.
#[derive(Debug)]
pub struct PostFeed {
    posts: Vec<Post>,
    selected: CategoryFilter,
    loading: bool,
}

impl Default for PostFeed {
    fn default() -> Self {
        Self {
            posts: Vec::new(),
            selected: CategoryFilter::All,
            loading: true,
        }
    }
}

impl PostFeed {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the held posts with a fresh read. Called once per mount.
    pub async fn load(&mut self, store: &dyn PostStore) {
        self.posts = load_all_posts(store).await;
        self.loading = false;
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    #[must_use]
    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    #[must_use]
    pub fn selected(&self) -> CategoryFilter {
        self.selected
    }

    pub fn select(&mut self, filter: CategoryFilter) {
        self.selected = filter;
    }

    /// Posts passing the selected filter.
    #[must_use]
    pub fn visible(&self) -> Vec<&Post> {
        filter_by_category(&self.posts, self.selected)
    }

    /// Puts a freshly created post at the top without re-sorting.
    pub fn prepend(&mut self, post: Post) {
        self.posts.insert(0, post);
    }
}

/// Read-only feed served at the root route.
#[derive(Debug)]
pub struct PublicFeed {
    feed: PostFeed,
}

impl PublicFeed {
    /// Mounts the feed and performs its single load.
    pub async fn mount(store: Arc<dyn PostStore>) -> Self {
        let mut feed = PostFeed::new();
        feed.load(store.as_ref()).await;
        Self { feed }
    }

    #[must_use]
    pub fn feed(&self) -> &PostFeed {
        &self.feed
    }

    pub fn select(&mut self, filter: CategoryFilter) {
        self.feed.select(filter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blog::{
        memory::MemoryPosts,
        model::{Category, PostId},
    };

    fn post(id: i64, title: &str, category: Category) -> Post {
        Post {
            id: PostId::Number(id),
            title: title.to_string(),
            content: format!("{title} body"),
            category,
            date: "2026-02-01".to_string(),
            tags: Vec::new(),
        }
    }

    fn sample() -> Vec<Post> {
        vec![
            post(4, "d", Category::Life),
            post(3, "c", Category::Philosophy),
            post(2, "b", Category::Life),
            post(1, "a", Category::Technology),
        ]
    }

    #[test]
    fn all_is_identity() {
        let posts = sample();
        let filtered: Vec<Post> = filter_by_category(&posts, CategoryFilter::All)
            .into_iter()
            .cloned()
            .collect();
        assert_eq!(filtered, posts);
    }

    #[test]
    fn category_filter_keeps_order() {
        let posts = sample();
        for category in Category::ALL {
            let filtered = filter_by_category(&posts, CategoryFilter::Only(category));
            assert!(filtered.iter().all(|post| post.category == category));

            // Subsequence check: ids strictly decrease as in the input.
            let ids: Vec<&PostId> = filtered.iter().map(|post| &post.id).collect();
            let expected: Vec<&PostId> = posts
                .iter()
                .filter(|post| post.category == category)
                .map(|post| &post.id)
                .collect();
            assert_eq!(ids, expected);
        }

        let life: Vec<&str> = filter_by_category(&posts, CategoryFilter::Only(Category::Life))
            .iter()
            .map(|post| post.title.as_str())
            .collect();
        assert_eq!(life, vec!["d", "b"]);
    }

    #[tokio::test]
    async fn load_keeps_store_order_for_ties() {
        // Two rows sharing a created_at: whatever order the store reports wins.
        let rows = vec![post(7, "later", Category::Life), post(8, "earlier", Category::Life)];
        let store = MemoryPosts::with_rows(rows.clone());
        let mut feed = PostFeed::new();
        feed.load(&store).await;
        assert_eq!(feed.posts(), rows.as_slice());

        let reversed: Vec<Post> = rows.into_iter().rev().collect();
        let store = MemoryPosts::with_rows(reversed.clone());
        let mut feed = PostFeed::new();
        feed.load(&store).await;
        assert_eq!(feed.posts(), reversed.as_slice());
    }

    #[tokio::test]
    async fn failed_read_is_an_empty_feed() {
        let store = MemoryPosts::with_rows(sample());
        store.fail_reads(true);

        let mut feed = PostFeed::new();
        assert!(feed.is_loading());
        feed.load(&store).await;

        assert!(!feed.is_loading());
        assert!(feed.posts().is_empty());
        assert!(feed.visible().is_empty());
    }

    #[tokio::test]
    async fn public_feed_loads_once_on_mount() {
        let store = Arc::new(MemoryPosts::with_rows(sample()));
        let mut public = PublicFeed::mount(Arc::clone(&store) as Arc<dyn PostStore>).await;
        assert_eq!(store.select_calls(), 1);

        public.select(CategoryFilter::Only(Category::Philosophy));
        assert_eq!(public.feed().visible().len(), 1);
        assert_eq!(store.select_calls(), 1);
    }
}
