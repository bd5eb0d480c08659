//! Plain-text rendering of the screens.

use crate::blog::{
    admin::AdminScreen,
    feed::PostFeed,
    form::{CredentialForm, FormMessage, FormMode},
    gate::AuthStatus,
    model::{CategoryFilter, Draft, Post},
};
use std::fmt::Write;

pub const LOADING: &str = "Loading...";
const TITLE: &str = "Thoughts & Reflections";
const SUBTITLE: &str = "Essays on Life and Ideas";
const RULE: &str = "----------------------------------------";
const EMPTY_CATEGORY: &str = "No posts yet in this category";

/// Hint under the empty-state line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EmptyHint {
    Public,
    Admin,
}

impl EmptyHint {
    const fn text(self) -> &'static str {
        match self {
            Self::Public => "Check back soon",
            Self::Admin => "Start sharing your ideas",
        }
    }
}

fn header(out: &mut String) {
    let _ = writeln!(out, "{TITLE}");
    let _ = writeln!(out, "{SUBTITLE}");
    let _ = writeln!(out, "Philosophy - Technology - Life");
    let _ = writeln!(out, "{RULE}");
}

fn category_bar(out: &mut String, selected: CategoryFilter) {
    let choices: Vec<String> = CategoryFilter::CHOICES
        .iter()
        .map(|choice| {
            if *choice == selected {
                format!("[{choice}]")
            } else {
                format!(" {choice} ")
            }
        })
        .collect();
    let _ = writeln!(out, "{}", choices.join(" "));
    let _ = writeln!(out);
}

fn post(out: &mut String, post: &Post) {
    let _ = writeln!(out, "{} | {}", post.category.as_str().to_uppercase(), post.date);
    let _ = writeln!(out, "{}", post.title);
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", post.content);
    if !post.tags.is_empty() {
        let tags: Vec<String> = post.tags.iter().map(|tag| format!("#{tag}")).collect();
        let _ = writeln!(out, "{}", tags.join(" "));
    }
    let _ = writeln!(out, "{RULE}");
}

/// Renders a loaded feed: header, category bar, visible posts or the empty state.
#[must_use]
pub fn feed(feed: &PostFeed, hint: EmptyHint) -> String {
    if feed.is_loading() {
        return format!("{LOADING}\n");
    }

    let mut out = String::new();
    header(&mut out);
    category_bar(&mut out, feed.selected());

    let visible = feed.visible();
    if visible.is_empty() {
        let _ = writeln!(out, "{EMPTY_CATEGORY}");
        let _ = writeln!(out, "{}", hint.text());
    } else {
        for item in visible {
            post(&mut out, item);
        }
    }
    out
}

#[must_use]
pub fn credential_form(form: &CredentialForm) -> String {
    let mut out = String::new();
    let (title, action, switch) = match form.mode() {
        FormMode::SignIn => ("Admin Login", "Sign In", "Don't have an account? Sign up"),
        FormMode::SignUp => ("Create Account", "Sign Up", "Already have an account? Sign in"),
    };
    let _ = writeln!(out, "{title}");
    let _ = writeln!(out, "Authenticate to manage posts");
    match form.message() {
        Some(FormMessage::Info(text)) => {
            let _ = writeln!(out, "+ {text}");
        }
        Some(FormMessage::Error(text)) => {
            let _ = writeln!(out, "! {text}");
        }
        None => {}
    }
    let submit = if form.is_submitting() { LOADING } else { action };
    let _ = writeln!(out, "Commands: submit ({submit}), toggle ({switch}), quit");
    out
}

#[must_use]
pub fn draft(draft: &Draft) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "New Fragment");
    let _ = writeln!(out, "  title:    {}", draft.title);
    let _ = writeln!(out, "  content:  {}", draft.content);
    let _ = writeln!(out, "  category: {}", draft.category);
    let _ = writeln!(out, "  tags:     {}", draft.tags);
    let _ = writeln!(
        out,
        "Commands: title <text>, content <text>, category <name>, tags <a, b>, publish, new (abort)"
    );
    out
}

/// Renders whatever the gate currently allows.
#[must_use]
pub fn admin(screen: &AdminScreen) -> String {
    match screen.status() {
        AuthStatus::Checking => format!("{LOADING}\n"),
        AuthStatus::Anonymous => credential_form(screen.form()),
        AuthStatus::Authenticated(session) => {
            let Some(admin) = screen.feed() else {
                return format!("{LOADING}\n");
            };
            let mut out = String::new();
            let _ = writeln!(out, "Admin: {}  (logout)", session.email);
            if admin.is_creating() {
                out.push_str(&draft(admin.draft()));
            } else {
                let _ = writeln!(out, "Commands: new, filter <category>, logout, quit");
            }
            out.push_str(&feed(admin.feed(), EmptyHint::Admin));
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blog::{
        backend::{Backend, PostStore, SessionProvider},
        memory::{MemoryPosts, MemorySessions},
        model::{Category, PostId, Session},
    };
    use std::sync::Arc;

    fn sample() -> Post {
        Post {
            id: PostId::Number(1),
            title: "On Stillness".to_string(),
            content: "Sit with it.".to_string(),
            category: Category::Philosophy,
            date: "2026-02-03".to_string(),
            tags: vec!["stoic".to_string(), "quiet".to_string()],
        }
    }

    #[tokio::test]
    async fn feed_shows_posts_and_selection() {
        let store = MemoryPosts::with_rows(vec![sample()]);
        let mut posts = PostFeed::new();
        assert_eq!(feed(&posts, EmptyHint::Public), "Loading...\n");

        posts.load(&store).await;
        let text = feed(&posts, EmptyHint::Public);
        assert!(text.contains("[All]"));
        assert!(text.contains("PHILOSOPHY | 2026-02-03"));
        assert!(text.contains("#stoic #quiet"));

        posts.select(CategoryFilter::Only(Category::Life));
        let text = feed(&posts, EmptyHint::Public);
        assert!(text.contains("[Life]"));
        assert!(text.contains("No posts yet in this category"));
        assert!(text.contains("Check back soon"));
        assert!(!text.contains("On Stillness"));
    }

    #[tokio::test]
    async fn admin_screen_follows_the_gate() {
        let sessions = Arc::new(MemorySessions::new());
        let posts = Arc::new(MemoryPosts::new());
        let backend = Backend::new(
            Arc::clone(&sessions) as Arc<dyn SessionProvider>,
            posts as Arc<dyn PostStore>,
        );
        let mut screen = AdminScreen::mount(&backend);
        assert_eq!(admin(&screen), "Loading...\n");

        screen.resolve().await;
        assert!(admin(&screen).starts_with("Admin Login"));

        sessions.sign_in_elsewhere(Session {
            id: "user-1".to_string(),
            email: "ada@example.com".to_string(),
        });
        screen.sync().await;
        let text = admin(&screen);
        assert!(text.starts_with("Admin: ada@example.com"));
        assert!(text.contains("Start sharing your ideas"));
    }
}
