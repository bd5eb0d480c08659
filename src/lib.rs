//! # Reflections (blog client)
//!
//! `reflections` is a terminal client for the "Thoughts & Reflections" blog. Posts
//! and identities live in a hosted Supabase project; this crate never stores
//! anything locally.
//!
//! ## Screens
//!
//! - **Public feed:** every post, newest first, filterable by category. Read only.
//! - **Admin:** the same feed behind an auth gate, plus a creation form and sign-out.
//!
//! ## Backend boundary
//!
//! The core in [`blog`] talks to two injected collaborators, a
//! [`blog::SessionProvider`] and a [`blog::PostStore`]. [`supabase`] implements
//! both over the Supabase auth and REST APIs; [`blog::memory`] implements both in
//! memory.

pub mod blog;
pub mod cli;
pub mod supabase;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_user_agent() {
        assert!(APP_USER_AGENT.starts_with("reflections/"));
    }
}
