use crate::supabase::SupabaseConfig;
use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;
use std::time::Duration;
use url::Url;

pub const ARG_SUPABASE_URL: &str = "supabase-url";
pub const ARG_SUPABASE_ANON_KEY: &str = "supabase-anon-key";
pub const ARG_REQUEST_TIMEOUT: &str = "request-timeout";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_SUPABASE_URL)
                .long("supabase-url")
                .help("Supabase project URL, example: https://<project>.supabase.co")
                .env("REFLECTIONS_SUPABASE_URL")
                .global(true)
                .value_parser(clap::value_parser!(Url)),
        )
        .arg(
            Arg::new(ARG_SUPABASE_ANON_KEY)
                .long("supabase-anon-key")
                .help("Supabase anon (public) API key")
                .env("REFLECTIONS_SUPABASE_ANON_KEY")
                .hide_env_values(true)
                .global(true),
        )
        .arg(
            Arg::new(ARG_REQUEST_TIMEOUT)
                .long("request-timeout")
                .help("HTTP request timeout in seconds")
                .env("REFLECTIONS_REQUEST_TIMEOUT")
                .default_value("10")
                .global(true)
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
}

#[derive(Debug)]
pub struct Options {
    pub url: Url,
    pub anon_key: SecretString,
    pub request_timeout: Duration,
}

impl Options {
    /// Parse Supabase arguments from matches.
    ///
    /// # Errors
    /// Returns an error if the URL or anon key is missing.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let url = matches
            .get_one::<Url>(ARG_SUPABASE_URL)
            .cloned()
            .context("missing required argument: --supabase-url")?;

        let anon_key = matches
            .get_one::<String>(ARG_SUPABASE_ANON_KEY)
            .filter(|key| !key.trim().is_empty())
            .map(|key| SecretString::from(key.trim().to_string()))
            .context("missing required argument: --supabase-anon-key")?;

        let request_timeout = Duration::from_secs(
            matches
                .get_one::<u64>(ARG_REQUEST_TIMEOUT)
                .copied()
                .unwrap_or(10),
        );

        Ok(Self {
            url,
            anon_key,
            request_timeout,
        })
    }

    #[must_use]
    pub fn into_config(self) -> SupabaseConfig {
        SupabaseConfig {
            url: self.url,
            anon_key: self.anon_key,
            request_timeout: self.request_timeout,
        }
    }
}
