//! Maps validated CLI arguments to an action.

use crate::blog::CategoryFilter;
use crate::cli::actions::{Action, admin, feed};
use crate::cli::commands::{ARG_CATEGORY, CMD_ADMIN, CMD_FEED, supabase};
use anyhow::{Result, bail};

/// Map validated CLI matches to an action.
///
/// # Errors
/// Returns an error if required arguments are missing or the subcommand is unknown.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let config = supabase::Options::parse(matches)?.into_config();

    match matches.subcommand() {
        Some((CMD_FEED, sub_m)) => Ok(Action::Feed(feed::Args {
            config,
            category: sub_m
                .get_one::<CategoryFilter>(ARG_CATEGORY)
                .copied()
                .unwrap_or_default(),
        })),
        Some((CMD_ADMIN, _)) => Ok(Action::Admin(admin::Args { config })),
        Some((name, _)) => bail!("unknown command: {name}"),
        None => bail!("missing command, use --help"),
    }
}
