pub mod logging;
pub mod supabase;

use crate::blog::CategoryFilter;
use clap::{
    Arg, ColorChoice, Command,
    builder::{
        ValueParser,
        styling::{AnsiColor, Effects, Styles},
    },
};

pub const CMD_FEED: &str = "feed";
pub const CMD_ADMIN: &str = "admin";
pub const ARG_CATEGORY: &str = "category";

#[must_use]
pub fn validator_category() -> ValueParser {
    ValueParser::from(
        move |category: &str| -> std::result::Result<CategoryFilter, String> {
            category.parse::<CategoryFilter>().map_err(|err| {
                format!("{err}, expected one of: All, Philosophy, Technology, Life")
            })
        },
    )
}

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("reflections")
        .about("Thoughts & Reflections: essays on life and ideas")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new(CMD_FEED)
                .about("Print the public feed, newest first")
                .arg(
                    Arg::new(ARG_CATEGORY)
                        .short('c')
                        .long("category")
                        .help("Category filter: All, Philosophy, Technology, Life")
                        .default_value("All")
                        .value_parser(validator_category()),
                ),
        )
        .subcommand(Command::new(CMD_ADMIN).about("Sign in and manage posts interactively"));

    let command = supabase::with_args(command);
    logging::with_args(command)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blog::Category;
    use crate::cli::telemetry::LogFormat;
    use url::Url;

    const ENV_VARS: [&str; 5] = [
        "REFLECTIONS_SUPABASE_URL",
        "REFLECTIONS_SUPABASE_ANON_KEY",
        "REFLECTIONS_REQUEST_TIMEOUT",
        "REFLECTIONS_LOG_LEVEL",
        "REFLECTIONS_LOG_FORMAT",
    ];

    fn without_env<F: FnOnce()>(f: F) {
        temp_env::with_vars(ENV_VARS.map(|key| (key, None::<&str>)), f);
    }

    #[test]
    fn test_new() {
        let command = new();

        assert_eq!(command.get_name(), "reflections");
        assert_eq!(
            command.get_about().unwrap().to_string(),
            "Thoughts & Reflections: essays on life and ideas"
        );
        assert_eq!(
            command.get_version().unwrap().to_string(),
            env!("CARGO_PKG_VERSION")
        );
    }

    #[test]
    fn test_feed_args() {
        without_env(|| {
            let matches = new().get_matches_from(vec![
                "reflections",
                "--supabase-url",
                "https://abc.supabase.co",
                "--supabase-anon-key",
                "anon",
                "feed",
                "--category",
                "technology",
            ]);

            assert_eq!(
                matches.get_one::<Url>(supabase::ARG_SUPABASE_URL),
                Some(&Url::parse("https://abc.supabase.co").unwrap())
            );
            assert_eq!(
                matches.get_one::<u64>(supabase::ARG_REQUEST_TIMEOUT).copied(),
                Some(10)
            );

            let (name, sub) = matches.subcommand().unwrap();
            assert_eq!(name, CMD_FEED);
            assert_eq!(
                sub.get_one::<CategoryFilter>(ARG_CATEGORY).copied(),
                Some(CategoryFilter::Only(Category::Technology))
            );
        });
    }

    #[test]
    fn test_feed_category_defaults_to_all() {
        without_env(|| {
            let matches = new().get_matches_from(vec!["reflections", "feed"]);
            let sub = matches.subcommand_matches(CMD_FEED).unwrap();
            assert_eq!(
                sub.get_one::<CategoryFilter>(ARG_CATEGORY).copied(),
                Some(CategoryFilter::All)
            );
        });
    }

    #[test]
    fn test_feed_rejects_unknown_category() {
        without_env(|| {
            let result =
                new().try_get_matches_from(vec!["reflections", "feed", "--category", "poetry"]);
            assert!(result.is_err());
        });
    }

    #[test]
    fn test_global_args_after_subcommand() {
        without_env(|| {
            let matches = new().get_matches_from(vec![
                "reflections",
                "admin",
                "--supabase-url",
                "https://abc.supabase.co",
                "--request-timeout",
                "3",
                "--log-format",
                "json",
            ]);
            assert_eq!(matches.subcommand_name(), Some(CMD_ADMIN));
            let sub = matches.subcommand_matches(CMD_ADMIN).unwrap();
            assert_eq!(
                sub.get_one::<u64>(supabase::ARG_REQUEST_TIMEOUT).copied(),
                Some(3)
            );
            assert_eq!(logging::log_format(sub), LogFormat::Json);
        });
    }

    #[test]
    fn test_request_timeout_must_be_positive() {
        without_env(|| {
            let result = new().try_get_matches_from(vec![
                "reflections",
                "--request-timeout",
                "0",
                "admin",
            ]);
            assert!(result.is_err());
        });
    }

    #[test]
    fn test_check_env() {
        temp_env::with_vars(
            [
                ("REFLECTIONS_SUPABASE_URL", Some("https://abc.supabase.co")),
                ("REFLECTIONS_SUPABASE_ANON_KEY", Some("anon")),
                ("REFLECTIONS_REQUEST_TIMEOUT", Some("30")),
                ("REFLECTIONS_LOG_LEVEL", Some("info")),
                ("REFLECTIONS_LOG_FORMAT", Some("json")),
            ],
            || {
                let matches = new().get_matches_from(vec!["reflections", "admin"]);
                assert_eq!(
                    matches.get_one::<String>(supabase::ARG_SUPABASE_ANON_KEY),
                    Some(&"anon".to_string())
                );
                assert_eq!(
                    matches.get_one::<u64>(supabase::ARG_REQUEST_TIMEOUT).copied(),
                    Some(30)
                );
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    Some(2)
                );
                assert_eq!(logging::log_format(&matches), LogFormat::Json);
            },
        );
    }

    #[test]
    fn test_check_log_level_env() {
        let levels = ["error", "warn", "info", "debug", "trace"];
        for (index, &level) in levels.iter().enumerate() {
            temp_env::with_vars([("REFLECTIONS_LOG_LEVEL", Some(level))], || {
                let matches = new().get_matches_from(vec!["reflections", "feed"]);
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    Some(u8::try_from(index).unwrap())
                );
            });
        }
    }

    #[test]
    fn test_check_log_level_verbosity() {
        for index in 0..5_usize {
            temp_env::with_vars([("REFLECTIONS_LOG_LEVEL", None::<&str>)], || {
                let mut args = vec!["reflections".to_string(), "feed".to_string()];

                // Add the appropriate number of "-v" flags based on the index
                if index > 0 {
                    args.push(format!("-{}", "v".repeat(index)));
                }

                let matches = new().get_matches_from(args);

                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    Some(u8::try_from(index).unwrap())
                );
            });
        }
    }
}
