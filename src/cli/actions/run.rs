use crate::cli::actions::{Action, admin, feed};
use anyhow::Result;

/// Execute the provided action.
// Single dispatch point for all CLI actions.
/// # Errors
/// Returns an error if the action fails.
pub async fn execute(action: Action) -> Result<()> {
    match action {
        Action::Feed(args) => feed::execute(args).await,
        Action::Admin(args) => admin::execute(args).await,
    }
}
