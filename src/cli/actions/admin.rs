//! `reflections admin`: the gated admin screen as a line-oriented session.
//!
//! Each command is applied to the [`AdminScreen`], the screen is synced with
//! the gate and the result is rendered. Session changes that arrive between
//! commands (expiry, a sign-out elsewhere) re-render the screen on their own.

use crate::{
    blog::{
        AdminFeed, AdminScreen, AuthStatus, Backend, Category, CategoryFilter, FormMode,
        SubmitOutcome, render,
    },
    supabase::{self, SupabaseConfig},
};
use anyhow::{Context, Result};
use secrecy::SecretString;
use std::str::FromStr;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Lines};
use tracing::{debug, info};

const PROMPT: &str = "> ";
const CONTINUE_PROMPT: &str = "Press Enter to continue";

#[derive(Debug)]
pub struct Args {
    pub config: SupabaseConfig,
}

/// Execute the admin action against stdin and stdout.
/// # Errors
/// Returns an error if the backend cannot be configured or the terminal fails.
pub async fn execute(args: Args) -> Result<()> {
    debug!(
        supabase_url = %args.config.url,
        request_timeout = ?args.config.request_timeout,
        "starting admin screen"
    );

    let backend = supabase::connect(&args.config).context("failed to configure Supabase client")?;
    run(
        &backend,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
    )
    .await
}

/// One line of admin input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AdminCommand {
    /// Submit the credential form in its current mode.
    Submit,
    SignIn,
    SignUp,
    Toggle,
    New,
    Title(String),
    Content(String),
    Category(Category),
    Tags(String),
    Publish,
    Filter(CategoryFilter),
    List,
    Logout,
    Quit,
}

impl FromStr for AdminCommand {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (keyword, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(keyword, rest)| (keyword, rest.trim()));

        match keyword.to_lowercase().as_str() {
            "submit" => Ok(Self::Submit),
            "signin" => Ok(Self::SignIn),
            "signup" => Ok(Self::SignUp),
            "toggle" => Ok(Self::Toggle),
            "new" => Ok(Self::New),
            "title" => Ok(Self::Title(rest.to_string())),
            "content" => Ok(Self::Content(rest.to_string())),
            "category" => rest
                .parse()
                .map(Self::Category)
                .map_err(|err| err.to_string()),
            "tags" => Ok(Self::Tags(rest.to_string())),
            "publish" => Ok(Self::Publish),
            "filter" => rest
                .parse()
                .map(Self::Filter)
                .map_err(|err| err.to_string()),
            "list" => Ok(Self::List),
            "logout" => Ok(Self::Logout),
            "quit" | "exit" => Ok(Self::Quit),
            _ => Err(format!("unknown command: {keyword}")),
        }
    }
}

struct Terminal<R, W> {
    lines: Lines<R>,
    out: W,
}

impl<R, W> Terminal<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    fn new(input: R, out: W) -> Self {
        Self {
            lines: input.lines(),
            out,
        }
    }

    async fn write(&mut self, text: &str) -> Result<()> {
        self.out
            .write_all(text.as_bytes())
            .await
            .context("failed to write output")?;
        self.out.flush().await.context("failed to flush output")
    }

    /// Cancel safe: only delegates to [`Lines::next_line`].
    async fn next_line(&mut self) -> Result<Option<String>> {
        self.lines.next_line().await.context("failed to read input")
    }

    async fn ask(&mut self, prompt: &str) -> Result<Option<String>> {
        self.write(prompt).await?;
        self.next_line().await
    }
}

/// Runs the admin screen until `quit` or end of input, then unmounts it.
///
/// # Errors
/// Returns an error if reading `input` or writing `out` fails.
pub async fn run<R, W>(backend: &Backend, input: R, out: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut terminal = Terminal::new(input, out);
    let mut screen = AdminScreen::mount(backend);

    terminal.write(&render::admin(&screen)).await?;
    screen.resolve().await;
    terminal.write(&render::admin(&screen)).await?;

    let result = session(&mut screen, &mut terminal).await;
    screen.unmount();
    result
}

async fn session<R, W>(screen: &mut AdminScreen, terminal: &mut Terminal<R, W>) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut watch = screen.watch();
    let mut rendered = screen.status();

    terminal.write(PROMPT).await?;
    loop {
        tokio::select! {
            line = terminal.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                if line.trim().is_empty() {
                    terminal.write(PROMPT).await?;
                    continue;
                }

                match line.parse::<AdminCommand>() {
                    Ok(AdminCommand::Quit) => break,
                    Ok(command) => apply(screen, terminal, command).await?,
                    Err(err) => {
                        terminal.write(&format!("{err}\n{PROMPT}")).await?;
                        continue;
                    }
                }

                rendered = screen.sync().await;
                terminal.write(&render::admin(screen)).await?;
                terminal.write(PROMPT).await?;
            }
            Some(status) = watch.changed() => {
                if status == rendered {
                    continue;
                }
                debug!("session changed outside a command");
                rendered = screen.sync().await;
                terminal.write("\n").await?;
                terminal.write(&render::admin(screen)).await?;
                terminal.write(PROMPT).await?;
            }
        }
    }

    Ok(())
}

async fn apply<R, W>(
    screen: &mut AdminScreen,
    terminal: &mut Terminal<R, W>,
    command: AdminCommand,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    match screen.status() {
        AuthStatus::Checking => Ok(()),
        AuthStatus::Anonymous => match command {
            AdminCommand::Submit => submit(screen, terminal, None).await,
            AdminCommand::SignIn => submit(screen, terminal, Some(FormMode::SignIn)).await,
            AdminCommand::SignUp => submit(screen, terminal, Some(FormMode::SignUp)).await,
            AdminCommand::Toggle => {
                screen.form().toggle_mode();
                Ok(())
            }
            _ => terminal.write("Sign in first.\n").await,
        },
        AuthStatus::Authenticated(_) => {
            if command == AdminCommand::Logout {
                screen.sign_out().await;
                info!("signed out");
                return Ok(());
            }
            let Some(admin) = screen.feed_mut() else {
                return Ok(());
            };
            manage(admin, terminal, command).await
        }
    }
}

async fn submit<R, W>(
    screen: &AdminScreen,
    terminal: &mut Terminal<R, W>,
    mode: Option<FormMode>,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let form = screen.form();
    if let Some(mode) = mode {
        if form.mode() != mode {
            form.toggle_mode();
        }
    }

    let Some(email) = terminal.ask("Email: ").await? else {
        return Ok(());
    };
    let Some(password) = terminal.ask("Password: ").await? else {
        return Ok(());
    };
    let password = SecretString::from(password);

    match form.submit(email.trim(), &password).await {
        SubmitOutcome::SignedIn(_) => info!("signed in"),
        SubmitOutcome::SignedUp => info!("account created"),
        outcome => debug!(?outcome, "credentials not accepted"),
    }
    Ok(())
}

async fn manage<R, W>(
    admin: &mut AdminFeed,
    terminal: &mut Terminal<R, W>,
    command: AdminCommand,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    match command {
        AdminCommand::New => admin.toggle_creating(),
        AdminCommand::Filter(filter) => admin.feed_mut().select(filter),
        AdminCommand::List => {}
        AdminCommand::Title(_)
        | AdminCommand::Content(_)
        | AdminCommand::Category(_)
        | AdminCommand::Tags(_)
        | AdminCommand::Publish
            if !admin.is_creating() =>
        {
            terminal
                .write("Open the creation panel with `new` first.\n")
                .await?;
        }
        AdminCommand::Title(title) => admin.draft_mut().title = title,
        AdminCommand::Content(content) => admin.draft_mut().content = content,
        AdminCommand::Category(category) => admin.draft_mut().category = category,
        AdminCommand::Tags(tags) => admin.draft_mut().tags = tags,
        AdminCommand::Publish => publish(admin, terminal).await?,
        AdminCommand::Submit | AdminCommand::SignIn | AdminCommand::SignUp | AdminCommand::Toggle => {
            terminal.write("Already signed in.\n").await?;
        }
        AdminCommand::Logout | AdminCommand::Quit => {}
    }
    Ok(())
}

/// An incomplete draft is ignored without a word. A store failure blocks on an
/// alert until the user acknowledges it.
async fn publish<R, W>(admin: &mut AdminFeed, terminal: &mut Terminal<R, W>) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let alert = match admin.publish().await {
        Ok(post) => {
            let notice = format!("Published \"{}\".\n", post.title);
            terminal.write(&notice).await?;
            return Ok(());
        }
        Err(err) => err.alert(),
    };

    if let Some(alert) = alert {
        terminal.write(&format!("!! {alert}\n")).await?;
        terminal.ask(CONTINUE_PROMPT).await?;
        terminal.write("\n").await?;
    }
    Ok(())
}
