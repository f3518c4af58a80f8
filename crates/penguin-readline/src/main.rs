use std::borrow::Cow::{self, Borrowed, Owned};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use tokio::sync::mpsc;

use penguin_application::chat::{ChatIntent, ChatSessionHandle, IntentOutcome, SendOutcome};
use penguin_application::ChatBootstrap;
use penguin_core::auth::AccountStatus;
use penguin_core::chat::Attachment;
use penguin_core::share::ShareToken;
use penguin_execution::{ObservabilityEvent, init_logging};
use penguin_infrastructure::ConfigService;

mod render;

use render::{ViewPrinter, code_blocks, render_transcript};

/// Account status for this terminal: `approved` (default), `admin` or `pending`.
const ENV_ACCOUNT_STATUS: &str = "PENGUIN_ACCOUNT_STATUS";

const COMMANDS: [&str; 8] = [
    "/reply", "/cancel", "/new", "/share", "/attach", "/open", "/copy", "/help",
];

/// CLI helper for rustyline that provides completion, highlighting, and hints.
#[derive(Clone)]
struct CliHelper {
    commands: Vec<String>,
}

impl CliHelper {
    fn new() -> Self {
        Self {
            commands: COMMANDS.iter().map(|cmd| cmd.to_string()).collect(),
        }
    }
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];

        if line.starts_with('/') {
            let candidates: Vec<Pair> = self
                .commands
                .iter()
                .filter(|cmd| cmd.starts_with(line))
                .map(|cmd| Pair {
                    display: cmd.clone(),
                    replacement: cmd.clone(),
                })
                .collect();
            Ok((0, candidates))
        } else {
            Ok((0, vec![]))
        }
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];

        if line.starts_with('/') && !line.contains(' ') {
            self.commands
                .iter()
                .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
                .map(|cmd| cmd[line.len()..].to_string())
        } else {
            None
        }
    }
}

impl Validator for CliHelper {}

/// A parsed line of REPL input.
#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Quit,
    Help,
    Reply(usize),
    CancelReply,
    NewChat,
    Share,
    Attach(Vec<&'a str>),
    Open(&'a str),
    Copy(usize),
    Message(&'a str),
    Invalid(String),
}

fn parse_command(line: &str) -> Command<'_> {
    let trimmed = line.trim();
    if trimmed == "quit" || trimmed == "exit" {
        return Command::Quit;
    }
    if !trimmed.starts_with('/') {
        return Command::Message(trimmed);
    }

    let mut parts = trimmed.split_whitespace();
    let name = parts.next().unwrap_or_default();
    let args: Vec<&str> = parts.collect();

    let position = |args: &[&str]| -> Option<usize> {
        match args {
            [n] => n.parse::<usize>().ok().filter(|n| *n > 0),
            _ => None,
        }
    };

    match name {
        "/help" => Command::Help,
        "/cancel" => Command::CancelReply,
        "/new" => Command::NewChat,
        "/share" => Command::Share,
        "/attach" => Command::Attach(args),
        "/reply" => position(&args)
            .map(Command::Reply)
            .unwrap_or_else(|| Command::Invalid("usage: /reply <message number>".to_string())),
        "/copy" => position(&args)
            .map(Command::Copy)
            .unwrap_or_else(|| Command::Invalid("usage: /copy <message number>".to_string())),
        "/open" => match args.as_slice() {
            [token] => Command::Open(*token),
            _ => Command::Invalid("usage: /open <share token>".to_string()),
        },
        other => Command::Invalid(format!("unknown command: {other}")),
    }
}

fn account_status_from_env() -> AccountStatus {
    match std::env::var(ENV_ACCOUNT_STATUS).as_deref() {
        Ok("pending") => AccountStatus::pending(),
        Ok("admin") => AccountStatus::admin(),
        _ => AccountStatus::approved(),
    }
}

/// Describes a local file as an attachment. Only metadata is read.
fn describe_file(path: &Path) -> Result<Attachment> {
    let metadata = std::fs::metadata(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    anyhow::ensure!(metadata.is_file(), "{} is not a file", path.display());

    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let media_type = mime_guess::from_path(path)
        .first()
        .map(|mime| mime.essence_str().to_string())
        .unwrap_or_default();

    Ok(Attachment::new(name, metadata.len(), media_type))
}

fn print_help() {
    let lines = [
        "<text>              send a message (staged files go with it)",
        "/reply <n>          reply to message n",
        "/cancel             stop replying",
        "/attach <path>...   stage files for the next message (no args: list)",
        "/copy <n>           print the code blocks of message n",
        "/share              store a snapshot and print its link",
        "/open <token>       show a shared conversation",
        "/new                start over",
        "quit                exit",
    ];
    for line in lines {
        println!("{}", line.bright_black());
    }
}

/// Prints forwarded WARN/ERROR events while the REPL runs.
fn spawn_error_printer(mut errors: mpsc::UnboundedReceiver<ObservabilityEvent>) {
    tokio::spawn(async move {
        while let Some(event) = errors.recv().await {
            if !event.is_error() {
                continue;
            }
            let detail = event
                .field("reason")
                .or_else(|| event.field("error"))
                .map(|detail| format!(": {detail}"))
                .unwrap_or_default();
            eprintln!("{}", format!("! {}{}", event.message, detail).red());
        }
    });
}

/// Prints view changes published by the session.
fn spawn_view_printer(session: &ChatSessionHandle) -> tokio::task::JoinHandle<()> {
    let mut views = session.subscribe();
    tokio::spawn(async move {
        let mut printer = ViewPrinter::new();
        loop {
            let view = views.borrow_and_update().clone();
            for line in printer.update(&view) {
                println!("{line}");
            }
            if views.changed().await.is_err() {
                break;
            }
        }
    })
}

async fn handle_send(session: &ChatSessionHandle, text: &str, staged: &mut Vec<Attachment>) {
    let files = std::mem::take(staged);
    match session.send(text, files.clone()).await {
        Ok(SendOutcome::Dispatched(_)) => {}
        Ok(SendOutcome::Busy) => {
            println!("{}", "Still waiting for the assistant.".yellow());
            *staged = files;
        }
        Ok(SendOutcome::Empty) => {}
        Err(e) if e.is_unauthorized() => {
            if let Some(notice) = session.view().notice() {
                println!("{}", notice.yellow());
            }
            *staged = files;
        }
        Err(e) => eprintln!("{}", format!("Error: {e}").red()),
    }
}

async fn handle_intent(session: &ChatSessionHandle, intent: ChatIntent) {
    match session.dispatch(intent).await {
        Ok(IntentOutcome::Applied(false)) => {
            println!("{}", "Not available right now.".bright_black());
        }
        Ok(IntentOutcome::Shared(Some(link))) => {
            println!("{} {}", "Share link:".bright_green(), link.url.underline());
        }
        Ok(IntentOutcome::Shared(None)) => {
            println!("{}", "Wait for the assistant before sharing.".yellow());
        }
        Ok(IntentOutcome::Opened(Some(snapshot))) => {
            println!(
                "{}",
                format!("=== Shared chat {} ===", snapshot.token).bright_magenta()
            );
            for line in render_transcript(&snapshot.messages) {
                println!("{line}");
            }
            println!("{}", "=== end of shared chat ===".bright_magenta());
        }
        Ok(IntentOutcome::Opened(None)) => {
            println!("{}", "Shared chat not found.".yellow());
        }
        Ok(_) => {}
        Err(e) => eprintln!("{}", format!("Error: {e}").red()),
    }
}

/// The main entry point for the Penguin readline REPL.
///
/// Loads the configuration, installs logging, starts a chat session and
/// then reads lines until `quit` or EOF. Session views are printed by a
/// background task as they change, so the typing indicator and the
/// assistant's answer appear without blocking the prompt.
#[tokio::main]
async fn main() -> Result<()> {
    // ===== Backend Initialization =====
    let config = ConfigService::default_location()
        .get_config()
        .context("failed to load configuration")?;

    let (error_tx, error_rx) = mpsc::unbounded_channel();
    init_logging(&config.logging, Some(error_tx))?;
    spawn_error_printer(error_rx);

    let session = ChatBootstrap::new(config)
        .start_session(Arc::new(account_status_from_env()))
        .await
        .context("failed to start chat session")?;
    let view_printer = spawn_view_printer(&session);

    // ===== REPL Setup =====
    let mut rl = Editor::new()?;
    rl.set_helper(Some(CliHelper::new()));

    println!("{}", "=== Penguin AI ===".bright_magenta().bold());
    println!("{}", "Type a message, '/help' for commands, or 'quit' to exit.".bright_black());
    println!();

    let mut staged: Vec<Attachment> = Vec::new();

    // ===== Main REPL Loop =====
    loop {
        let prompt = if staged.is_empty() {
            ">> ".to_string()
        } else {
            format!("[{} file(s)] >> ", staged.len())
        };

        match rl.readline(&prompt) {
            Ok(line) => {
                if line.trim().is_empty() && staged.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line.as_str());

                match parse_command(&line) {
                    Command::Quit => {
                        println!("{}", "Goodbye!".bright_green());
                        break;
                    }
                    Command::Help => print_help(),
                    Command::Message(text) => handle_send(&session, text, &mut staged).await,
                    Command::Reply(position) => {
                        let view = session.view();
                        match view.messages.get(position - 1) {
                            Some(message) => {
                                handle_intent(&session, ChatIntent::Reply(message.id.clone())).await
                            }
                            None => println!("{}", format!("No message {position}.").yellow()),
                        }
                    }
                    Command::CancelReply => handle_intent(&session, ChatIntent::CancelReply).await,
                    Command::NewChat => {
                        staged.clear();
                        handle_intent(&session, ChatIntent::NewChat).await
                    }
                    Command::Share => handle_intent(&session, ChatIntent::Share).await,
                    Command::Open(token) => {
                        handle_intent(&session, ChatIntent::OpenShared(ShareToken::from(token))).await
                    }
                    Command::Attach(paths) if paths.is_empty() => {
                        for file in &staged {
                            println!("  {} ({})", file.name, file.display_size());
                        }
                    }
                    Command::Attach(paths) => {
                        for path in paths {
                            match describe_file(Path::new(path)) {
                                Ok(file) => staged.push(file),
                                Err(e) => eprintln!("{}", format!("{e:#}").red()),
                            }
                        }
                    }
                    Command::Copy(position) => {
                        let view = session.view();
                        let blocks = view
                            .messages
                            .get(position - 1)
                            .map(code_blocks)
                            .unwrap_or_default();
                        if blocks.is_empty() {
                            println!("{}", "No code blocks there.".yellow());
                        }
                        for block in blocks {
                            println!("{block}");
                        }
                    }
                    Command::Invalid(reason) => println!("{}", reason.yellow()),
                }
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
            }
            Err(rustyline::error::ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        }
    }

    session.shutdown();
    let _ = view_printer.await;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use penguin_core::chat::AttachmentKind;
    use std::io::Write;

    #[test]
    fn test_parse_plain_text_is_message() {
        assert_eq!(parse_command("  hello there "), Command::Message("hello there"));
        assert_eq!(parse_command("exit"), Command::Quit);
    }

    #[test]
    fn test_parse_commands_with_arguments() {
        assert_eq!(parse_command("/reply 3"), Command::Reply(3));
        assert_eq!(parse_command("/copy 2"), Command::Copy(2));
        assert_eq!(parse_command("/open abc123"), Command::Open("abc123"));
        assert_eq!(
            parse_command("/attach a.png b.txt"),
            Command::Attach(vec!["a.png", "b.txt"])
        );
        assert_eq!(parse_command("/attach"), Command::Attach(vec![]));
    }

    #[test]
    fn test_parse_rejects_bad_positions() {
        assert!(matches!(parse_command("/reply 0"), Command::Invalid(_)));
        assert!(matches!(parse_command("/reply x"), Command::Invalid(_)));
        assert!(matches!(parse_command("/bogus"), Command::Invalid(_)));
    }

    #[test]
    fn test_describe_file_reads_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"twelve bytes")
            .unwrap();

        let attachment = describe_file(&path).unwrap();
        assert_eq!(attachment.name, "notes.txt");
        assert_eq!(attachment.size_bytes, 12);
        assert_eq!(attachment.media_type, "text/plain");
        assert_eq!(attachment.kind(), AttachmentKind::Text);
    }

    #[test]
    fn test_describe_missing_file_fails() {
        assert!(describe_file(Path::new("/definitely/not/here.png")).is_err());
    }
}
