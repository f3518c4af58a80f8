//! Terminal rendering of chat views.

use colored::Colorize;
use penguin_application::ChatView;
use penguin_core::chat::{AttachmentKind, Message, MessageId, MessageRole};
use penguin_core::content::{ContentSegment, parse};

const TYPING_INDICATOR: &str = "Penguin AI is typing...";
/// Reply previews are cut to this many characters.
const PREVIEW_CHARS: usize = 60;

pub fn attachment_icon(kind: AttachmentKind) -> &'static str {
    match kind {
        AttachmentKind::Image => "[img]",
        AttachmentKind::Audio => "[audio]",
        AttachmentKind::Video => "[video]",
        AttachmentKind::Text => "[text]",
        AttachmentKind::Code => "[code]",
        AttachmentKind::Document => "[file]",
    }
}

/// One-line preview of a message, used for reply quotes.
pub fn preview(message: &Message) -> String {
    let first_line = message.body.lines().next().unwrap_or_default();
    if first_line.chars().count() > PREVIEW_CHARS {
        let cut: String = first_line.chars().take(PREVIEW_CHARS).collect();
        format!("{cut}...")
    } else {
        first_line.to_string()
    }
}

/// Lines for a message body: prose as-is, code blocks framed with their label.
pub fn render_body(body: &str) -> Vec<String> {
    let mut lines = Vec::new();
    for segment in parse(body) {
        match &segment {
            ContentSegment::Prose { text } => {
                // Line breaks around a fence belong to the frame.
                lines.extend(text.trim_matches('\n').lines().map(str::to_string));
            }
            ContentSegment::Code { text, .. } => {
                let label = segment.label().unwrap_or("code");
                lines.push(format!("┌─ {label}").bright_black().to_string());
                for code_line in text.lines() {
                    lines.push(format!("{} {}", "│".bright_black(), code_line.bright_white()));
                }
                lines.push("└─".bright_black().to_string());
            }
        }
    }
    lines
}

/// Renders one message with its 1-based position in the log.
pub fn render_message(position: usize, message: &Message, quoted: Option<&Message>) -> Vec<String> {
    let mut lines = Vec::new();
    let author = match message.role {
        MessageRole::User => "You".green().bold(),
        MessageRole::Assistant => "Penguin AI".bright_blue().bold(),
    };
    lines.push(format!(
        "{} {} {}",
        format!("[{position}]").bright_black(),
        author,
        message.display_time().bright_black()
    ));

    if let Some(quoted) = quoted {
        lines.push(format!("  ↪ {}", preview(quoted)).bright_black().to_string());
    }

    for attachment in &message.attachments {
        lines.push(format!(
            "  {} {} ({})",
            attachment_icon(attachment.kind()),
            attachment.name,
            attachment.display_size()
        ));
    }

    lines.extend(render_body(&message.body).into_iter().map(|line| format!("  {line}")));
    lines
}

/// Code block texts of a message, exactly as a copy action would take them.
pub fn code_blocks(message: &Message) -> Vec<String> {
    parse(&message.body)
        .into_iter()
        .filter(ContentSegment::is_code)
        .map(|segment| segment.text().to_string())
        .collect()
}

/// Renders a whole message list, resolving reply quotes within it.
pub fn render_transcript(messages: &[Message]) -> Vec<String> {
    messages
        .iter()
        .enumerate()
        .flat_map(|(index, message)| render_message(index + 1, message, quoted(messages, message)))
        .collect()
}

fn quoted<'a>(messages: &'a [Message], message: &Message) -> Option<&'a Message> {
    let target = message.reply_target.as_ref()?;
    messages.iter().find(|candidate| &candidate.id == target)
}

/// Prints only what changed between successive views.
#[derive(Debug, Default)]
pub struct ViewPrinter {
    printed: Vec<MessageId>,
    typing_shown: bool,
    reply_shown: Option<MessageId>,
}

impl ViewPrinter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines to print to bring the terminal in line with `view`.
    pub fn update(&mut self, view: &ChatView) -> Vec<String> {
        let mut lines = Vec::new();

        let continues = view.messages.len() >= self.printed.len()
            && view
                .messages
                .iter()
                .zip(&self.printed)
                .all(|(message, id)| &message.id == id);
        if !continues {
            lines.push("──── new chat ────".bright_magenta().to_string());
            self.printed.clear();
        }

        for (index, message) in view.messages.iter().enumerate().skip(self.printed.len()) {
            lines.extend(render_message(index + 1, message, quoted(&view.messages, message)));
            self.printed.push(message.id.clone());
        }

        if view.is_typing() && !self.typing_shown {
            lines.push(TYPING_INDICATOR.bright_black().italic().to_string());
        }
        self.typing_shown = view.is_typing();

        if view.reply_target != self.reply_shown {
            if let Some(target) = view.reply_message() {
                lines.push(format!("Replying to: {}", preview(target)).yellow().to_string());
            }
            self.reply_shown = view.reply_target.clone();
        }

        lines
    }
}
