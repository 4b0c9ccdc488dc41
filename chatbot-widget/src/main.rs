//! Terminal host for the chat widget.
//!
//! Each input line is typed into the draft and submitted with Enter.
//! `/toggle` and `/close` drive the panel, `/quit` exits.

use std::sync::Arc;

use chatbot_widget::{
    ansi_foreground, ChatWidget, IgnoreReason, Role, SendOutcome, StubReplier, TranscriptEntry,
    WidgetAttributes, ANSI_RESET,
};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(long)]
    bot_id: Option<String>,

    #[arg(long)]
    api_url: Option<String>,

    #[arg(long)]
    primary_color: Option<String>,

    #[arg(long)]
    bot_name: Option<String>,

    #[arg(long)]
    welcome_message: Option<String>,
}

impl Args {
    fn into_attributes(self) -> WidgetAttributes {
        let defaults = WidgetAttributes::default();
        WidgetAttributes {
            bot_id: self.bot_id.unwrap_or(defaults.bot_id),
            api_url: self.api_url.unwrap_or(defaults.api_url),
            primary_color: self.primary_color.unwrap_or(defaults.primary_color),
            bot_name: self.bot_name.unwrap_or(defaults.bot_name),
            welcome_message: self.welcome_message.unwrap_or(defaults.welcome_message),
        }
    }
}

fn render(entry: &TranscriptEntry, attributes: &WidgetAttributes) -> String {
    let time = entry.timestamp.format("%H:%M");
    match entry.role {
        Role::Assistant => format!(
            "{}[{}] {}: {}{}",
            ansi_foreground(&attributes.primary_color),
            time,
            attributes.bot_name,
            entry.content,
            ANSI_RESET
        ),
        Role::User => format!("[{}] You: {}", time, entry.content),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let attributes = Args::parse().into_attributes();

    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into()))
        .with_writer(std::io::stderr)
        .init();

    let widget = ChatWidget::new(attributes, Arc::new(StubReplier::default()));
    widget.toggle();

    let mut shown = 0;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let transcript = widget.transcript().await;
        if widget.is_open() {
            for entry in &transcript[shown..] {
                println!("{}", render(entry, widget.attributes()));
            }
            shown = transcript.len();
        }

        let Some(line) = lines.next_line().await? else {
            break;
        };
        match line.trim() {
            "/quit" => break,
            "/toggle" => {
                let open = widget.toggle();
                println!("(chat {})", if open { "opened" } else { "closed" });
                continue;
            }
            "/close" => {
                widget.close();
                println!("(chat closed)");
                continue;
            }
            _ => {}
        }

        widget.set_draft(line).await;
        match widget.on_key("Enter", false).await {
            Some(SendOutcome::Ignored(IgnoreReason::Empty)) | None => {}
            Some(SendOutcome::Ignored(IgnoreReason::Busy)) => println!("(still waiting for a reply)"),
            Some(SendOutcome::Replied) | Some(SendOutcome::Failed) => {}
        }
    }

    Ok(())
}
