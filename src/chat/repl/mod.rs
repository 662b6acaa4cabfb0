
use anyhow::Result;
use console::style;
use dialoguer::Input;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tracing::debug;

use super::{ChatSession, Role, Turn};
use crate::advisor::SAMPLE_QUESTIONS;

pub const TITLE: &str = "Canadian Accessibility Advisor 🍁";
pub const CAPTION: &str = "Get answers about Canadian accessibility laws and WCAG compliance";
pub const DISCLAIMER: &str = "This tool provides general information about Canadian accessibility laws and is not legal advice. Consult a qualified legal professional for specific compliance questions.";

/// Text shown when the chat starts
#[derive(Debug, Clone, Default)]
pub struct Banner {
    /// One-line description of the loaded index, if any
    pub index_summary: Option<String>,
}

/// A line typed at the chat prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatInput {
    Question(String),
    Reset,
    Examples,
    History,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

#[inline]
pub fn parse_input(line: &str) -> ChatInput {
    let line = line.trim();
    if line.is_empty() {
        return ChatInput::Empty;
    }
    if !line.starts_with('/') {
        return ChatInput::Question(line.to_string());
    }

    match line.to_lowercase().as_str() {
        "/reset" | "/clear" => ChatInput::Reset,
        "/examples" => ChatInput::Examples,
        "/history" => ChatInput::History,
        "/help" => ChatInput::Help,
        "/quit" | "/exit" => ChatInput::Quit,
        _ => ChatInput::Unknown(line.to_string()),
    }
}

#[inline]
pub fn render_turn(turn: &Turn) -> String {
    let label = match turn.role {
        Role::User => style("You").bold().green(),
        Role::Assistant => style("Advisor").bold().cyan(),
    };
    format!("{label}\n{}\n", turn.content)
}

#[inline]
pub fn render_examples() -> String {
    let mut lines = vec![style("Sample Questions").bold().yellow().to_string()];
    lines.extend(SAMPLE_QUESTIONS.iter().map(|q| format!("  - {q}")));
    lines.join("\n")
}

#[inline]
pub fn render_banner(banner: &Banner) -> String {
    let mut lines = vec![
        style(TITLE).bold().cyan().to_string(),
        style(CAPTION).dim().to_string(),
        String::new(),
        style(format!("⚠ {DISCLAIMER}")).yellow().to_string(),
        String::new(),
    ];
    if let Some(summary) = &banner.index_summary {
        lines.push(style(summary).dim().to_string());
        lines.push(String::new());
    }
    lines.push(render_examples());
    lines.push(String::new());
    lines.push(
        style("Commands: /reset  /examples  /history  /help  /quit")
            .dim()
            .to_string(),
    );
    lines.join("\n")
}

/// Read questions from the terminal until `/quit` or end of input
#[inline]
pub async fn run_repl(mut session: ChatSession, banner: &Banner) -> Result<()> {
    println!("{}", render_banner(banner));
    println!();

    loop {
        let line = match Input::<String>::new()
            .with_prompt("Ask about Canadian accessibility laws")
            .allow_empty(true)
            .interact_text()
        {
            Ok(line) => line,
            Err(e) => {
                debug!("Input closed: {}", e);
                break;
            }
        };

        match parse_input(&line) {
            ChatInput::Question(question) => {
                let spinner = thinking_spinner();
                let reply = session.ask(&question).await;
                spinner.finish_and_clear();
                println!();
                println!(
                    "{}",
                    render_turn(&Turn {
                        role: Role::Assistant,
                        content: reply,
                    })
                );
            }
            ChatInput::Reset => {
                session.reset();
                println!("{}", style("✓ Chat history cleared").green());
            }
            ChatInput::Examples => println!("{}", render_examples()),
            ChatInput::History => {
                if session.transcript().is_empty() {
                    println!("{}", style("No messages yet.").dim());
                }
                for turn in session.transcript().turns() {
                    println!("{}", render_turn(turn));
                }
            }
            ChatInput::Help => {
                println!("/reset     clear the conversation");
                println!("/examples  show sample questions");
                println!("/history   show the conversation so far");
                println!("/quit      leave the advisor");
            }
            ChatInput::Quit => break,
            ChatInput::Empty => {}
            ChatInput::Unknown(command) => {
                println!(
                    "{}",
                    style(format!("Unknown command {command}, try /help")).yellow()
                );
            }
        }
    }

    println!("{}", style("Goodbye!").dim());
    Ok(())
}

fn thinking_spinner() -> ProgressBar {
    if console::user_attended_stderr() {
        let bar = ProgressBar::new_spinner().with_style(
            ProgressStyle::with_template("{spinner} {msg}").expect("style template is valid"),
        );
        bar.set_message("Analyzing question...");
        bar.enable_steady_tick(Duration::from_millis(100));
        bar
    } else {
        ProgressBar::hidden()
    }
}
