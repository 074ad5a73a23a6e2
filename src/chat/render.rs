//! Terminal rendering of the transcript.

use std::io::{self, Write};

use crossterm::queue;
use crossterm::style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor};

use super::{ChatHistory, ChatMessage, ChatRole};

fn role_style(role: ChatRole) -> (&'static str, Color) {
    match role {
        ChatRole::User => ("you", Color::Cyan),
        ChatRole::Assistant => ("planner", Color::Green),
    }
}

/// Print the page header.
pub fn render_header<W: Write>(out: &mut W, title: &str) -> io::Result<()> {
    queue!(
        out,
        SetAttribute(Attribute::Bold),
        Print(title),
        SetAttribute(Attribute::Reset),
        Print("\n"),
        Print("=".repeat(title.chars().count())),
        Print("\n\n"),
    )?;
    out.flush()
}

/// Print one entry as a role label followed by its content.
pub fn render_message<W: Write>(out: &mut W, message: &ChatMessage) -> io::Result<()> {
    let (label, color) = role_style(message.role());
    queue!(
        out,
        SetForegroundColor(color),
        SetAttribute(Attribute::Bold),
        Print(format!("{label}> ")),
        SetAttribute(Attribute::Reset),
        ResetColor,
        Print(message.content()),
        Print("\n\n"),
    )?;
    out.flush()
}

/// Print the whole transcript, oldest entry first.
pub fn render_transcript<W: Write>(out: &mut W, history: &ChatHistory) -> io::Result<()> {
    for message in history {
        render_message(out, message)?;
    }
    Ok(())
}

/// Print the input prompt, preceded by `placeholder` unless it is empty.
pub fn render_prompt<W: Write>(out: &mut W, placeholder: &str) -> io::Result<()> {
    if !placeholder.is_empty() {
        queue!(
            out,
            SetForegroundColor(Color::DarkGrey),
            Print(placeholder),
            ResetColor,
            Print("\n"),
        )?;
    }
    queue!(
        out,
        SetForegroundColor(Color::Cyan),
        Print("you> "),
        ResetColor,
    )?;
    out.flush()
}
