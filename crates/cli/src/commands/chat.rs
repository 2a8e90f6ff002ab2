use std::path::PathBuf;

use anyhow::Result;
use planbot_service::{ChatEvent, EventKind, Keyboard, Message, Reply, Settings, UserRef};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::build_router;

const HELP: &str = "/command args · !button_payload · ~path/to/voice.ogg · anything else is text. Ctrl-D quits.";

/// Console line to chat event; blank lines are skipped.
pub(crate) fn parse_line(line: &str) -> Option<EventKind> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    if let Some(command) = line.strip_prefix('/') {
        let (name, args) = command.split_once(char::is_whitespace).unwrap_or((command, ""));
        return Some(EventKind::Command { name: name.to_owned(), args: args.trim().to_owned() });
    }
    if let Some(payload) = line.strip_prefix('!') {
        return Some(EventKind::Button { payload: payload.trim().to_owned() });
    }
    if let Some(path) = line.strip_prefix('~') {
        return Some(EventKind::Voice(PathBuf::from(path.trim())));
    }
    Some(EventKind::Text(line.to_owned()))
}

pub(crate) fn format_message(message: &Message) -> String {
    let mut out = message.text.clone();
    match message.keyboard {
        Some(Keyboard::Inline(ref rows)) => {
            for row in rows {
                let buttons: Vec<String> = row.iter().map(|b| format!("[{}] !{}", b.label, b.payload)).collect();
                out.push_str(&format!("\n  {}", buttons.join("   ")));
            }
        },
        Some(Keyboard::Reply(ref rows)) => {
            for row in rows {
                out.push_str(&format!("\n  ⌨ {}", row.join(" | ")));
            }
        },
        Some(Keyboard::Remove) | None => {},
    }
    out
}

fn print_reply(reply: &Reply) {
    let marker = match reply {
        Reply::Send(_) => "»",
        Reply::Edit(_) => "✎",
    };
    println!("{marker} {}\n", format_message(reply.message()));
}

pub(crate) async fn run(settings: &Settings, user_id: i64, first_name: Option<String>) -> Result<()> {
    let (router, mut jobs) = build_router(settings)?;
    if let Err(e) = router.restore_reminders() {
        tracing::warn!("Reminder restore failed: {}", e);
    }
    let user = UserRef { first_name, ..UserRef::private(user_id) };
    println!("{HELP}\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let Some(kind) = parse_line(&line) else { continue };
                for reply in router.handle(ChatEvent { user: user.clone(), kind }).await {
                    print_reply(&reply);
                }
            },
            Some(job) = jobs.recv() => {
                if let Some((_, message)) = router.fire(&job) {
                    println!("⏰ {}\n", format_message(&message));
                }
            },
        }
    }
    tracing::info!("Console chat closed");
    Ok(())
}
