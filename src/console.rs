//! Line-oriented console transport for local runs
//!
//! Outbound prompts print to stdout; inbound lines come from stdin.
//! Menu choices are entered as `@code` (the codes are printed with each
//! menu), contacts as `+<digits>`, and `/user <id> [handle]` switches the
//! active identity so a reviewer and an applicant can be exercised in one
//! session.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;

use crate::runtime::{EngineManager, Storage, Transport};
use crate::state_machine::{Choice, Event, UserId};
use crate::texts::MenuButton;

pub struct ConsoleTransport;

fn print_menu(buttons: &[MenuButton]) {
    for button in buttons {
        println!("    [@{}] {}", button.code, button.label);
    }
}

#[async_trait]
impl Transport for ConsoleTransport {
    async fn send_text(&self, user: UserId, text: &str) -> Result<(), String> {
        println!("-> {user}: {text}");
        Ok(())
    }

    async fn send_menu(&self, user: UserId, text: &str, buttons: &[MenuButton])
        -> Result<(), String> {
        println!("-> {user}: {text}");
        print_menu(buttons);
        Ok(())
    }

    async fn edit_menu(&self, user: UserId, text: &str, buttons: &[MenuButton])
        -> Result<(), String> {
        // The console cannot edit history; re-send instead.
        println!("-> {user} (edited): {text}");
        print_menu(buttons);
        Ok(())
    }

    async fn request_contact(&self, user: UserId, text: &str, button: &str) -> Result<(), String> {
        println!("-> {user}: {text}");
        println!("    [{button}] (reply with +<digits>)");
        Ok(())
    }

    async fn remove_input(&self, user: UserId, text: &str) -> Result<(), String> {
        println!("-> {user}: {text}");
        Ok(())
    }

    async fn direct_message(&self, recipient: UserId, text: &str) -> Result<(), String> {
        println!("=> {recipient} (direct): {text}");
        Ok(())
    }
}

/// Parse one input line into an event, if it maps to one.
fn parse_line(line: &str, handle: Option<&str>) -> Option<Event> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    if line == "/start" {
        return Some(Event::Start {
            handle: handle.map(str::to_string),
        });
    }
    if let Some(code) = line.strip_prefix('@') {
        return match Choice::parse(code) {
            Some(choice) => Some(Event::Choice { choice }),
            None => {
                println!("?? unknown choice code: {code}");
                None
            }
        };
    }
    if line.starts_with('+') && line[1..].chars().all(|c| c.is_ascii_digit()) {
        return Some(Event::Contact {
            phone: line.to_string(),
        });
    }
    Some(Event::Text {
        text: line.to_string(),
    })
}

/// Read stdin until EOF, dispatching each line as the active identity.
pub async fn run<S>(engine: Arc<EngineManager<S, ConsoleTransport>>, initial_user: UserId)
where
    S: Storage + Clone + 'static,
{
    let mut user = initial_user;
    let mut handle: Option<String> = None;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("<- acting as user {user}; /user <id> [handle] switches, /start begins");

    while let Ok(Some(line)) = lines.next_line().await {
        if let Some(rest) = line.trim().strip_prefix("/user") {
            let mut parts = rest.split_whitespace();
            match parts.next().map(str::parse::<UserId>) {
                Some(Ok(id)) => {
                    user = id;
                    handle = parts.next().map(str::to_string);
                    println!("<- acting as user {user}");
                }
                _ => println!("?? usage: /user <id> [handle]"),
            }
            continue;
        }

        if let Some(event) = parse_line(&line, handle.as_deref()) {
            if let Err(e) = engine.dispatch(user, event).await {
                warn!(user_id = user, error = %e, "dispatch failed");
            }
        }
    }
}
