//! Terminal front-end for the chat session
//!
//! Line-oriented: inbound entries print as they arrive, stdin lines go
//! out as messages. Connection events, render notifications, and user
//! input all drain through one select loop, so the session pump never
//! runs concurrently with itself.

use anyhow::Result;
use colored::Colorize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::client::{ChatClient, ClientEvent};
use crate::config::Config;
use crate::connection::ConnectionState;
use crate::core::types::{ChatEntry, Sender};

/// Run the interactive chat loop until stdin closes or `/quit`
pub async fn run_chat(config: Config, initial_message: Option<String>) -> Result<()> {
    let (conn_tx, mut conn_rx) = mpsc::unbounded_channel();
    let (note_tx, mut note_rx) = mpsc::unbounded_channel();
    let reconnect_on_close = config.connection.reconnect_on_close;
    let mut client = ChatClient::new(&config, conn_tx, note_tx);

    client.connect()?;

    let mut pending_initial = initial_message;
    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    loop {
        tokio::select! {
            event = conn_rx.recv() => {
                let Some(event) = event else { break };
                let was_open = client.state() == ConnectionState::Open;
                client.handle_event(event);
                match client.state() {
                    ConnectionState::Open => {
                        if let Some(message) = pending_initial.take() {
                            client.send_message(&message);
                        }
                    }
                    ConnectionState::Closed if was_open && reconnect_on_close => {
                        tracing::info!("reconnect_on_close set, dialing again");
                        client.connect()?;
                    }
                    _ => {}
                }
            }
            note = note_rx.recv() => {
                if let Some(note) = note {
                    render_note(&note);
                }
            }
            line = lines.next_line() => {
                match line? {
                    Some(line) => {
                        if !handle_line(&mut client, &line)? {
                            break;
                        }
                    }
                    None => break,
                }
            }
        }
    }

    Ok(())
}

/// Process one line of user input; returns false when the loop should end
fn handle_line(client: &mut ChatClient, line: &str) -> Result<bool> {
    match line.trim() {
        "/quit" | "/exit" => return Ok(false),
        "/reconnect" => {
            client.connect()?;
        }
        _ => {
            if !client.send_message(line) && client.state() != ConnectionState::Open {
                eprintln!("{}", "(not connected; /reconnect to retry)".dimmed());
            }
        }
    }
    Ok(true)
}

fn render_note(note: &ClientEvent) {
    match note {
        ClientEvent::EntryAppended(entry) => render_entry(entry),
        ClientEvent::StateChanged(state) => {
            tracing::debug!("connection state: {}", state.as_str());
        }
    }
}

/// Print one transcript entry with its sender-role styling
fn render_entry(entry: &ChatEntry) {
    match &entry.sender {
        Sender::You => println!("{} {}", "You:".cyan().bold(), entry.content),
        Sender::System => println!("{}", format!("· {}", entry.content).dimmed().italic()),
        Sender::Agent(name) => println!("{} {}", format!("{name}:").green().bold(), entry.content),
    }
    if let Some(tool) = &entry.tool {
        println!("  {}", format!("tool: {tool}").dimmed());
    }
    if entry.handoff_occurred() {
        println!("  {}", "handoff occurred".blue());
    }
}
