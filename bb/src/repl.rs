//! Interactive chat session
//!
//! Lines are read on a blocking thread and each one is handled on its own
//! task, so a slow illustration never holds up the next message.

use colored::Colorize;
use eyre::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, info};

use crate::session::{ConsoleReply, InboundMessage, Outcome, SessionController};

/// Interactive terminal session with Bob
pub struct ChatSession {
    controller: SessionController,
    author: String,
}

impl ChatSession {
    pub fn new(controller: SessionController, author: impl Into<String>) -> Self {
        Self {
            controller,
            author: author.into(),
        }
    }

    /// Run the chat loop until `/quit` or Ctrl-D
    pub async fn run(&self) -> Result<()> {
        self.print_welcome();

        let (tx, mut rx) = mpsc::channel::<String>(16);
        let reader = tokio::task::spawn_blocking(move || read_lines(tx));
        let mut in_flight = JoinSet::new();

        while let Some(line) = rx.recv().await {
            if line.starts_with('/') {
                self.handle_slash_command(&line).await;
                continue;
            }

            let controller = self.controller.clone();
            let message = InboundMessage::from_user(self.author.clone(), line);
            debug!(id = %message.id, "run: spawning handler");
            in_flight.spawn(async move {
                let reply = ConsoleReply::default();
                controller.handle(&message, &reply).await
            });

            // Reap whatever has already finished
            while let Some(done) = in_flight.try_join_next() {
                log_finished(done);
            }
        }

        if !in_flight.is_empty() {
            println!("{}", "Waiting for Bob to finish...".dimmed());
        }
        while let Some(done) = in_flight.join_next().await {
            log_finished(done);
        }

        reader.await??;
        println!("Goodbye!");
        Ok(())
    }

    fn print_welcome(&self) {
        println!();
        println!("{}", "BuilderBot".bright_cyan().bold());
        println!("Try {}", "\"Bob, please build me a birdhouse\"".yellow());
        println!("Type {} for help, {} to quit", "/help".yellow(), "/quit".yellow());
        println!();
    }

    async fn handle_slash_command(&self, input: &str) {
        let cmd = input.split_whitespace().next().unwrap_or("");

        match cmd {
            "/help" | "/h" => self.print_help(),
            "/history" => match self.controller.history().stats().await {
                Ok(stats) => println!(
                    "{} {} of {} build(s) remembered, {} step(s) in the latest",
                    "history:".dimmed(),
                    stats.stored,
                    stats.capacity,
                    stats.most_recent_steps
                ),
                Err(e) => println!("{} {}", "error:".red(), e),
            },
            _ => {
                println!("{} Unknown command: {}", "?".yellow(), cmd);
                println!("Type {} for available commands", "/help".yellow());
            }
        }
    }

    fn print_help(&self) {
        println!();
        println!("{}", "Talking to Bob:".bright_cyan());
        println!("  Bob, please build me <thing>     step-by-step instructions");
        println!("  explain step N of the last build  more detail on one step");
        println!("  step N from M builds ago          same, for an older build");
        println!("  Bob, please draw <description>    an illustration");
        println!("  !ping [text]                      check that Bob is listening");
        println!();
        println!("{}", "Commands:".bright_cyan());
        println!("  /history   show what Bob remembers");
        println!("  /help      show this help");
        println!("  /quit      exit");
        println!();
    }
}

/// Blocking readline loop; returns on `/quit`, Ctrl-D or when the receiver is gone
fn read_lines(tx: mpsc::Sender<String>) -> Result<()> {
    let mut rl = DefaultEditor::new().map_err(|e| eyre::eyre!("Failed to initialize readline: {}", e))?;

    loop {
        match rl.readline(&format!("{} ", ">".bright_green())) {
            Ok(line) => {
                let input = line.trim();
                if input.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(input);

                if matches!(input, "/quit" | "/q" | "/exit") {
                    break;
                }
                if tx.blocking_send(input.to_string()).is_err() {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!();
                break;
            }
            Err(err) => {
                return Err(eyre::eyre!("Readline error: {}", err));
            }
        }
    }

    Ok(())
}

fn log_finished(done: Result<Outcome, tokio::task::JoinError>) {
    match done {
        Ok(outcome) => info!(?outcome, "Message handled"),
        Err(e) => tracing::error!(error = %e, "Message handler panicked"),
    }
}
