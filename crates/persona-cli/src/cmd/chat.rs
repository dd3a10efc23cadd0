use crate::session::AgentSession;
use cli_driver::{invoke, DriverError, Preference};
use persona_core::Store;
use std::io::{BufRead, Write};
use std::sync::mpsc;
use std::time::Duration;

/// How often the foreground loop wakes to print a progress dot while the
/// assistant subprocess is running.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Longest assistant reply shown verbatim by the `history` command.
const HISTORY_SNIPPET: usize = 100;

/// Interactive conversation loop. This is the default command.
pub fn run(preference: Preference, config: Option<&str>) -> anyhow::Result<()> {
    let rt = tokio::runtime::Runtime::new()?;

    // Ctrl-C at any point in the loop (including mid-read on stdin) ends
    // the session with the same farewell as `quit`.
    rt.spawn(async {
        if tokio::signal::ctrl_c().await.is_ok() {
            println!("\nGoodbye!");
            std::process::exit(0);
        }
    });

    let mut session = AgentSession::open(Store::from_env(), config)?;
    rt.block_on(session.bind(preference));
    print_banner(&session);

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("\nYou: ");
        std::io::stdout().flush()?;

        let line = match lines.next() {
            Some(line) => line?,
            // EOF ends the session as cleanly as "quit" does.
            None => {
                println!("\nGoodbye!");
                return Ok(());
            }
        };
        let input = line.trim();

        match input {
            "" => continue,
            "quit" | "exit" => {
                println!("Goodbye!");
                return Ok(());
            }
            "history" => print_history(&session),
            "clear" => {
                session.clear_history();
                println!("Conversation history cleared.");
            }
            "starters" => print_starters(&session),
            _ if input.starts_with("provider ") => {
                let choice = input["provider ".len()..].trim();
                rt.block_on(switch_provider(&mut session, choice));
            }
            message => {
                dispatch(&rt, &mut session, message)?;
            }
        }
    }
}

async fn switch_provider(session: &mut AgentSession, choice: &str) {
    let preference = match choice.parse::<Preference>() {
        Ok(p) => p,
        Err(e) => {
            println!("{e}");
            return;
        }
    };
    if session.switch_provider(preference).await {
        println!(
            "Now using {} ({}).",
            session.binding().provider_name(),
            session.binding().path.as_deref().unwrap_or("?")
        );
    } else {
        // Previous binding is still in place, nothing was lost.
        println!("No CLI found for '{choice}'; keeping the current provider.");
    }
}

/// Run one exchange. The invocation happens on a worker task so the
/// foreground can show progress; the session is only touched back here,
/// once the worker has reported its result over the channel.
fn dispatch(
    rt: &tokio::runtime::Runtime,
    session: &mut AgentSession,
    message: &str,
) -> anyhow::Result<()> {
    let (payload, system) = session.outgoing(message);
    let binding = session.binding().clone();

    let (tx, rx) = mpsc::sync_channel(1);
    rt.spawn(async move {
        let result = invoke(&binding, &payload, Some(&system)).await;
        // The receiver only disappears on ctrl-c teardown.
        let _ = tx.send(result);
    });

    print!("\n{}: ", session.config().name);
    std::io::stdout().flush()?;

    let result = loop {
        match rx.recv_timeout(POLL_INTERVAL) {
            Ok(result) => break result,
            Err(mpsc::RecvTimeoutError::Timeout) => {
                print!(".");
                std::io::stdout().flush()?;
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                break Err(DriverError::Process("worker exited unexpectedly".into()));
            }
        }
    };
    println!();

    match result {
        Ok(reply) => {
            println!("{reply}");
            session.record(message, &reply);
        }
        Err(e) => println!("[{e}]"),
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Display helpers
// ---------------------------------------------------------------------------

fn print_banner(session: &AgentSession) {
    let config = session.config();
    println!("{}", "=".repeat(60));
    println!("{}", config.name);
    println!("{}", config.description);
    println!("{}", "=".repeat(60));
    if session.binding().is_bound() {
        println!("Provider: {}", session.binding().provider_name());
    } else {
        println!("Provider: none found (messages will fail until one is installed)");
    }
    print_starters(session);
    println!(
        "\nCommands: quit, history, clear, starters, provider <auto|claude|gemini>"
    );
}

fn print_starters(session: &AgentSession) {
    let starters = &session.config().conversation_starters;
    if starters.is_empty() {
        return;
    }
    println!("\nConversation starters:");
    for (i, starter) in starters.iter().enumerate() {
        println!("  {}. {}", i + 1, starter);
    }
}

fn print_history(session: &AgentSession) {
    if session.history().is_empty() {
        println!("No conversation history yet.");
        return;
    }
    for turn in session.history().turns() {
        let stamp = turn.timestamp.format("%H:%M:%S");
        println!("[{stamp}] You: {}", turn.user);
        let reply = if turn.assistant.chars().count() > HISTORY_SNIPPET {
            let cut: String = turn.assistant.chars().take(HISTORY_SNIPPET).collect();
            format!("{cut}...")
        } else {
            turn.assistant.clone()
        };
        println!("[{stamp}] {}: {}", session.config().name, reply);
    }
}
