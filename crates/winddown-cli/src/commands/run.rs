use std::path::Path;

use tokio::io::{AsyncBufReadExt, BufReader};
use winddown_core::{BreakTimer, Config, Event, Session};

use crate::terminal_host::TerminalHost;

/// A line of input typed into the live session.
#[derive(Debug, PartialEq, Eq)]
enum Input {
    Quit,
    Postpone,
    Status,
    Activity,
}

fn parse_input(line: &str) -> Input {
    match line.trim() {
        "q" | "quit" => Input::Quit,
        "p" | "postpone" => Input::Postpone,
        "s" | "status" => Input::Status,
        _ => Input::Activity,
    }
}

pub fn run(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_from(path)?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(run_session(config));
    // A stdin read may still be parked on a blocking thread.
    runtime.shutdown_background();
    result
}

async fn run_session(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = Session::new(BreakTimer::new(TerminalHost::new()));
    session.configure(config.timer)?;

    if let Event::SessionStarted { tick_period_ms, .. } = session.start() {
        println!(
            "winddown running, checking every {:.1}s. Enter = activity, p = postpone, s = status, q = quit",
            tick_period_ms as f64 / 1000.0
        );
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_input(&line) {
                    Input::Quit => break,
                    Input::Postpone => {
                        session.postpone();
                    }
                    Input::Status => {
                        println!("{}", serde_json::to_string_pretty(&session.snapshot())?);
                    }
                    Input::Activity => {
                        session.log_activity();
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("received Ctrl-C, shutting down");
                break;
            }
        }
    }

    session.stop();
    Ok(())
}
