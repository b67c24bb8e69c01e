mod calc;
mod config;
mod ipc;
mod model;
mod seed;
mod store;

use anyhow::Context;
use std::io::{self, BufRead, Write};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    // stdout carries the protocol; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let cfg = config::AppConfig::load().context("failed to load configuration")?;
    let snapshot = seed::initial_snapshot(&cfg)?;
    tracing::info!(
        seed = ?cfg.seed,
        seed_file = ?cfg.seed_file,
        students = snapshot.students.len(),
        exams = snapshot.exams.len(),
        assignments = snapshot.assignments.len(),
        "edutrackd ready"
    );
    let mut state = ipc::AppState::new(snapshot, cfg.top_performers_limit);

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "stdin closed");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: ipc::Request = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "bad request line");
                let _ = writeln!(stdout, "{}", ipc::bad_json(e.to_string()));
                let _ = stdout.flush();
                continue;
            }
        };

        let resp = ipc::handle_request(&mut state, req);
        let _ = writeln!(
            stdout,
            "{}",
            serde_json::to_string(&resp).unwrap_or_else(|_| "{\"ok\":false}".to_string())
        );
        let _ = stdout.flush();
    }

    tracing::info!("edutrackd shutting down");
    Ok(())
}
