use std::sync::Arc;

use services::{AppServices, Clock, SessionHandle, TimeLimit};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

mod args;
mod terminal;

use args::{Args, Parsed, prepare_sqlite_file, print_usage};
use terminal::TerminalObserver;

fn print_commands() {
    println!("Commands:");
    println!("  start [secs]   begin drilling (default time limit if omitted)");
    println!("  stop           end the session");
    println!("  reset          forget all results");
    println!("  grid           show the accuracy grid");
    println!("  quit           exit");
    println!("Anything else is taken as an answer.");
}

/// Forward one input line. Returns false when the user wants to quit.
fn dispatch(
    line: &str,
    handle: &SessionHandle,
    observer: &TerminalObserver,
    default_limit: TimeLimit,
) -> Result<bool, Box<dyn std::error::Error>> {
    let mut words = line.split_whitespace();
    match words.next() {
        Some("start") => {
            let limit = words
                .next()
                .map_or(default_limit, |raw| TimeLimit::from_input(raw, default_limit));
            handle.start(i64::from(limit.secs()))?;
        }
        Some("stop") => handle.stop()?,
        Some("reset") => handle.reset()?,
        Some("grid") => print!("{}", observer.render_grid()),
        Some("help") => print_commands(),
        Some("quit" | "exit") => return Ok(false),
        _ => handle.submit(line)?,
    }
    Ok(true)
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let parsed = Args::parse(
        std::env::var("DRILL_DB_URL").ok(),
        std::env::var("DRILL_TIME_LIMIT").ok(),
        &mut argv,
    )
    .map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;
    let Parsed::Run(parsed) = parsed else {
        print_usage();
        return Ok(());
    };

    // Open + migrate SQLite at startup.
    prepare_sqlite_file(&parsed.db_url)?;
    let services =
        AppServices::new_sqlite(&parsed.db_url, Clock::default(), parsed.session_config()).await?;
    tracing::info!(db = %parsed.db_url, time_limit = parsed.time_limit.secs(), "drill ready");

    let observer = Arc::new(TerminalObserver::default());
    let (runtime, handle) = services.launch(observer.clone()).await;
    let session = tokio::spawn(runtime.run());

    print_commands();
    handle.refresh()?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if !dispatch(line.trim(), &handle, &observer, parsed.time_limit)? {
            break;
        }
    }

    drop(handle);
    let controller = session.await?;
    let (attempts, correct) = controller.matrix().totals();
    println!("{correct}/{attempts} correct overall");
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
