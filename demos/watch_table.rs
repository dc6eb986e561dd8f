// ABOUTME: Watches one table and prints every authoritative snapshot
// ABOUTME: Connects, subscribes to the table-state slot, exits when the server disconnects

use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tablesync::{ClientConfig, Endpoint, SharedState, StateClient};

/// Table state watcher
#[derive(Parser, Debug)]
#[command(name = "watch_table")]
#[command(about = "Connect to a table-state server and print snapshots", long_about = None)]
struct Args {
    /// Table identifier
    table: String,

    /// Base WebSocket URL tables live under
    #[arg(short, long, default_value = tablesync::config::DEFAULT_BASE_URL)]
    server: String,

    /// Connection setup window in milliseconds
    #[arg(short, long, default_value_t = 5000)]
    timeout_ms: u64,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args = Args::parse();

    let config = ClientConfig::new()
        .with_base_url(args.server)
        .with_connect_timeout(Duration::from_millis(args.timeout_ms));
    let shared = Arc::new(SharedState::new());
    let client = StateClient::new(config, Arc::clone(&shared))?;

    let table = Endpoint::new(args.table)?;
    shared.current_table.set(table.clone());

    println!("Connecting to table {}...", table);
    let connection = client.establish(&table).await?;
    println!("Connected ({})", connection.info().url);

    let mut snapshots = shared.table_state.subscribe();
    let printer = tokio::spawn(async move {
        while snapshots.changed().await.is_ok() {
            if let Some(state) = snapshots.borrow_and_update().as_ref() {
                println!("{}", state);
            }
        }
    });

    let summary = connection.closed().await;
    tokio::task::yield_now().await;
    printer.abort();

    println!(
        "Disconnected: {} snapshots, {} ignored, {} undecodable",
        summary.frames_applied, summary.frames_ignored, summary.decode_faults
    );
    if let Some(e) = summary.channel_error {
        eprintln!("Channel error: {}", e);
    }

    Ok(())
}
