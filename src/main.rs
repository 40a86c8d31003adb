use anyhow::Result;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use travel_gpt::{App, Command, Config, Flow};

#[derive(Debug, Parser)]
#[command(name = "travel-gpt", about = "Chat with text and voice notes")]
struct Args {
    /// Config file, extension optional
    #[arg(short, long, default_value = "config/travel-gpt")]
    config: String,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // stdout belongs to the chat screen
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cfg = Config::load(&args.config)?;
    info!("Loaded config: {}", cfg.app.name);
    info!("Recordings directory: {}", cfg.audio.recordings_dir().display());

    let mut app = App::new(cfg)?;
    println!("{}", app.render());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match Command::parse(&line) {
            Ok(command) => command,
            Err(e) => {
                println!("  {}", e);
                continue;
            }
        };

        match app.handle(command).await {
            Ok(Flow::Continue) => println!("{}", app.render()),
            Ok(Flow::Output(text)) => println!("{}", text),
            Ok(Flow::Quit) => break,
            Err(e) => warn!("Command failed: {:#}", e),
        }
    }

    app.shutdown().await;
    Ok(())
}
