use clap::Parser;
use ridetag::ReaderKind;
use ridetag::core::config::{self, CliOverrides};
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::fs::File;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ridetag", about = "Read NFC tags and record rides")]
struct Args {
    /// NFC backend to use
    #[arg(short, long, value_enum)]
    reader: Option<ReaderKind>,

    /// Ride record endpoint URL
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Device UUID sent with every ride record
    #[arg(long)]
    device_id: Option<String>,

    /// Seconds to show the send result before scanning again
    #[arg(long)]
    delay: Option<f64>,

    /// Config file (default: ~/.ridetag/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level written to ridetag.log
    #[arg(long, default_value = "debug")]
    log_level: LevelFilter,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Initialize file logger - writes to ridetag.log in current directory
    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();

    if let Ok(log_file) = File::create("ridetag.log") {
        let _ = WriteLogger::init(args.log_level, log_config, log_file);
    }

    let file_config = config::load_config(args.config.as_deref())
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    let cli = CliOverrides {
        reader: args.reader,
        endpoint: args.endpoint,
        device_id: args.device_id,
        return_delay_secs: args.delay,
    };
    let resolved = config::resolve(&file_config, &cli).map_err(|e| {
        log::error!("Invalid configuration: {e}");
        std::io::Error::other(e.to_string())
    })?;

    log::info!(
        "ridetag starting up with reader {:?}, device {}",
        resolved.reader,
        resolved.device_id
    );

    ridetag::tui::run(resolved).await
}
