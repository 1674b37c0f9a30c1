use clap::Parser;
use std::path::Path;
use std::process::ExitCode;

use form_finder::{FormScan, ScanConfig, utils};

mod args;
use args::Args;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Parse command-line arguments
    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            ::log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> form_finder::Result<()> {
    let mut config = match &args.config {
        Some(path) => ScanConfig::from_file(path)?,
        None => ScanConfig::default(),
    };
    args.apply(&mut config);

    let seeds = match &args.input {
        Some(input) if Path::new(input).is_file() => {
            ::log::info!("Reading seed URLs from {}", input);
            utils::read_seed_list(Path::new(input))?
        }
        Some(input) => vec![input.clone()],
        None => Vec::new(),
    };

    let output = config.export.output.clone();
    let scan = FormScan::new(seeds).with_config(config);
    ::log::info!("Starting scan of {} seed(s)", scan.seeds().len());

    let start_time = std::time::Instant::now();
    let (report, written) = scan.run().await?;

    ::log::info!(
        "Scan complete - {} pages in {:.2} seconds",
        report.pages_fetched(),
        start_time.elapsed().as_secs_f64()
    );
    println!("{} form page(s) written to {}", written, output.display());

    Ok(())
}
