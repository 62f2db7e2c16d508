use anyhow::Result;
use clap::Parser;
use vib_cargo_cli::Cli;

fn main() -> Result<()> {
    // Initialize tracing based on RUST_LOG env var
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let code = Cli::parse().execute()?;
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}
