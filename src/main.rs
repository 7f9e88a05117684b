use anyhow::Result;
use clap::{Parser, Subcommand};
use hifiovl::cmd::{dbinfo, ovl};

#[derive(Parser)]
#[command(name = "hifiovl")]
#[command(version = "0.1.0")]
#[command(about = "Minimizer-seeded overlap engine for long high-accuracy reads", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Overlap queries against an indexed target set
    Ovl(ovl::OvlArgs),
    /// Summarize a SeedDB index
    Dbinfo(dbinfo::DbinfoArgs),
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Ovl(args) => ovl::run(args)?,
        Commands::Dbinfo(args) => dbinfo::run(args)?,
    }
    Ok(())
}
