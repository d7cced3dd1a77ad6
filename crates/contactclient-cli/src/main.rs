mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::send_contact::SendContactArgs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "contactclient",
    about = "Send contacts to clients through the contact client integration",
    version,
    propagate_version = true
)]
struct Cli {
    /// Data root (default: auto-detect from .contactclient/)
    #[arg(long, global = true, env = "CONTACTCLIENT_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the .contactclient/ data directory and default config
    Init,

    /// Send a contact to a client
    #[command(visible_alias = "sendcontact")]
    SendContact(SendContactArgs),
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root, cli.json),
        Commands::SendContact(args) => cmd::send_contact::run(&root, args, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
