use crate::output::{print_json, print_report};
use anyhow::Context;
use clap::Args;
use contactclient_core::config::Config;
use contactclient_core::dispatch::{DispatchCommand, DispatchOptions};
use contactclient_core::integration::Integration;
use contactclient_core::local::LocalIntegration;
use contactclient_core::lock::FileRunLock;
use contactclient_core::resolver::FileResolver;
use std::path::Path;

#[derive(Args, Debug)]
pub struct SendContactArgs {
    /// The contact client to send to
    #[arg(long, short = 'c')]
    client: Option<String>,

    /// The id of a contact to send
    #[arg(long, short = 'l')]
    contact: Option<String>,

    /// Run client requests in test mode
    #[arg(long, short = 'i')]
    test: bool,

    /// Send even if the client or the integration is unpublished
    #[arg(long, short = 'f')]
    force: bool,

    /// Print the integration logs under the result
    #[arg(long, short = 'v')]
    verbose: bool,

    /// Seconds after which another run's lock is considered abandoned
    /// (default: lock.timeout_seconds from config; 0 = never)
    #[arg(long, value_name = "SECONDS")]
    lock_timeout: Option<u64>,
}

/// Every pipeline outcome returns `Ok` and exits 0; only I/O and config
/// failures surface as errors.
pub fn run(root: &Path, args: SendContactArgs, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;

    let lock = FileRunLock::new(
        root,
        args.lock_timeout.unwrap_or(config.lock.timeout_seconds),
    );
    let resolver = FileResolver::new(root);
    let local = LocalIntegration::from_config(root, &config);
    let integration = local.as_ref().map(|i| i as &dyn Integration);

    let options = DispatchOptions {
        client: args.client,
        contact: args.contact,
        test: args.test,
        force: args.force,
        verbose: args.verbose,
    };

    let report = DispatchCommand::new(&lock, &resolver, integration)
        .run(&options)
        .context("send-contact failed")?;

    if json {
        print_json(&report)?;
    } else {
        print_report(&report.lines);
    }
    Ok(())
}
