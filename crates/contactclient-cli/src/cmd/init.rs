use crate::output::print_json;
use anyhow::Context;
use contactclient_core::{config::Config, io, paths};
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    if !json {
        println!("Initializing contact client data in: {}", root.display());
    }

    let dirs = [
        paths::DATA_DIR,
        paths::CLIENTS_DIR,
        paths::CONTACTS_DIR,
        paths::LOCKS_DIR,
        paths::OUTBOX_DIR,
    ];
    for dir in dirs {
        let p = root.join(dir);
        io::ensure_dir(&p).with_context(|| format!("failed to create {}", p.display()))?;
    }

    let config_path = paths::config_path(root);
    let created = !config_path.exists();
    if created {
        Config::initial()
            .save(root)
            .context("failed to write config.yaml")?;
    }

    if json {
        print_json(&serde_json::json!({
            "root": root.display().to_string(),
            "config_created": created,
        }))?;
    } else if created {
        println!("  created: {}", paths::CONFIG_FILE);
    } else {
        println!("  exists:  {}", paths::CONFIG_FILE);
    }
    Ok(())
}
