use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const DATA_DIR: &str = ".contactclient";
pub const CLIENTS_DIR: &str = ".contactclient/clients";
pub const CONTACTS_DIR: &str = ".contactclient/contacts";
pub const LOCKS_DIR: &str = ".contactclient/locks";
pub const OUTBOX_DIR: &str = ".contactclient/outbox";

pub const CONFIG_FILE: &str = ".contactclient/config.yaml";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn data_dir(root: &Path) -> PathBuf {
    root.join(DATA_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn client_record(root: &Path, id: u64) -> PathBuf {
    root.join(CLIENTS_DIR).join(format!("{id}.yaml"))
}

pub fn contact_record(root: &Path, id: u64) -> PathBuf {
    root.join(CONTACTS_DIR).join(format!("{id}.yaml"))
}

pub fn locks_dir(root: &Path) -> PathBuf {
    root.join(LOCKS_DIR)
}

pub fn lock_marker(root: &Path, key: &str) -> PathBuf {
    locks_dir(root).join(format!("{key}.lock"))
}

/// Short-lived guard that serializes stale-marker reclaim for one key.
pub fn reclaim_guard(root: &Path, key: &str) -> PathBuf {
    locks_dir(root).join(format!("{key}.reclaim"))
}

pub fn outbox_dir(root: &Path, client_id: u64) -> PathBuf {
    root.join(OUTBOX_DIR).join(client_id.to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
