use crate::client::Client;
use crate::contact::Contact;
use crate::error::Result;
use std::path::{Path, PathBuf};

/// Looks up clients and contacts by identifier.
///
/// `Ok(None)` is the ordinary not-found answer. `Err` means the store itself
/// could not be read.
pub trait EntityResolver {
    fn resolve_client(&self, id: u64) -> Result<Option<Client>>;
    fn resolve_contact(&self, id: u64) -> Result<Option<Contact>>;
}

/// Resolves records from the YAML files under `.contactclient/`.
#[derive(Debug, Clone)]
pub struct FileResolver {
    root: PathBuf,
}

impl FileResolver {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }
}

impl EntityResolver for FileResolver {
    fn resolve_client(&self, id: u64) -> Result<Option<Client>> {
        Client::load(&self.root, id)
    }

    fn resolve_contact(&self, id: u64) -> Result<Option<Contact>> {
        Contact::load(&self.root, id)
    }
}
