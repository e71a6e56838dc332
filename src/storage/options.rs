/// Configuration options supplied when opening a [`super::FileStore`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct StoreOptions {
    /// Whether every store call is followed by a sync of the medium
    pub sync_on_store: bool,
    /// Whether a missing record file is created on open
    pub create_if_missing: bool,
}

impl StoreOptions {
    /// Creates StoreOptions with default settings.
    pub fn new() -> Self {
        Self {
            sync_on_store: false,
            create_if_missing: true,
        }
    }

    /// Enables or disables syncing after each store.
    pub fn sync_on_store(mut self, enabled: bool) -> Self {
        self.sync_on_store = enabled;
        self
    }

    /// Sets whether opening creates a missing file.
    pub fn create_if_missing(mut self, enabled: bool) -> Self {
        self.create_if_missing = enabled;
        self
    }
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self::new()
    }
}
