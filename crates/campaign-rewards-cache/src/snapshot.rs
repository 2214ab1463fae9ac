/// Lifecycle of a cache entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStatus {
    Idle,
    Fetching,
    Fetched,
    Failed,
}

/// Point-in-time view of one cache entry
///
/// A failed refresh keeps the last good `data` alongside the error.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<V> {
    pub data: Option<V>,
    pub status: FetchStatus,
    pub error: Option<String>,
}

impl<V> Snapshot<V> {
    pub fn idle() -> Self {
        Self {
            data: None,
            status: FetchStatus::Idle,
            error: None,
        }
    }

    /// True until the entry has resolved successfully
    pub fn is_loading(&self) -> bool {
        self.status != FetchStatus::Fetched
    }

    pub fn is_error(&self) -> bool {
        self.status == FetchStatus::Failed
    }

    pub fn is_fetching(&self) -> bool {
        self.status == FetchStatus::Fetching
    }
}
