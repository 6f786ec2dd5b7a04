use std::{fmt, sync::Arc, time::Duration};

use tokio::time::Instant;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    /// No request has settled yet.
    #[default]
    Pending,
    Success,
    /// The latest request failed. Earlier data, if any, is still available.
    Error,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
    /// `None` fetches once per subscription.
    pub refetch_interval: Option<Duration>,
}

impl QueryOptions {
    pub fn once() -> Self {
        Self::default()
    }

    pub fn polling(interval: Duration) -> Self {
        Self {
            refetch_interval: Some(interval),
        }
    }
}

/// Snapshot of one query as seen by a subscriber.
pub struct QueryState<T> {
    pub status: QueryStatus,
    pub data: Option<Arc<T>>,
    pub error: Option<Arc<anyhow::Error>>,
    pub is_fetching: bool,
    pub data_updated_at: Option<Instant>,
}

impl<T> QueryState<T> {
    pub fn pending() -> Self {
        Self {
            status: QueryStatus::Pending,
            data: None,
            error: None,
            is_fetching: false,
            data_updated_at: None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.status == QueryStatus::Pending
    }

    pub fn is_success(&self) -> bool {
        self.status == QueryStatus::Success
    }

    pub fn is_error(&self) -> bool {
        self.status == QueryStatus::Error
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_deref()
    }
}

impl<T> Clone for QueryState<T> {
    fn clone(&self) -> Self {
        Self {
            status: self.status,
            data: self.data.clone(),
            error: self.error.clone(),
            is_fetching: self.is_fetching,
            data_updated_at: self.data_updated_at,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for QueryState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryState")
            .field("status", &self.status)
            .field("data", &self.data)
            .field("error", &self.error.as_ref().map(|e| e.to_string()))
            .field("is_fetching", &self.is_fetching)
            .finish()
    }
}
