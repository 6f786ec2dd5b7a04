use serde::{Deserialize, Serialize};

/// Envelope every Checkpointz endpoint wraps its payload in.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub data: T,
}
