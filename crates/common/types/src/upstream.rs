use serde::{Deserialize, Serialize};

use crate::checkpoint::Finality;

/// An upstream beacon node and what it last reported.
#[derive(Debug, Eq, PartialEq, Clone, Serialize, Deserialize)]
pub struct Upstream {
    pub name: String,
    pub healthy: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finality: Option<Finality>,
}

impl Upstream {
    pub fn health_label(&self) -> &'static str {
        if self.healthy {
            "healthy"
        } else {
            "unhealthy"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_minimal() {
        let upstream: Upstream =
            serde_json::from_str(r#"{"name":"lighthouse-1","healthy":false}"#).unwrap();

        assert_eq!(upstream.health_label(), "unhealthy");
        assert!(upstream.network_name.is_none());
        assert!(upstream.finality.is_none());
    }
}
