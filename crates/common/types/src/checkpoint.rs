use serde::{Deserialize, Serialize};

use crate::primitives::Epoch;

/// A finality checkpoint. The epoch travels as a quoted decimal string.
#[derive(Debug, Eq, Hash, PartialEq, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    #[serde(with = "serde_utils::quoted_u64")]
    pub epoch: Epoch,
    pub root: String,
}

#[derive(Debug, Default, Eq, PartialEq, Clone, Serialize, Deserialize)]
pub struct Finality {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finalized: Option<Checkpoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_justified: Option<Checkpoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_justified: Option<Checkpoint>,
}
