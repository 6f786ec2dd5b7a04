use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    block::VersionedBlock,
    primitives::{Epoch, Slot},
};

#[derive(Debug, Eq, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub struct SlotTime {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

/// One entry of the historical checkpoint list.
#[derive(Debug, Eq, PartialEq, Clone, Serialize, Deserialize)]
pub struct BeaconSlot {
    pub slot: Slot,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_root: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_root: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epoch: Option<Epoch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<SlotTime>,
}

#[derive(Debug, Default, Eq, PartialEq, Clone, Serialize, Deserialize)]
pub struct BeaconSlots {
    #[serde(default)]
    pub slots: Vec<BeaconSlot>,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct SlotDetail {
    #[serde(default)]
    pub block: Option<VersionedBlock>,
    #[serde(default)]
    pub epoch: Option<Epoch>,
    #[serde(default)]
    pub time: Option<SlotTime>,
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_beacon_slot() {
        let slot: BeaconSlot = serde_json::from_str(
            r#"{
                "slot": 529024,
                "block_root": "0x91e4f5129bc54f7284f1690e00803db360aeb63d34610d6995e1145bd01c0d92",
                "epoch": 16532,
                "time": {"start_time": "2022-06-01T12:00:00Z", "end_time": "2022-06-01T12:00:12Z"}
            }"#,
        )
        .unwrap();

        assert_eq!(slot.slot, 529024);
        assert_eq!(slot.epoch, Some(16532));
        assert!(slot.state_root.is_none());
        assert_eq!(
            slot.time.unwrap().start_time,
            Utc.with_ymd_and_hms(2022, 6, 1, 12, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_slot_detail_without_block() {
        let detail: SlotDetail = serde_json::from_str(r#"{"block":null,"epoch":3}"#).unwrap();

        assert!(detail.block.is_none());
        assert_eq!(detail.epoch, Some(3));
    }
}
