use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::primitives::{Slot, ValidatorIndex};

#[derive(Debug, Eq, Hash, PartialEq, Clone, Copy, PartialOrd, Ord)]
pub enum ForkName {
    Phase0,
    Altair,
    Bellatrix,
    Capella,
    Deneb,
    Electra,
}

impl ForkName {
    pub const ALL: [ForkName; 6] = [
        ForkName::Phase0,
        ForkName::Altair,
        ForkName::Bellatrix,
        ForkName::Capella,
        ForkName::Deneb,
        ForkName::Electra,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ForkName::Phase0 => "PHASE0",
            ForkName::Altair => "ALTAIR",
            ForkName::Bellatrix => "BELLATRIX",
            ForkName::Capella => "CAPELLA",
            ForkName::Deneb => "DENEB",
            ForkName::Electra => "ELECTRA",
        }
    }

    /// Blocks from the merge onwards carry an execution payload instead of
    /// relying on the eth1 data vote for the block hash.
    pub fn has_execution_payload(&self) -> bool {
        *self >= ForkName::Bellatrix
    }
}

impl fmt::Display for ForkName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ForkName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ForkName::ALL
            .into_iter()
            .find(|fork| fork.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown fork version: {s}"))
    }
}

impl Serialize for ForkName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ForkName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Default, Eq, PartialEq, Clone, Serialize, Deserialize)]
pub struct Eth1Data {
    #[serde(default)]
    pub block_hash: Option<String>,
}

#[derive(Debug, Default, Eq, PartialEq, Clone, Serialize, Deserialize)]
pub struct ExecutionPayloadSummary {
    #[serde(default)]
    pub block_hash: Option<String>,
    #[serde(default)]
    pub block_number: Option<String>,
}

#[derive(Debug, Eq, PartialEq, Clone, Serialize, Deserialize)]
pub struct BlockBody {
    pub randao_reveal: String,

    /// Eth1 data vote
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eth1_data: Option<Eth1Data>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_payload: Option<ExecutionPayloadSummary>,

    /// Arbitrary data
    pub graffiti: String,
}

#[derive(Debug, Eq, PartialEq, Clone, Serialize, Deserialize)]
pub struct BlockMessage {
    #[serde(with = "serde_utils::quoted_u64")]
    pub slot: Slot,
    #[serde(with = "serde_utils::quoted_u64")]
    pub proposer_index: ValidatorIndex,
    pub parent_root: String,
    pub state_root: String,
    pub body: BlockBody,
}

#[derive(Debug, Eq, PartialEq, Clone, Serialize, Deserialize)]
pub struct SignedBlock {
    pub message: BlockMessage,
    pub signature: String,
}

/// A signed block tagged with the fork it was produced under.
#[derive(Debug, Eq, PartialEq, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawVersionedBlock", into = "RawVersionedBlock")]
pub enum VersionedBlock {
    Phase0(SignedBlock),
    Altair(SignedBlock),
    Bellatrix(SignedBlock),
    Capella(SignedBlock),
    Deneb(SignedBlock),
    Electra(SignedBlock),
}

impl VersionedBlock {
    pub fn new(fork: ForkName, block: SignedBlock) -> Self {
        match fork {
            ForkName::Phase0 => VersionedBlock::Phase0(block),
            ForkName::Altair => VersionedBlock::Altair(block),
            ForkName::Bellatrix => VersionedBlock::Bellatrix(block),
            ForkName::Capella => VersionedBlock::Capella(block),
            ForkName::Deneb => VersionedBlock::Deneb(block),
            ForkName::Electra => VersionedBlock::Electra(block),
        }
    }

    pub fn fork_name(&self) -> ForkName {
        match self {
            VersionedBlock::Phase0(_) => ForkName::Phase0,
            VersionedBlock::Altair(_) => ForkName::Altair,
            VersionedBlock::Bellatrix(_) => ForkName::Bellatrix,
            VersionedBlock::Capella(_) => ForkName::Capella,
            VersionedBlock::Deneb(_) => ForkName::Deneb,
            VersionedBlock::Electra(_) => ForkName::Electra,
        }
    }

    pub fn signed_block(&self) -> &SignedBlock {
        match self {
            VersionedBlock::Phase0(block)
            | VersionedBlock::Altair(block)
            | VersionedBlock::Bellatrix(block)
            | VersionedBlock::Capella(block)
            | VersionedBlock::Deneb(block)
            | VersionedBlock::Electra(block) => block,
        }
    }

    pub fn block_hash(&self) -> Option<&str> {
        let body = &self.signed_block().message.body;
        if self.fork_name().has_execution_payload() {
            body.execution_payload.as_ref()?.block_hash.as_deref()
        } else {
            body.eth1_data.as_ref()?.block_hash.as_deref()
        }
    }
}

/// Wire shape: the declared version plus one optional field per fork.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawVersionedBlock {
    #[serde(rename = "Version")]
    version: ForkName,
    #[serde(rename = "Phase0", default, skip_serializing_if = "Option::is_none")]
    phase0: Option<SignedBlock>,
    #[serde(rename = "Altair", default, skip_serializing_if = "Option::is_none")]
    altair: Option<SignedBlock>,
    #[serde(rename = "Bellatrix", default, skip_serializing_if = "Option::is_none")]
    bellatrix: Option<SignedBlock>,
    #[serde(rename = "Capella", default, skip_serializing_if = "Option::is_none")]
    capella: Option<SignedBlock>,
    #[serde(rename = "Deneb", default, skip_serializing_if = "Option::is_none")]
    deneb: Option<SignedBlock>,
    #[serde(rename = "Electra", default, skip_serializing_if = "Option::is_none")]
    electra: Option<SignedBlock>,
}

impl TryFrom<RawVersionedBlock> for VersionedBlock {
    type Error = String;

    fn try_from(raw: RawVersionedBlock) -> Result<Self, Self::Error> {
        let block = match raw.version {
            ForkName::Phase0 => raw.phase0,
            ForkName::Altair => raw.altair,
            ForkName::Bellatrix => raw.bellatrix,
            ForkName::Capella => raw.capella,
            ForkName::Deneb => raw.deneb,
            ForkName::Electra => raw.electra,
        };
        block
            .map(|block| VersionedBlock::new(raw.version, block))
            .ok_or_else(|| format!("block for version {} is missing", raw.version))
    }
}

impl From<VersionedBlock> for RawVersionedBlock {
    fn from(block: VersionedBlock) -> Self {
        let version = block.fork_name();
        let mut raw = RawVersionedBlock {
            version,
            phase0: None,
            altair: None,
            bellatrix: None,
            capella: None,
            deneb: None,
            electra: None,
        };
        let signed = match block {
            VersionedBlock::Phase0(b)
            | VersionedBlock::Altair(b)
            | VersionedBlock::Bellatrix(b)
            | VersionedBlock::Capella(b)
            | VersionedBlock::Deneb(b)
            | VersionedBlock::Electra(b) => b,
        };
        let slot = match version {
            ForkName::Phase0 => &mut raw.phase0,
            ForkName::Altair => &mut raw.altair,
            ForkName::Bellatrix => &mut raw.bellatrix,
            ForkName::Capella => &mut raw.capella,
            ForkName::Deneb => &mut raw.deneb,
            ForkName::Electra => &mut raw.electra,
        };
        *slot = Some(signed);
        raw
    }
}
