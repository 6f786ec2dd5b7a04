use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::{checkpoint::Finality, upstream::Upstream};

#[derive(Debug, Eq, PartialEq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperatingMode {
    Light,
    Full,
}

impl OperatingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperatingMode::Light => "light",
            OperatingMode::Full => "full",
        }
    }
}

#[derive(Debug, Default, Eq, PartialEq, Clone, Serialize, Deserialize)]
pub struct Version {
    #[serde(default)]
    pub full: Option<String>,
    #[serde(default)]
    pub short: Option<String>,
    #[serde(default)]
    pub release: Option<String>,
    #[serde(default)]
    pub git_commit: Option<String>,
}

/// Global snapshot served by `/checkpointz/v1/status`.
#[derive(Debug, Default, PartialEq, Clone, Serialize, Deserialize)]
pub struct Status {
    #[serde(default, deserialize_with = "null_as_default")]
    pub upstreams: BTreeMap<String, Upstream>,
    #[serde(default)]
    pub finality: Option<Finality>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand_image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operating_mode: Option<OperatingMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<Version>,
}

impl Status {
    pub fn upstreams(&self) -> impl Iterator<Item = &Upstream> {
        self.upstreams.values()
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
