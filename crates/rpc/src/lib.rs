pub mod client;
pub mod error;

pub use client::{
    beacon_slot_path, CheckpointzClient, BEACON_SLOTS_PATH, DEFAULT_REQUEST_TIMEOUT, STATUS_PATH,
};
pub use error::RpcError;
