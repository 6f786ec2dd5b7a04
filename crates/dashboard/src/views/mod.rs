pub mod checkpoints;
pub mod footer;
pub mod header;
pub mod hero;
pub mod query;
pub mod slot;
pub mod upstreams;

pub use checkpoints::CheckpointsTable;
pub use footer::Footer;
pub use header::Header;
pub use hero::Hero;
pub use query::QueryView;
pub use slot::{GraffitiFormat, SlotView};
pub use upstreams::UpstreamTable;

pub const LOADING: &str = "Loading...";
pub const SOMETHING_WENT_WRONG: &str = "Something went wrong";
