pub mod client;
pub mod key;
pub mod state;

pub use client::{QueryClient, Subscription};
pub use key::QueryKey;
pub use state::{QueryOptions, QueryState, QueryStatus};
