pub mod block;
pub mod checkpoint;
pub mod primitives;
pub mod response;
pub mod slot;
pub mod status;
pub mod upstream;
