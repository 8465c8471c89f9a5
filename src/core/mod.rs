//! Generation stages, persistence, mood interpretation and runtime glue.

pub mod audio;
pub mod collectibles;
pub mod collision;
pub mod decoration;
pub mod floating;
pub mod interpret;
pub mod markers;
pub mod pipeline;
pub mod profile;
pub mod session;
pub mod store;
pub mod terrain;
