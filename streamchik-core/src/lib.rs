//! Wire model shared by the relay server and the desktop client.

pub mod model;

pub use model::*;
