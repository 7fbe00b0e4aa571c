pub mod commands;

pub use commands::{ip, map, mods};
