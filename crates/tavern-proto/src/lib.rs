//! Types shared between the tavern daemon and the board widgets.

pub mod config;
pub mod platform;
pub mod protocol;
