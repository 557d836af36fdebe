//! Widget state for the tavern tabletop companion.
//!
//! Every widget is an owned object with pure transitions.  The host UI feeds
//! it clicks, text and clock ticks and renders whatever state it exposes;
//! nothing here touches a screen or a sound card directly.  Audio goes through
//! the [`backend::AudioBackend`] seam.

pub mod backend;
pub mod catalog;
pub mod dice;
pub mod hp_expr;
pub mod initiative;
pub mod manual;
pub mod mixer;
