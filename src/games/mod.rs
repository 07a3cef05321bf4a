//! Reference integrations built on the session components.

pub mod duel;
