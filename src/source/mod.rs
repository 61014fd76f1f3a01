// Frame source domain — depth frame types, source trait, and replay playback.

pub mod backend;
pub mod error;
pub mod replay;
pub mod types;
