//! Service trait seams implemented by the API layer.

pub mod push;

pub use push::{PushOutcome, PushService};
