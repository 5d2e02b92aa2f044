pub mod coordinator;
pub mod gather;
pub mod sanitize;
pub mod segment;

pub use coordinator::SynthesisCoordinator;
pub use gather::scatter_ordered;
pub use sanitize::{sanitize_for_tts, split_for_tts};
pub use segment::AudioSegment;
