pub mod acquirer;
pub mod chunker;
pub mod types;

pub use acquirer::SourceAcquirer;
pub use chunker::split_text;
pub use types::{InputSource, SourceDocument, SourceOrigin};
