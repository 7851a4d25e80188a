// Audio segment extraction
//
// - Allocator: batch-unique ids for output file names
// - Extractor: one ffmpeg cut per match
// - Orchestrator: concurrent fan-out over all matches of a batch

pub mod allocator;
pub mod extractor;
pub mod orchestrator;

pub use allocator::*;
pub use extractor::*;
pub use orchestrator::*;
