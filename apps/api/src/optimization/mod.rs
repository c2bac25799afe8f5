// Resume optimization: upload → extract → analyze → optimize → render.
// Stages are plain async functions; `pipeline` sequences them per session
// and `queue` decides when a session runs.

pub mod analyzer;
pub mod extractor;
pub mod handlers;
pub mod optimizer;
pub mod outcome;
pub mod pipeline;
pub mod prompts;
pub mod queue;

pub use pipeline::Pipeline;
pub use queue::{recover_interrupted, JobQueue};
