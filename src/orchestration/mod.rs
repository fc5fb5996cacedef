pub mod pipeline;

pub use pipeline::{Pipeline, PipelineError, RunMode, RunReport};
