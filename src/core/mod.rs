pub mod client;
pub mod engine;
pub mod pipeline;

pub use client::{GeminiClient, ModelClient, DEFAULT_MODEL};
pub use engine::Engine;
pub use pipeline::{DocumentationPipeline, FenceMode, MalformedPolicy};
