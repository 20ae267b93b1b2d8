//! Outfitter search crate - template resolution, generation services, and
//! the per-query search orchestrator.
//!
//! Everything between "a user typed a question" and "here is the answer
//! plus the matched product" lives here.

pub mod generation;
pub mod orchestrator;
pub mod template;

pub use generation::{
    invoke_generation, DynGenerationService, GenerationService, MockGeneration,
    RemoteGenerationClient,
};
pub use orchestrator::SearchOrchestrator;
pub use template::{
    resolve_template, PromptParams, ResolvedTemplate, TemplateResolver, TemplateSource,
    INLINE_TEMPLATE, SEARCH_TEMPLATE_NAME,
};
