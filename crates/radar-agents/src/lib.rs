pub mod analysis;
pub mod openai;
pub mod prompts;
pub mod providers;

pub use analysis::{ANALYSIS_FAILED, AnalysisError, AnalysisOrchestrator, AnalysisSettings};
pub use openai::OpenAiProvider;
pub use providers::{ChatMessage, ChatRole, LlmProvider, LlmRequest, LlmResponse, Usage};
