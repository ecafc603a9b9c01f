pub mod cleanup;
pub mod context;
pub mod document;
pub mod fallback;
pub mod fusion;
pub mod prompt;
pub mod scenario;
pub mod terms;

pub use cleanup::{CleanupRules, ResponseCleaner};
pub use context::{ComplianceContext, assemble};
pub use document::{ConversationTurn, Role, ScoredDocument, SearchScope, TermDefinition};
pub use fallback::{FallbackOutcome, ScopeFallback};
pub use fusion::{DEFAULT_K, fuse, fuse_multi_source};
pub use prompt::{PromptInput, PromptSelector};
pub use scenario::Scenario;
pub use terms::{TermExtractor, TermRules};
