// ABOUTME: The artifact generators the router dispatches to.
// ABOUTME: Each owns its gateway and parameters and returns Result<GenerationResult, GenerationError>.

pub mod chat;
pub mod feature;
pub mod script;
pub mod testcase;

pub use chat::ChatGenerator;
pub use feature::FeatureGenerator;
pub use script::{ScriptGenerator, ScriptStyle};
pub use testcase::TestCaseGenerator;

/// Improvement guard: a revision replaces the prior draft only when it is
/// non-empty and at least half as long.
pub(crate) fn accept_revision(previous: &str, revised: &str) -> bool {
    let revised = revised.trim();
    !revised.is_empty() && revised.chars().count() * 2 >= previous.trim().chars().count()
}
