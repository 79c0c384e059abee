//! Fresh story generation with a hidden twist.

mod error;
mod generator;
pub mod parse;
pub mod prompt;
mod types;

#[cfg(test)]
mod tests;

pub use error::GenerationError;
pub use generator::StoryGenerator;
pub use types::{DEFAULT_GENRE, Difficulty, GeneratedStory, StoryRequest};
