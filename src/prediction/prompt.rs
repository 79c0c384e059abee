//! Few-shot prompt construction.

use std::fmt::Write;

use crate::generation::{GenerationOptions, GenerationRequest, PromptTask};
use crate::index::RetrievalHit;

const SYSTEM_PREAMBLE: &str = "You are a plot twist prediction expert. \
Given a story setup, predict the most likely plot twist.";

/// Renders the prediction prompt with one `Example i` block per retrieved hit.
pub fn build_prompt(
    story_setup: &str,
    genre: Option<&str>,
    examples: &[RetrievalHit],
    count: usize,
) -> GenerationRequest {
    let mut system = String::from(SYSTEM_PREAMBLE);
    if !examples.is_empty() {
        system.push_str("\n\nHere are some examples of story setups and their twists:\n");
        for (i, hit) in examples.iter().enumerate() {
            // Writing to a String cannot fail.
            let _ = write!(
                system,
                "\nExample {}:\nSetup: {}\nTwist: {}\n",
                i + 1,
                hit.example.story_setup,
                hit.example.twist
            );
        }
    }

    let user = format!(
        "Now, predict {count} possible plot twists for this story:\n\n\
         Genre: {}\n\
         Setup: {story_setup}\n\n\
         Respond with exactly {count} numbered twists, one per line, like \"1. ...\".",
        genre.unwrap_or("unknown"),
    );

    GenerationRequest {
        system,
        user,
        options: GenerationOptions::PREDICT,
        task: PromptTask::PredictTwists { count },
    }
}
