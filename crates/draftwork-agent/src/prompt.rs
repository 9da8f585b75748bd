//! Rewrite prompt construction.
//!
//! The local provider recovers the instruction and selection from this
//! exact layout, so the format is part of the provider contract.

/// System instruction for the rewrite agent.
pub const SYSTEM_PROMPT: &str = "You are draftwork's rewrite agent. Your task is to rewrite \
only the text the user selected and leave everything else untouched. Output must be the \
rewritten selected text itself: no explanations, no surrounding quotes, no code fences. \
Preserve the language, punctuation style and natural line breaks of the original.";

/// Build the user prompt for one rewrite.
pub fn build_user_prompt(instruction: &str, selected: &str) -> String {
    format!(
        "Instruction: {instruction}\n\nSelected text:\n```text\n{selected}\n```\n\nRewrite the selected text:"
    )
}
