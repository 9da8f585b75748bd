//! Deterministic instruction-keyed rewrite transforms.
//!
//! Pure functions over `(instruction, selected_text)`. The local provider
//! streams the result in fragments; keeping the transforms here, table
//! driven, makes them unit-testable and swappable without touching the
//! session orchestration.

use std::sync::OnceLock;

/// Vocabulary substitutions applied for colloquial rewrites.
const COLLOQUIAL_SUBSTITUTIONS: &[(&str, &str)] = &[
    ("therefore", "so"),
    ("in addition", "also"),
    ("however", "but"),
    ("moreover", "plus"),
    ("utilize", "use"),
    ("we need to", "we've got to"),
];

const COLLOQUIAL_KEYWORDS: &[&str] = &["colloquial", "casual", "conversational"];
const EXPAND_KEYWORDS: &[&str] = &["expand", "lengthen", "elaborate"];
const CONDENSE_KEYWORDS: &[&str] = &["condense", "shorten", "compress", "tighten"];
const TITLE_KEYWORDS: &[&str] = &["title", "headline"];

/// Filler appended when expanding toward a character target.
const EXPANSION_FILLER: &str = "Think of it as scaffolding first, substance second: \
state the point plainly, then back it with an example, a contrast, and one \
conclusion the reader can act on.";

static TARGET_REGEX: OnceLock<regex::Regex> = OnceLock::new();

fn target_regex() -> &'static regex::Regex {
    TARGET_REGEX.get_or_init(|| {
        regex::Regex::new(r"(\d+)\s*(?:chars?|characters|words?)")
            .expect("Invalid regex pattern - this is a compile-time constant")
    })
}

static PUNCTUATION_REGEX: OnceLock<regex::Regex> = OnceLock::new();

fn punctuation_regex() -> &'static regex::Regex {
    PUNCTUATION_REGEX.get_or_init(|| {
        regex::Regex::new(r#"[,.!?;:'"“”‘’，。！？；：]+"#)
            .expect("Invalid regex pattern - this is a compile-time constant")
    })
}

/// Apply the transform selected by `instruction` to `selected`.
///
/// Deterministic: identical inputs always produce identical output. Unknown
/// instructions return the selection unchanged (after trimming surrounding
/// newlines), which still exercises the full streaming protocol.
pub fn rewrite(instruction: &str, selected: &str) -> String {
    let text = selected.trim_matches('\n');
    if text.is_empty() {
        return String::new();
    }

    let instruction_lc = instruction.to_lowercase();
    let mut text = text.to_string();

    if has_any(&instruction_lc, COLLOQUIAL_KEYWORDS) {
        text = colloquialize(&text);
    }

    if let Some(target) = expansion_target(&instruction_lc, text.chars().count()) {
        return expand(&text, target);
    }

    if has_any(&instruction_lc, CONDENSE_KEYWORDS) {
        return condense(&text);
    }

    if has_any(&instruction_lc, TITLE_KEYWORDS) {
        return title(&text);
    }

    text
}

fn has_any(instruction: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| instruction.contains(k))
}

fn colloquialize(text: &str) -> String {
    let mut out = text.to_string();
    for (formal, casual) in COLLOQUIAL_SUBSTITUTIONS {
        out = out.replace(formal, casual);
    }
    out
}

/// An explicit "N chars" target, or a default when the instruction asks to
/// expand without one.
fn expansion_target(instruction: &str, current_len: usize) -> Option<usize> {
    if let Some(captures) = target_regex().captures(instruction) {
        if let Ok(target) = captures[1].parse::<usize>() {
            return Some(target);
        }
    }
    if has_any(instruction, EXPAND_KEYWORDS) {
        return Some(std::cmp::max(200, current_len + 120));
    }
    None
}

fn expand(text: &str, target: usize) -> String {
    let mut out = text.to_string();
    while out.chars().count() < target {
        out.push_str("\n\n");
        out.push_str(EXPANSION_FILLER);
    }
    out.trim_matches('\n').to_string()
}

fn condense(text: &str) -> String {
    let joined = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    let keep = std::cmp::max(50, joined.chars().count() * 65 / 100);
    joined.chars().take(keep).collect()
}

fn title(text: &str) -> String {
    let core = punctuation_regex().replace_all(text, "");
    let core: String = core.chars().take(24).collect();
    format!("{core}: at a glance")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_colloquial_substitutes_vocabulary() {
        let out = rewrite("make it colloquial", "therefore we need to act; however, wait");
        assert_eq!(out, "so we've got to act; but, wait");
    }

    #[test]
    fn test_expand_reaches_character_target() {
        let out = rewrite("expand to 200 chars", "short seed text");
        assert!(out.chars().count() >= 200);
        assert!(out.starts_with("short seed text"));
    }

    #[test]
    fn test_expand_without_target_uses_default() {
        let out = rewrite("please expand this", "tiny");
        assert!(out.chars().count() >= 200);
    }

    #[test]
    fn test_condense_collapses_and_truncates() {
        let long: String = "word ".repeat(60);
        let input = format!("{long}\n\n{long}");
        let out = rewrite("condense this paragraph", &input);
        assert!(!out.contains('\n'));
        assert!(out.chars().count() < input.chars().count());
    }

    #[test]
    fn test_condense_keeps_short_text_floor() {
        let out = rewrite("shorten", "one two three");
        // Below the 50-char floor nothing is cut.
        assert_eq!(out, "one two three");
    }

    #[test]
    fn test_title_strips_punctuation_and_templates() {
        let out = rewrite("write a title", "Hello, world! This is a long opening sentence.");
        assert!(out.ends_with(": at a glance"));
        assert!(!out.trim_end_matches(": at a glance").contains(','));
        assert!(out.trim_end_matches(": at a glance").chars().count() <= 24);
    }

    #[test]
    fn test_unknown_instruction_is_identity() {
        assert_eq!(rewrite("reorder the logic", "keep me intact"), "keep me intact");
    }

    #[test]
    fn test_empty_selection_yields_empty() {
        assert_eq!(rewrite("expand", "\n\n"), "");
    }

    #[test]
    fn test_deterministic() {
        let a = rewrite("expand to 300 chars", "seed");
        let b = rewrite("expand to 300 chars", "seed");
        assert_eq!(a, b);
    }
}
