//! Heuristic outline extraction.
//!
//! Builds a flat outline from markdown headings, or from leading paragraphs
//! when the document has none. Deterministic; no provider involved.

use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Maximum number of heading nodes extracted.
const MAX_HEADING_NODES: usize = 24;

/// Maximum number of fallback paragraph nodes.
const MAX_PARAGRAPH_NODES: usize = 3;

/// Output language hint; affects fallback title truncation only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    En,
    #[default]
    Zh,
}

/// One outline node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutlineNode {
    pub title: String,
    pub detail: String,
    /// Nesting depth, clamped to 1..=3.
    pub depth: usize,
}

static HEADING_REGEX: OnceLock<regex::Regex> = OnceLock::new();

fn heading_regex() -> &'static regex::Regex {
    HEADING_REGEX.get_or_init(|| {
        regex::Regex::new(r"(?m)^(#{1,6})\s+(.+?)\s*$")
            .expect("Invalid regex pattern - this is a compile-time constant")
    })
}

/// Extract an outline from document content.
pub fn extract_outline(content: &str, lang: Lang) -> Vec<OutlineNode> {
    let text = content.trim();
    if text.is_empty() {
        return Vec::new();
    }

    let headings: Vec<_> = heading_regex().captures_iter(text).collect();
    if !headings.is_empty() {
        let spans: Vec<(usize, usize, String)> = headings
            .iter()
            .take(MAX_HEADING_NODES)
            .map(|c| {
                let m = c.get(0).expect("capture 0 always exists");
                (c[1].len(), m.end(), c[2].trim().to_string())
            })
            .collect();

        return spans
            .iter()
            .enumerate()
            .map(|(idx, (level, body_start, title))| {
                let body_end = headings
                    .get(idx + 1)
                    .and_then(|c| c.get(0))
                    .map(|m| m.start())
                    .unwrap_or(text.len());
                let body = &text[*body_start..body_end];
                OutlineNode {
                    title: title.clone(),
                    detail: first_paragraph_summary(body, 140),
                    depth: (*level).min(3),
                }
            })
            .collect();
    }

    // No headings: summarize the leading paragraphs instead.
    text.split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .take(MAX_PARAGRAPH_NODES)
        .map(|p| {
            let one_line = collapse_whitespace(p);
            let cutoff = match lang {
                Lang::Zh if one_line.chars().count() > 12 => Some(12),
                Lang::En if one_line.chars().count() > 18 => Some(18),
                _ => None,
            };
            let title = match cutoff {
                Some(n) => format!("{}…", one_line.chars().take(n).collect::<String>()),
                None => one_line.clone(),
            };
            OutlineNode {
                title,
                detail: one_line.chars().take(160).collect(),
                depth: 1,
            }
        })
        .collect()
}

fn first_paragraph_summary(body: &str, limit: usize) -> String {
    body.split("\n\n")
        .map(str::trim)
        .find(|p| !p.is_empty())
        .map(|p| collapse_whitespace(p).chars().take(limit).collect())
        .unwrap_or_default()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_content_yields_no_nodes() {
        assert!(extract_outline("", Lang::En).is_empty());
        assert!(extract_outline("   \n\n  ", Lang::Zh).is_empty());
    }

    #[test]
    fn test_headings_become_nodes_with_details() {
        let content = "# Intro\n\nOpening paragraph here.\n\n## Depth two\n\nMore text.\n";
        let nodes = extract_outline(content, Lang::En);

        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].title, "Intro");
        assert_eq!(nodes[0].detail, "Opening paragraph here.");
        assert_eq!(nodes[0].depth, 1);
        assert_eq!(nodes[1].title, "Depth two");
        assert_eq!(nodes[1].depth, 2);
    }

    #[test]
    fn test_depth_is_clamped_to_three() {
        let nodes = extract_outline("##### Deep heading\n", Lang::En);
        assert_eq!(nodes[0].depth, 3);
    }

    #[test]
    fn test_detail_is_collapsed_and_truncated() {
        let body = format!("# H\n\n{}\n", "word ".repeat(60));
        let nodes = extract_outline(&body, Lang::En);
        assert!(!nodes[0].detail.contains('\n'));
        assert!(nodes[0].detail.chars().count() <= 140);
    }

    #[test]
    fn test_paragraph_fallback_without_headings() {
        let content = "First paragraph with a reasonably long opening line.\n\nSecond one.\n\nThird one.\n\nFourth is ignored.";
        let nodes = extract_outline(content, Lang::En);

        assert_eq!(nodes.len(), 3);
        assert!(nodes[0].title.ends_with('…'));
        assert_eq!(nodes[0].title.chars().count(), 19);
        assert!(nodes.iter().all(|n| n.depth == 1));
    }

    #[test]
    fn test_zh_fallback_uses_shorter_titles() {
        let content = "这是一个没有标题的很长的段落内容示例文本。";
        let nodes = extract_outline(content, Lang::Zh);
        assert_eq!(nodes[0].title.chars().count(), 13);
    }

    #[test]
    fn test_heading_node_cap() {
        let content: String = (0..40).map(|i| format!("# H{i}\n\n")).collect();
        let nodes = extract_outline(&content, Lang::En);
        assert_eq!(nodes.len(), 24);
    }
}
