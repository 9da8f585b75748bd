//! Markdown to platform HTML rendering.

use pulldown_cmark::{html, Options, Parser};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Publishing platforms with dedicated export styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Wechat,
    Zhihu,
    Xiaohongshu,
}

impl Platform {
    pub fn id(&self) -> &'static str {
        match self {
            Platform::Wechat => "wechat",
            Platform::Zhihu => "zhihu",
            Platform::Xiaohongshu => "xiaohongshu",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Platform::Wechat => "WeChat",
            Platform::Zhihu => "Zhihu",
            Platform::Xiaohongshu => "XHS",
        }
    }

    fn css(&self) -> &'static str {
        match self {
            Platform::Wechat => {
                "article.dw--wechat { max-width: 578px; font-size: 16px; line-height: 1.8; }"
            }
            Platform::Zhihu => {
                "article.dw--zhihu { max-width: 690px; font-size: 15px; line-height: 1.7; }"
            }
            Platform::Xiaohongshu => {
                "article.dw--xiaohongshu { max-width: 420px; font-size: 17px; line-height: 1.6; }"
            }
        }
    }
}

const BASE_CSS: &str = "body { margin: 0; padding: 24px; font-family: -apple-system, sans-serif; } \
article.dw { word-break: break-word; } \
article.dw h1, article.dw h2, article.dw h3 { line-height: 1.4; } \
article.dw pre { overflow-x: auto; padding: 12px; background: #f6f6f6; }";

/// Platform descriptor for the listing endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct PlatformInfo {
    pub id: &'static str,
    pub name: &'static str,
}

/// List all supported export platforms.
pub fn list_platforms() -> Vec<PlatformInfo> {
    [Platform::Wechat, Platform::Zhihu, Platform::Xiaohongshu]
        .iter()
        .map(|p| PlatformInfo {
            id: p.id(),
            name: p.name(),
        })
        .collect()
}

/// Render markdown content to a self-contained HTML page for a platform.
///
/// Returns the HTML plus non-fatal lint warnings about the source markdown.
pub fn render_platform_html(
    content: &str,
    platform: Platform,
    title: Option<&str>,
) -> (String, Vec<String>) {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_FOOTNOTES);

    let parser = Parser::new_ext(content, options);
    let mut body_html = String::new();
    html::push_html(&mut body_html, parser);

    let warnings = lint_markdown(content);

    let safe_title: String = title
        .unwrap_or("draftwork export")
        .trim()
        .chars()
        .take(80)
        .collect();

    let css = format!("{BASE_CSS}\n{}", platform.css());
    let page = format!(
        "<!doctype html>\n<html lang=\"zh-CN\">\n<head>\n  <meta charset=\"utf-8\" />\n  \
<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\" />\n  \
<title>{}</title>\n  <style>{css}</style>\n</head>\n<body>\n  \
<article class=\"dw dw--{}\">\n    {body_html}\n  </article>\n</body>\n</html>\n",
        escape_html(&safe_title),
        platform.id(),
    );

    (page, warnings)
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

static HEADING_REGEX: OnceLock<regex::Regex> = OnceLock::new();

fn heading_regex() -> &'static regex::Regex {
    HEADING_REGEX.get_or_init(|| {
        regex::Regex::new(r"^(#{1,6})\s+.+")
            .expect("Invalid regex pattern - this is a compile-time constant")
    })
}

/// Longest paragraph (in non-whitespace characters) before a readability
/// warning fires.
const MAX_PARAGRAPH_CHARS: usize = 520;

/// Lint the markdown source for publishing problems.
///
/// Warnings are advisory; rendering always succeeds.
fn lint_markdown(content: &str) -> Vec<String> {
    let mut warnings = Vec::new();

    let levels: Vec<usize> = content
        .lines()
        .filter_map(|line| heading_regex().captures(line))
        .map(|c| c[1].len())
        .collect();
    for window in levels.windows(2) {
        if window[1] > window[0] + 1 {
            warnings.push(format!(
                "Heading level jumps: avoid jumping from H{} to H{}",
                window[0], window[1]
            ));
            break;
        }
    }

    for paragraph in content.split("\n\n") {
        let plain: String = paragraph.chars().filter(|c| !c.is_whitespace()).collect();
        if plain.chars().count() > MAX_PARAGRAPH_CHARS {
            warnings
                .push("Paragraph too long: consider splitting for readability".to_string());
            break;
        }
    }

    if content.contains("TODO") {
        warnings.push("TODO found: remove placeholders before publishing".to_string());
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renders_markdown_body() {
        let (html, warnings) =
            render_platform_html("# Title\n\nSome **bold** text.", Platform::Wechat, None);
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<strong>bold</strong>"));
        assert!(html.contains("dw--wechat"));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_title_is_escaped_and_truncated() {
        let long_title = format!("<script>{}", "x".repeat(100));
        let (html, _) = render_platform_html("body", Platform::Zhihu, Some(&long_title));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_heading_jump_warning() {
        let (_, warnings) =
            render_platform_html("# One\n\n### Three\n", Platform::Wechat, None);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("H1 to H3"));
    }

    #[test]
    fn test_stepwise_headings_pass_lint() {
        let (_, warnings) =
            render_platform_html("# One\n\n## Two\n\n### Three\n", Platform::Wechat, None);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_long_paragraph_warning() {
        let long = "x".repeat(600);
        let (_, warnings) = render_platform_html(&long, Platform::Xiaohongshu, None);
        assert!(warnings.iter().any(|w| w.contains("Paragraph too long")));
    }

    #[test]
    fn test_todo_warning() {
        let (_, warnings) = render_platform_html("TODO: finish intro\n", Platform::Zhihu, None);
        assert!(warnings.iter().any(|w| w.contains("TODO found")));
    }

    #[test]
    fn test_list_platforms() {
        let platforms = list_platforms();
        let ids: Vec<&str> = platforms.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["wechat", "zhihu", "xiaohongshu"]);
    }

    #[test]
    fn test_platform_deserializes_from_lowercase_id() {
        let p: Platform = serde_json::from_str("\"wechat\"").unwrap();
        assert_eq!(p, Platform::Wechat);
    }
}
