//! Zenn-flavoured markdown to portable markdown.

use regex::{Captures, Regex};
use std::sync::LazyLock;

pub const DEFAULT_IMAGE_BASE_URL: &str =
    "https://raw.githubusercontent.com/shimo4228/zenn-content/main/images";

static IMAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"!\[([^\]]*)\]\(/images/([^)]+)\)").expect("valid image regex")
});

static MESSAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?ms)^:::message[ \t]*\n(.*?)\n^:::[ \t]*$")
        .expect("valid message regex")
});

static DETAILS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?ms)^:::details[ \t]+(.*?)[ \t]*\n(.*?)\n^:::[ \t]*$")
        .expect("valid details regex")
});

/// Rewrites Zenn-only syntax: `/images/...` links, `:::message` and `:::details` blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZennMarkup {
    image_base_url: String,
}

impl Default for ZennMarkup {
    fn default() -> Self {
        Self::new(DEFAULT_IMAGE_BASE_URL)
    }
}

impl ZennMarkup {
    pub fn new(image_base_url: impl Into<String>) -> Self {
        Self {
            image_base_url: image_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn translate(&self, content: &str) -> String {
        let content = IMAGE_RE.replace_all(content, |caps: &Captures| {
            format!("![{}]({}/{})", &caps[1], self.image_base_url, &caps[2])
        });
        let content = MESSAGE_RE.replace_all(&content, |caps: &Captures| {
            caps[1]
                .trim()
                .lines()
                .map(|line| format!("> {line}"))
                .collect::<Vec<_>>()
                .join("\n")
        });
        DETAILS_RE
            .replace_all(&content, |caps: &Captures| {
                format!(
                    "<details><summary>{}</summary>\n\n{}\n\n</details>",
                    caps[1].trim(),
                    caps[2].trim()
                )
            })
            .into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrites_image_paths() {
        let out = ZennMarkup::new("https://cdn.example/img/").translate("![alt](/images/a.png)");
        assert_eq!(out, "![alt](https://cdn.example/img/a.png)");
    }

    #[test]
    fn message_becomes_blockquote() {
        let out = ZennMarkup::default().translate(":::message\nline one\nline two\n:::");
        assert_eq!(out, "> line one\n> line two");
    }

    #[test]
    fn details_becomes_html() {
        let out = ZennMarkup::default().translate("before\n:::details Click me\nhidden\n:::\nafter");
        assert_eq!(
            out,
            "before\n<details><summary>Click me</summary>\n\nhidden\n\n</details>\nafter"
        );
    }

    #[test]
    fn plain_markdown_is_untouched() {
        let text = "# Title\n\n![remote](https://x/y.png)\n";
        assert_eq!(ZennMarkup::default().translate(text), text);
    }
}
