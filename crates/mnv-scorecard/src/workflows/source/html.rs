use std::sync::OnceLock;

use regex::Regex;

/// Characters kept from a fetched page before the `...` marker is appended.
pub const MAX_TEXT_CHARS: usize = 8000;

const STRIPPED_BLOCKS: [&str; 5] = ["script", "style", "nav", "footer", "header"];

const ENTITIES: [(&str, &str); 6] = [
    ("&nbsp;", " "),
    ("&amp;", "&"),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#39;", "'"),
];

struct Patterns {
    blocks: Vec<Regex>,
    tag: Regex,
    whitespace: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        blocks: STRIPPED_BLOCKS
            .iter()
            .map(|name| {
                Regex::new(&format!(r"(?is)<{name}.*?</{name}>")).expect("block pattern compiles")
            })
            .collect(),
        tag: Regex::new(r"<[^>]+>").expect("tag pattern compiles"),
        whitespace: Regex::new(r"\s+").expect("whitespace pattern compiles"),
    })
}

/// Reduces an HTML document to readable plain text.
pub fn page_text(html: &str) -> String {
    let patterns = patterns();

    let mut text = html.to_string();
    for block in &patterns.blocks {
        text = block.replace_all(&text, "").into_owned();
    }
    text = patterns.tag.replace_all(&text, " ").into_owned();
    // &amp; is decoded in list order, so "&amp;lt;" becomes "&lt;" and then "<".
    for (entity, replacement) in ENTITIES {
        text = text.replace(entity, replacement);
    }

    let collapsed = patterns.whitespace.replace_all(&text, " ");
    truncate(collapsed.trim())
}

fn truncate(text: &str) -> String {
    match text.char_indices().nth(MAX_TEXT_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
