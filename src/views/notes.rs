use std::collections::BTreeSet;

use crate::models::Note;

pub const PREVIEW_CHARS: usize = 150;

/// Case-insensitive match on title or content, narrowed to `tag` when given
pub fn filter_notes<'a>(notes: &'a [Note], search: &str, tag: Option<&str>) -> Vec<&'a Note> {
    let needle = search.trim().to_lowercase();
    notes
        .iter()
        .filter(|note| {
            needle.is_empty()
                || note.title.to_lowercase().contains(&needle)
                || note.content.to_lowercase().contains(&needle)
        })
        .filter(|note| tag.is_none_or(|tag| note.tags.contains(tag)))
        .collect()
}

/// Every tag used by any note, sorted
pub fn all_tags(notes: &[Note]) -> Vec<String> {
    notes
        .iter()
        .flat_map(|note| note.tags.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Drop anything between `<` and `>` and decode the few entities legacy notes use
pub fn strip_html(content: &str) -> String {
    let mut text = String::with_capacity(content.len());
    let mut in_tag = false;
    for c in content.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Notes written by the old web editor carry HTML markup
pub fn looks_like_html(content: &str) -> bool {
    ["</", "<br", "<p>", "<div", "<ul", "<li"].iter().any(|tag| content.contains(tag))
}

/// Content with legacy HTML removed. Markdown, including a bare `<`, is returned as is.
pub fn plain_text(content: &str) -> String {
    if looks_like_html(content) { strip_html(content) } else { content.to_string() }
}

/// Plain-text preview, cut to `PREVIEW_CHARS` characters with a trailing `...`
pub fn preview(content: &str) -> String {
    let plain = plain_text(content);
    if plain.chars().count() > PREVIEW_CHARS {
        let cut: String = plain.chars().take(PREVIEW_CHARS).collect();
        format!("{}...", cut)
    } else {
        plain
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::parse_tags;
    use chrono::Utc;

    fn note(id: i64, title: &str, content: &str, tags: &str) -> Note {
        let now = Utc::now();
        Note {
            id,
            title: title.to_string(),
            content: content.to_string(),
            tags: parse_tags(tags),
            created_at: now,
            updated_at: now,
        }
    }

    fn notes() -> Vec<Note> {
        vec![
            note(1, "Rust tips", "Use clippy", "dev, rust"),
            note(2, "Groceries", "<p>Buy RUST remover</p>", "home"),
            note(3, "Trip", "Pack bags", "travel, home"),
        ]
    }

    #[test]
    fn search_is_case_insensitive_over_title_and_content() {
        let notes = notes();
        let ids: Vec<i64> = filter_notes(&notes, "rust", None).iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(filter_notes(&notes, "  ", None).len(), 3);
    }

    #[test]
    fn tag_filter_narrows_search() {
        let notes = notes();
        let ids: Vec<i64> = filter_notes(&notes, "", Some("home")).iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![2, 3]);
        assert_eq!(filter_notes(&notes, "rust", Some("home")).len(), 1);
    }

    #[test]
    fn tags_are_merged_and_sorted() {
        assert_eq!(all_tags(&notes()), vec!["dev", "home", "rust", "travel"]);
    }

    #[test]
    fn preview_strips_markup_and_truncates() {
        assert_eq!(preview("<p>Hello <b>there</b> &amp; bye</p>"), "Hello there & bye");
        let long = "x".repeat(200);
        let shown = preview(&long);
        assert_eq!(shown.len(), PREVIEW_CHARS + 3);
        assert!(shown.ends_with("..."));
        assert_eq!(preview(&"y".repeat(PREVIEW_CHARS)), "y".repeat(PREVIEW_CHARS));
    }

    #[test]
    fn markdown_with_angle_brackets_is_not_stripped() {
        let content = "Remember: x < 3 retries, then escalate to on-call";
        assert!(!looks_like_html(content));
        assert_eq!(plain_text(content), content);
        assert_eq!(preview(content), content);
        assert_eq!(plain_text("<p>a &lt; b</p>"), "a < b");
    }
}
