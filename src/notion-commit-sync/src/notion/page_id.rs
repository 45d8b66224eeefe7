//! Notion page identifier extraction from free text.
//!
//! Notion URLs carry a human-readable title followed by a hyphen and a
//! compact identifier as their last path segment
//! (`notion.so/My-Task-Title-abc123` refers to page `abc123`). Taking the
//! token after the last hyphen recovers the identifier without knowing the
//! title's shape. Extraction runs as named stages so each is testable on
//! its own: find the first Notion URL, take the last path segment, take the
//! trailing hyphen-delimited token.

/// Host the extractor scans for.
const NOTION_HOST: &str = "notion.so";

/// Extracts the page identifier from the first Notion URL in `text`.
///
/// Returns `None` when the text contains no Notion URL. Later URLs are
/// ignored. The identifier is not validated beyond its position in the
/// URL; a dangling one surfaces when the page read fails.
pub fn extract_first_page_id(text: &str) -> Option<String> {
    let url = find_notion_url(text)?;
    let segment = last_path_segment(url)?;
    Some(trailing_token(segment).to_string())
}

/// Finds the first substring of the form `[http[s]://][www.]notion.so/<path>`
/// where `<path>` is a non-empty run of alphanumerics, hyphens and slashes.
///
/// The returned slice starts at the host; scheme and `www.` only matter for
/// deciding whether the host hit is genuine.
fn find_notion_url(text: &str) -> Option<&str> {
    // Offsets in the lowered copy line up with `text`: ASCII lowering is
    // byte-for-byte.
    let lowered = text.to_ascii_lowercase();
    let mut search_from = 0;

    while let Some(offset) = lowered[search_from..].find(NOTION_HOST) {
        let host_start = search_from + offset;
        let path_start = host_start + NOTION_HOST.len();

        if is_host_boundary(&lowered, host_start) {
            if let Some(path) = leading_path(&text[path_start..]) {
                return Some(&text[host_start..path_start + path.len()]);
            }
        }

        search_from = path_start;
    }

    None
}

/// Checks that the host hit at `host_start` is not the tail of a larger
/// hostname (`notnotion.so`, `foo.notion.so`). An optional `www.` and an
/// optional scheme may precede the host; anything else must be a non-URL
/// character.
fn is_host_boundary(lowered: &str, host_start: usize) -> bool {
    let mut before = &lowered[..host_start];
    if let Some(stripped) = before.strip_suffix("www.") {
        before = stripped;
    }
    if let Some(stripped) = before
        .strip_suffix("https://")
        .or_else(|| before.strip_suffix("http://"))
    {
        before = stripped;
    }
    match before.chars().last() {
        None => true,
        Some(c) => !(c.is_ascii_alphanumeric() || c == '-' || c == '.'),
    }
}

/// Returns the `/`-led run of path characters at the start of `rest`, or
/// `None` when the host is not followed by a path.
fn leading_path(rest: &str) -> Option<&str> {
    let tail = rest.strip_prefix('/')?;
    let len = tail
        .bytes()
        .take_while(|b| b.is_ascii_alphanumeric() || *b == b'-' || *b == b'/')
        .count();
    if len == 0 {
        return None;
    }
    Some(&rest[..len + 1])
}

/// Takes the final non-empty `/`-separated segment of a matched URL.
fn last_path_segment(url: &str) -> Option<&str> {
    let (_, path) = url.split_once('/')?;
    path.split('/').rev().find(|segment| !segment.is_empty())
}

/// Takes the token after the last hyphen. A hyphen-free segment is its own
/// token; that degenerate identifier is accepted as-is.
fn trailing_token(segment: &str) -> &str {
    match segment.rsplit_once('-') {
        Some((_, token)) => token,
        None => segment,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_none_without_notion_url() {
        assert_eq!(extract_first_page_id("Fixes a bug in the parser."), None);
        assert_eq!(extract_first_page_id(""), None);
    }

    #[test]
    fn extracts_id_with_scheme() {
        let id = extract_first_page_id("See https://notion.so/My-Task-Title-abc123def456");
        assert_eq!(id.as_deref(), Some("abc123def456"));
    }

    #[test]
    fn extracts_id_without_scheme() {
        let id = extract_first_page_id("See notion.so/My-Task-Title-abc123def456");
        assert_eq!(id.as_deref(), Some("abc123def456"));
    }

    #[test]
    fn extracts_id_with_www() {
        let id = extract_first_page_id("See www.notion.so/My-Task-Title-abc123def456");
        assert_eq!(id.as_deref(), Some("abc123def456"));

        let id = extract_first_page_id("See https://www.notion.so/My-Task-Title-abc123def456");
        assert_eq!(id.as_deref(), Some("abc123def456"));
    }

    #[test]
    fn host_match_is_case_insensitive() {
        let id = extract_first_page_id("See NOTION.SO/My-Task-abc123");
        assert_eq!(id.as_deref(), Some("abc123"));
    }

    #[test]
    fn first_url_wins() {
        let text = "notion.so/First-task-aaa111 and notion.so/Second-task-bbb222";
        assert_eq!(extract_first_page_id(text).as_deref(), Some("aaa111"));
    }

    #[test]
    fn hyphen_free_segment_is_the_identifier() {
        assert_eq!(
            extract_first_page_id("notion.so/abc123").as_deref(),
            Some("abc123")
        );
    }

    #[test]
    fn takes_last_segment_of_nested_path() {
        let id = extract_first_page_id("notion.so/workspace/My-Task-xyz987");
        assert_eq!(id.as_deref(), Some("xyz987"));
    }

    #[test]
    fn trailing_slash_is_ignored() {
        let id = extract_first_page_id("notion.so/My-Task-xyz987/");
        assert_eq!(id.as_deref(), Some("xyz987"));
    }

    #[test]
    fn stops_at_non_path_characters() {
        let id = extract_first_page_id("(see notion.so/Fix-bug-xyz987?pvs=4).");
        assert_eq!(id.as_deref(), Some("xyz987"));
    }

    #[test]
    fn rejects_host_embedded_in_larger_hostname() {
        assert_eq!(extract_first_page_id("see notnotion.so/Task-abc"), None);
        assert_eq!(extract_first_page_id("see foo.notion.so/Task-abc"), None);
    }

    #[test]
    fn rejects_host_without_path() {
        assert_eq!(extract_first_page_id("we track work in notion.so now"), None);
    }

    #[test]
    fn skips_bare_host_then_matches_later_url() {
        let text = "notion.so is down, use notion.so/Backup-task-ccc333";
        assert_eq!(extract_first_page_id(text).as_deref(), Some("ccc333"));
    }
}
