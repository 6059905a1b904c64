use std::collections::HashSet;

use tracing::debug;
use url::Url;

use crate::search::platform::display_host;
use crate::search::GroundingCitation;

/// Where a candidate link was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Citation,
    Text,
}

/// A link pulled out of the model reply, not yet filtered
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Exact string the link was found as; also the dedup key
    pub raw: String,
    pub url: Url,
    pub title: String,
    pub origin: Origin,
}

/// URL found in free text, with its markdown label when it had one
#[derive(Debug, Clone, PartialEq)]
pub struct TextLink {
    pub url: String,
    pub label: Option<String>,
}

const URL_TERMINATORS: &[char] = &[')', ']', '>', '<', '"', '\'', '`', '|', '{', '}'];
const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', '*'];

/// Merge grounding citations and links mined from `text` into one list.
///
/// Citations come first. The first occurrence of a URL string wins, title included.
pub fn collect_candidates(citations: &[GroundingCitation], text: &str) -> Vec<Candidate> {
    let mut seen = HashSet::new();
    let mut candidates = Vec::new();

    let from_citations = citations
        .iter()
        .map(|citation| (citation.uri.trim().to_string(), citation.title.clone(), Origin::Citation));
    let from_text = find_text_links(text)
        .into_iter()
        .map(|link| (link.url, link.label, Origin::Text));

    for (raw, title, origin) in from_citations.chain(from_text) {
        if raw.is_empty() || seen.contains(&raw) {
            continue;
        }
        let url = match Url::parse(&raw) {
            Ok(url) => url,
            Err(err) => {
                debug!(url = %raw, error = %err, "skipping unparseable link");
                continue;
            }
        };
        let title = title
            .map(|title| title.trim().to_string())
            .filter(|title| !title.is_empty())
            .unwrap_or_else(|| display_host(&url));
        seen.insert(raw.clone());
        candidates.push(Candidate {
            raw,
            url,
            title,
            origin,
        });
    }

    candidates
}

/// Find every http(s) URL in free text, in order of appearance
pub fn find_text_links(text: &str) -> Vec<TextLink> {
    let mut links = Vec::new();
    let mut consumed = 0;

    for (start, _) in text.match_indices("http") {
        if start < consumed {
            continue;
        }
        let rest = &text[start..];
        if !rest.starts_with("https://") && !rest.starts_with("http://") {
            continue;
        }
        let end = rest
            .char_indices()
            .find(|(_, ch)| ch.is_whitespace() || URL_TERMINATORS.contains(ch))
            .map(|(idx, _)| idx)
            .unwrap_or(rest.len());
        let url = rest[..end].trim_end_matches(TRAILING_PUNCTUATION);
        consumed = start + end;
        if url.len() <= "https://".len() {
            continue;
        }
        links.push(TextLink {
            url: url.to_string(),
            label: markdown_label(&text[..start]),
        });
    }

    links
}

/// Label of a `[label](` that ends right before a URL
fn markdown_label(before: &str) -> Option<String> {
    let before = before.strip_suffix("](")?;
    let open = before.rfind('[')?;
    let label = &before[open + 1..];
    if label.contains(']') || label.contains('\n') {
        return None;
    }
    let label = label.trim();
    (!label.is_empty()).then(|| label.to_string())
}
