use chrono::{DateTime, Utc};

use crate::models::{PropertyDetails, SearchResponse};

/// Render a search as a plain-text document: property header, summary, and the links
pub fn render(details: &PropertyDetails, response: &SearchResponse, generated_at: DateTime<Utc>) -> String {
    let header = format!("Property Videos: {}", details.display_address());
    let mut lines = vec![
        header.clone(),
        "=".repeat(header.chars().count()),
        format!("MLS Number: {}", details.mls_number.trim()),
        format!("Generated: {}", generated_at.format("%Y-%m-%d %H:%M UTC")),
        String::new(),
        "Summary".to_string(),
        "-------".to_string(),
    ];

    let summary = response.summary.trim();
    lines.push(if summary.is_empty() {
        "(no summary)".to_string()
    } else {
        summary.to_string()
    });
    lines.push(String::new());

    lines.push(format!("Links ({})", response.videos.len()));
    lines.push("-----".to_string());
    if !response.found {
        lines.push("No videos found for this property.".to_string());
    }
    for (i, video) in response.videos.iter().enumerate() {
        lines.push(format!("{}. {}", i + 1, video.title));
        lines.push(format!("   URL: {}", video.url));
        lines.push(format!("   Source: {}", video.source));
    }

    let mut doc = lines.join("\n");
    doc.push('\n');
    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VideoSearchResult;
    use chrono::TimeZone;

    fn details() -> PropertyDetails {
        PropertyDetails {
            street: "123 Maple Dr".to_string(),
            city: "Beverly Hills".to_string(),
            state: "CA".to_string(),
            zip: "90210".to_string(),
            mls_number: "MLS123".to_string(),
        }
    }

    #[test]
    fn renders_header_summary_and_links() {
        let response = SearchResponse::new(
            "Two results.".to_string(),
            vec![
                VideoSearchResult {
                    title: "Official Listing Page".to_string(),
                    url: "https://zillow.com/homedetails/abc".to_string(),
                    source: "zillow.com".to_string(),
                },
                VideoSearchResult {
                    title: "Maple Tour".to_string(),
                    url: "https://youtube.com/watch?v=xyz".to_string(),
                    source: "youtube.com".to_string(),
                },
            ],
        );
        let at = Utc.with_ymd_and_hms(2026, 10, 16, 9, 30, 0).unwrap();
        let doc = render(&details(), &response, at);

        assert!(doc.starts_with("Property Videos: 123 Maple Dr, Beverly Hills, CA 90210\n"));
        assert!(doc.contains("MLS Number: MLS123\n"));
        assert!(doc.contains("Generated: 2026-10-16 09:30 UTC\n"));
        assert!(doc.contains("Two results.\n"));
        assert!(doc.contains("1. Official Listing Page\n   URL: https://zillow.com/homedetails/abc\n"));
        assert!(doc.contains("2. Maple Tour\n   URL: https://youtube.com/watch?v=xyz\n   Source: youtube.com\n"));
        assert!(doc.ends_with("Source: youtube.com\n"));
        assert!(doc.contains("Two results.\n\nLinks (2)\n-----\n"));
    }

    #[test]
    fn empty_result_says_so() {
        let doc = render(&details(), &SearchResponse::default(), Utc::now());
        assert!(doc.contains("(no summary)"));
        assert!(doc.contains("No videos found for this property."));
    }
}
