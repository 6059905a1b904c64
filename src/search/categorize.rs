use crate::models::VideoSearchResult;
use crate::search::extract::Candidate;
use crate::search::platform::{display_host, VideoPlatform};

pub const LISTING_TITLE: &str = "Official Listing Page";

const VIDEO_KEYWORDS: &[&str] = &["video", "tour", "walkthrough", "matterport"];

pub fn is_video(candidate: &Candidate) -> bool {
    if VideoPlatform::detect(&candidate.url).is_some() {
        return true;
    }
    let raw = candidate.raw.to_lowercase();
    VIDEO_KEYWORDS.iter().any(|keyword| raw.contains(keyword))
}

/// Split accepted candidates into the listing entry and video entries.
///
/// The first candidate not hosted on a video platform becomes the listing and
/// is placed first, even when its URL carries a video keyword. Later
/// candidates are kept only if they are videos, in first-seen order.
pub fn categorize(candidates: Vec<Candidate>) -> Vec<VideoSearchResult> {
    let mut listing = None;
    let mut videos = Vec::new();

    for candidate in candidates {
        let source = display_host(&candidate.url);
        let on_platform = VideoPlatform::detect(&candidate.url).is_some();
        if !on_platform && listing.is_none() {
            listing = Some(VideoSearchResult {
                title: LISTING_TITLE.to_string(),
                url: candidate.raw,
                source,
            });
        } else if is_video(&candidate) {
            videos.push(VideoSearchResult {
                title: candidate.title,
                url: candidate.raw,
                source,
            });
        }
    }

    listing.into_iter().chain(videos).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::extract::Origin;
    use url::Url;

    fn candidate(raw: &str) -> Candidate {
        Candidate {
            raw: raw.to_string(),
            url: Url::parse(raw).unwrap(),
            title: "Found".to_string(),
            origin: Origin::Text,
        }
    }

    #[test]
    fn keyword_and_platform_links_are_videos() {
        assert!(is_video(&candidate("https://youtu.be/xyz")));
        assert!(is_video(&candidate("https://agent.example.com/123-maple-virtual-tour")));
        assert!(!is_video(&candidate("https://zillow.com/homedetails/abc")));
    }

    #[test]
    fn listing_is_first_and_unique() {
        let results = categorize(vec![
            candidate("https://youtube.com/watch?v=one"),
            candidate("https://zillow.com/homedetails/abc"),
            candidate("https://www.redfin.com/CA/Beverly-Hills/home/555"),
            candidate("https://vimeo.com/12345"),
        ]);
        let urls: Vec<&str> = results.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://zillow.com/homedetails/abc",
                "https://youtube.com/watch?v=one",
                "https://vimeo.com/12345",
            ]
        );
        assert_eq!(results[0].title, LISTING_TITLE);
        assert_eq!(results[1].title, "Found");
        assert_eq!(results[0].source, "zillow.com");
    }

    #[test]
    fn keyword_in_listing_url_does_not_make_it_a_video() {
        let results = categorize(vec![
            candidate("https://www.zillow.com/homedetails/12-Tournament-Dr-Beverly-Hills-CA-90210/2077_zpid/"),
            candidate("https://youtube.com/watch?v=xyz"),
        ]);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, LISTING_TITLE);
        assert_eq!(results[0].source, "zillow.com");
        assert_eq!(results[1].url, "https://youtube.com/watch?v=xyz");
    }

    #[test]
    fn first_off_platform_link_takes_the_listing_slot() {
        let results = categorize(vec![
            candidate("https://agent.example.com/123-maple-virtual-tour"),
            candidate("https://www.redfin.com/CA/Beverly-Hills/home/555"),
        ]);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].url, "https://agent.example.com/123-maple-virtual-tour");
        assert_eq!(results[0].title, LISTING_TITLE);
    }

    #[test]
    fn keyword_links_after_the_listing_are_videos() {
        let results = categorize(vec![
            candidate("https://zillow.com/homedetails/abc"),
            candidate("https://agent.example.com/123-maple-virtual-tour"),
            candidate("https://www.redfin.com/CA/Beverly-Hills/home/555"),
        ]);
        let urls: Vec<&str> = results.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://zillow.com/homedetails/abc",
                "https://agent.example.com/123-maple-virtual-tour",
            ]
        );
    }

    #[test]
    fn no_listing_when_everything_is_video() {
        let results = categorize(vec![candidate("https://vimeo.com/12345")]);
        assert_eq!(results.len(), 1);
        assert_ne!(results[0].title, LISTING_TITLE);
    }
}
