//! Link filtering rules.
//!
//! Rules are evaluated top to bottom and the first one that matches decides the
//! verdict. A link no rule matches is accepted.

use tracing::debug;

use crate::search::extract::Candidate;
use crate::search::platform::{host_matches, path_segments, VideoPlatform};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    Reject,
}

pub struct LinkRule {
    pub name: &'static str,
    pub matches: fn(&Candidate) -> bool,
    pub verdict: Verdict,
}

pub const LINK_RULES: &[LinkRule] = &[
    LinkRule {
        name: "non-http-scheme",
        matches: non_http_scheme,
        verdict: Verdict::Reject,
    },
    LinkRule {
        name: "video-channel-page",
        matches: video_channel_page,
        verdict: Verdict::Reject,
    },
    LinkRule {
        name: "map-or-search-results",
        matches: map_or_search_results,
        verdict: Verdict::Reject,
    },
    LinkRule {
        name: "near-empty-path",
        matches: near_empty_path,
        verdict: Verdict::Reject,
    },
    LinkRule {
        name: "tutorial-title",
        matches: tutorial_title,
        verdict: Verdict::Reject,
    },
    LinkRule {
        name: "portal-single-listing",
        matches: portal_single_listing,
        verdict: Verdict::Accept,
    },
    LinkRule {
        name: "portal-search-page",
        matches: portal_search_page,
        verdict: Verdict::Reject,
    },
];

/// A real-estate portal and the path shapes of its pages
struct Portal {
    domain: &'static str,
    listing: &'static [&'static str],
    search: &'static [&'static str],
}

const PORTALS: &[Portal] = &[
    Portal {
        domain: "zillow.com",
        listing: &["/homedetails/"],
        search: &["/homes/", "/homes-for-sale", "/for_sale", "/for_rent", "/b/", "/browse/"],
    },
    Portal {
        domain: "realtor.com",
        listing: &["/realestateandhomes-detail/"],
        search: &["/realestateandhomes-search/", "/apartments/", "/sold-homes", "/realestateagents/"],
    },
    Portal {
        domain: "redfin.com",
        listing: &["/home/"],
        search: &["/city/", "/zipcode/", "/neighborhood/", "/county/", "/school/"],
    },
    Portal {
        domain: "trulia.com",
        listing: &["/p/", "/home/", "/builder-community-plan/"],
        search: &["/for_sale/", "/for_rent/", "/sold/", "/county/", "/zip/"],
    },
    Portal {
        domain: "homes.com",
        listing: &["/property/"],
        search: &["/homes-for-sale/", "/for-sale/", "/for-rent/", "/real-estate-agents/"],
    },
];

const TUTORIAL_PHRASES: &[&str] = &[
    "how to use",
    "tutorial",
    "tips and tricks",
    "for beginners",
    "step by step guide",
];

const SEARCH_ENGINES: &[&str] = &[
    "bing.com",
    "duckduckgo.com",
    "search.yahoo.com",
    "yandex.com",
    "baidu.com",
];

/// Run the rule table over one candidate
pub fn evaluate(candidate: &Candidate) -> Verdict {
    for rule in LINK_RULES {
        if (rule.matches)(candidate) {
            debug!(
                url = %candidate.raw,
                origin = ?candidate.origin,
                rule = rule.name,
                verdict = ?rule.verdict,
                "link rule matched"
            );
            return rule.verdict;
        }
    }
    Verdict::Accept
}

pub fn is_accepted(candidate: &Candidate) -> bool {
    evaluate(candidate) == Verdict::Accept
}

fn non_http_scheme(candidate: &Candidate) -> bool {
    !matches!(candidate.url.scheme(), "http" | "https")
}

fn video_channel_page(candidate: &Candidate) -> bool {
    VideoPlatform::detect(&candidate.url)
        .is_some_and(|platform| platform.is_channel_page(&candidate.url))
}

fn map_or_search_results(candidate: &Candidate) -> bool {
    let Some(host) = candidate.url.host_str() else {
        return false;
    };
    let segments = path_segments(&candidate.url);
    let first = segments.first().map(String::as_str).unwrap_or("");

    if host.starts_with("maps.") || host == "goo.gl" || host == "maps.app.goo.gl" {
        return true;
    }
    let is_google = host == "google.com"
        || host.starts_with("google.")
        || host.starts_with("www.google.");
    if is_google && matches!(first, "maps" | "search" | "url") {
        return true;
    }
    if SEARCH_ENGINES.iter().any(|engine| host_matches(host, engine)) {
        return true;
    }
    match VideoPlatform::detect(&candidate.url) {
        Some(VideoPlatform::YouTube) => matches!(first, "results" | "hashtag" | "feed"),
        Some(VideoPlatform::Vimeo) | Some(VideoPlatform::TikTok) => first == "search",
        _ => false,
    }
}

fn near_empty_path(candidate: &Candidate) -> bool {
    candidate.url.path().trim_matches('/').len() < 2
}

fn tutorial_title(candidate: &Candidate) -> bool {
    let title = candidate.title.to_lowercase();
    TUTORIAL_PHRASES.iter().any(|phrase| title.contains(phrase))
}

fn portal_for(candidate: &Candidate) -> Option<&'static Portal> {
    let host = candidate.url.host_str()?;
    PORTALS.iter().find(|portal| host_matches(host, portal.domain))
}

fn portal_single_listing(candidate: &Candidate) -> bool {
    let path = candidate.url.path().to_ascii_lowercase();
    portal_for(candidate).is_some_and(|portal| portal.listing.iter().any(|shape| path.contains(shape)))
}

fn portal_search_page(candidate: &Candidate) -> bool {
    let path = candidate.url.path().to_ascii_lowercase();
    portal_for(candidate).is_some_and(|portal| portal.search.iter().any(|shape| path.contains(shape)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::extract::Origin;
    use url::Url;

    fn candidate(raw: &str, title: &str) -> Candidate {
        Candidate {
            raw: raw.to_string(),
            url: Url::parse(raw).unwrap(),
            title: title.to_string(),
            origin: Origin::Citation,
        }
    }

    fn rule(name: &str) -> &'static LinkRule {
        LINK_RULES.iter().find(|rule| rule.name == name).unwrap()
    }

    fn rule_matches(name: &str, raw: &str) -> bool {
        (rule(name).matches)(&candidate(raw, "Some page"))
    }

    #[test]
    fn rule_names_are_unique() {
        let mut names: Vec<&str> = LINK_RULES.iter().map(|rule| rule.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), LINK_RULES.len());
    }

    #[test]
    fn non_http_schemes() {
        assert!(rule_matches("non-http-scheme", "ftp://example.com/tour.mp4"));
        assert!(rule_matches("non-http-scheme", "mailto:agent@example.com"));
        assert!(!rule_matches("non-http-scheme", "http://example.com/tour"));
    }

    #[test]
    fn channel_pages() {
        assert!(rule_matches("video-channel-page", "https://youtube.com/channel/UC123"));
        assert!(!rule_matches("video-channel-page", "https://youtube.com/watch?v=xyz"));
        assert!(!rule_matches("video-channel-page", "https://example.com/channel/UC123"));
    }

    #[test]
    fn maps_and_search_engines() {
        assert!(rule_matches("map-or-search-results", "https://www.google.com/maps/place/123+Maple"));
        assert!(rule_matches("map-or-search-results", "https://maps.google.com/?q=123+Maple"));
        assert!(rule_matches("map-or-search-results", "https://www.google.com/search?q=123+Maple"));
        assert!(rule_matches("map-or-search-results", "https://www.bing.com/videos/search?q=maple"));
        assert!(rule_matches("map-or-search-results", "https://www.youtube.com/results?search_query=maple"));
        assert!(!rule_matches("map-or-search-results", "https://www.youtube.com/watch?v=xyz"));
        assert!(!rule_matches("map-or-search-results", "https://www.zillow.com/homedetails/abc"));
    }

    #[test]
    fn near_empty_paths() {
        assert!(rule_matches("near-empty-path", "https://zillow.com"));
        assert!(rule_matches("near-empty-path", "https://zillow.com/"));
        assert!(rule_matches("near-empty-path", "https://example.com/a/"));
        assert!(!rule_matches("near-empty-path", "https://youtu.be/xyz"));
    }

    #[test]
    fn tutorial_titles() {
        let tutorial = candidate("https://youtube.com/watch?v=abc", "How To Use Google Earth");
        assert!((rule("tutorial-title").matches)(&tutorial));
        let tour = candidate("https://youtube.com/watch?v=xyz", "123 Maple Dr Walkthrough");
        assert!(!(rule("tutorial-title").matches)(&tour));
    }

    #[test]
    fn portal_shapes() {
        assert!(rule_matches("portal-single-listing", "https://www.zillow.com/homedetails/123-Maple-Dr/2077_zpid/"));
        assert!(!rule_matches("portal-single-listing", "https://www.zillow.com/homes/Beverly-Hills,-CA_rb/"));
        assert!(rule_matches("portal-search-page", "https://www.zillow.com/homes/Beverly-Hills,-CA_rb/"));
        assert!(rule_matches(
            "portal-search-page",
            "https://www.realtor.com/realestateandhomes-search/Beverly-Hills_CA"
        ));
        assert!(!rule_matches("portal-search-page", "https://example.com/homes/"));
    }

    #[test]
    fn listing_shape_overrides_search_shape() {
        let url = "https://www.redfin.com/city/1234/CA/Beverly-Hills/home/555";
        assert_eq!(evaluate(&candidate(url, "Redfin")), Verdict::Accept);
        let search = "https://www.redfin.com/city/1234/CA/Beverly-Hills";
        assert_eq!(evaluate(&candidate(search, "Redfin")), Verdict::Reject);
    }

    #[test]
    fn unmatched_links_are_accepted() {
        let url = "https://www.sothebysrealty.com/eng/sales/detail/180-l-1180-abc";
        assert_eq!(evaluate(&candidate(url, "Sotheby's listing")), Verdict::Accept);
    }
}
