use url::Url;

/// Video hosts whose links are treated as videos regardless of path keywords
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoPlatform {
    YouTube,
    Vimeo,
    TikTok,
    Instagram,
    Facebook,
    Matterport,
}

impl VideoPlatform {
    const ALL: [VideoPlatform; 6] = [
        VideoPlatform::YouTube,
        VideoPlatform::Vimeo,
        VideoPlatform::TikTok,
        VideoPlatform::Instagram,
        VideoPlatform::Facebook,
        VideoPlatform::Matterport,
    ];

    fn domains(self) -> &'static [&'static str] {
        match self {
            VideoPlatform::YouTube => &["youtube.com", "youtu.be", "youtube-nocookie.com"],
            VideoPlatform::Vimeo => &["vimeo.com"],
            VideoPlatform::TikTok => &["tiktok.com"],
            VideoPlatform::Instagram => &["instagram.com"],
            VideoPlatform::Facebook => &["facebook.com", "fb.watch"],
            VideoPlatform::Matterport => &["matterport.com"],
        }
    }

    pub fn detect(url: &Url) -> Option<Self> {
        let host = url.host_str()?;
        Self::ALL
            .into_iter()
            .find(|platform| platform.domains().iter().any(|domain| host_matches(host, domain)))
    }

    /// True when the path points at a profile or channel rather than a single video
    pub fn is_channel_page(self, url: &Url) -> bool {
        let segments = path_segments(url);
        let first = segments.first().map(String::as_str).unwrap_or("");
        match self {
            VideoPlatform::YouTube => {
                first.starts_with('@') || matches!(first, "channel" | "c" | "user")
            }
            VideoPlatform::Vimeo => {
                !segments.is_empty()
                    && !segments
                        .iter()
                        .any(|segment| segment.chars().all(|ch| ch.is_ascii_digit()))
            }
            VideoPlatform::TikTok => {
                first.starts_with('@') && !segments.iter().any(|segment| segment == "video")
            }
            VideoPlatform::Instagram => {
                !segments.is_empty()
                    && !(matches!(first, "p" | "reel" | "reels" | "tv") && segments.len() >= 2)
            }
            VideoPlatform::Facebook => {
                if url.host_str().is_some_and(|host| host_matches(host, "fb.watch")) {
                    return false;
                }
                let is_video_list = segments.last().is_some_and(|last| last == "videos");
                let is_page_root = segments.len() == 1 && first != "watch";
                is_video_list || is_page_root
            }
            VideoPlatform::Matterport => false,
        }
    }
}

/// `host` equals `domain` or is one of its subdomains
pub fn host_matches(host: &str, domain: &str) -> bool {
    let host = host.to_ascii_lowercase();
    host == domain
        || host
            .strip_suffix(domain)
            .is_some_and(|prefix| prefix.ends_with('.'))
}

/// Hostname shown to the user, without a leading `www.`
pub fn display_host(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
    host.strip_prefix("www.").map(str::to_string).unwrap_or(host)
}

pub fn path_segments(url: &Url) -> Vec<String> {
    url.path()
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| segment.to_ascii_lowercase())
        .collect()
}
