use crate::net::Request;

/// Which fetch strategy a request gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// Live data provider: network-first
    Api,
    /// App shell, stylesheets and everything else: cache-first
    Static,
}

/// Classify by hostname substring only. Path and headers are not inspected,
/// so any host containing `api.` counts as an API host.
pub fn classify(request: &Request, api_host_patterns: &[String]) -> RequestKind {
    let host = request.host();
    if api_host_patterns
        .iter()
        .any(|pattern| host.contains(pattern.as_str()))
    {
        RequestKind::Api
    } else {
        RequestKind::Static
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::API_HOST_PATTERNS;
    use reqwest::Url;

    fn kind(url: &str) -> RequestKind {
        let patterns: Vec<String> = API_HOST_PATTERNS.iter().map(|s| s.to_string()).collect();
        classify(&Request::get(Url::parse(url).unwrap()), &patterns)
    }

    #[test]
    fn test_api_providers() {
        assert_eq!(kind("https://api.aladhan.com/v1/timingsByCity?city=Lahore"), RequestKind::Api);
        assert_eq!(kind("https://api.alquran.cloud/v1/surah/1"), RequestKind::Api);
        assert_eq!(kind("https://cdn.jsdelivr.net/gh/fawazahmed0/hadith-api@1/editions.json"), RequestKind::Api);
        assert_eq!(kind("https://api.example.org/data"), RequestKind::Api);
    }

    #[test]
    fn test_static_hosts() {
        assert_eq!(kind("http://localhost:8080/index.html"), RequestKind::Static);
        assert_eq!(kind("https://fonts.googleapis.com/css2?family=Amiri"), RequestKind::Static);
        assert_eq!(kind("https://cdnjs.cloudflare.com/ajax/libs/font-awesome/6.5.0/css/all.min.css"), RequestKind::Static);
    }

    #[test]
    fn test_path_is_not_inspected() {
        assert_eq!(kind("http://localhost:8080/api.aladhan.com/cached"), RequestKind::Static);
    }

    #[test]
    fn test_substring_match_is_loose() {
        // Any host containing "api." is treated as a data provider
        assert_eq!(kind("https://myapi.images.example/logo.png"), RequestKind::Api);
    }
}
