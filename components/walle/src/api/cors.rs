/// CORS origin policy derived from the serve command's `--origins` flag.
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    allow_any: bool,
    origins: Vec<String>,
}

impl CorsPolicy {
    pub fn new(origins: Vec<String>) -> Self {
        let allow_any = origins.iter().any(|origin| origin == "*");
        Self { allow_any, origins }
    }

    /// Resolves the `Access-Control-Allow-Origin` value for a request.
    ///
    /// A wildcard policy always answers `*`; otherwise the request origin is
    /// echoed back only when it is on the allow list.
    pub fn allow_origin(&self, request_origin: Option<&str>) -> Option<String> {
        if self.allow_any {
            return Some("*".to_string());
        }

        request_origin
            .filter(|origin| {
                self.origins
                    .iter()
                    .any(|allowed| allowed.eq_ignore_ascii_case(origin))
            })
            .map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcard_allows_every_origin() {
        let policy = CorsPolicy::new(vec!["*".to_string()]);

        assert_eq!(policy.allow_origin(Some("https://a.com")).as_deref(), Some("*"));
        assert_eq!(policy.allow_origin(None).as_deref(), Some("*"));
    }

    #[test]
    fn listed_origin_is_echoed_back() {
        let policy = CorsPolicy::new(vec!["https://a.com".to_string(), "https://b.com".to_string()]);

        assert_eq!(
            policy.allow_origin(Some("https://b.com")).as_deref(),
            Some("https://b.com")
        );
    }

    #[test]
    fn unlisted_origin_is_refused() {
        let policy = CorsPolicy::new(vec!["https://a.com".to_string()]);

        assert_eq!(policy.allow_origin(Some("https://evil.test")), None);
        assert_eq!(policy.allow_origin(None), None);
    }

    #[test]
    fn origin_matching_ignores_ascii_case() {
        let policy = CorsPolicy::new(vec!["https://A.com".to_string()]);

        assert_eq!(
            policy.allow_origin(Some("https://a.com")).as_deref(),
            Some("https://a.com")
        );
    }
}
