use crate::DEFAULT_API_URL;

/// Where finished sessions are sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
    /// Bearer token for the request layer, if the endpoint wants one.
    pub token: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            token: None,
        }
    }
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: token.filter(|t| !t.trim().is_empty()),
        }
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[test]
fn endpoint_joins_cleanly() {
    let config = ApiConfig::new("http://localhost:1337/api/", Some("  ".into()));
    assert_eq!(config.endpoint("/runs"), "http://localhost:1337/api/runs");
    assert_eq!(config.token, None);
    assert_eq!(ApiConfig::default().endpoint("/runs"), "http://localhost:1337/api/runs");
}
