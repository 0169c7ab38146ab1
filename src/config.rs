use std::env;

const DEFAULT_API_BASE: &str = "http://localhost:8100";
const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Environment variables checked for the API base, first match wins.
const API_BASE_VARS: &[&str] = &["MEMSHAHEB_API_BASE_URL", "API_BASE_URL", "NEXT_PUBLIC_API_BASE_URL"];

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base: String,
    pub token: Option<String>,
    pub timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Self {
        let api_base = API_BASE_VARS
            .iter()
            .find_map(|key| non_empty_var(key))
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        let timeout_secs = non_empty_var("MEMSHAHEB_HTTP_TIMEOUT_SECS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Config {
            api_base: normalize_base(&api_base),
            token: non_empty_var("MEMSHAHEB_API_TOKEN"),
            timeout_secs,
        }
    }

    /// Apply CLI flags on top of the environment.
    pub fn with_overrides(mut self, api_base: Option<String>, token: Option<String>) -> Self {
        if let Some(base) = api_base {
            self.api_base = normalize_base(&base);
        }
        if token.is_some() {
            self.token = token;
        }
        self
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn normalize_base(base: &str) -> String {
    base.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base: &str) -> Config {
        Config {
            api_base: base.to_string(),
            token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    #[test]
    fn trailing_slash_trimmed() {
        assert_eq!(normalize_base("http://api.test:8100/"), "http://api.test:8100");
        assert_eq!(normalize_base(" http://api.test// "), "http://api.test");
    }

    #[test]
    fn overrides_replace_env_values() {
        let c = config("http://env").with_overrides(Some("http://flag/".into()), Some("secret".into()));
        assert_eq!(c.api_base, "http://flag");
        assert_eq!(c.token.as_deref(), Some("secret"));
    }

    #[test]
    fn missing_overrides_keep_env_values() {
        let mut c = config("http://env");
        c.token = Some("from-env".into());
        let c = c.with_overrides(None, None);
        assert_eq!(c.api_base, "http://env");
        assert_eq!(c.token.as_deref(), Some("from-env"));
    }
}
