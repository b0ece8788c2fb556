use crate::domain::ports::ConfigProvider;
use crate::utils::batch::BatchPolicy;
use crate::utils::error::{Result, VoteError};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

/// 登入狀態最長保留一年
const MAX_SESSION_TTL_HOURS: u64 = 24 * 365;

static ENV_VAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid")
});

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteConfig {
    pub tmdb: TmdbConfig,
    pub rawg: RawgConfig,
    pub ballot: BallotConfig,
    pub gate: GateConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmdbConfig {
    pub api_key: String,
    #[serde(default = "default_tmdb_base_url")]
    pub base_url: String,
    #[serde(default = "default_tmdb_image_base")]
    pub image_base: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawgConfig {
    pub api_key: String,
    #[serde(default = "default_rawg_base_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BallotConfig {
    pub sink_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateConfig {
    pub password: String,
    #[serde(default = "default_session_file")]
    pub session_file: String,
    #[serde(default = "default_session_ttl_hours")]
    pub session_ttl_hours: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_batch_delay_ms")]
    pub batch_delay_ms: u64,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "default_result_limit")]
    pub result_limit: usize,
    pub request_timeout_seconds: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            batch_delay_ms: default_batch_delay_ms(),
            debounce_ms: default_debounce_ms(),
            result_limit: default_result_limit(),
            request_timeout_seconds: None,
        }
    }
}

fn default_tmdb_base_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_tmdb_image_base() -> String {
    "https://image.tmdb.org/t/p/w200".to_string()
}

fn default_rawg_base_url() -> String {
    "https://api.rawg.io/api".to_string()
}

fn default_session_file() -> String {
    "./.bestof-session.json".to_string()
}

fn default_session_ttl_hours() -> u64 {
    24
}

fn default_batch_size() -> usize {
    5
}

fn default_batch_delay_ms() -> u64 {
    150
}

fn default_debounce_ms() -> u64 {
    400
}

fn default_result_limit() -> usize {
    8
}

impl VoteConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(VoteError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| VoteError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${TMDB_API_KEY})，未設定的保留原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .to_string()
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_secret("tmdb.api_key", &self.tmdb.api_key)?;
        validation::validate_url("tmdb.base_url", &self.tmdb.base_url)?;
        validation::validate_url("tmdb.image_base", &self.tmdb.image_base)?;
        validation::validate_secret("rawg.api_key", &self.rawg.api_key)?;
        validation::validate_url("rawg.base_url", &self.rawg.base_url)?;
        validation::validate_url("ballot.sink_url", &self.ballot.sink_url)?;
        validation::validate_secret("gate.password", &self.gate.password)?;
        validation::validate_path("gate.session_file", &self.gate.session_file)?;
        validation::validate_positive_number(
            "gate.session_ttl_hours",
            usize::try_from(self.gate.session_ttl_hours).unwrap_or(usize::MAX),
            1,
        )?;
        validation::validate_max_number(
            "gate.session_ttl_hours",
            self.gate.session_ttl_hours,
            MAX_SESSION_TTL_HOURS,
        )?;
        validation::validate_positive_number("search.batch_size", self.search.batch_size, 1)?;
        validation::validate_positive_number("search.result_limit", self.search.result_limit, 1)?;
        Ok(())
    }

    pub fn session_file(&self) -> &str {
        &self.gate.session_file
    }
}

impl ConfigProvider for VoteConfig {
    fn tmdb_api_key(&self) -> &str {
        &self.tmdb.api_key
    }

    fn tmdb_base_url(&self) -> &str {
        &self.tmdb.base_url
    }

    fn tmdb_image_base(&self) -> &str {
        &self.tmdb.image_base
    }

    fn rawg_api_key(&self) -> &str {
        &self.rawg.api_key
    }

    fn rawg_base_url(&self) -> &str {
        &self.rawg.base_url
    }

    fn sink_url(&self) -> &str {
        &self.ballot.sink_url
    }

    fn site_password(&self) -> &str {
        &self.gate.password
    }

    fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.gate.session_ttl_hours.saturating_mul(60 * 60))
    }

    fn batch_policy(&self) -> BatchPolicy {
        BatchPolicy::new(
            self.search.batch_size,
            Duration::from_millis(self.search.batch_delay_ms),
        )
    }

    fn debounce(&self) -> Duration {
        Duration::from_millis(self.search.debounce_ms)
    }

    fn result_limit(&self) -> usize {
        self.search.result_limit
    }

    fn request_timeout(&self) -> Option<Duration> {
        self.search.request_timeout_seconds.map(Duration::from_secs)
    }
}

impl Validate for VoteConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const MINIMAL: &str = r#"
[tmdb]
api_key = "tmdb-key"

[rawg]
api_key = "rawg-key"

[ballot]
sink_url = "https://sheets.example/exec"

[gate]
password = "friends"
"#;

    #[test]
    fn test_parse_minimal_config_uses_defaults() {
        let config = VoteConfig::from_toml_str(MINIMAL).unwrap();

        assert_eq!(config.tmdb_base_url(), "https://api.themoviedb.org/3");
        assert_eq!(config.tmdb_image_base(), "https://image.tmdb.org/t/p/w200");
        assert_eq!(config.rawg_base_url(), "https://api.rawg.io/api");
        assert_eq!(config.session_ttl(), Duration::from_secs(24 * 60 * 60));
        assert_eq!(config.batch_policy(), BatchPolicy::enrichment());
        assert_eq!(config.debounce(), Duration::from_millis(400));
        assert_eq!(config.result_limit(), 8);
        assert_eq!(config.request_timeout(), None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_search_overrides() {
        let content = format!(
            "{}\n[search]\nbatch_size = 3\nbatch_delay_ms = 20\nrequest_timeout_seconds = 10\n",
            MINIMAL
        );
        let config = VoteConfig::from_toml_str(&content).unwrap();

        assert_eq!(config.batch_policy(), BatchPolicy::new(3, Duration::from_millis(20)));
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(10)));
        assert_eq!(config.debounce(), Duration::from_millis(400));
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("BESTOF_TEST_SINK_URL", "https://sink.test/exec");

        let content = MINIMAL.replace("https://sheets.example/exec", "${BESTOF_TEST_SINK_URL}");
        let config = VoteConfig::from_toml_str(&content).unwrap();
        assert_eq!(config.sink_url(), "https://sink.test/exec");

        std::env::remove_var("BESTOF_TEST_SINK_URL");
    }

    #[test]
    fn test_unset_env_var_fails_validation() {
        let content = MINIMAL.replace("\"friends\"", "\"${BESTOF_TEST_UNSET_PASSWORD}\"");
        let config = VoteConfig::from_toml_str(&content).unwrap();

        match config.validate() {
            Err(VoteError::ConfigValidationError { field, .. }) => assert_eq!(field, "gate.password"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_sink_url() {
        let content = MINIMAL.replace("https://sheets.example/exec", "not-a-url");
        let config = VoteConfig::from_toml_str(&content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_session_ttl_bounds() {
        let content = MINIMAL.replace(
            "password = \"friends\"",
            "password = \"friends\"\nsession_ttl_hours = 9223372036854775807",
        );
        let config = VoteConfig::from_toml_str(&content).unwrap();

        assert_eq!(config.session_ttl(), Duration::from_secs(u64::MAX));
        match config.validate() {
            Err(VoteError::InvalidConfigValueError { field, .. }) => {
                assert_eq!(field, "gate.session_ttl_hours")
            }
            other => panic!("unexpected result: {:?}", other),
        }

        let content = MINIMAL.replace(
            "password = \"friends\"",
            "password = \"friends\"\nsession_ttl_hours = 8760",
        );
        assert!(VoteConfig::from_toml_str(&content).unwrap().validate().is_ok());
    }

    #[test]
    fn test_missing_section_is_parse_error() {
        let result = VoteConfig::from_toml_str("[tmdb]\napi_key = \"k\"\n");
        assert!(matches!(result, Err(VoteError::ConfigValidationError { .. })));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(MINIMAL.as_bytes()).unwrap();

        let config = VoteConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.site_password(), "friends");
        assert_eq!(config.session_file(), "./.bestof-session.json");
    }
}
