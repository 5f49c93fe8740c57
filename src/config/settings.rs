use crate::core::decision::UnavailablePolicy;
use crate::domain::model::{CheckTarget, Strategy};
use crate::utils::error::{Result, WatchError};
use crate::utils::validation::{self, Validate};
use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::Path;
use std::time::Duration;

pub const PARK_PLACEHOLDER: &str = "{park}";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub target: TargetConfig,
    pub acquire: AcquireConfig,
    pub notify: NotifyConfig,
    pub history: Option<HistoryConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    pub park: String,
    pub arrival: NaiveDate,
    pub nights: u32,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            park: "John Pennekamp Coral Reef State Park".to_string(),
            arrival: NaiveDate::from_ymd_opt(2026, 4, 4).unwrap_or_default(),
            nights: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AcquireConfig {
    pub strategy: Strategy,
    pub direct_fetch: DirectFetchConfig,
    pub interactive: InteractiveConfig,
}

impl Default for AcquireConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::Interactive,
            direct_fetch: DirectFetchConfig::default(),
            interactive: InteractiveConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectFetchConfig {
    pub search_url: String,
    pub park_param: String,
    pub user_agent: String,
    pub accept_language: String,
    pub timeout_seconds: u64,
}

impl Default for DirectFetchConfig {
    fn default() -> Self {
        Self {
            search_url: "https://www.floridastateparks.org/search".to_string(),
            park_param: "keys".to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36".to_string(),
            accept_language: "en-US,en;q=0.9".to_string(),
            timeout_seconds: 30,
        }
    }
}

impl DirectFetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// How an element on the booking site is located.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locator {
    Css(String),
    Xpath(String),
}

impl Locator {
    pub fn expression(&self) -> &str {
        match self {
            Locator::Css(s) | Locator::Xpath(s) => s,
        }
    }

    /// Substitutes `{park}` in the selector expression, escaped for the locator type.
    ///
    /// CSS: the name is backslash-escaped, so it can sit inside either quote style.
    /// XPath: the placeholder (with or without surrounding quotes) becomes a
    /// complete string literal, using `concat()` when the name holds both quotes.
    pub fn for_park(&self, park: &str) -> Locator {
        match self {
            Locator::Css(s) => Locator::Css(s.replace(PARK_PLACEHOLDER, &css_escape(park))),
            Locator::Xpath(s) => {
                let literal = xpath_literal(park);
                Locator::Xpath(
                    s.replace("'{park}'", &literal)
                        .replace("\"{park}\"", &literal)
                        .replace(PARK_PLACEHOLDER, &literal),
                )
            }
        }
    }
}

fn css_escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '\'' | '"') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn xpath_literal(value: &str) -> String {
    if !value.contains('\'') {
        return format!("'{}'", value);
    }
    if !value.contains('"') {
        return format!("\"{}\"", value);
    }
    // 同時含有兩種引號：concat('a', "'", 'b')
    let parts = value
        .split('\'')
        .map(|part| format!("'{}'", part))
        .collect::<Vec<_>>();
    format!("concat({})", parts.join(", \"'\", "))
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Locator::Css(s) => write!(f, "css={}", s),
            Locator::Xpath(s) => write!(f, "xpath={}", s),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub book_a_stay: Locator,
    pub location_input: Locator,
    pub arrival_date: Locator,
    pub nights: Locator,
    pub show_results: Locator,
    /// Must contain `{park}`.
    pub results: Locator,
    pub results_attribute: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            book_a_stay: Locator::Xpath(
                "//a[contains(normalize-space(.), 'Book your overnight stay today')]".to_string(),
            ),
            location_input: Locator::Css("#home-search-location-input".to_string()),
            arrival_date: Locator::Css("#arrivaldate".to_string()),
            nights: Locator::Css("#nights".to_string()),
            show_results: Locator::Xpath(
                "//button[contains(normalize-space(.), 'Show Results')]".to_string(),
            ),
            results: Locator::Css("a[aria-label*='{park}']".to_string()),
            results_attribute: "aria-label".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractiveConfig {
    pub landing_url: String,
    pub headless: bool,
    pub chromium_path: Option<String>,
    pub launch_timeout_seconds: u64,
    pub navigation_timeout_seconds: u64,
    pub step_timeout_seconds: u64,
    pub poll_interval_ms: u64,
    /// chrono format for the arrival-date field.
    pub date_format: String,
    pub selectors: SelectorConfig,
}

impl Default for InteractiveConfig {
    fn default() -> Self {
        Self {
            landing_url: "https://www.floridastateparks.org/stay-night".to_string(),
            headless: true,
            chromium_path: None,
            launch_timeout_seconds: 30,
            navigation_timeout_seconds: 30,
            step_timeout_seconds: 15,
            poll_interval_ms: 250,
            date_format: "%m/%d/%Y".to_string(),
            selectors: SelectorConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub timeout_seconds: u64,
    pub timezone: String,
    pub unavailable: UnavailablePolicy,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            smtp_host: "smtp.gmail.com".to_string(),
            smtp_port: 465,
            timeout_seconds: 30,
            timezone: "America/Chicago".to_string(),
            unavailable: UnavailablePolicy::default(),
        }
    }
}

impl NotifyConfig {
    pub fn timezone(&self) -> Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| WatchError::InvalidConfigValueError {
                field: "notify.timezone".to_string(),
                value: self.timezone.clone(),
                reason: format!("Unknown time zone: {}", e),
            })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    pub path: String,
}

impl Settings {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| WatchError::ConfigError {
            message: format!("cannot read {}: {}", path.as_ref().display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);
        Ok(toml::from_str(&processed_content)?)
    }

    /// 替換環境變數 (例如 ${PARK_NAME})，未設定的保持原樣
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        use std::sync::LazyLock;

        static ENV_VAR: LazyLock<Regex> =
            LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"));

        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .to_string()
    }

    pub fn check_target(&self) -> CheckTarget {
        CheckTarget::new(self.target.park.clone(), self.target.arrival, self.target.nights)
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("target.park", &self.target.park)?;
        validation::validate_range("target.nights", self.target.nights, 1, 14)?;

        // 只驗證實際會用到的取得策略
        match self.acquire.strategy {
            Strategy::DirectFetch => {
                let direct = &self.acquire.direct_fetch;
                validation::validate_url("acquire.direct_fetch.search_url", &direct.search_url)?;
                validation::validate_non_empty_string("acquire.direct_fetch.park_param", &direct.park_param)?;
                validation::validate_positive_number(
                    "acquire.direct_fetch.timeout_seconds",
                    direct.timeout_seconds,
                    1,
                )?;
            }
            Strategy::Interactive => {
                let interactive = &self.acquire.interactive;
                validation::validate_url("acquire.interactive.landing_url", &interactive.landing_url)?;
                for (field, value) in [
                    ("acquire.interactive.launch_timeout_seconds", interactive.launch_timeout_seconds),
                    ("acquire.interactive.navigation_timeout_seconds", interactive.navigation_timeout_seconds),
                    ("acquire.interactive.step_timeout_seconds", interactive.step_timeout_seconds),
                    ("acquire.interactive.poll_interval_ms", interactive.poll_interval_ms),
                ] {
                    validation::validate_positive_number(field, value, 1)?;
                }
                validation::validate_contains_placeholder(
                    "acquire.interactive.selectors.results",
                    interactive.selectors.results.expression(),
                    PARK_PLACEHOLDER,
                )?;
                validation::validate_non_empty_string(
                    "acquire.interactive.selectors.results_attribute",
                    &interactive.selectors.results_attribute,
                )?;
                validation::validate_non_empty_string("acquire.interactive.date_format", &interactive.date_format)?;
                let mut probe = String::new();
                if write!(probe, "{}", self.target.arrival.format(&interactive.date_format)).is_err() {
                    return Err(WatchError::InvalidConfigValueError {
                        field: "acquire.interactive.date_format".to_string(),
                        value: interactive.date_format.clone(),
                        reason: "Not a valid strftime format".to_string(),
                    });
                }
            }
        }

        validation::validate_non_empty_string("notify.smtp_host", &self.notify.smtp_host)?;
        validation::validate_positive_number("notify.timeout_seconds", self.notify.timeout_seconds, 1)?;
        self.notify.timezone()?;

        if let Some(history) = &self.history {
            validation::validate_path("history.path", &history.path)?;
        }

        Ok(())
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
