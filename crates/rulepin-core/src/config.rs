use crate::error::{Result, RulepinError};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_CHECK_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_HEALTH_PORT: u16 = 8080;
/// Longest accepted poll period: one week.
pub const MAX_CHECK_INTERVAL_SECS: i64 = 7 * 24 * 60 * 60;

// ---------------------------------------------------------------------------
// WriteFormat
// ---------------------------------------------------------------------------

/// Body encoding used when writing the rule list back.
///
/// The filter accepted a newline-joined text body in older releases and a
/// JSON envelope in newer ones. The two are not interchangeable, so the
/// deployment picks one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteFormat {
    /// `{"rules": [...]}` sent as `application/json`.
    #[default]
    Json,
    /// Rules joined with `\n` sent as `text/plain`.
    Text,
}

impl WriteFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            WriteFormat::Json => "json",
            WriteFormat::Text => "text",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            WriteFormat::Json => "application/json",
            WriteFormat::Text => "text/plain",
        }
    }
}

impl fmt::Display for WriteFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WriteFormat {
    type Err = RulepinError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(WriteFormat::Json),
            "text" => Ok(WriteFormat::Text),
            _ => Err(RulepinError::InvalidWriteFormat(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// Basic-auth credential pair. `Debug` never prints the password.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Validated, immutable runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Filter base address without a trailing slash.
    pub base_url: String,
    pub credentials: Credentials,
    /// Rule that must sit last. Compared byte-for-byte.
    pub target_rule: String,
    pub check_interval: Duration,
    pub health_port: u16,
    pub write_format: WriteFormat,
}

/// Raw settings as read from flags or the environment, before validation.
///
/// Empty strings are treated the same as unset values.
#[derive(Debug, Clone, Default)]
pub struct ConfigInput {
    pub url: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub target_rule: Option<String>,
    pub check_interval: Option<String>,
    pub health_port: Option<String>,
    pub write_format: Option<String>,
}

impl ConfigInput {
    pub fn validate(self) -> Result<Config> {
        let url = required(self.url, "ADGUARD_URL")?;
        let user = required(self.user, "ADGUARD_USER")?;
        let password = required(self.password, "ADGUARD_PASS")?;
        let target_rule = required(self.target_rule, "TARGET_RULE")?;

        Ok(Config {
            base_url: parse_base_url(&url)?,
            credentials: Credentials::new(user, password),
            target_rule,
            check_interval: parse_check_interval(non_empty(self.check_interval).as_deref())?,
            health_port: parse_health_port(non_empty(self.health_port).as_deref())?,
            write_format: match non_empty(self.write_format) {
                Some(s) => s.parse()?,
                None => WriteFormat::default(),
            },
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn required(value: Option<String>, key: &'static str) -> Result<String> {
    non_empty(value).ok_or(RulepinError::MissingSetting(key))
}

fn parse_base_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim_end_matches('/');
    let parsed = reqwest::Url::parse(trimmed).map_err(|e| RulepinError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(RulepinError::InvalidUrl {
            url: raw.to_string(),
            reason: format!("unsupported scheme '{}'", parsed.scheme()),
        });
    }
    Ok(trimmed.to_string())
}

/// Parse `CHECK_INTERVAL` seconds; `None` yields the default.
pub fn parse_check_interval(raw: Option<&str>) -> Result<Duration> {
    let Some(raw) = raw else {
        return Ok(Duration::from_secs(DEFAULT_CHECK_INTERVAL_SECS));
    };
    let seconds: i64 = raw
        .parse()
        .map_err(|_| RulepinError::InvalidInterval(raw.to_string()))?;
    if seconds <= 0 {
        return Err(RulepinError::NonPositiveInterval(seconds));
    }
    if seconds > MAX_CHECK_INTERVAL_SECS {
        return Err(RulepinError::IntervalTooLong {
            seconds,
            max: MAX_CHECK_INTERVAL_SECS,
        });
    }
    Ok(Duration::from_secs(seconds.unsigned_abs()))
}

/// Parse `HEALTH_PORT`; `None` yields the default.
pub fn parse_health_port(raw: Option<&str>) -> Result<u16> {
    match raw {
        None => Ok(DEFAULT_HEALTH_PORT),
        Some(raw) => raw
            .parse()
            .map_err(|_| RulepinError::InvalidPort(raw.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn full_input() -> ConfigInput {
        ConfigInput {
            url: Some("http://adguard.local:3000".into()),
            user: Some("admin".into()),
            password: Some("s3cret".into()),
            target_rule: Some("@@||example.org^$important".into()),
            ..Default::default()
        }
    }

    #[test]
    fn defaults_apply_when_optional_settings_absent() {
        let config = full_input().validate().unwrap();
        assert_eq!(config.base_url, "http://adguard.local:3000");
        assert_eq!(config.credentials.username, "admin");
        assert_eq!(config.credentials.password(), "s3cret");
        assert_eq!(config.target_rule, "@@||example.org^$important");
        assert_eq!(config.check_interval, Duration::from_secs(60));
        assert_eq!(config.health_port, 8080);
        assert_eq!(config.write_format, WriteFormat::Json);
    }

    #[test]
    fn optional_settings_override_defaults() {
        let config = ConfigInput {
            check_interval: Some("15".into()),
            health_port: Some("9090".into()),
            write_format: Some("TEXT".into()),
            ..full_input()
        }
        .validate()
        .unwrap();
        assert_eq!(config.check_interval, Duration::from_secs(15));
        assert_eq!(config.health_port, 9090);
        assert_eq!(config.write_format, WriteFormat::Text);
    }

    #[test]
    fn empty_optional_settings_fall_back_to_defaults() {
        let config = ConfigInput {
            check_interval: Some(String::new()),
            health_port: Some(String::new()),
            write_format: Some(String::new()),
            ..full_input()
        }
        .validate()
        .unwrap();
        assert_eq!(config.check_interval, Duration::from_secs(60));
        assert_eq!(config.health_port, 8080);
    }

    #[test]
    fn trailing_slashes_are_stripped_from_url() {
        let config = ConfigInput {
            url: Some("https://adguard.local/".into()),
            ..full_input()
        }
        .validate()
        .unwrap();
        assert_eq!(config.base_url, "https://adguard.local");
    }

    #[test]
    fn missing_required_settings_are_reported_by_name() {
        let cases: [(fn(&mut ConfigInput), &str); 4] = [
            (|i| i.url = None, "ADGUARD_URL"),
            (|i| i.user = None, "ADGUARD_USER"),
            (|i| i.password = None, "ADGUARD_PASS"),
            (|i| i.target_rule = None, "TARGET_RULE"),
        ];
        for (clear, key) in cases {
            let mut input = full_input();
            clear(&mut input);
            match input.validate() {
                Err(RulepinError::MissingSetting(k)) => assert_eq!(k, key),
                other => panic!("expected MissingSetting({key}), got {other:?}"),
            }
        }
    }

    #[test]
    fn empty_required_setting_counts_as_missing() {
        let err = ConfigInput {
            password: Some(String::new()),
            ..full_input()
        }
        .validate()
        .unwrap_err();
        assert!(matches!(err, RulepinError::MissingSetting("ADGUARD_PASS")));
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn target_rule_is_kept_verbatim() {
        let config = ConfigInput {
            target_rule: Some("  ||ads.example^  ".into()),
            ..full_input()
        }
        .validate()
        .unwrap();
        assert_eq!(config.target_rule, "  ||ads.example^  ");
    }

    #[test]
    fn interval_must_be_an_integer() {
        let err = parse_check_interval(Some("1m")).unwrap_err();
        assert!(matches!(err, RulepinError::InvalidInterval(_)));
    }

    #[test]
    fn interval_must_be_positive() {
        assert!(matches!(
            parse_check_interval(Some("0")),
            Err(RulepinError::NonPositiveInterval(0))
        ));
        assert!(matches!(
            parse_check_interval(Some("-5")),
            Err(RulepinError::NonPositiveInterval(-5))
        ));
    }

    #[test]
    fn interval_is_bounded() {
        assert_eq!(
            parse_check_interval(Some("604800")).unwrap(),
            Duration::from_secs(604_800)
        );
        assert!(matches!(
            parse_check_interval(Some("604801")),
            Err(RulepinError::IntervalTooLong { seconds: 604_801, .. })
        ));

        let err = ConfigInput {
            check_interval: Some(i64::MAX.to_string()),
            ..full_input()
        }
        .validate()
        .unwrap_err();
        assert!(matches!(err, RulepinError::IntervalTooLong { .. }));
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn port_must_fit_u16() {
        assert!(matches!(
            parse_health_port(Some("70000")),
            Err(RulepinError::InvalidPort(_))
        ));
        assert_eq!(parse_health_port(Some("0")).unwrap(), 0);
    }

    #[test]
    fn unknown_write_format_is_rejected() {
        let err = ConfigInput {
            write_format: Some("yaml".into()),
            ..full_input()
        }
        .validate()
        .unwrap_err();
        assert!(matches!(err, RulepinError::InvalidWriteFormat(_)));
    }

    #[test]
    fn invalid_url_is_rejected() {
        let err = ConfigInput {
            url: Some("adguard.local".into()),
            ..full_input()
        }
        .validate()
        .unwrap_err();
        assert!(matches!(err, RulepinError::InvalidUrl { .. }));

        let err = ConfigInput {
            url: Some("ftp://adguard.local".into()),
            ..full_input()
        }
        .validate()
        .unwrap_err();
        assert!(matches!(err, RulepinError::InvalidUrl { .. }));
    }

    #[test]
    fn debug_output_redacts_password() {
        let config = full_input().validate().unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("s3cret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn write_format_content_types() {
        assert_eq!(WriteFormat::Json.content_type(), "application/json");
        assert_eq!(WriteFormat::Text.content_type(), "text/plain");
        assert_eq!(WriteFormat::Text.to_string(), "text");
    }
}
