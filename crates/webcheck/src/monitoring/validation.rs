//! Input validation for new checks.
//!
//! Everything here runs before any network call, so a rejected check never
//! touches the target or the store.

use url::Url;

use crate::database::CheckSettings;
use crate::error::WebCheckError;

/// Parse an absolute http/https url with a host
pub fn validate_url(target: &str) -> Result<Url, String> {
    let url = Url::parse(target).map_err(|e| e.to_string())?;

    match url.scheme() {
        "http" | "https" => {}
        other => return Err(format!("unsupported scheme `{}`, use http or https", other)),
    }

    if url.host_str().is_none_or(str::is_empty) {
        return Err("missing host".to_string());
    }

    Ok(url)
}

fn parse_seconds(name: &str, value: &str) -> Result<i64, WebCheckError> {
    value.trim().parse::<i64>().map_err(|_| {
        WebCheckError::InvalidConfiguration(format!(
            "{} {} given, must be an integer",
            name, value
        ))
    })
}

impl CheckSettings {
    /// Parse settings given as text, e.g. from an import line or the command
    /// line, and validate them.
    pub fn parse(
        max_down_time: &str,
        check_frequency: &str,
        check_timeout: &str,
    ) -> Result<Self, WebCheckError> {
        let settings = Self {
            max_down_time: parse_seconds("max_down_time", max_down_time)?,
            check_frequency: parse_seconds("check_frequency", check_frequency)?,
            check_timeout: parse_seconds("check_timeout", check_timeout)?,
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Only the timeout is constrained. Zero or negative `max_down_time` and
    /// `check_frequency` make the check run every pass and alert at once.
    pub fn validate(&self) -> Result<(), WebCheckError> {
        if self.check_timeout <= 0 {
            return Err(WebCheckError::InvalidConfiguration(format!(
                "check_timeout {} given, must be greater than 0",
                self.check_timeout
            )));
        }
        Ok(())
    }
}
