use std::str::FromStr;

use reqwest::Url;

use crate::prelude::*;

/// Largest team the service accepts.
pub const MAX_TEAM_SIZE: usize = 5;

pub fn base_url(value: &str) -> Result<String> {
    let url = Url::parse(value).with_context(|| format!("`{}` is not a valid URL", value))?;
    match url.scheme() {
        "http" | "https" => Ok(url.as_str().trim_end_matches('/').to_string()),
        scheme => Err(anyhow!("unsupported URL scheme `{}`", scheme)),
    }
}

pub fn team_size(value: &str) -> Result<usize> {
    match usize::from_str(value)? {
        value if (1..=MAX_TEAM_SIZE).contains(&value) => Ok(value),
        value => Err(anyhow!("team size must be from 1 to {}, got {}", MAX_TEAM_SIZE, value)),
    }
}

pub fn non_zero_duration(value: &str) -> Result<StdDuration> {
    match humantime::parse_duration(value)? {
        duration if !duration.is_zero() => Ok(duration),
        _ => Err(anyhow!("expected a positive duration")),
    }
}
