//! TOML parsing with line context in error messages
//!
//! Shared by federation.toml and fedshare.toml loading.

use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

use super::schema::FederationConfig;

/// Parse a federation.toml file
pub fn parse_federation_toml(path: &Path) -> Result<FederationConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read federation config: {}", path.display()))?;

    parse_federation_toml_str(&content)
        .with_context(|| format!("Failed to parse federation config: {}", path.display()))
}

/// Parse federation.toml content from string
pub fn parse_federation_toml_str(content: &str) -> Result<FederationConfig> {
    let config: FederationConfig = parse_toml_str(content)?;
    config.validate()?;
    Ok(config)
}

/// Deserialize TOML, enhancing errors with the offending lines
pub fn parse_toml_str<T: DeserializeOwned>(content: &str) -> Result<T> {
    toml::from_str(content).map_err(|e| enhance_toml_error(e, content))
}

fn enhance_toml_error(error: toml::de::Error, content: &str) -> anyhow::Error {
    let error_msg = error.to_string();

    let line_hint = error
        .span()
        .and_then(|span| content.get(..span.start))
        .map(|before| before.matches('\n').count() + 1);

    if let Some(line_num) = line_hint {
        let context = get_line_context(content, line_num);
        anyhow::anyhow!(
            "TOML parsing error at line {}:\n{}\n\nError: {}",
            line_num,
            context,
            error_msg
        )
    } else {
        anyhow::anyhow!("TOML parsing error: {}", error_msg)
    }
}

fn get_line_context(content: &str, line_num: usize) -> String {
    let lines: Vec<&str> = content.lines().collect();
    let start = line_num.saturating_sub(2);
    let end = (line_num + 1).min(lines.len());

    lines[start.min(end)..end]
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let num = start + i + 1;
            let marker = if num == line_num { ">>>" } else { "   " };
            format!("{} {:4} | {}", marker, num, line)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
