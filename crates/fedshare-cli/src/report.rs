//! Table output for the CLI

use console::{StyledObject, style};
use semver::Version;
use serde::Serialize;

use fedshare_core::config::OverrideProfile;
use fedshare_core::manifest::{
    OverrideMode, OverrideOutcome, OverrideReport, OverrideState, OverrideStatus,
};
use fedshare_core::registry::{BindingSource, ResolvedBinding};
use fedshare_core::session::RemoteModule;

/// Bindings of every app in a session, host first
#[derive(Debug, Default, Serialize)]
pub struct ResolveReport {
    pub apps: Vec<AppBindings>,
}

#[derive(Debug, Serialize)]
pub struct AppBindings {
    pub app: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_url: Option<String>,
    pub bindings: Vec<ResolvedBinding>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AppBindings {
    pub fn host(host: &str, bindings: Vec<ResolvedBinding>) -> Self {
        Self {
            app: host.to_string(),
            module_url: None,
            bindings,
            error: None,
        }
    }

    pub fn loaded(module: &RemoteModule) -> Self {
        Self {
            app: module.remote.clone(),
            module_url: Some(module.url.to_string()),
            bindings: module.bindings.clone(),
            error: None,
        }
    }

    pub fn failed(app: &str, error: &anyhow::Error) -> Self {
        Self {
            app: app.to_string(),
            module_url: None,
            bindings: Vec::new(),
            error: Some(format!("{:#}", error)),
        }
    }
}

/// Colour a version like the shared-ui badge: 1.x blue, 2.x green, 3.x red.
fn badge(version: &Version) -> StyledObject<String> {
    let text = version.to_string();
    match version.major {
        1 => style(text).blue(),
        2 => style(text).green(),
        3 => style(text).red(),
        _ => style(text).dim(),
    }
}

pub fn print_resolve_report(report: &ResolveReport) {
    for app in &report.apps {
        println!("{}", style(&app.app).bold());
        if let Some(url) = &app.module_url {
            println!("  Module: {}", url);
        }
        if let Some(error) = &app.error {
            println!("  ✗ {}", style(error).red());
            println!();
            continue;
        }
        if app.bindings.is_empty() {
            println!("  No shared packages declared.");
            println!();
            continue;
        }

        println!(
            "  {:<24} {:<12} {:<10} {:<16} Overridden",
            "Package", "Version", "Provider", "Source"
        );
        println!("  {}", "-".repeat(74));
        for binding in &app.bindings {
            let source = match binding.source {
                BindingSource::EagerSingleton => "eager-singleton",
                BindingSource::Singleton => "singleton",
                BindingSource::Local => "local",
            };
            let version = badge(&binding.version);
            // Pad before styling so escape codes don't skew the columns
            let padding = 12usize.saturating_sub(binding.version.to_string().len());
            println!(
                "  {:<24} {}{} {:<10} {:<16} {}",
                binding.name,
                version,
                " ".repeat(padding),
                binding.provider,
                source,
                if binding.overridden { "yes" } else { "no" }
            );
        }
        println!();
    }
}

pub fn print_override_report(report: &OverrideReport, profile: &OverrideProfile) {
    let verb = match report.mode {
        OverrideMode::Enabled => "enabled",
        OverrideMode::Disabled => "disabled",
    };

    match report.outcome {
        OverrideOutcome::NoOp => {
            println!(
                "• Override already {} in {}",
                verb,
                report.manifest.display()
            );
            return;
        }
        OverrideOutcome::Changed => {
            println!("✓ Override {} in {}", verb, report.manifest.display());
        }
    }

    for change in report.changes.iter().filter(|c| c.is_change()) {
        println!(
            "  {}: {} -> {}",
            change.alias,
            change.from.as_deref().unwrap_or("(missing)"),
            change.to
        );
    }

    println!();
    println!("Next steps:");
    println!("  npm install");
    for command in &profile.restart {
        println!("  {}", command);
    }
    println!();
    match report.mode {
        OverrideMode::Enabled => println!(
            "Every app will render {} after restart.",
            style(&profile.target).red()
        ),
        OverrideMode::Disabled => {
            println!("Each app will render its own library version after restart.")
        }
    }
}

pub fn print_override_status(status: &OverrideStatus) {
    let state = match status.state {
        OverrideState::Enabled => style("enabled").green(),
        OverrideState::Disabled => style("disabled").dim(),
        OverrideState::Mixed => style("mixed").yellow(),
    };
    println!("Manifest: {}", status.manifest.display());
    println!("Override: {}", state);
    println!("Target:   {}", status.target);
    println!();

    println!("{:<20} {:<44} Original", "Alias", "Current");
    println!("{}", "-".repeat(100));
    for alias in &status.aliases {
        println!(
            "{:<20} {:<44} {}",
            alias.alias,
            alias.current.as_deref().unwrap_or("(missing)"),
            alias.original
        );
    }
}

#[cfg(test)]
mod tests {
    use super::{AppBindings, badge};
    use semver::Version;

    fn styled(version: &str) -> String {
        badge(&Version::parse(version).unwrap())
            .force_styling(true)
            .to_string()
    }

    #[test]
    fn badge_colour_follows_major_version() {
        assert!(styled("1.0.0").contains("\x1b[34m"));
        assert!(styled("2.0.0").contains("\x1b[32m"));
        assert!(styled("3.0.0").contains("\x1b[31m"));
        assert!(styled("4.1.0").contains("\x1b[2m"));
        assert!(styled("3.0.0").contains("3.0.0"));
    }

    #[test]
    fn failed_app_keeps_error_chain() {
        let error = anyhow::anyhow!("connection refused").context("Failed to load remote 'mfe1'");
        let app = AppBindings::failed("mfe1", &error);

        assert_eq!(app.app, "mfe1");
        assert!(app.bindings.is_empty());
        assert!(app.module_url.is_none());
        assert_eq!(
            app.error.as_deref(),
            Some("Failed to load remote 'mfe1': connection refused")
        );
    }

    #[test]
    fn failed_app_serializes_error_without_module_url() {
        let app = AppBindings::failed("mfe2", &anyhow::anyhow!("timed out"));
        let json = serde_json::to_value(&app).unwrap();

        assert_eq!(json["error"], "timed out");
        assert!(json.get("module_url").is_none());
    }
}
