use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use serde::Deserialize;
use shared::{
    domain::{Control, VIEW_ID},
    trigger::Trigger,
};

pub const DEFAULT_CONFIG_PATH: &str = "piine.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScriptStep {
    pub trigger: String,
    #[serde(default)]
    pub delay_ms: u64,
}

impl ScriptStep {
    pub fn new(trigger: impl Into<String>, delay_ms: u64) -> Self {
        Self {
            trigger: trigger.into(),
            delay_ms,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledTrigger {
    pub delay: Duration,
    pub trigger: Trigger,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub log_filter: String,
    pub host_elements: Vec<String>,
    pub rng_seed: Option<u64>,
    pub script: Vec<ScriptStep>,
    pub json_output: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_filter: "info".into(),
            host_elements: Control::ALL
                .iter()
                .map(|control| control.element_id().to_string())
                .chain(std::iter::once(VIEW_ID.to_string()))
                .collect(),
            rng_seed: None,
            script: vec![
                ScriptStep::new("add-user", 0),
                ScriptStep::new("add-user", 200),
                ScriptStep::new("add-user", 200),
                ScriptStep::new("react-user", 300),
                ScriptStep::new("ovation", 300),
                ScriptStep::new("remove-user", 2500),
            ],
            json_output: false,
        }
    }
}

impl Settings {
    /// Resolves every script step into a trigger, failing on the first
    /// unknown name.
    pub fn compiled_script(&self) -> Result<Vec<ScheduledTrigger>> {
        self.script
            .iter()
            .enumerate()
            .map(|(index, step)| {
                let trigger = step
                    .trigger
                    .parse::<Trigger>()
                    .with_context(|| format!("script step {index}"))?;
                Ok(ScheduledTrigger {
                    delay: Duration::from_millis(step.delay_ms),
                    trigger,
                })
            })
            .collect()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    log_filter: Option<String>,
    host_elements: Option<Vec<String>>,
    rng_seed: Option<u64>,
    script: Option<Vec<ScriptStep>>,
    json_output: Option<bool>,
}

/// Defaults, then the config file, then the environment.
///
/// An explicit `path` must exist; without one `piine.toml` in the working
/// directory is used when present.
pub fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let mut settings = Settings::default();

    let file_path = match path {
        Some(path) => Some(path.to_path_buf()),
        None => {
            let fallback = PathBuf::from(DEFAULT_CONFIG_PATH);
            fallback.exists().then_some(fallback)
        }
    };
    if let Some(file_path) = file_path {
        let raw = fs::read_to_string(&file_path)
            .with_context(|| format!("failed to read config '{}'", file_path.display()))?;
        apply_file(&mut settings, &raw)
            .with_context(|| format!("invalid config '{}'", file_path.display()))?;
    }

    apply_env(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

fn apply_file(settings: &mut Settings, raw: &str) -> Result<()> {
    let file_cfg: FileSettings = toml::from_str(raw)?;
    if let Some(v) = file_cfg.log_filter {
        settings.log_filter = v;
    }
    if let Some(v) = file_cfg.host_elements {
        settings.host_elements = v;
    }
    if let Some(v) = file_cfg.rng_seed {
        settings.rng_seed = Some(v);
    }
    if let Some(v) = file_cfg.script {
        settings.script = v;
    }
    if let Some(v) = file_cfg.json_output {
        settings.json_output = v;
    }
    Ok(())
}

fn apply_env(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("PIINE_LOG") {
        settings.log_filter = v;
    }
    if let Some(v) = var("APP__LOG_FILTER") {
        settings.log_filter = v;
    }

    for key in ["PIINE_SEED", "APP__RNG_SEED"] {
        if let Some(v) = var(key) {
            if let Ok(seed) = v.trim().parse::<u64>() {
                settings.rng_seed = Some(seed);
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
