use super::*;

use std::{
    collections::HashMap,
    env,
    time::{SystemTime, UNIX_EPOCH},
};

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn defaults_bind_every_control_and_compile() {
    let settings = Settings::default();
    assert_eq!(settings.host_elements.len(), 5);
    assert!(settings.host_elements.iter().any(|id| id == VIEW_ID));

    let script = settings.compiled_script().expect("default script");
    assert_eq!(script.len(), 6);
    assert_eq!(script[4].trigger, Trigger::control(Control::Ovation));
}

#[test]
fn file_values_override_defaults() {
    let mut settings = Settings::default();
    apply_file(
        &mut settings,
        r#"
log_filter = "debug"
rng_seed = 9
host_elements = ["add-user", "piine-view"]

[[script]]
trigger = "add-user"

[[script]]
trigger = "unload"
delay_ms = 50
"#,
    )
    .expect("valid config");

    assert_eq!(settings.log_filter, "debug");
    assert_eq!(settings.rng_seed, Some(9));
    assert_eq!(settings.host_elements, vec!["add-user", "piine-view"]);
    assert_eq!(
        settings.script,
        vec![ScriptStep::new("add-user", 0), ScriptStep::new("unload", 50)]
    );
    assert!(!settings.json_output);
}

#[test]
fn unknown_file_keys_are_rejected() {
    let mut settings = Settings::default();
    assert!(apply_file(&mut settings, "ovation_duration_ms = 10").is_err());
}

#[test]
fn env_overrides_file_and_later_aliases_win() {
    let mut settings = Settings::default();
    apply_env(
        &mut settings,
        env_from(&[
            ("PIINE_LOG", "warn"),
            ("APP__LOG_FILTER", "trace"),
            ("PIINE_SEED", "3"),
            ("APP__RNG_SEED", "not-a-number"),
        ]),
    );

    assert_eq!(settings.log_filter, "trace");
    assert_eq!(settings.rng_seed, Some(3));
}

#[test]
fn unknown_script_trigger_names_the_step() {
    let settings = Settings {
        script: vec![ScriptStep::new("add-user", 0), ScriptStep::new("wave", 0)],
        ..Settings::default()
    };

    let err = settings.compiled_script().expect_err("unknown trigger");
    assert!(format!("{err:#}").contains("script step 1"));
    assert!(format!("{err:#}").contains("wave"));
}

#[test]
fn explicit_config_path_is_loaded_and_must_exist() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let path = env::temp_dir().join(format!("piine_cli_config_test_{suffix}.toml"));
    fs::write(&path, "json_output = true\n").expect("write config");

    let settings = load_settings(Some(&path)).expect("load");
    assert!(settings.json_output);

    fs::remove_file(&path).expect("cleanup");
    assert!(load_settings(Some(&path)).is_err());
}
