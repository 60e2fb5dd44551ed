//! Command-line mod syntax
//!
//! A mod is written as its acronym, optionally followed by `:` and a
//! comma-separated list of settings:
//!
//! - `DT`, `hd`: default settings
//! - `HT:0.8`: a bare number is the speed change
//! - `DA:cs=5,ar=10`: `ar`, `cs`, `od` and `hp` expand to the full setting names
//! - `TP:seed=42`: any other key is passed through as is

use anyhow::Context;
use osu_score_core::{GameMod, RawMod, Ruleset};
use serde_json::{Number, Value};

/// Parse one mod argument into its API representation
pub fn parse_mod_arg(arg: &str) -> Result<RawMod, String> {
    let (acronym, settings) = match arg.split_once(':') {
        Some((acronym, settings)) => (acronym.trim(), Some(settings.trim())),
        None => (arg.trim(), None),
    };

    if acronym.is_empty() {
        return Err(format!("Missing mod acronym in '{}'", arg));
    }

    let mut raw = RawMod::new(acronym.to_ascii_uppercase());
    let Some(settings) = settings else {
        return Ok(raw);
    };
    if settings.is_empty() {
        return Err(format!("Expected settings after ':' in '{}'", arg));
    }

    for part in settings.split(',').map(str::trim) {
        match part.split_once('=') {
            Some((key, value)) => {
                raw = raw.with_setting(setting_name(key.trim()), parse_value(value.trim())?);
            }
            None => {
                let speed: f64 = part
                    .parse()
                    .map_err(|_| format!("Invalid speed change '{}' in '{}'", part, arg))?;
                raw = raw.with_setting("speed_change", speed);
            }
        }
    }

    Ok(raw)
}

/// Parse every arg and build the mods for `ruleset`
pub fn parse_mods(ruleset: Ruleset, args: &[String]) -> anyhow::Result<Vec<GameMod>> {
    args
        .iter()
        .map(|arg| {
            let raw = parse_mod_arg(arg).map_err(anyhow::Error::msg)?;
            GameMod::from_raw(ruleset, &raw).with_context(|| format!("Invalid mod '{}'", arg))
        })
        .collect()
}

fn setting_name(key: &str) -> String {
    match key.to_ascii_lowercase().as_str() {
        "ar" => "approach_rate".to_string(),
        "cs" => "circle_size".to_string(),
        "od" => "overall_difficulty".to_string(),
        "hp" => "drain_rate".to_string(),
        "speed" | "rate" => "speed_change".to_string(),
        other => other.to_string(),
    }
}

fn parse_value(value: &str) -> Result<Value, String> {
    match value {
        "true" => return Ok(Value::Bool(true)),
        "false" => return Ok(Value::Bool(false)),
        _ => {}
    }

    if let Ok(integer) = value.parse::<i64>() {
        return Ok(Value::from(integer));
    }

    value
        .parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .ok_or_else(|| format!("Invalid setting value '{}'", value))
}
