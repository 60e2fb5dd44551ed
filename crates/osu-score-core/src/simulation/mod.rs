//! Remote score simulation contract
//!
//! The simulation service computes difficulty and performance attributes for a
//! described play. It is consumed through [`ScoreSimulationDao`]; absence of a
//! result is a `None`, never an error.

mod http;

pub use http::*;

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::ruleset::Ruleset;

/// Access to the score simulation service
#[async_trait]
pub trait ScoreSimulationDao: Send + Sync {
    /// Simulate a play; `None` when the beatmap or simulation cannot be resolved
    async fn simulate(&self, request: &SimulationRequest) -> Option<SimulationResult>;
}

/// A play to simulate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationRequest {
    pub beatmap_id: u32,
    pub ruleset: Ruleset,
    /// Mod acronyms
    pub mods: Vec<String>,
    /// `None` for a full combo
    pub combo: Option<u32>,
    pub misses: u32,
    pub mehs: u32,
    pub goods: u32,
    #[serde(flatten)]
    pub params: SimulationParams,
}

/// Mod settings forwarded to the simulation, only when they differ from the defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dt_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ht_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty_adjust: Option<DifficultyAdjustParams>,
}

impl SimulationParams {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DifficultyAdjustParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ar: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cs: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub od: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hp: Option<f64>,
}

/// Simulation output in the layout of the osu-tools simulate command
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    #[serde(default)]
    pub score: SimulatedScore,
    #[serde(default)]
    pub performance_attributes: PerformanceAttributes,
    #[serde(default)]
    pub difficulty_attributes: DifficultyAttributes,
}

impl SimulationResult {
    pub fn star_rating(&self) -> Option<f64> {
        self.difficulty_attributes.star_rating
    }

    pub fn pp(&self) -> Option<f64> {
        self.performance_attributes.pp
    }

    /// Sum of the named hit results of the simulated play
    pub fn total_hits(&self, names: &[&str]) -> u32 {
        names
            .iter()
            .filter_map(|name| self.score.statistics.get(*name))
            .fold(0u32, |total, &count| total.saturating_add(count))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulatedScore {
    #[serde(default)]
    pub accuracy: Option<f64>,
    #[serde(default)]
    pub combo: Option<u32>,
    /// Hit result name to count
    #[serde(default)]
    pub statistics: BTreeMap<String, u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceAttributes {
    #[serde(default)]
    pub pp: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DifficultyAttributes {
    #[serde(default)]
    pub star_rating: Option<f64>,
    #[serde(default)]
    pub max_combo: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_json_layout() {
        let request = SimulationRequest {
            beatmap_id: 100,
            ruleset: Ruleset::Osu,
            mods: vec!["HD".to_string(), "DT".to_string()],
            combo: None,
            misses: 1,
            mehs: 0,
            goods: 12,
            params: SimulationParams {
                dt_rate: Some(1.2),
                ..Default::default()
            },
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["beatmap_id"], 100);
        assert_eq!(json["ruleset"], "osu");
        assert_eq!(json["combo"], serde_json::Value::Null);
        assert_eq!(json["dt_rate"], 1.2);
        assert!(json.get("ht_rate").is_none());
        assert!(json.get("difficulty_adjust").is_none());

        let parsed: SimulationRequest = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, request);
    }

    #[test]
    fn test_result_parses_osu_tools_output() {
        let json = r#"{
            "score": {
                "ruleset_id": 0,
                "accuracy": 100.0,
                "combo": 1200,
                "statistics": {"great": 900, "ok": 0, "meh": 0, "miss": 0, "slider_tail_hit": 150}
            },
            "performance_attributes": {"pp": 412.7, "aim": 200.1},
            "difficulty_attributes": {"star_rating": 6.12, "max_combo": 1200}
        }"#;

        let result: SimulationResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.star_rating(), Some(6.12));
        assert_eq!(result.pp(), Some(412.7));
        assert_eq!(result.difficulty_attributes.max_combo, Some(1200));
        assert_eq!(result.total_hits(&["great", "ok", "meh", "miss"]), 900);
    }

    #[test]
    fn test_result_tolerates_missing_sections() {
        let result: SimulationResult = serde_json::from_str("{}").unwrap();
        assert_eq!(result.star_rating(), None);
        assert_eq!(result.pp(), None);
        assert_eq!(result.total_hits(&["great"]), 0);
        assert!(SimulationParams::default().is_empty());
    }

    #[test]
    fn test_total_hits_saturates_on_huge_counts() {
        let json = format!(
            r#"{{"score": {{"statistics": {{"great": {}, "miss": 10}}}}}}"#,
            u32::MAX
        );
        let result: SimulationResult = serde_json::from_str(&json).unwrap();
        assert_eq!(result.total_hits(&["great", "ok", "meh", "miss"]), u32::MAX);
    }
}
