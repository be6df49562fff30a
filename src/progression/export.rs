//! Backup envelope for progression state

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::challenges::ChallengeSet;
use super::models::{AchievementState, PlayerProfile};
use super::stats::StatsState;
use super::streaks::DailyStreakState;

/// Envelope version written by this build
pub const EXPORT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum ProgressionError {
    #[error("progression tracking is disabled (storage unavailable)")]
    Disabled,

    #[error("unsupported export version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("invalid export data: {0}")]
    InvalidEnvelope(#[from] serde_json::Error),

    #[error("invalid profile in export: {0}")]
    InvalidProfile(String),
}

/// All persistent sections
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportData {
    pub profile: PlayerProfile,
    pub achievements: AchievementState,
    pub daily_streak: DailyStreakState,
    pub challenges: ChallengeSet,
    pub stats: StatsState,
}

/// Versioned backup as written by `ProgressionStore::export_data`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportEnvelope {
    pub version: u32,
    pub exported_at: DateTime<Utc>,
    pub data: ExportData,
}

impl ExportEnvelope {
    pub fn new(data: ExportData, exported_at: DateTime<Utc>) -> Self {
        Self {
            version: EXPORT_VERSION,
            exported_at,
            data,
        }
    }

    /// Parse and version-check a JSON backup
    pub fn from_json(json: &str) -> Result<Self, ProgressionError> {
        // Check the version first so newer formats fail with a clear error
        let raw: serde_json::Value = serde_json::from_str(json)?;
        let found = raw
            .get("version")
            .and_then(serde_json::Value::as_u64)
            .unwrap_or(0) as u32;
        if found != EXPORT_VERSION {
            return Err(ProgressionError::UnsupportedVersion {
                found,
                expected: EXPORT_VERSION,
            });
        }
        Ok(serde_json::from_value(raw)?)
    }

    pub fn to_json(&self) -> Result<String, ProgressionError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
