// =============================================================================
// Volume Activity
// =============================================================================
//
// Compares the latest session's volume with the mean volume of the series:
//   ratio > 1.5 => High,  ratio < 0.7 => Low,  otherwise Normal.

use serde::{Deserialize, Serialize};

use crate::types::PriceSeries;

pub const HIGH_VOLUME_RATIO: f64 = 1.5;
pub const LOW_VOLUME_RATIO: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumeLevel {
    High,
    Normal,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolumeActivity {
    pub recent: f64,
    pub average: f64,
    pub ratio: f64,
    pub level: VolumeLevel,
}

/// Volume insight for the last point of `series`.
///
/// Returns `None` when the last point carries no volume or the mean of the
/// reported volumes is not positive.
pub fn volume_activity(series: &PriceSeries) -> Option<VolumeActivity> {
    let recent = series.last()?.volume?;

    let volumes: Vec<f64> = series.points().iter().filter_map(|p| p.volume).collect();
    let average = volumes.iter().sum::<f64>() / volumes.len() as f64;
    if !(average > 0.0) {
        return None;
    }

    let ratio = recent / average;
    let level = if ratio > HIGH_VOLUME_RATIO {
        VolumeLevel::High
    } else if ratio < LOW_VOLUME_RATIO {
        VolumeLevel::Low
    } else {
        VolumeLevel::Normal
    };

    Some(VolumeActivity {
        recent,
        average,
        ratio,
        level,
    })
}
