use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct PatientStats {
    #[serde(default)]
    pub all: u64,
}

/// Transfusion counters grouped by tag (`all` and reactions under `rt`).
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct TransfusionStats {
    #[serde(default)]
    pub all: u64,
    #[serde(default)]
    pub rt: u64,
}

impl TransfusionStats {
    /// Share of transfusions without a reaction, in percent.
    ///
    /// `None` when no reaction was recorded, matching the dashboard which only
    /// shows the gauge once there is something to compare against.
    pub fn no_reaction_percent(&self) -> Option<f64> {
        if self.rt == 0 || self.all == 0 {
            return None;
        }
        Some((1.0 - self.rt as f64 / self.all as f64) * 100.0)
    }
}
