use serde::Serialize;

use crate::domain::stats::{PatientStats, TransfusionStats};

/// Counters shown on the landing page. Missing parts failed to load.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardData {
    pub transfusions: Option<TransfusionStats>,
    pub patients: Option<PatientStats>,
    pub no_reaction_percent: Option<f64>,
    pub failed: bool,
}
