/// Metric names recorded for every measured trial of a plan.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrialLabels {
    pub success: String,
    pub error: String,
    pub latency: String,
}

impl TrialLabels {
    pub fn for_plan(name: &str) -> Self {
        Self {
            success: format!("{name}_success"),
            error: format!("{name}_error"),
            latency: format!("{name}_latency"),
        }
    }
}
