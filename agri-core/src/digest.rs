//! Derived views over a snapshot
//!
//! Dashboard cards summarize the current signal set: the alert ticker,
//! per-commodity groups, risk vs opportunity zones and a regional heatmap.
//! All views keep the first-seen order of the input.

use serde::Serialize;

use crate::{Signal, ALERT_THRESHOLD};

/// Region label for signals without a state
pub const INTERNATIONAL: &str = "International";

/// Commodity label for signals without a commodity tag
pub const UNTAGGED: &str = "other";

/// Severity tier of a score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Critical,
    Elevated,
    Watch,
}

impl Severity {
    pub fn of(score: f64) -> Self {
        if score >= 90.0 {
            Severity::Critical
        } else if score >= 80.0 {
            Severity::Elevated
        } else {
            Severity::Watch
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Severity::Critical => "CRITICAL",
            Severity::Elevated => "ELEVATED",
            Severity::Watch => "WATCH",
        }
    }
}

/// Signals sharing a key, with their average score
#[derive(Debug, Clone, Serialize)]
pub struct ScoreGroup<'a> {
    pub key: String,
    pub signals: Vec<&'a Signal>,
    pub avg_score: f64,
}

/// Risk zones (above the alert threshold) vs opportunity zones
#[derive(Debug, Default, Serialize)]
pub struct RiskSplit<'a> {
    pub risk: Vec<&'a Signal>,
    pub opportunity: Vec<&'a Signal>,
}

/// First `limit` signals above the alert threshold
pub fn top_alerts(signals: &[Signal], limit: usize) -> Vec<&Signal> {
    signals
        .iter()
        .filter(|s| s.score > ALERT_THRESHOLD)
        .take(limit)
        .collect()
}

/// Group by commodity tag
pub fn commodity_groups(signals: &[Signal]) -> Vec<ScoreGroup<'_>> {
    group_by(signals, |s| {
        s.commodity.clone().unwrap_or_else(|| UNTAGGED.to_string())
    })
}

/// Group by state, everything else is "International"
pub fn regional_heatmap(signals: &[Signal]) -> Vec<ScoreGroup<'_>> {
    group_by(signals, |s| {
        s.state.clone().unwrap_or_else(|| INTERNATIONAL.to_string())
    })
}

pub fn risk_split(signals: &[Signal]) -> RiskSplit<'_> {
    let (risk, opportunity): (Vec<&Signal>, Vec<&Signal>) =
        signals.iter().partition(|s| s.score > ALERT_THRESHOLD);
    RiskSplit { risk, opportunity }
}

/// Mean score, `None` for an empty set
pub fn average_score<'a, I>(signals: I) -> Option<f64>
where
    I: IntoIterator<Item = &'a Signal>,
{
    let (sum, count) = signals
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), s| (sum + s.score, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

fn group_by<F>(signals: &[Signal], key: F) -> Vec<ScoreGroup<'_>>
where
    F: Fn(&Signal) -> String,
{
    let mut groups: Vec<ScoreGroup<'_>> = Vec::new();

    for signal in signals {
        let k = key(signal);
        match groups.iter_mut().find(|g| g.key == k) {
            Some(group) => group.signals.push(signal),
            None => groups.push(ScoreGroup {
                key: k,
                signals: vec![signal],
                avg_score: 0.0,
            }),
        }
    }

    for group in &mut groups {
        group.avg_score = average_score(group.signals.iter().copied()).unwrap_or(0.0);
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> Vec<Signal> {
        vec![
            Signal::builder(1, "McDonald's slashes combo prices")
                .commodity("cattle")
                .city("Chicago")
                .state("IL")
                .score(92.0)
                .build(),
            Signal::builder(2, "Brazil coffee harvest yields drop 20%")
                .commodity("coffee")
                .country("Brazil")
                .score(88.0)
                .build(),
            Signal::builder(3, "Feedlot placements fall")
                .commodity("cattle")
                .state("NE")
                .score(78.0)
                .build(),
            Signal::builder(4, "Colorado water lawsuit")
                .state("CO")
                .score(86.0)
                .build(),
            Signal::builder(5, "Boxed beef cutout firms")
                .commodity("cattle")
                .state("IL")
                .score(84.0)
                .build(),
        ]
    }

    #[test]
    fn test_severity_tiers() {
        assert_eq!(Severity::of(95.0), Severity::Critical);
        assert_eq!(Severity::of(90.0), Severity::Critical);
        assert_eq!(Severity::of(80.0), Severity::Elevated);
        assert_eq!(Severity::of(79.9), Severity::Watch);
    }

    #[test]
    fn test_top_alerts_keeps_order_and_limit() {
        let signals = fixture();
        let alerts = top_alerts(&signals, 2);
        let ids: Vec<_> = alerts.iter().map(|s| s.id.to_string()).collect();
        assert_eq!(ids, vec!["1", "2"]);

        assert_eq!(top_alerts(&signals, 10).len(), 3);
    }

    #[test]
    fn test_commodity_groups() {
        let signals = fixture();
        let groups = commodity_groups(&signals);

        let keys: Vec<_> = groups.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["cattle", "coffee", "other"]);
        assert_eq!(groups[0].signals.len(), 3);
        assert!((groups[0].avg_score - (92.0 + 78.0 + 84.0) / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_regional_heatmap() {
        let signals = fixture();
        let heat = regional_heatmap(&signals);

        let keys: Vec<_> = heat.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["IL", INTERNATIONAL, "NE", "CO"]);
        assert_eq!(heat[0].avg_score, 88.0);
    }

    #[test]
    fn test_risk_split() {
        let signals = fixture();
        let split = risk_split(&signals);
        assert_eq!(split.risk.len(), 3);
        assert_eq!(split.opportunity.len(), 2);
    }

    #[test]
    fn test_average_of_empty() {
        assert_eq!(average_score(&Vec::<Signal>::new()), None);
    }
}
