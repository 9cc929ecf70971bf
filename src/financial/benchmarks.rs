use serde::{Deserialize, Serialize};

use crate::financial::Tone;
use crate::parse::finite_or_zero;

pub const DEFAULT_HEALTH_WATCH_PCT: f64 = 16.0;
pub const DEFAULT_HEALTH_RISK_PCT: f64 = 24.0;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthSignal {
    pub label: String,
    pub tone: Tone,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BenchmarkBand {
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BenchmarkTone {
    pub pill: String,
    pub label: String,
}

fn health(label: &str, tone: Tone) -> HealthSignal {
    HealthSignal {
        label: label.to_string(),
        tone,
    }
}

/// Both thresholds are inclusive upper bounds of their band.
pub fn health_signal(labor_pct: f64, watch_threshold: f64, risk_threshold: f64) -> HealthSignal {
    if labor_pct <= watch_threshold {
        health("Healthy", Tone::Good)
    } else if labor_pct <= risk_threshold {
        health("Watch", Tone::Watch)
    } else {
        health("High Load", Tone::Risk)
    }
}

fn tone(pill: &str, label: &str) -> BenchmarkTone {
    BenchmarkTone {
        pill: pill.to_string(),
        label: label.to_string(),
    }
}

/// Places `value` within a peer percentile band.
pub fn benchmark_tone(value: f64, band: &BenchmarkBand, lower_is_better: bool) -> BenchmarkTone {
    let v = finite_or_zero(value);
    if lower_is_better {
        if v <= band.p25 {
            tone("status-good", "Top Quartile")
        } else if v <= band.p50 {
            tone("status-good", "Better Than Median")
        } else if v <= band.p75 {
            tone("status-watch", "Watch Zone")
        } else {
            tone("status-risk", "High vs Peers")
        }
    } else if v >= band.p75 {
        tone("status-good", "Top Quartile")
    } else if v >= band.p50 {
        tone("status-good", "Better Than Median")
    } else if v >= band.p25 {
        tone("status-watch", "Watch Zone")
    } else {
        tone("status-risk", "Low vs Peers")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_bands_are_inclusive() {
        let at_watch = health_signal(16.0, DEFAULT_HEALTH_WATCH_PCT, DEFAULT_HEALTH_RISK_PCT);
        assert_eq!((at_watch.label.as_str(), at_watch.tone), ("Healthy", Tone::Good));

        let at_risk = health_signal(24.0, DEFAULT_HEALTH_WATCH_PCT, DEFAULT_HEALTH_RISK_PCT);
        assert_eq!((at_risk.label.as_str(), at_risk.tone), ("Watch", Tone::Watch));

        let over = health_signal(24.01, DEFAULT_HEALTH_WATCH_PCT, DEFAULT_HEALTH_RISK_PCT);
        assert_eq!((over.label.as_str(), over.tone), ("High Load", Tone::Risk));
    }

    #[test]
    fn benchmark_direction_matters() {
        let band = BenchmarkBand {
            p25: 20.0,
            p50: 25.0,
            p75: 30.0,
        };
        assert_eq!(benchmark_tone(18.0, &band, true).label, "Top Quartile");
        assert_eq!(benchmark_tone(27.0, &band, true).pill, "status-watch");
        assert_eq!(benchmark_tone(31.0, &band, true).label, "High vs Peers");

        assert_eq!(benchmark_tone(31.0, &band, false).label, "Top Quartile");
        assert_eq!(benchmark_tone(26.0, &band, false).label, "Better Than Median");
        assert_eq!(benchmark_tone(10.0, &band, false).label, "Low vs Peers");
    }
}
