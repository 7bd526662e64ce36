// Scheduler metadata reported by the backend
use super::format::format_next_run;
use serde::Deserialize;

/// Opaque scheduler status. Both fields are free-form on the backend side.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SchedulerStatus {
    #[serde(default)]
    pub interval: Option<String>,
    #[serde(default)]
    pub next_run: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct IntervalParts {
    #[serde(default)]
    hours: Option<u64>,
    #[serde(default)]
    minutes: Option<u64>,
    #[serde(default)]
    seconds: Option<u64>,
}

impl SchedulerStatus {
    /// Badge text, e.g. "Auto-measurement: every 1h 30m".
    pub fn badge(&self) -> Option<String> {
        let interval = self.interval.as_deref()?;
        Some(match describe_interval(interval) {
            Some(every) => format!("Auto-measurement: every {}", every),
            None => format!("Auto-measurement: {}", interval),
        })
    }

    pub fn next_run_line(&self) -> Option<String> {
        self.next_run
            .as_deref()
            .map(|raw| format!("Next scheduled run: {}", format_next_run(raw)))
    }
}

/// Read a dict-like interval ("{'minutes': 15}") into "15m".
///
/// Returns `None` when the text is not such a dict or names no parts.
pub fn describe_interval(raw: &str) -> Option<String> {
    let normalized = raw.replace('\'', "\"");
    let parts: IntervalParts = serde_json::from_str(&normalized).ok()?;

    let text: Vec<String> = [(parts.hours, "h"), (parts.minutes, "m"), (parts.seconds, "s")]
        .into_iter()
        .filter_map(|(value, suffix)| value.filter(|v| *v > 0).map(|v| format!("{}{}", v, suffix)))
        .collect();

    if text.is_empty() {
        None
    } else {
        Some(text.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_interval() {
        assert_eq!(describe_interval("{'minutes': 15}"), Some("15m".to_string()));
        assert_eq!(
            describe_interval(r#"{"hours": 1, "minutes": 30}"#),
            Some("1h 30m".to_string())
        );
        assert_eq!(describe_interval("1 hour"), None);
        assert_eq!(describe_interval("{}"), None);
    }

    #[test]
    fn test_badge_falls_back_to_raw_interval() {
        let status = SchedulerStatus {
            interval: Some("1 hour".to_string()),
            next_run: None,
        };
        assert_eq!(status.badge().as_deref(), Some("Auto-measurement: 1 hour"));
        assert_eq!(status.next_run_line(), None);

        let status = SchedulerStatus {
            interval: Some("{'seconds': 45}".to_string()),
            next_run: Some("soon".to_string()),
        };
        assert_eq!(status.badge().as_deref(), Some("Auto-measurement: every 45s"));
        assert_eq!(status.next_run_line().as_deref(), Some("Next scheduled run: soon"));
    }
}
