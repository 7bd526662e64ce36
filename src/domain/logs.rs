// Backend log text split into classified lines
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogsResponse {
    #[serde(default)]
    pub logs: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warning,
    Error,
}

impl LogLevel {
    pub fn css_class(&self) -> &'static str {
        match self {
            LogLevel::Info => "log-info",
            LogLevel::Warning => "log-warning",
            LogLevel::Error => "log-error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub level: LogLevel,
    pub text: String,
}

impl LogLine {
    pub fn classify(text: &str) -> Self {
        let level = if text.contains("ERROR") {
            LogLevel::Error
        } else if text.contains("WARNING") {
            LogLevel::Warning
        } else {
            LogLevel::Info
        };
        Self {
            level,
            text: text.to_string(),
        }
    }
}

/// Split newline-delimited log text, dropping blank lines.
pub fn parse_log_lines(raw: &str) -> Vec<LogLine> {
    raw.lines()
        .filter(|line| !line.trim().is_empty())
        .map(LogLine::classify)
        .collect()
}
