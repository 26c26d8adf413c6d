use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    #[default]
    Unknown,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
            Severity::Unknown => "unknown",
        }
    }

    /// Maps a numeric base score onto the CVSS qualitative bands.
    pub fn from_base_score(score: f32) -> Self {
        match score {
            s if s >= 9.0 => Severity::Critical,
            s if s >= 7.0 => Severity::High,
            s if s >= 4.0 => Severity::Medium,
            s if s > 0.0 => Severity::Low,
            _ => Severity::Unknown,
        }
    }

    /// Parses a distro or ecosystem rating such as `HIGH` or `moderate`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "critical" => Severity::Critical,
            "high" | "important" => Severity::High,
            "medium" | "moderate" => Severity::Medium,
            "low" | "negligible" => Severity::Low,
            _ => Severity::Unknown,
        }
    }

    /// Maps a CVSS score, numeric or vector, into a severity level.
    pub fn from_cvss_score(score: &str) -> Self {
        match score.trim().parse::<f32>() {
            Ok(base) => Self::from_base_score(base),
            Err(_) => vector_severity(score),
        }
    }
}

/// Rates a CVSS vector by its worst impact metric, since vectors carry no
/// base score. Covers v2 (`C:C`, `C:P`), v3 (`C:H`, `C:L`) and v4 (`VC:H`).
fn vector_severity(vector: &str) -> Severity {
    let mut impacts = vector
        .split('/')
        .filter_map(|metric| metric.split_once(':'))
        .filter(|(key, _)| matches!(*key, "C" | "I" | "A" | "VC" | "VI" | "VA"))
        .map(|(_, value)| value)
        .peekable();

    if impacts.peek().is_none() {
        return Severity::Unknown;
    }

    let mut partial = false;
    for value in impacts {
        match value {
            "H" | "C" => return Severity::High,
            "L" | "P" => partial = true,
            _ => {}
        }
    }

    if partial {
        Severity::Medium
    } else {
        Severity::Low
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityScore {
    #[serde(rename = "type")]
    pub score_type: String,
    pub score: String,
}

impl SeverityScore {
    /// The level this score stands for. CVSS entries are read as scores or
    /// vectors; other types (`Ubuntu`, ecosystem-specific) carry a label.
    pub fn level(&self) -> Severity {
        match self.score_type.as_str() {
            "CVSS_V2" | "CVSS_V3" | "CVSS_V4" => Severity::from_cvss_score(&self.score),
            _ => match Severity::from_label(&self.score) {
                Severity::Unknown => Severity::from_cvss_score(&self.score),
                level => level,
            },
        }
    }
}

/// An advisory matched against a package by the downstream matcher.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vulnerability {
    pub id: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub severity: Vec<SeverityScore>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_url: Option<String>,
}

impl Vulnerability {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// The most severe level among the known scores.
    pub fn severity_level(&self) -> Severity {
        self.severity
            .iter()
            .map(SeverityScore::level)
            .filter(|level| *level != Severity::Unknown)
            .min()
            .unwrap_or(Severity::Unknown)
    }
}

/// An SPDX license expression resolved for a package.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct License(pub String);

impl License {
    pub fn new(expression: impl Into<String>) -> Self {
        Self(expression.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for License {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A finding that is not tied to a package, e.g. a weak configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenericFinding {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
}
