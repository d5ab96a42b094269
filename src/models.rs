//! Core data models for the dashboard

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::DashboardError;

//
// ================= Domains =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Sales,
    Hr,
    Finance,
}

impl Domain {
    pub const ALL: [Domain; 3] = [Domain::Sales, Domain::Hr, Domain::Finance];

    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Sales => "sales",
            Domain::Hr => "hr",
            Domain::Finance => "finance",
        }
    }

    /// Heading used in prompts and page titles
    pub fn label(&self) -> &'static str {
        match self {
            Domain::Sales => "Sales",
            Domain::Hr => "HR",
            Domain::Finance => "Finance",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Domain {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sales" => Ok(Domain::Sales),
            "hr" => Ok(Domain::Hr),
            "finance" => Ok(Domain::Finance),
            other => Err(DashboardError::UnknownDomain(other.to_string())),
        }
    }
}

/// Which agent handles a query: one of the domain agents, or the general one
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AgentKind {
    Sales,
    Hr,
    Finance,
    General,
}

impl AgentKind {
    pub fn domain(&self) -> Option<Domain> {
        match self {
            AgentKind::Sales => Some(Domain::Sales),
            AgentKind::Hr => Some(Domain::Hr),
            AgentKind::Finance => Some(Domain::Finance),
            AgentKind::General => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self.domain() {
            Some(domain) => domain.label(),
            None => "General",
        }
    }
}

impl From<Domain> for AgentKind {
    fn from(domain: Domain) -> Self {
        match domain {
            Domain::Sales => AgentKind::Sales,
            Domain::Hr => AgentKind::Hr,
            Domain::Finance => AgentKind::Finance,
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AgentKind::Sales => "sales",
            AgentKind::Hr => "hr",
            AgentKind::Finance => "finance",
            AgentKind::General => "general",
        };
        write!(f, "{}", s)
    }
}

//
// ================= KPI =================
//

/// Precomputed KPIs for one domain, as written by the ETL step.
///
/// `summary` holds the flat metric map. Every other top-level key
/// (`by_month`, `rfm_segments`, `tenure_distribution`, ...) is kept as a
/// named breakdown.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct KpiRecord {
    #[serde(default)]
    pub summary: Map<String, Value>,
    #[serde(default)]
    pub insights: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(flatten)]
    pub breakdowns: BTreeMap<String, Value>,
}

impl KpiRecord {
    pub fn is_empty(&self) -> bool {
        self.summary.is_empty()
            && self.insights.is_empty()
            && self.recommendations.is_empty()
            && self.breakdowns.is_empty()
    }

    pub fn metric(&self, key: &str) -> Option<&Value> {
        self.summary.get(key)
    }

    pub fn metric_f64(&self, key: &str) -> Option<f64> {
        self.summary.get(key).and_then(Value::as_f64)
    }

    /// Numeric series of a breakdown in key order; non-numeric entries are skipped
    pub fn breakdown(&self, name: &str) -> Vec<(String, f64)> {
        self.breakdowns
            .get(name)
            .and_then(Value::as_object)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|(label, value)| value.as_f64().map(|v| (label.clone(), v)))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "state", content = "reason", rename_all = "lowercase")]
pub enum KpiLoadStatus {
    Loaded,
    Missing,
    Invalid(String),
}

impl KpiLoadStatus {
    pub fn is_loaded(&self) -> bool {
        matches!(self, KpiLoadStatus::Loaded)
    }
}

//
// ================= Queries & Responses =================
//

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Query {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<AgentKind>,
}

impl Query {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            domain: None,
        }
    }

    pub fn routed(mut self, kind: AgentKind) -> Self {
        self.domain = Some(kind);
        self
    }
}

/// Text produced by one agent for one query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentResponse {
    pub agent_id: String,
    pub agent: AgentKind,
    pub success: bool,
    pub response: String,
    #[serde(default)]
    pub data: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestrationResult {
    pub query: Query,
    pub success: bool,
    pub response: String,
    pub routed_to: AgentKind,
    pub agent_response: AgentResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentStatus {
    pub agent_id: String,
    pub agent_type: AgentKind,
    pub status: String,
    pub data_loaded: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_parsing() {
        assert_eq!("Sales".parse::<Domain>().unwrap(), Domain::Sales);
        assert_eq!(" hr ".parse::<Domain>().unwrap(), Domain::Hr);
        assert!("marketing".parse::<Domain>().is_err());
    }

    #[test]
    fn test_kpi_record_keeps_breakdowns() {
        let record: KpiRecord = serde_json::from_value(serde_json::json!({
            "summary": {"total_employees": 290},
            "insights": ["Total Employees: 290"],
            "by_department": {"Production": 180, "Sales": 18, "note": "n/a"}
        }))
        .unwrap();

        assert_eq!(record.metric_f64("total_employees"), Some(290.0));
        assert!(record.recommendations.is_empty());
        assert_eq!(
            record.breakdown("by_department"),
            vec![("Production".to_string(), 180.0), ("Sales".to_string(), 18.0)]
        );
        assert!(record.breakdown("tenure_distribution").is_empty());
    }

    #[test]
    fn test_load_status_serialization() {
        let json = serde_json::to_value(KpiLoadStatus::Invalid("bad".into())).unwrap();
        assert_eq!(json["state"], "invalid");
        assert_eq!(json["reason"], "bad");
    }
}
