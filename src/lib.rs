//! AI-Powered Business Intelligence Dashboard
//!
//! A dashboard over precomputed Sales, HR and Finance KPIs with an AI
//! analyst that:
//! - Routes each question to one specialist agent by keyword
//! - Grounds every prompt in that domain's KPI data
//! - Falls back to a general agent that sees all three domains
//! - Reports provider failures as text instead of failing the page
//!
//! FLOW:
//! QUESTION → ROUTE → AGENT PROMPT → LLM → ANSWER

pub mod agents;
pub mod api;
pub mod charts;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod gemini;
pub mod history;
pub mod kpi;
pub mod models;
pub mod orchestrator;
pub mod router;

pub use error::Result;

// Re-export common types
pub use models::*;
pub use orchestrator::LeadOrchestrator;
pub use router::QueryRouter;
