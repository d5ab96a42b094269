//! Domain agents
//!
//! Each agent is a prompt template plus a KPI slice. The only logic is
//! formatting the prompt and passing the provider's answer (or error) through.

pub mod prompts;

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::error::DashboardError;
use crate::gemini::CompletionClient;
use crate::kpi::KpiStore;
use crate::models::{AgentKind, AgentResponse, AgentStatus, Domain, KpiRecord};
use prompts::{PresetAnalysis, AI_DISABLED_MESSAGE};

/// Common agent behaviour
#[async_trait]
pub trait Agent: Send + Sync {
    fn kind(&self) -> AgentKind;

    fn agent_id(&self) -> &'static str;

    /// Full prompt sent to the model for `query`
    fn build_prompt(&self, query: &str) -> crate::Result<String>;

    /// KPI values returned alongside the answer
    fn data(&self) -> Map<String, Value>;

    fn client(&self) -> Option<&Arc<dyn CompletionClient>>;

    /// Format the prompt, call the model, and turn any failure into text
    async fn process_query(&self, query: &str) -> AgentResponse {
        let Some(client) = self.client() else {
            warn!(agent = self.agent_id(), "Query received with AI features disabled");
            return self.respond(false, AI_DISABLED_MESSAGE.to_string());
        };

        let prompt = match self.build_prompt(query) {
            Ok(prompt) => prompt,
            Err(e) => {
                error!(agent = self.agent_id(), "Prompt formatting failed: {}", e);
                return self.respond(false, format!("Error: {}", e));
            }
        };

        info!(agent = self.agent_id(), "Processing query");

        match client.generate(&prompt).await {
            Ok(text) => self.respond(true, text),
            Err(e) => {
                error!(agent = self.agent_id(), "Query processing failed: {}", e);
                self.respond(false, format!("Error: {}", e))
            }
        }
    }

    fn respond(&self, success: bool, response: String) -> AgentResponse {
        AgentResponse {
            agent_id: self.agent_id().to_string(),
            agent: self.kind(),
            success,
            response,
            data: self.data(),
        }
    }
}

/// Sales, HR or Finance agent
pub struct DomainAgent {
    domain: Domain,
    kpis: Arc<KpiStore>,
    client: Option<Arc<dyn CompletionClient>>,
}

impl DomainAgent {
    pub fn new(domain: Domain, kpis: Arc<KpiStore>, client: Option<Arc<dyn CompletionClient>>) -> Self {
        Self { domain, kpis, client }
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    pub fn record(&self) -> &KpiRecord {
        self.kpis.record(self.domain)
    }

    pub fn insights(&self) -> &[String] {
        &self.record().insights
    }

    pub fn analyses(&self) -> &'static [PresetAnalysis] {
        prompts::preset_analyses(self.domain)
    }

    /// Run one of the canned analyses by slug
    pub async fn run_analysis(&self, slug: &str) -> crate::Result<AgentResponse> {
        let analysis = prompts::find_analysis(self.domain, slug).ok_or_else(|| {
            DashboardError::UnknownAnalysis(format!("{}/{}", self.domain, slug))
        })?;

        info!(agent = self.agent_id(), analysis = analysis.slug, "Running preset analysis");
        Ok(self.process_query(analysis.question).await)
    }

    pub fn status(&self) -> AgentStatus {
        AgentStatus {
            agent_id: self.agent_id().to_string(),
            agent_type: self.kind(),
            status: "active".to_string(),
            data_loaded: self.kpis.is_loaded(self.domain),
        }
    }
}

#[async_trait]
impl Agent for DomainAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::from(self.domain)
    }

    fn agent_id(&self) -> &'static str {
        match self.domain {
            Domain::Sales => "sales_ai_agent_001",
            Domain::Hr => "hr_ai_agent_001",
            Domain::Finance => "finance_ai_agent_001",
        }
    }

    fn build_prompt(&self, query: &str) -> crate::Result<String> {
        Ok(format!(
            "{}\n\n{} Data:\n{}\n\nUser Question: {}\n\n{}",
            prompts::system_context(self.domain),
            self.domain.label(),
            serde_json::to_string_pretty(self.record())?,
            query,
            prompts::closing_instruction(self.domain),
        ))
    }

    fn data(&self) -> Map<String, Value> {
        self.record().summary.clone()
    }

    fn client(&self) -> Option<&Arc<dyn CompletionClient>> {
        self.client.as_ref()
    }
}

/// Fallback agent that sees every domain's KPI summary
pub struct GeneralAgent {
    kpis: Arc<KpiStore>,
    client: Option<Arc<dyn CompletionClient>>,
}

impl GeneralAgent {
    pub fn new(kpis: Arc<KpiStore>, client: Option<Arc<dyn CompletionClient>>) -> Self {
        Self { kpis, client }
    }
}

#[async_trait]
impl Agent for GeneralAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::General
    }

    fn agent_id(&self) -> &'static str {
        "general_ai_agent_001"
    }

    fn build_prompt(&self, query: &str) -> crate::Result<String> {
        let mut prompt = String::from(prompts::GENERAL_CONTEXT);
        prompt.push_str("\n\nQuestion: ");
        prompt.push_str(query);

        for domain in Domain::ALL {
            prompt.push_str(&format!(
                "\n\n{} DATA:\n{}",
                domain.label().to_uppercase(),
                serde_json::to_string_pretty(&self.kpis.record(domain).summary)?
            ));
        }

        prompt.push_str("\n\nAnalysis:");
        Ok(prompt)
    }

    /// Summaries keyed by domain
    fn data(&self) -> Map<String, Value> {
        Domain::ALL
            .iter()
            .map(|domain| {
                (
                    domain.as_str().to_string(),
                    Value::Object(self.kpis.record(*domain).summary.clone()),
                )
            })
            .collect()
    }

    fn client(&self) -> Option<&Arc<dyn CompletionClient>> {
        self.client.as_ref()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Completion client that records prompts and replays a fixed outcome
    pub struct MockCompletionClient {
        pub reply: std::result::Result<String, String>,
        pub prompts: Mutex<Vec<String>>,
    }

    impl MockCompletionClient {
        pub fn ok(text: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(text.to_string()),
                prompts: Mutex::new(Vec::new()),
            })
        }

        pub fn failing(message: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(message.to_string()),
                prompts: Mutex::new(Vec::new()),
            })
        }

        pub fn last_prompt(&self) -> Option<String> {
            self.prompts.lock().unwrap().last().cloned()
        }

        pub fn call_count(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl CompletionClient for MockCompletionClient {
        async fn generate(&self, prompt: &str) -> crate::Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply
                .clone()
                .map_err(DashboardError::LlmError)
        }

        fn model(&self) -> &str {
            "mock-model"
        }
    }

    pub fn handle(client: &Arc<MockCompletionClient>) -> Option<Arc<dyn CompletionClient>> {
        let client: Arc<dyn CompletionClient> = client.clone();
        Some(client)
    }

    pub fn sample_store() -> Arc<KpiStore> {
        let record = |value: Value| serde_json::from_value::<KpiRecord>(value).unwrap();
        Arc::new(KpiStore::from_records([
            (
                Domain::Sales,
                record(serde_json::json!({
                    "summary": {"total_revenue": 109846381.4, "total_orders": 31465,
                                "average_order_value": 3491.07, "customer_lifetime_value": 5712.6},
                    "insights": ["Total Revenue: $109,846,381"],
                    "by_month": {"(2013, 1)": 2340061.55, "(2013, 2)": 3847036.05},
                    "rfm_segments": {"Champions": 4200, "Regular": 9000, "At Risk": 5900},
                    "top_products": {"Mountain-200 Black, 38": 4400592.8, "Road-250 Red, 44": 2000000.0}
                })),
            ),
            (
                Domain::Hr,
                record(serde_json::json!({
                    "summary": {"total_employees": 290, "average_tenure_years": 11.4,
                                "high_risk_percentage": 8.6, "gender_diversity_ratio": 28.97},
                    "insights": ["Total Employees: 290"],
                    "recommendations": ["HR metrics are healthy."],
                    "by_department": {"Production": 180, "Sales": 18},
                    "tenure_distribution": {"0-2 years": 0, "10+ years": 250}
                })),
            ),
            (
                Domain::Finance,
                record(serde_json::json!({
                    "summary": {"total_revenue": 109846381.4, "gross_margin_percentage": 41.2,
                                "effective_tax_rate": 8.0, "financial_health_score": 82.5},
                    "insights": ["Gross Margin: 41.20%"],
                    "by_quarter": {"2013-Q1": 9000000.0, "2013-Q2": 11000000.0}
                })),
            ),
        ]))
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{handle, sample_store, MockCompletionClient};
    use super::*;

    #[tokio::test]
    async fn test_domain_prompt_contains_template_data_and_question() {
        let client = MockCompletionClient::ok("Attrition is low.");
        let agent = DomainAgent::new(Domain::Hr, sample_store(), handle(&client));

        let response = agent.process_query("What is our attrition rate?").await;

        assert!(response.success);
        assert_eq!(response.agent, AgentKind::Hr);
        assert_eq!(response.agent_id, "hr_ai_agent_001");
        assert_eq!(response.response, "Attrition is low.");
        assert_eq!(response.data["total_employees"], 290);

        let prompt = client.last_prompt().unwrap();
        assert!(prompt.starts_with("You are an expert People Analytics AI Agent"));
        assert!(prompt.contains("HR Data:\n{"));
        assert!(prompt.contains("\"total_employees\": 290"));
        assert!(prompt.contains("User Question: What is our attrition rate?"));
        assert!(prompt.ends_with("Provide empathetic, data-driven HR analysis."));
    }

    #[tokio::test]
    async fn test_api_failure_becomes_error_text() {
        let client = MockCompletionClient::failing("Gemini API returned 429: Quota exceeded");
        let agent = DomainAgent::new(Domain::Sales, sample_store(), handle(&client));

        let response = agent.process_query("How is revenue trending?").await;

        assert!(!response.success);
        assert!(response.response.starts_with("Error: "));
        assert!(response.response.contains("Quota exceeded"));
    }

    #[tokio::test]
    async fn test_missing_client_reports_configuration_error() {
        let agent = DomainAgent::new(Domain::Finance, sample_store(), None);

        let response = agent.process_query("What is our margin?").await;

        assert!(!response.success);
        assert_eq!(response.response, AI_DISABLED_MESSAGE);
        assert_eq!(response.data["financial_health_score"], 82.5);
    }

    #[tokio::test]
    async fn test_preset_analysis() {
        let client = MockCompletionClient::ok("Forecast: up 4%");
        let agent = DomainAgent::new(Domain::Sales, sample_store(), handle(&client));

        let response = agent.run_analysis("revenue-forecast").await.unwrap();
        assert!(response.success);
        assert!(client
            .last_prompt()
            .unwrap()
            .contains("Forecast revenue for the next quarter"));

        let err = agent.run_analysis("diversity").await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(client.call_count(), 1);
    }

    #[tokio::test]
    async fn test_general_prompt_includes_every_domain() {
        let client = MockCompletionClient::ok("Overview");
        let agent = GeneralAgent::new(sample_store(), handle(&client));

        let response = agent.process_query("random unrelated text").await;
        assert!(response.success);
        assert_eq!(response.agent, AgentKind::General);
        assert!(response.data.contains_key("hr"));

        let prompt = client.last_prompt().unwrap();
        assert!(prompt.contains("SALES DATA:"));
        assert!(prompt.contains("HR DATA:"));
        assert!(prompt.contains("FINANCE DATA:"));
        assert!(prompt.contains("Question: random unrelated text"));
    }

    #[test]
    fn test_status_reflects_loaded_data() {
        let store = Arc::new(KpiStore::from_records([(Domain::Sales, KpiRecord::default())]));
        assert!(DomainAgent::new(Domain::Sales, store.clone(), None).status().data_loaded);
        assert!(!DomainAgent::new(Domain::Hr, store, None).status().data_loaded);
    }
}
