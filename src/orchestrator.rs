//! Lead orchestrator
//!
//! QUERY → ROUTE (keywords) → ONE AGENT → LLM → TEXT

use std::sync::Arc;
use tracing::{error, info};

use crate::agents::prompts;
use crate::agents::{Agent, DomainAgent, GeneralAgent};
use crate::gemini::CompletionClient;
use crate::kpi::KpiStore;
use crate::models::{AgentKind, AgentStatus, Domain, OrchestrationResult, Query};
use crate::router::QueryRouter;

pub struct LeadOrchestrator {
    kpis: Arc<KpiStore>,
    client: Option<Arc<dyn CompletionClient>>,
    sales: DomainAgent,
    hr: DomainAgent,
    finance: DomainAgent,
    general: GeneralAgent,
}

impl LeadOrchestrator {
    pub fn new(kpis: Arc<KpiStore>, client: Option<Arc<dyn CompletionClient>>) -> Self {
        Self {
            sales: DomainAgent::new(Domain::Sales, kpis.clone(), client.clone()),
            hr: DomainAgent::new(Domain::Hr, kpis.clone(), client.clone()),
            finance: DomainAgent::new(Domain::Finance, kpis.clone(), client.clone()),
            general: GeneralAgent::new(kpis.clone(), client.clone()),
            kpis,
            client,
        }
    }

    pub fn kpis(&self) -> &KpiStore {
        &self.kpis
    }

    pub fn ai_enabled(&self) -> bool {
        self.client.is_some()
    }

    pub fn model(&self) -> Option<&str> {
        self.client.as_ref().map(|c| c.model())
    }

    pub fn domain_agent(&self, domain: Domain) -> &DomainAgent {
        match domain {
            Domain::Sales => &self.sales,
            Domain::Hr => &self.hr,
            Domain::Finance => &self.finance,
        }
    }

    fn agent(&self, kind: AgentKind) -> &dyn Agent {
        match kind.domain() {
            Some(domain) => self.domain_agent(domain),
            None => &self.general,
        }
    }

    /// Agent selected for a query
    pub fn route(&self, query: &str) -> AgentKind {
        QueryRouter::route(query)
    }

    /// Route a question to one agent and return its answer.
    ///
    /// Provider failures come back as an unsuccessful result carrying the
    /// error text.
    pub async fn process_query(&self, text: &str) -> OrchestrationResult {
        let routed_to = self.route(text);
        let query = Query::new(text).routed(routed_to);

        info!(routed_to = %routed_to, "Dispatching query");

        let agent_response = self.agent(routed_to).process_query(&query.text).await;

        OrchestrationResult {
            query,
            success: agent_response.success,
            response: agent_response.response.clone(),
            routed_to,
            agent_response,
        }
    }

    /// Executive summary over every domain's insights.
    ///
    /// Without a model this is a locally formatted bullet list.
    pub async fn executive_summary(&self) -> String {
        let sales = self.sales.insights();
        let hr = self.hr.insights();
        let finance = self.finance.insights();

        let Some(client) = &self.client else {
            return prompts::offline_executive_summary(sales, hr, finance);
        };

        let prompt = prompts::executive_summary_prompt(sales, hr, finance);
        match client.generate(&prompt).await {
            Ok(summary) => summary,
            Err(e) => {
                error!("Executive summary failed: {}", e);
                format!("Error generating summary: {}", e)
            }
        }
    }

    pub fn agent_statuses(&self) -> Vec<AgentStatus> {
        Domain::ALL
            .iter()
            .map(|domain| self.domain_agent(*domain).status())
            .collect()
    }
}
