//! Query router
//!
//! Picks the agent for a user question by keyword match:
//! - exactly one domain matched: that domain's agent
//! - no domain, or several: the general agent with all three KPI slices

use crate::models::{AgentKind, Domain};

/// Static keyword lists
const SALES_KEYWORDS: &[&str] = &["revenue", "sales", "customer", "product", "order"];

const HR_KEYWORDS: &[&str] = &[
    "employee", "hr", "attrition", "workforce", "talent", "diversity", "tenure", "staff",
];

const FINANCE_KEYWORDS: &[&str] = &[
    "profit", "finance", "financial", "cost", "margin", "budget", "tax", "cash flow",
];

pub fn keywords(domain: Domain) -> &'static [&'static str] {
    match domain {
        Domain::Sales => SALES_KEYWORDS,
        Domain::Hr => HR_KEYWORDS,
        Domain::Finance => FINANCE_KEYWORDS,
    }
}

/// Keyword router
pub struct QueryRouter;

impl QueryRouter {
    /// Select the agent for a query
    pub fn route(query: &str) -> AgentKind {
        match Self::matched_domains(query).as_slice() {
            [single] => AgentKind::from(*single),
            _ => AgentKind::General,
        }
    }

    /// Domains whose vocabulary appears in the query, in `Domain::ALL` order
    pub fn matched_domains(query: &str) -> Vec<Domain> {
        let text = query.to_lowercase();
        let normalized = text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        Domain::ALL
            .iter()
            .copied()
            .filter(|domain| {
                keywords(*domain)
                    .iter()
                    .any(|kw| matches_keyword(&normalized, kw))
            })
            .collect()
    }
}

/// A keyword must start a word; suffixes are allowed ("taxes", "orders")
/// but prefixes are not ("three", "border").
fn matches_keyword(normalized: &str, keyword: &str) -> bool {
    normalized
        .match_indices(keyword)
        .any(|(at, _)| at == 0 || normalized.as_bytes()[at - 1] == b' ')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_keyword_routes_to_its_domain() {
        for domain in Domain::ALL {
            for kw in keywords(domain) {
                let query = format!("tell me about {} this quarter", kw);
                assert_eq!(
                    QueryRouter::route(&query),
                    AgentKind::from(domain),
                    "keyword {:?} should route to {}",
                    kw,
                    domain
                );
            }
        }
    }

    #[test]
    fn test_examples() {
        assert_eq!(QueryRouter::route("What is our attrition rate?"), AgentKind::Hr);
        assert_eq!(QueryRouter::route("Show me REVENUE by month"), AgentKind::Sales);
        assert_eq!(QueryRouter::route("Where can we cut costs?"), AgentKind::Finance);
    }

    #[test]
    fn test_no_match_falls_back_to_general() {
        assert_eq!(QueryRouter::route("random unrelated text"), AgentKind::General);
        assert_eq!(QueryRouter::route(""), AgentKind::General);
    }

    #[test]
    fn test_ties_fall_back_to_general() {
        let query = "How does employee attrition affect profit margins?";
        assert_eq!(
            QueryRouter::matched_domains(query),
            vec![Domain::Hr, Domain::Finance]
        );
        assert_eq!(QueryRouter::route(query), AgentKind::General);
    }

    #[test]
    fn test_keywords_match_at_word_start() {
        // "three" contains "hr"
        assert_eq!(QueryRouter::route("top three products"), AgentKind::Sales);
        assert_eq!(QueryRouter::route("HR headcount please"), AgentKind::Hr);
        assert_eq!(QueryRouter::route("what is the tax rate"), AgentKind::Finance);
        assert_eq!(QueryRouter::route("How much do we pay in taxes?"), AgentKind::Finance);
        assert_eq!(QueryRouter::route("Any news on taxation?"), AgentKind::Finance);
        assert_eq!(QueryRouter::route("Show open orders"), AgentKind::Sales);
        assert_eq!(QueryRouter::route("Which regions border our HQ?"), AgentKind::General);
        assert_eq!(QueryRouter::route("Forecast our cash-flow"), AgentKind::Finance);
    }
}
