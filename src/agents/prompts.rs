//! Prompt templates for the domain agents

use crate::models::Domain;

pub const AI_DISABLED_MESSAGE: &str = "AI features are disabled. Please set GOOGLE_API_KEY.";

/// A canned question a domain agent can be asked from its analytics page
#[derive(Debug, Clone, Copy)]
pub struct PresetAnalysis {
    pub slug: &'static str,
    pub title: &'static str,
    pub question: &'static str,
}

pub fn system_context(domain: Domain) -> &'static str {
    match domain {
        Domain::Sales => SALES_CONTEXT,
        Domain::Hr => HR_CONTEXT,
        Domain::Finance => FINANCE_CONTEXT,
    }
}

/// Last line of every domain prompt
pub fn closing_instruction(domain: Domain) -> &'static str {
    match domain {
        Domain::Sales => "Provide a comprehensive, data-driven analysis.",
        Domain::Hr => "Provide empathetic, data-driven HR analysis.",
        Domain::Finance => "Provide CFO-level financial analysis.",
    }
}

pub fn preset_analyses(domain: Domain) -> &'static [PresetAnalysis] {
    match domain {
        Domain::Sales => SALES_ANALYSES,
        Domain::Hr => HR_ANALYSES,
        Domain::Finance => FINANCE_ANALYSES,
    }
}

pub fn find_analysis(domain: Domain, slug: &str) -> Option<&'static PresetAnalysis> {
    preset_analyses(domain).iter().find(|a| a.slug == slug)
}

const SALES_CONTEXT: &str = r#"You are an expert Sales Intelligence AI Agent with deep expertise in:
- Revenue analysis and forecasting
- Customer segmentation and behavior analysis (RFM methodology)
- Sales performance optimization
- Market trends and competitive insights
- Customer lifetime value strategies

Your role:
1. Analyze sales data with business context
2. Identify growth opportunities and risks
3. Provide actionable, specific recommendations
4. Explain complex metrics in business-friendly language
5. Use actual numbers from the data provided

Communication style: Professional, data-driven, concise, actionable."#;

const HR_CONTEXT: &str = r#"You are an expert People Analytics AI Agent specializing in:
- Workforce planning and optimization
- Employee retention and attrition analysis
- Diversity, equity, and inclusion metrics
- Talent acquisition and development
- Organizational health assessment

Your role:
1. Analyze HR metrics with people-centric insights
2. Identify talent risks and opportunities
3. Recommend evidence-based HR interventions
4. Predict workforce trends and needs
5. Balance business needs with employee wellbeing

Communication style: Empathetic, data-driven, actionable, focused on both organizational and employee success."#;

const FINANCE_CONTEXT: &str = r#"You are an expert Financial Intelligence AI Agent specializing in:
- Financial performance analysis and reporting
- Profitability and margin optimization
- Cost management and efficiency
- Financial forecasting and budgeting
- Cash flow and working capital management
- Financial risk assessment

Your role:
1. Analyze financial KPIs with strategic context
2. Identify financial risks and opportunities
3. Provide actionable financial recommendations
4. Explain complex financial concepts clearly
5. Support data-driven financial decision-making

Communication style: Precise, numbers-focused, CFO-level analytical, professional."#;

pub const GENERAL_CONTEXT: &str = r#"You are a Lead Business Intelligence Coordinator with access to Sales, HR, and Finance KPIs.

Your role:
1. Answer the question using whichever domains are relevant
2. Analyze relationships and correlations across Sales, HR, and Finance
3. Identify causal connections (e.g., how HR metrics affect finance)
4. Recommend cross-functional initiatives where they apply

Communication style: Executive-level, concise, actionable."#;

const SALES_ANALYSES: &[PresetAnalysis] = &[
    PresetAnalysis {
        slug: "revenue-forecast",
        title: "Revenue Forecast",
        question: r#"Analyze the revenue trends in the data. Based on historical patterns:
1. Forecast revenue for the next quarter
2. Provide confidence level for your forecast
3. Identify key factors influencing the forecast
4. Recommend actions to achieve or exceed projections"#,
    },
    PresetAnalysis {
        slug: "customer-segments",
        title: "Customer Segments",
        question: r#"Analyze the RFM customer segments in the data:
1. Characterize each segment (Champions, Regular, At Risk)
2. Identify which segments need immediate attention
3. Recommend specific strategies for each segment
4. Suggest how to move customers to higher-value segments"#,
    },
    PresetAnalysis {
        slug: "top-products",
        title: "Top Products",
        question: r#"Analyze the top products data:
1. Identify best and worst performers
2. Explain why certain products succeed
3. Recommend product strategy adjustments
4. Identify cross-sell and upsell opportunities"#,
    },
];

const HR_ANALYSES: &[PresetAnalysis] = &[
    PresetAnalysis {
        slug: "attrition-risk",
        title: "Attrition Risk",
        question: r#"Based on the HR data, especially risk scores and attrition metrics:
1. Identify high-risk employee segments
2. Analyze root causes of attrition risk
3. Recommend targeted retention interventions
4. Estimate potential cost impact of attrition
5. Suggest preventive measures"#,
    },
    PresetAnalysis {
        slug: "diversity",
        title: "Diversity Analysis",
        question: r#"Analyze the diversity metrics (gender, department distribution):
1. Assess current diversity levels
2. Identify gaps and underrepresented groups
3. Compare to industry benchmarks (if applicable)
4. Recommend inclusive hiring practices
5. Suggest concrete diversity improvement strategies"#,
    },
    PresetAnalysis {
        slug: "workforce-optimization",
        title: "Workforce Optimization",
        question: r#"Based on workforce metrics:
1. Analyze current workforce composition and efficiency
2. Identify potential over/under-staffed departments
3. Recommend optimal workforce allocation
4. Suggest succession planning strategies
5. Propose talent development initiatives"#,
    },
];

const FINANCE_ANALYSES: &[PresetAnalysis] = &[
    PresetAnalysis {
        slug: "profitability",
        title: "Profitability Analysis",
        question: r#"Analyze profitability metrics in the data:
1. Evaluate gross margin and profitability trends
2. Identify margin improvement opportunities
3. Compare against industry benchmarks (typical ranges)
4. Analyze cost structure efficiency
5. Recommend pricing or cost optimization strategies"#,
    },
    PresetAnalysis {
        slug: "health-assessment",
        title: "Health Assessment",
        question: r#"Based on the financial health score and all metrics:
1. Provide comprehensive financial health assessment
2. Identify key strengths and weaknesses
3. Analyze sustainability and growth capacity
4. Recommend actions to improve financial position
5. Assess readiness for growth or investment"#,
    },
    PresetAnalysis {
        slug: "cost-optimization",
        title: "Cost Optimization",
        question: r#"Analyze cost structure:
1. Identify high-cost areas (tax, freight, operations)
2. Benchmark costs against revenue
3. Recommend specific cost reduction strategies
4. Assess impact on margins
5. Prioritize quick wins vs long-term initiatives"#,
    },
];

/// Prompt for the executive summary built from every domain's insights
pub fn executive_summary_prompt(sales: &[String], hr: &[String], finance: &[String]) -> String {
    format!(
        r#"Create a comprehensive executive dashboard summary for business leadership.

SALES INSIGHTS:
{}

HR/PEOPLE INSIGHTS:
{}

FINANCE INSIGHTS:
{}

Create an executive summary with:
1. **Overall Business Health Status** (2-3 sentences)
2. **Top 3 Strengths** (bullet points)
3. **Top 3 Concerns/Risks** (bullet points)
4. **Strategic Recommendations** (3-5 actionable items)

Format: Professional, concise, executive-level language."#,
        bullet_list(sales, "-"),
        bullet_list(hr, "-"),
        bullet_list(finance, "-"),
    )
}

/// Executive summary used when no model is configured
pub fn offline_executive_summary(sales: &[String], hr: &[String], finance: &[String]) -> String {
    format!(
        "**EXECUTIVE SUMMARY**\n\n**SALES INSIGHTS:**\n{}\n\n**HR INSIGHTS:**\n{}\n\n**FINANCE INSIGHTS:**\n{}",
        bullet_list(sales, "•"),
        bullet_list(hr, "•"),
        bullet_list(finance, "•"),
    )
}

fn bullet_list(items: &[String], bullet: &str) -> String {
    if items.is_empty() {
        return format!("{} No insights available", bullet);
    }
    items
        .iter()
        .map(|item| format!("{} {}", bullet, item))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_domain_has_three_analyses() {
        for domain in Domain::ALL {
            assert_eq!(preset_analyses(domain).len(), 3);
        }
        assert!(find_analysis(Domain::Hr, "attrition-risk").is_some());
        assert!(find_analysis(Domain::Hr, "revenue-forecast").is_none());
    }

    #[test]
    fn test_offline_summary_lists_insights() {
        let summary = offline_executive_summary(
            &["Total Revenue: $1,000".to_string()],
            &[],
            &["Gross Margin: 40.00%".to_string()],
        );
        assert!(summary.contains("• Total Revenue: $1,000"));
        assert!(summary.contains("• No insights available"));
        assert!(summary.contains("• Gross Margin: 40.00%"));
    }
}
