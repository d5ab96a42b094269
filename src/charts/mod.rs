//! Chart descriptions
//!
//! Charts are plain data (kind, labels, values) built from the KPI store.
//! The page script draws them. Missing source data gives a placeholder
//! chart, never an error.

use serde::{Deserialize, Serialize};

use crate::kpi::KpiStore;
use crate::models::{Domain, KpiRecord};

pub const TOP_PRODUCTS_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Line,
    Bar,
    Pie,
    Gauge,
    Cards,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChartSpec {
    pub id: String,
    pub kind: ChartKind,
    pub title: String,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    /// Pre-formatted values, used by KPI cards
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub display: Vec<String>,
    pub placeholder: bool,
}

impl ChartSpec {
    fn series(id: &str, kind: ChartKind, title: &str, points: Vec<(String, f64)>) -> Self {
        let placeholder = points.is_empty();
        let (labels, values) = points.into_iter().unzip();
        Self {
            id: id.to_string(),
            kind,
            title: title.to_string(),
            labels,
            values,
            display: Vec::new(),
            placeholder,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValueFormat {
    Money { decimals: usize },
    Integer,
    Percent,
    Years,
    Score,
}

pub fn format_value(value: f64, format: ValueFormat) -> String {
    match format {
        ValueFormat::Money { decimals } => format!("${}", format_thousands(value, decimals)),
        ValueFormat::Integer => format_thousands(value, 0),
        ValueFormat::Percent => format!("{:.1}%", value),
        ValueFormat::Years => format!("{:.1} yrs", value),
        ValueFormat::Score => format!("{:.1}/100", value),
    }
}

/// `1234567.891, 2` → `1,234,567.89`
pub fn format_thousands(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && formatted.chars().any(|c| c.is_ascii_digit() && c != '0') {
        "-"
    } else {
        ""
    };

    match frac_part {
        Some(frac) => format!("{}{}.{}", sign, grouped, frac),
        None => format!("{}{}", sign, grouped),
    }
}

/// Card label, summary key and format for each domain's KPI cards
fn card_fields(domain: Domain) -> &'static [(&'static str, &'static str, ValueFormat)] {
    match domain {
        Domain::Sales => &[
            ("Total Revenue", "total_revenue", ValueFormat::Money { decimals: 0 }),
            ("Total Orders", "total_orders", ValueFormat::Integer),
            ("Avg Order Value", "average_order_value", ValueFormat::Money { decimals: 2 }),
            ("Customer LTV", "customer_lifetime_value", ValueFormat::Money { decimals: 2 }),
        ],
        Domain::Hr => &[
            ("Total Employees", "total_employees", ValueFormat::Integer),
            ("Avg Tenure", "average_tenure_years", ValueFormat::Years),
            ("High Risk %", "high_risk_percentage", ValueFormat::Percent),
            ("Diversity Ratio", "gender_diversity_ratio", ValueFormat::Percent),
        ],
        Domain::Finance => &[
            ("Total Revenue", "total_revenue", ValueFormat::Money { decimals: 0 }),
            ("Gross Margin", "gross_margin_percentage", ValueFormat::Percent),
            ("Tax Rate", "effective_tax_rate", ValueFormat::Percent),
            ("Health Score", "financial_health_score", ValueFormat::Score),
        ],
    }
}

/// Headline KPI cards; a missing metric shows as "—"
pub fn kpi_cards(domain: Domain, record: &KpiRecord) -> ChartSpec {
    let fields = card_fields(domain);
    let mut labels = Vec::with_capacity(fields.len());
    let mut values = Vec::with_capacity(fields.len());
    let mut display = Vec::with_capacity(fields.len());

    for (label, key, format) in fields {
        let value = record.metric_f64(key);
        labels.push(label.to_string());
        values.push(value.unwrap_or(0.0));
        display.push(
            value
                .map(|v| format_value(v, *format))
                .unwrap_or_else(|| "—".to_string()),
        );
    }

    ChartSpec {
        id: "kpi-cards".to_string(),
        kind: ChartKind::Cards,
        title: format!("{} Key Performance Indicators", domain.label()),
        labels,
        values,
        display,
        placeholder: record.summary.is_empty(),
    }
}

pub fn revenue_trend(sales: &KpiRecord) -> ChartSpec {
    ChartSpec::series(
        "revenue-trend",
        ChartKind::Line,
        "Revenue Trend",
        sales.breakdown("by_month"),
    )
}

pub fn customer_segments(sales: &KpiRecord) -> ChartSpec {
    ChartSpec::series(
        "customer-segments",
        ChartKind::Pie,
        "Customer Segments (RFM)",
        sales.breakdown("rfm_segments"),
    )
}

/// Best sellers by revenue, highest first
pub fn top_products(sales: &KpiRecord, limit: usize) -> ChartSpec {
    let mut points = sales.breakdown("top_products");
    points.sort_by(|a, b| b.1.total_cmp(&a.1));
    points.truncate(limit);

    ChartSpec::series("top-products", ChartKind::Bar, "Top Products by Revenue", points)
}

pub fn department_distribution(hr: &KpiRecord) -> ChartSpec {
    ChartSpec::series(
        "department-distribution",
        ChartKind::Bar,
        "Employees by Department",
        hr.breakdown("by_department"),
    )
}

pub fn tenure_distribution(hr: &KpiRecord) -> ChartSpec {
    ChartSpec::series(
        "tenure-distribution",
        ChartKind::Bar,
        "Employee Tenure",
        hr.breakdown("tenure_distribution"),
    )
}

pub fn quarterly_revenue(finance: &KpiRecord) -> ChartSpec {
    ChartSpec::series(
        "quarterly-revenue",
        ChartKind::Bar,
        "Quarterly Revenue",
        finance.breakdown("by_quarter"),
    )
}

/// Health score gauge, clamped to 0..=100
pub fn financial_health(finance: &KpiRecord) -> ChartSpec {
    let points = finance
        .metric_f64("financial_health_score")
        .filter(|score| score.is_finite())
        .map(|score| vec![("Financial Health Score".to_string(), score.clamp(0.0, 100.0))])
        .unwrap_or_default();

    ChartSpec::series("financial-health", ChartKind::Gauge, "Financial Health Score", points)
}

/// Every chart on a domain's analytics page
pub fn domain_charts(domain: Domain, record: &KpiRecord) -> Vec<ChartSpec> {
    let mut charts = vec![kpi_cards(domain, record)];
    match domain {
        Domain::Sales => {
            charts.push(revenue_trend(record));
            charts.push(customer_segments(record));
            charts.push(top_products(record, TOP_PRODUCTS_LIMIT));
        }
        Domain::Hr => {
            charts.push(department_distribution(record));
            charts.push(tenure_distribution(record));
        }
        Domain::Finance => {
            charts.push(quarterly_revenue(record));
            charts.push(financial_health(record));
        }
    }
    charts
}

/// One chart per domain for the overview page
pub fn overview_charts(kpis: &KpiStore) -> Vec<ChartSpec> {
    vec![
        revenue_trend(kpis.record(Domain::Sales)),
        department_distribution(kpis.record(Domain::Hr)),
        financial_health(kpis.record(Domain::Finance)),
    ]
}
