//! KPI store
//!
//! Loads the per-domain KPI files written by the ETL step.
//! Read once at startup; read-only afterwards.

use crate::error::DashboardError;
use crate::models::{Domain, KpiLoadStatus, KpiRecord};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Summary keys each domain's dashboard cards rely on
pub fn expected_summary_keys(domain: Domain) -> &'static [&'static str] {
    match domain {
        Domain::Sales => &[
            "total_revenue",
            "total_orders",
            "average_order_value",
            "customer_lifetime_value",
        ],
        Domain::Hr => &[
            "total_employees",
            "average_tenure_years",
            "high_risk_percentage",
            "gender_diversity_ratio",
        ],
        Domain::Finance => &[
            "total_revenue",
            "gross_margin_percentage",
            "effective_tax_rate",
            "financial_health_score",
        ],
    }
}

pub fn kpi_file_name(domain: Domain) -> String {
    format!("{}_kpis.json", domain.as_str())
}

#[derive(Debug, Clone)]
struct DomainKpis {
    record: KpiRecord,
    status: KpiLoadStatus,
    missing_keys: Vec<&'static str>,
}

/// Read-only KPI data for all domains
#[derive(Debug, Clone)]
pub struct KpiStore {
    data_dir: PathBuf,
    domains: HashMap<Domain, DomainKpis>,
}

impl KpiStore {
    /// Load every domain file from `data_dir`.
    ///
    /// A missing or malformed file leaves that domain empty and is logged;
    /// loading itself never fails.
    pub fn load(data_dir: impl AsRef<Path>) -> Self {
        let data_dir = data_dir.as_ref().to_path_buf();
        let domains = Domain::ALL
            .iter()
            .map(|domain| (*domain, load_domain(&data_dir, *domain)))
            .collect();

        Self { data_dir, domains }
    }

    /// Build a store from in-memory records (all marked loaded)
    pub fn from_records(records: impl IntoIterator<Item = (Domain, KpiRecord)>) -> Self {
        let mut domains: HashMap<Domain, DomainKpis> = Domain::ALL
            .iter()
            .map(|domain| {
                (
                    *domain,
                    DomainKpis {
                        record: KpiRecord::default(),
                        status: KpiLoadStatus::Missing,
                        missing_keys: expected_summary_keys(*domain).to_vec(),
                    },
                )
            })
            .collect();

        for (domain, record) in records {
            let missing_keys = missing_keys(domain, &record);
            domains.insert(
                domain,
                DomainKpis {
                    record,
                    status: KpiLoadStatus::Loaded,
                    missing_keys,
                },
            );
        }

        Self {
            data_dir: PathBuf::new(),
            domains,
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// KPI record for a domain; empty when the file was missing or invalid
    pub fn record(&self, domain: Domain) -> &KpiRecord {
        &self.entry(domain).record
    }

    pub fn status(&self, domain: Domain) -> &KpiLoadStatus {
        &self.entry(domain).status
    }

    pub fn missing_keys(&self, domain: Domain) -> &[&'static str] {
        &self.entry(domain).missing_keys
    }

    pub fn is_loaded(&self, domain: Domain) -> bool {
        self.status(domain).is_loaded()
    }

    fn entry(&self, domain: Domain) -> &DomainKpis {
        // Every domain is inserted by both constructors
        &self.domains[&domain]
    }
}

fn load_domain(data_dir: &Path, domain: Domain) -> DomainKpis {
    let path = data_dir.join(kpi_file_name(domain));

    match read_record(&path) {
        Ok(record) => {
            let missing_keys = missing_keys(domain, &record);
            if !missing_keys.is_empty() {
                warn!(
                    domain = %domain,
                    missing = ?missing_keys,
                    "KPI summary is missing expected keys"
                );
            }
            info!(domain = %domain, path = %path.display(), "KPI data loaded");
            DomainKpis {
                record,
                status: KpiLoadStatus::Loaded,
                missing_keys,
            }
        }
        Err(DashboardError::IoError(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!(domain = %domain, path = %path.display(), "KPI file not found");
            DomainKpis {
                record: KpiRecord::default(),
                status: KpiLoadStatus::Missing,
                missing_keys: expected_summary_keys(domain).to_vec(),
            }
        }
        Err(e) => {
            warn!(domain = %domain, path = %path.display(), "Invalid KPI file: {}", e);
            DomainKpis {
                record: KpiRecord::default(),
                status: KpiLoadStatus::Invalid(e.to_string()),
                missing_keys: expected_summary_keys(domain).to_vec(),
            }
        }
    }
}

fn read_record(path: &Path) -> crate::Result<KpiRecord> {
    let raw = std::fs::read_to_string(path)?;
    let value: serde_json::Value = serde_json::from_str(&raw)?;

    if !value.is_object() {
        return Err(DashboardError::KpiError(
            "top-level value is not a JSON object".to_string(),
        ));
    }

    Ok(serde_json::from_value(value)?)
}

fn missing_keys(domain: Domain, record: &KpiRecord) -> Vec<&'static str> {
    expected_summary_keys(domain)
        .iter()
        .copied()
        .filter(|key| record.metric(key).is_none())
        .collect()
}
