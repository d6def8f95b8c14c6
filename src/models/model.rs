//! Budget models and their versions
//!
//! A model is an independent workspace: a live working dataset plus an
//! ordered history of named snapshots.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::budget::{ServiceBudget, MONTHS};
use super::ids::{ModelId, ServiceId};
use super::service::Service;

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Calendar anchor for month index 0
///
/// Purely presentational: it only changes labels, never which data sits at
/// which index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetConfig {
    /// Zero-based calendar month (0 = January)
    pub start_month: u32,
    pub start_year: i32,
}

impl BudgetConfig {
    pub fn new(start_month: u32, start_year: i32) -> Self {
        Self {
            start_month: start_month % 12,
            start_year,
        }
    }

    /// Anchor at the month containing `now`
    pub fn starting_at(now: DateTime<Utc>) -> Self {
        Self::new(now.month0(), now.year())
    }

    /// Calendar label for a month index, e.g. "Nov 2025"
    pub fn label(&self, index: usize) -> String {
        let absolute = self.start_month as usize + index;
        let year = self.start_year + (absolute / 12) as i32;
        format!("{} {}", MONTH_NAMES[absolute % 12], year)
    }

    /// Labels for all twelve month indices
    pub fn labels(&self) -> Vec<String> {
        (0..MONTHS).map(|i| self.label(i)).collect()
    }
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self::starting_at(Utc::now())
    }
}

/// One dataset: service catalogue, calendar anchor and per-service budgets
///
/// `services` and `budget_data` always hold the same id set; use
/// [`ModelData::insert_service`] and [`ModelData::remove_service`] to keep it
/// that way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelData {
    /// Insertion order drives legend/colour assignment
    #[serde(default)]
    pub services: Vec<Service>,

    pub budget_config: BudgetConfig,

    #[serde(default)]
    pub budget_data: BTreeMap<ServiceId, ServiceBudget>,
}

impl ModelData {
    /// An empty dataset
    pub fn new(budget_config: BudgetConfig) -> Self {
        Self {
            services: Vec::new(),
            budget_config,
            budget_data: BTreeMap::new(),
        }
    }

    pub fn service(&self, id: ServiceId) -> Option<&Service> {
        self.services.iter().find(|s| s.id == id)
    }

    pub fn service_mut(&mut self, id: ServiceId) -> Option<&mut Service> {
        self.services.iter_mut().find(|s| s.id == id)
    }

    /// Find a service by case-insensitive name
    pub fn find_service_by_name(&self, name: &str) -> Option<&Service> {
        self.services
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name))
    }

    pub fn budget(&self, id: ServiceId) -> Option<&ServiceBudget> {
        self.budget_data.get(&id)
    }

    pub fn budget_mut(&mut self, id: ServiceId) -> Option<&mut ServiceBudget> {
        self.budget_data.get_mut(&id)
    }

    /// Add a service together with its budget row
    pub fn insert_service(&mut self, service: Service, budget: ServiceBudget) {
        self.budget_data.insert(service.id, budget);
        self.services.push(service);
    }

    /// Remove a service and its budget row; false if it did not exist
    pub fn remove_service(&mut self, id: ServiceId) -> bool {
        let before = self.services.len();
        self.services.retain(|s| s.id != id);
        self.budget_data.remove(&id);
        self.services.len() != before
    }

    /// Every service has a budget row and every row has a service
    pub fn is_consistent(&self) -> bool {
        self.services.len() == self.budget_data.len()
            && self
                .services
                .iter()
                .all(|s| self.budget_data.contains_key(&s.id))
    }
}

/// A numbered, timestamped snapshot of a model's working data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Version {
    /// 1-based position in timestamp order
    pub number: u32,
    pub name: String,
    pub timestamp: DateTime<Utc>,
    /// Eligible for export
    #[serde(default)]
    pub shared: bool,
    pub data: ModelData,
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "v{} {} ({})",
            self.number,
            self.name,
            self.timestamp.format("%Y-%m-%d %H:%M")
        )
    }
}

/// Sort versions by timestamp and renumber them densely from 1
pub fn renumber_versions(versions: &mut [Version]) {
    versions.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
    for (i, version) in versions.iter_mut().enumerate() {
        version.number = i as u32 + 1;
    }
}

/// An independent budgeting workspace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetModel {
    /// Stable across export/import; the conflict key on import
    pub id: ModelId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Live working dataset
    pub data: ModelData,
    /// Ascending by number, which is ascending by timestamp
    #[serde(default)]
    pub versions: Vec<Version>,
}

impl BudgetModel {
    /// A new empty model with a fresh id
    pub fn new(name: impl Into<String>, budget_config: BudgetConfig, now: DateTime<Utc>) -> Self {
        Self {
            id: ModelId::new(),
            name: name.into(),
            created_at: now,
            updated_at: now,
            data: ModelData::new(budget_config),
            versions: Vec::new(),
        }
    }

    /// Bump the modification time
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }

    /// `max(number) + 1`, or 1 for an empty history
    pub fn next_version_number(&self) -> u32 {
        self.versions.iter().map(|v| v.number).max().unwrap_or(0) + 1
    }

    pub fn version(&self, number: u32) -> Option<&Version> {
        self.versions.iter().find(|v| v.number == number)
    }

    pub fn version_mut(&mut self, number: u32) -> Option<&mut Version> {
        self.versions.iter_mut().find(|v| v.number == number)
    }

    /// The version saved at `timestamp`
    pub fn version_saved_at(&self, timestamp: DateTime<Utc>) -> Option<&Version> {
        self.versions.iter().find(|v| v.timestamp == timestamp)
    }

    pub fn shared_version_count(&self) -> usize {
        self.versions.iter().filter(|v| v.shared).count()
    }
}

impl fmt::Display for BudgetModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} services, {} versions)",
            self.name,
            self.data.services.len(),
            self.versions.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::service::ServiceDefinition;
    use chrono::{Duration, TimeZone};

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn version(number: u32, secs: i64) -> Version {
        Version {
            number,
            name: format!("v{}", number),
            timestamp: ts(secs),
            shared: false,
            data: ModelData::new(BudgetConfig::new(0, 2025)),
        }
    }

    #[test]
    fn test_month_labels_roll_over_year() {
        let config = BudgetConfig::new(10, 2025);
        assert_eq!(config.label(0), "Nov 2025");
        assert_eq!(config.label(1), "Dec 2025");
        assert_eq!(config.label(2), "Jan 2026");
        assert_eq!(config.labels().len(), 12);
    }

    #[test]
    fn test_insert_and_remove_service_keeps_consistency() {
        let mut data = ModelData::new(BudgetConfig::new(0, 2025));
        let service = Service::from_definition(ServiceDefinition::new("Compute", "h", 1.0), ts(0));
        let id = service.id;

        data.insert_service(service, ServiceBudget::seeded(100.0, 0.0));
        assert!(data.is_consistent());
        assert!(data.budget(id).is_some());

        assert!(data.remove_service(id));
        assert!(data.is_consistent());
        assert!(data.budget(id).is_none());
        assert!(!data.remove_service(id));
    }

    #[test]
    fn test_next_version_number() {
        let mut model = BudgetModel::new("Test", BudgetConfig::new(0, 2025), ts(0));
        assert_eq!(model.next_version_number(), 1);

        model.versions.push(version(1, 10));
        model.versions.push(version(4, 20));
        assert_eq!(model.next_version_number(), 5);
    }

    #[test]
    fn test_renumber_sorts_by_timestamp() {
        let mut versions = vec![version(7, 30), version(2, 10), version(3, 20)];
        renumber_versions(&mut versions);

        let numbers: Vec<u32> = versions.iter().map(|v| v.number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert!(versions
            .windows(2)
            .all(|w| w[0].timestamp < w[1].timestamp));
        assert_eq!(versions[0].timestamp, ts(10));
    }

    #[test]
    fn test_timestamp_round_trips_exactly() {
        let mut v = version(1, 0);
        v.timestamp = ts(0) + Duration::nanoseconds(123_456_789);
        let json = serde_json::to_string(&v).unwrap();
        let back: Version = serde_json::from_str(&json).unwrap();
        assert_eq!(back.timestamp, v.timestamp);
    }
}
