//! Notification rule configuration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Thresholds used by the rule evaluators and the overdue detector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RulesConfig {
    /// Usage percentage at which a budget warning is raised.
    #[serde(default = "default_warning_percent")]
    pub budget_warning_percent: f64,
    /// Usage percentage at which a budget is reported as exceeded.
    #[serde(default = "default_exceeded_percent")]
    pub budget_exceeded_percent: f64,
    /// Days overdue from which an overdue notification is `high` priority.
    #[serde(default = "default_overdue_high_after")]
    pub overdue_high_priority_after_days: i64,
    /// Monthly spending ceiling per expense category.
    #[serde(default = "default_budget_thresholds")]
    pub budget_thresholds: BTreeMap<String, f64>,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            budget_warning_percent: default_warning_percent(),
            budget_exceeded_percent: default_exceeded_percent(),
            overdue_high_priority_after_days: default_overdue_high_after(),
            budget_thresholds: default_budget_thresholds(),
        }
    }
}

impl RulesConfig {
    /// Check that the thresholds are ordered and positive.
    pub fn validate(&self) -> Result<(), AppError> {
        if !(0.0 < self.budget_warning_percent
            && self.budget_warning_percent < self.budget_exceeded_percent)
        {
            return Err(AppError::configuration(format!(
                "rules.budget_warning_percent ({}) must be positive and below budget_exceeded_percent ({})",
                self.budget_warning_percent, self.budget_exceeded_percent
            )));
        }
        if self.overdue_high_priority_after_days < 1 {
            return Err(AppError::configuration(
                "rules.overdue_high_priority_after_days must be at least 1",
            ));
        }
        if let Some((category, _)) = self.budget_thresholds.iter().find(|(_, v)| **v <= 0.0) {
            return Err(AppError::configuration(format!(
                "rules.budget_thresholds.{category} must be positive"
            )));
        }
        Ok(())
    }
}

fn default_warning_percent() -> f64 {
    80.0
}

fn default_exceeded_percent() -> f64 {
    100.0
}

fn default_overdue_high_after() -> i64 {
    7
}

fn default_budget_thresholds() -> BTreeMap<String, f64> {
    [
        ("Yiyecek ve İçecek", 2000.0),
        ("Ulaşım", 1000.0),
        ("Eğlence", 500.0),
        ("Alışveriş", 1500.0),
        ("Faturalar", 1000.0),
        ("Sağlık", 500.0),
        ("Eğitim", 1000.0),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}
