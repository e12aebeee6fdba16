//! Dose schedule value types

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Treatment stage, always derived from the day of therapy
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Initial,
    Transition,
    Maintenance,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Initial => "initial",
            Phase::Transition => "transition",
            Phase::Maintenance => "maintenance",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Phase::Initial => "Initial phase",
            Phase::Transition => "Transition phase",
            Phase::Maintenance => "Maintenance therapy",
        }
    }
}

/// Potency of the formulation in use
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Concentration {
    /// 10 IR/ml, blue cap
    Low,
    /// 300 IR/ml, purple cap
    High,
}

impl Concentration {
    pub fn as_str(&self) -> &'static str {
        match self {
            Concentration::Low => "low",
            Concentration::High => "high",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Concentration::Low => "10 IR/ml",
            Concentration::High => "300 IR/ml",
        }
    }

    pub fn cap_color(&self) -> &'static str {
        match self {
            Concentration::Low => "blue",
            Concentration::High => "purple",
        }
    }

    /// Accepts either the short name or the potency label
    pub fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" | "10 ir/ml" | "10" => Ok(Concentration::Low),
            "high" | "300 ir/ml" | "300" => Ok(Concentration::High),
            _ => anyhow::bail!("Unknown concentration: {}", s),
        }
    }
}

/// Dose prescribed for one day of therapy
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DoseInfo {
    pub concentration: Concentration,
    pub clicks: u32,
    pub phase: Phase,
    pub day_of_therapy: i64,
}

/// Position within the current phase, for progress display
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PhaseProgress {
    pub current_step: i64,
    /// Zero for the open-ended maintenance phase
    pub total_steps: u32,
    pub percentage: f64,
}
