//! Cost and power estimation for a service's per-pod resource request
//!
//! A flat linear pricing model used by resource-provider callers to vet a
//! service before asking for it to be deployed.

use serde::{Deserialize, Serialize};

/// Price per CPU unit per hour
pub const COST_PER_CPU: f64 = 10.0;

/// Price per memory unit per hour
pub const COST_PER_MEMORY: f64 = 5.0;

/// Power draw per CPU unit, in watts
pub const WATTS_PER_CPU: f64 = 50.0;

/// Power draw per memory unit, in watts
pub const WATTS_PER_MEMORY: f64 = 10.0;

/// Hourly cost at or above this is only `Medium` viability
pub const HIGH_VIABILITY_COST_CEILING: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Viability {
    High,
    Medium,
}

/// Estimated running cost of a resource request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostEstimate {
    #[serde(rename = "estimatedCostPerHour")]
    pub estimated_cost_per_hour: f64,

    #[serde(rename = "estimatedPowerWatts")]
    pub estimated_power_watts: f64,

    pub viability: Viability,
}

/// Evaluate cost, power and viability for the given request
pub fn evaluate_service_cost(cpu_request: f64, memory_request: f64) -> CostEstimate {
    let cost = cpu_request * COST_PER_CPU + memory_request * COST_PER_MEMORY;
    let power = cpu_request * WATTS_PER_CPU + memory_request * WATTS_PER_MEMORY;

    CostEstimate {
        estimated_cost_per_hour: cost,
        estimated_power_watts: power,
        viability: if cost < HIGH_VIABILITY_COST_CEILING {
            Viability::High
        } else {
            Viability::Medium
        },
    }
}
