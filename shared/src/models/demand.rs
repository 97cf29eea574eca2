//! Demand denomination for allocate calls

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How an allocation request is denominated.
///
/// Packaged goods are sold by package but tracked internally by unit; a
/// package-denominated demand is converted with the pool-inferred
/// units-per-package ratio before allocation. `Units` exists for
/// continuous quantities (weight) and for legacy callers that still send
/// raw units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum StockDemand {
    Units(Decimal),
    Packages(Decimal),
}
