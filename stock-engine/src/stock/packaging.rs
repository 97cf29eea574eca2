//! Unit/Package Conversion (packaged-goods variant)
//!
//! 按箱售卖、按件记账。换算比是批次级属性；需要池级比率时每次现算，
//! 绝不缓存。

use crate::db::models::Batch;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use shared::quantity::round_quantity;

/// Pool-wide units-per-package ratio, inferred fresh on every call.
///
/// `batches` must already be in FIFO order: the first positive per-batch
/// ratio wins. Failing that, any batch carrying an original package count
/// yields `quantity / packages`. Failing both, `default` applies (the
/// configured fallback, minimum 1).
pub fn infer_units_per_package(batches: &[Batch], default: i64) -> i64 {
    for batch in batches {
        if let Some(ratio) = batch.units_per_package {
            if ratio > 0 {
                return ratio;
            }
        }
    }

    for batch in batches {
        if let Some(packages) = batch.packages {
            if packages > 0 && batch.quantity > Decimal::ZERO {
                let inferred = (batch.quantity / Decimal::from(packages))
                    .round()
                    .to_i64()
                    .unwrap_or(0);
                if inferred > 0 {
                    return inferred;
                }
            }
        }
    }

    default.max(1)
}

/// Derived package counter: `floor(remaining / units_per_package)`.
/// Batches without a per-batch ratio carry no counter.
pub fn derive_remaining_packages(remaining: Decimal, units_per_package: Option<i64>) -> Option<i64> {
    match units_per_package {
        Some(ratio) if ratio > 0 => (remaining / Decimal::from(ratio)).floor().to_i64(),
        _ => None,
    }
}

/// Convert a package-denominated demand into units.
pub fn packages_to_units(packages: Decimal, ratio: i64) -> Decimal {
    round_quantity(packages * Decimal::from(ratio))
}

/// Shortfall expressed in whole packages (rounded up), for the
/// operator-facing "how many packages are missing" message.
pub fn missing_packages(shortfall_units: Decimal, ratio: i64) -> i64 {
    if ratio <= 0 || shortfall_units <= Decimal::ZERO {
        return 0;
    }
    (shortfall_units / Decimal::from(ratio))
        .ceil()
        .to_i64()
        .unwrap_or(0)
}
