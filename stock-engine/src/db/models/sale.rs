//! Sale Model
//!
//! 销售单由订单模块（外部协作者）写入，本引擎只读取和删除。
//! 历史数据有三代形态，业务规则运行前必须先归一化。

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::AllocationEntry;
use shared::quantity::round_quantity;
use surrealdb::RecordId;

/// One sale line as persisted by order entry. Current-schema lines carry
/// their own allocation facts; legacy lines do not.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleItem {
    pub product: String,
    pub quantity: Decimal,
    #[serde(default)]
    pub allocations: Option<Vec<AllocationEntry>>,
}

/// Raw sale document. Field presence varies across three historical
/// schema generations; call [`SaleDoc::normalize`] before acting on one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleDoc {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    /// Line items (current and intermediate schema).
    #[serde(default)]
    pub items: Option<Vec<SaleItem>>,
    /// Root-level allocation list (intermediate legacy schema: one flat
    /// list for the whole sale instead of per-line lists).
    #[serde(default)]
    pub allocations: Option<Vec<AllocationEntry>>,
    /// Single-product fields (oldest schema stored the sale flat).
    #[serde(default)]
    pub product: Option<String>,
    #[serde(default)]
    pub quantity: Option<Decimal>,
    #[serde(default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Which historical generation a sale document belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaleShape {
    /// Every line carries its own allocation facts. Lossless reversal.
    PerLineAllocations,
    /// One root-level allocation list for the whole sale.
    FlatAllocations,
    /// No allocation facts anywhere; reversal must approximate.
    NoAllocations,
    /// No items and no quantity; nothing to restore.
    Empty,
}

/// Canonical form every reversal path operates on.
#[derive(Debug, Clone)]
pub struct NormalizedSale {
    pub shape: SaleShape,
    pub items: Vec<NormalizedSaleItem>,
}

#[derive(Debug, Clone)]
pub struct NormalizedSaleItem {
    pub product: String,
    pub quantity: Decimal,
    pub allocations: Vec<AllocationEntry>,
}

impl SaleDoc {
    /// Collapse the three historical shapes into one canonical form.
    ///
    /// Priority order: per-line allocation facts win; a root-level flat
    /// list becomes a single synthetic line; otherwise only quantities
    /// survive and the shape is `NoAllocations`. A sale with no items
    /// and no quantity normalizes to `Empty`.
    pub fn normalize(&self) -> NormalizedSale {
        // 第一代（当前）形态：行级分配明细
        if let Some(items) = &self.items {
            let has_line_allocations = items
                .iter()
                .any(|i| i.allocations.as_ref().is_some_and(|a| !a.is_empty()));
            if has_line_allocations {
                return NormalizedSale {
                    shape: SaleShape::PerLineAllocations,
                    items: items
                        .iter()
                        .map(|i| NormalizedSaleItem {
                            product: i.product.clone(),
                            quantity: round_quantity(i.quantity),
                            allocations: i.allocations.clone().unwrap_or_default(),
                        })
                        .collect(),
                };
            }
        }

        // 第二代形态：整单一个扁平分配列表，视为单一合成行
        if let Some(allocations) = &self.allocations {
            if !allocations.is_empty() {
                let quantity =
                    round_quantity(allocations.iter().map(|a| a.quantity).sum::<Decimal>());
                let product = self
                    .product
                    .clone()
                    .or_else(|| {
                        self.items
                            .as_ref()
                            .and_then(|items| items.first())
                            .map(|i| i.product.clone())
                    })
                    .unwrap_or_default();
                return NormalizedSale {
                    shape: SaleShape::FlatAllocations,
                    items: vec![NormalizedSaleItem {
                        product,
                        quantity,
                        allocations: allocations.clone(),
                    }],
                };
            }
        }

        // 第三代（最老）形态：只有数量，没有任何分配明细
        let mut items = Vec::new();
        if let Some(lines) = &self.items {
            for line in lines {
                if line.quantity > Decimal::ZERO {
                    items.push(NormalizedSaleItem {
                        product: line.product.clone(),
                        quantity: round_quantity(line.quantity),
                        allocations: Vec::new(),
                    });
                }
            }
        } else if let (Some(product), Some(quantity)) = (&self.product, self.quantity) {
            if quantity > Decimal::ZERO {
                items.push(NormalizedSaleItem {
                    product: product.clone(),
                    quantity: round_quantity(quantity),
                    allocations: Vec::new(),
                });
            }
        }

        if items.is_empty() {
            NormalizedSale {
                shape: SaleShape::Empty,
                items,
            }
        } else {
            NormalizedSale {
                shape: SaleShape::NoAllocations,
                items,
            }
        }
    }
}
