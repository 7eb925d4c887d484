//! Merchant registry and commission engine
//!
//! Merchants form a small closed set, each with its own commission scheme
//! and return terms. Commission behavior is selected by the scheme variant,
//! never by comparing merchant ids at call sites; adding a merchant means
//! adding a registry entry, not patching calculations.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How a merchant's commission is computed. One payload shape per variant.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CommissionScheme {
    /// Fixed amount per unit, entered manually per product; falls back to a
    /// configured default. Min/max are informational and not clamped.
    FixedVariable {
        default_per_unit: Decimal,
        min_per_unit: Decimal,
        max_per_unit: Decimal,
    },
    /// Percentage of the unit price, entered manually per product; falls
    /// back to the midpoint of the configured range.
    PercentageVariable { min_rate: Decimal, max_rate: Decimal },
    /// Two fixed percentage legs: one on the product price, one on the
    /// merchant-funded offer total when the order carries one.
    DualPercentage { product_rate: Decimal, offer_rate: Decimal },
    /// Commission lives in an offline price sheet and cannot be computed
    /// here; such merchants also only sell whole cartons.
    ComplexExternal { source: String },
    /// The platform's own catalog: no commission.
    None,
}

impl CommissionScheme {
    /// Whether per-product manual commission entry is expected.
    pub fn needs_manual_entry(&self) -> bool {
        matches!(
            self,
            CommissionScheme::FixedVariable { .. } | CommissionScheme::PercentageVariable { .. }
        )
    }

    /// Carton-bound merchants reject quantities that are not whole cartons.
    pub fn allows_partial_order(&self) -> bool {
        !matches!(self, CommissionScheme::ComplexExternal { .. })
    }
}

/// Who absorbs a returned shipment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnResponsibility {
    Merchant,
    Platform,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReturnPolicy {
    pub responsible: ReturnResponsibility,
    /// Fraction of the shipping cost refunded on return.
    pub shipping_refund_rate: Decimal,
}

/// Sender contact block used on carrier manifests.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SenderProfile {
    pub name: String,
    pub phone: String,
    pub city: String,
    pub area: String,
    pub address: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Merchant {
    pub id: String,
    pub name: String,
    pub sender: SenderProfile,
    pub scheme: CommissionScheme,
    pub return_policy: ReturnPolicy,
}

// =============================================================================
// Commission calculation
// =============================================================================

/// One product line as submitted for commission calculation.
#[derive(Clone, Debug)]
pub struct CommissionLine {
    pub unit_price: Decimal,
    pub quantity: u32,
    /// Manual per-unit amount or percentage, depending on the scheme.
    pub manual_value: Option<Decimal>,
}

/// Order-level context that some schemes need.
#[derive(Clone, Debug, Default)]
pub struct OrderContext {
    pub shipping_cost: Decimal,
    /// Total value of a merchant-funded offer on the order, if any.
    pub merchant_offer_total: Option<Decimal>,
}

/// How the amount was arrived at.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CommissionBasis {
    ManualPerUnit { per_unit: Decimal },
    DefaultPerUnit { per_unit: Decimal },
    ManualRate { rate: Decimal },
    AverageRate { rate: Decimal },
    DualPercentage { product_leg: Decimal, offer_leg: Decimal },
    External,
    None,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReturnTerms {
    pub responsible: ReturnResponsibility,
    pub refund_rate: Decimal,
    /// Shipping refund owed if this order comes back.
    pub refund_amount: Decimal,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CommissionResult {
    pub amount: Decimal,
    pub basis: CommissionBasis,
    pub explanation: String,
    /// Set for merchants whose commission comes from an offline sheet.
    pub requires_manual_calculation: bool,
    pub return_terms: ReturnTerms,
}

/// Compute the commission for one line of one merchant's product.
///
/// Pure dispatch over the merchant's scheme; `ctx` supplies shipping cost
/// for the return terms and the offer total for dual-percentage merchants.
pub fn calculate_commission(
    merchant: &Merchant,
    line: &CommissionLine,
    ctx: Option<&OrderContext>,
) -> CommissionResult {
    let qty = Decimal::from(line.quantity);
    let (amount, basis, explanation, manual) = match &merchant.scheme {
        CommissionScheme::FixedVariable { default_per_unit, .. } => {
            let per_unit = line.manual_value.unwrap_or(*default_per_unit);
            let basis = match line.manual_value {
                Some(v) => CommissionBasis::ManualPerUnit { per_unit: v },
                None => CommissionBasis::DefaultPerUnit { per_unit },
            };
            (
                per_unit * qty,
                basis,
                format!("{per_unit} EGP × {} pcs", line.quantity),
                false,
            )
        }
        CommissionScheme::PercentageVariable { min_rate, max_rate } => {
            let (rate, basis) = match line.manual_value {
                Some(pct) => {
                    let rate = pct / Decimal::new(100, 0);
                    (rate, CommissionBasis::ManualRate { rate })
                }
                None => {
                    let rate = (*min_rate + *max_rate) / Decimal::new(2, 0);
                    (rate, CommissionBasis::AverageRate { rate })
                }
            };
            (
                line.unit_price * rate * qty,
                basis,
                format!("{}% of {}", rate * Decimal::new(100, 0), line.unit_price * qty),
                false,
            )
        }
        CommissionScheme::DualPercentage { product_rate, offer_rate } => {
            let product_leg = line.unit_price * *product_rate * qty;
            let offer_leg = ctx
                .and_then(|c| c.merchant_offer_total)
                .map(|total| total * *offer_rate)
                .unwrap_or(Decimal::ZERO);
            (
                product_leg + offer_leg,
                CommissionBasis::DualPercentage { product_leg, offer_leg },
                format!(
                    "{}% of product price = {product_leg}, {}% of offers = {offer_leg}",
                    *product_rate * Decimal::new(100, 0),
                    *offer_rate * Decimal::new(100, 0),
                ),
                false,
            )
        }
        CommissionScheme::ComplexExternal { source } => (
            Decimal::ZERO,
            CommissionBasis::External,
            format!("commission is settled manually from {source}"),
            true,
        ),
        CommissionScheme::None => (
            Decimal::ZERO,
            CommissionBasis::None,
            "no commission for this merchant".to_string(),
            false,
        ),
    };

    let shipping_cost = ctx.map(|c| c.shipping_cost).unwrap_or(Decimal::ZERO);
    CommissionResult {
        amount,
        basis,
        explanation,
        requires_manual_calculation: manual,
        return_terms: ReturnTerms {
            responsible: merchant.return_policy.responsible,
            refund_rate: merchant.return_policy.shipping_refund_rate,
            refund_amount: shipping_cost * merchant.return_policy.shipping_refund_rate,
        },
    }
}

// =============================================================================
// Carton planning
// =============================================================================

/// Purchase projection for a carton-bound line: the wholesale buy is always
/// whole cartons, the customer pays for the requested quantity only.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CartonPlan {
    pub cartons_needed: u32,
    pub actual_quantity: u32,
    pub excess_quantity: u32,
    pub purchase_cost: Decimal,
    pub sales_revenue: Decimal,
    pub profit: Decimal,
}

pub fn plan_cartons(
    quantity: u32,
    pack_size: u32,
    wholesale_price: Decimal,
    unit_price: Decimal,
) -> CartonPlan {
    let pack = pack_size.max(1);
    let cartons_needed = quantity.div_ceil(pack);
    let actual_quantity = cartons_needed * pack;
    let purchase_cost = wholesale_price * Decimal::from(actual_quantity);
    let sales_revenue = unit_price * Decimal::from(quantity);
    CartonPlan {
        cartons_needed,
        actual_quantity,
        excess_quantity: actual_quantity - quantity,
        purchase_cost,
        sales_revenue,
        profit: sales_revenue - purchase_cost,
    }
}

// =============================================================================
// Registry
// =============================================================================

/// Closed, static merchant enumeration with an unknown-merchant fallback.
#[derive(Clone, Debug)]
pub struct MerchantRegistry {
    merchants: HashMap<String, Merchant>,
    fallback: Merchant,
}

impl MerchantRegistry {
    pub fn builtin() -> Self {
        let zagazig = |name: &str, phone: &str| SenderProfile {
            name: name.to_string(),
            phone: phone.to_string(),
            city: "Sharqia".to_string(),
            area: "Zagazig".to_string(),
            address: "الزقازيق الشرقية، حي الزهور".to_string(),
        };
        let half_refund = |responsible| ReturnPolicy {
            responsible,
            shipping_refund_rate: Decimal::new(5, 1),
        };

        let merchants = [
            Merchant {
                id: "CASTELPHARMA".to_string(),
                name: "كاستيل فارما".to_string(),
                sender: zagazig("كاستيل فارما", "01064147284"),
                scheme: CommissionScheme::DualPercentage {
                    product_rate: Decimal::new(5, 2),
                    offer_rate: Decimal::new(5, 2),
                },
                return_policy: half_refund(ReturnResponsibility::Merchant),
            },
            Merchant {
                id: "SUDIID".to_string(),
                name: "Azúcar".to_string(),
                sender: zagazig("Azúcar", "01017549330"),
                scheme: CommissionScheme::FixedVariable {
                    default_per_unit: Decimal::new(10, 0),
                    min_per_unit: Decimal::new(5, 0),
                    max_per_unit: Decimal::new(50, 0),
                },
                return_policy: half_refund(ReturnResponsibility::Merchant),
            },
            Merchant {
                id: "FOFO".to_string(),
                name: "Fofo".to_string(),
                sender: zagazig("Fofo", "01212137256"),
                scheme: CommissionScheme::FixedVariable {
                    default_per_unit: Decimal::new(5, 0),
                    min_per_unit: Decimal::new(3, 0),
                    max_per_unit: Decimal::new(20, 0),
                },
                return_policy: half_refund(ReturnResponsibility::Merchant),
            },
            Merchant {
                id: "UNILEVERID".to_string(),
                name: "يونيليفر".to_string(),
                sender: zagazig("يونيليفر", "01055688136"),
                scheme: CommissionScheme::ComplexExternal {
                    source: "the wholesale price sheet".to_string(),
                },
                return_policy: half_refund(ReturnResponsibility::Platform),
            },
            Merchant {
                id: "BUSSNISID".to_string(),
                name: "متجر Argento".to_string(),
                sender: zagazig("Argento Store", "01055688136"),
                scheme: CommissionScheme::None,
                return_policy: ReturnPolicy {
                    responsible: ReturnResponsibility::Platform,
                    shipping_refund_rate: Decimal::new(1, 0),
                },
            },
        ];

        let fallback = Merchant {
            id: "UNKNOWN".to_string(),
            name: "تاجر غير معروف".to_string(),
            sender: SenderProfile {
                name: "Argento Store".to_string(),
                phone: "01055688136".to_string(),
                city: "Sharqia".to_string(),
                area: "Zagazig".to_string(),
                address: "حي الزهور، الزقازيق".to_string(),
            },
            scheme: CommissionScheme::None,
            return_policy: half_refund(ReturnResponsibility::Platform),
        };

        Self {
            merchants: merchants.into_iter().map(|m| (m.id.clone(), m)).collect(),
            fallback,
        }
    }

    /// Unknown ids resolve to the fallback merchant rather than failing.
    pub fn lookup(&self, merchant_id: &str) -> &Merchant {
        self.merchants.get(merchant_id).unwrap_or(&self.fallback)
    }

    /// Sender contact for carrier manifests, defaulting to the platform's own.
    pub fn sender_profile(&self, merchant_id: &str) -> &SenderProfile {
        &self.lookup(merchant_id).sender
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.merchants.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> MerchantRegistry {
        MerchantRegistry::builtin()
    }

    #[test]
    fn test_dual_percentage_without_offer_context() {
        let m = registry().lookup("CASTELPHARMA").clone();
        let line = CommissionLine {
            unit_price: Decimal::new(200, 0),
            quantity: 2,
            manual_value: None,
        };
        let result = calculate_commission(&m, &line, None);
        assert_eq!(result.amount, Decimal::new(20, 0));
        assert!(!result.requires_manual_calculation);
    }

    #[test]
    fn test_dual_percentage_adds_offer_leg() {
        let m = registry().lookup("CASTELPHARMA").clone();
        let line = CommissionLine {
            unit_price: Decimal::new(200, 0),
            quantity: 2,
            manual_value: None,
        };
        let ctx = OrderContext {
            shipping_cost: Decimal::new(45, 0),
            merchant_offer_total: Some(Decimal::new(100, 0)),
        };
        let result = calculate_commission(&m, &line, Some(&ctx));
        // 20 product leg + 5 offer leg
        assert_eq!(result.amount, Decimal::new(25, 0));
        assert_eq!(
            result.basis,
            CommissionBasis::DualPercentage {
                product_leg: Decimal::new(20, 0),
                offer_leg: Decimal::new(5, 0),
            }
        );
    }

    #[test]
    fn test_fixed_variable_manual_override() {
        let m = registry().lookup("SUDIID").clone();
        let line = CommissionLine {
            unit_price: Decimal::new(150, 0),
            quantity: 3,
            manual_value: Some(Decimal::new(7, 0)),
        };
        let result = calculate_commission(&m, &line, None);
        assert_eq!(result.amount, Decimal::new(21, 0));
        assert_eq!(
            result.basis,
            CommissionBasis::ManualPerUnit { per_unit: Decimal::new(7, 0) }
        );
    }

    #[test]
    fn test_fixed_variable_falls_back_to_default() {
        let m = registry().lookup("FOFO").clone();
        let line = CommissionLine {
            unit_price: Decimal::new(80, 0),
            quantity: 2,
            manual_value: None,
        };
        let result = calculate_commission(&m, &line, None);
        // Fofo's configured default is 5 EGP per unit
        assert_eq!(result.amount, Decimal::new(10, 0));
    }

    #[test]
    fn test_percentage_variable_midpoint() {
        let m = Merchant {
            id: "M1".to_string(),
            name: "m1".to_string(),
            sender: registry().fallback.sender.clone(),
            scheme: CommissionScheme::PercentageVariable {
                min_rate: Decimal::new(15, 2),
                max_rate: Decimal::new(30, 2),
            },
            return_policy: ReturnPolicy {
                responsible: ReturnResponsibility::Merchant,
                shipping_refund_rate: Decimal::new(5, 1),
            },
        };
        let line = CommissionLine {
            unit_price: Decimal::new(100, 0),
            quantity: 1,
            manual_value: None,
        };
        let result = calculate_commission(&m, &line, None);
        // midpoint of 15%..30% is 22.5%
        assert_eq!(result.amount, Decimal::new(225, 1));

        let manual = CommissionLine { manual_value: Some(Decimal::new(20, 0)), ..line };
        let result = calculate_commission(&m, &manual, None);
        assert_eq!(result.amount, Decimal::new(20, 0));
    }

    #[test]
    fn test_complex_external_requires_manual_settlement() {
        let m = registry().lookup("UNILEVERID").clone();
        let line = CommissionLine {
            unit_price: Decimal::new(45, 0),
            quantity: 24,
            manual_value: None,
        };
        let result = calculate_commission(&m, &line, None);
        assert_eq!(result.amount, Decimal::ZERO);
        assert!(result.requires_manual_calculation);
    }

    #[test]
    fn test_unknown_merchant_gets_zero_commission() {
        let reg = registry();
        let m = reg.lookup("SOMEBODY_NEW");
        let line = CommissionLine {
            unit_price: Decimal::new(99, 0),
            quantity: 5,
            manual_value: Some(Decimal::new(10, 0)),
        };
        let result = calculate_commission(m, &line, None);
        assert_eq!(result.amount, Decimal::ZERO);
        assert_eq!(result.basis, CommissionBasis::None);
    }

    #[test]
    fn test_return_terms_refund_amount() {
        let reg = registry();
        let m = reg.lookup("SUDIID");
        let line = CommissionLine {
            unit_price: Decimal::new(100, 0),
            quantity: 1,
            manual_value: None,
        };
        let ctx = OrderContext { shipping_cost: Decimal::new(60, 0), merchant_offer_total: None };
        let result = calculate_commission(m, &line, Some(&ctx));
        assert_eq!(result.return_terms.responsible, ReturnResponsibility::Merchant);
        assert_eq!(result.return_terms.refund_amount, Decimal::new(30, 0));
    }

    #[test]
    fn test_sender_profile_falls_back_to_platform() {
        let reg = registry();
        let sender = reg.sender_profile("WHO_DIS");
        assert_eq!(sender.name, "Argento Store");
        assert_eq!(sender.city, "Sharqia");

        let known = reg.sender_profile("FOFO");
        assert_eq!(known.name, "Fofo");
    }

    #[test]
    fn test_manual_entry_expected_per_scheme() {
        let reg = registry();
        assert!(reg.lookup("SUDIID").scheme.needs_manual_entry());
        assert!(!reg.lookup("CASTELPHARMA").scheme.needs_manual_entry());
        assert!(!reg.lookup("UNILEVERID").scheme.needs_manual_entry());
    }

    #[test]
    fn test_carton_plan_rounds_up() {
        let plan = plan_cartons(30, 24, Decimal::new(35, 0), Decimal::new(45, 0));
        assert_eq!(plan.cartons_needed, 2);
        assert_eq!(plan.actual_quantity, 48);
        assert_eq!(plan.excess_quantity, 18);
        assert_eq!(plan.purchase_cost, Decimal::new(1680, 0));
        // revenue covers requested quantity only
        assert_eq!(plan.sales_revenue, Decimal::new(1350, 0));
        assert_eq!(plan.profit, Decimal::new(-330, 0));
    }

    #[test]
    fn test_exact_cartons_have_no_excess() {
        let plan = plan_cartons(48, 24, Decimal::new(35, 0), Decimal::new(45, 0));
        assert_eq!(plan.cartons_needed, 2);
        assert_eq!(plan.excess_quantity, 0);
    }
}
