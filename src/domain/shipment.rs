//! Speedaf shipment record formatter
//!
//! A shipment record is a stateless, export-time projection of one order
//! plus a resolved sender profile into the carrier's fixed 22-column,
//! tab-separated row. Nothing here is persisted.
//!
//! Degraded input never fails an export: phones outside the recognized
//! shapes become an all-zero placeholder and unrecognized cities fall back
//! to the platform's home region. Each canonicalization reports whether the
//! fallback was used so callers can log it.

use serde::Serialize;

use crate::config::CarrierDirectory;
use crate::domain::merchant::{MerchantRegistry, SenderProfile};
use crate::domain::order::{Order, OrderStatus};

/// Goods-name column width accepted by the carrier import sheet.
const GOODS_NAME_MAX: usize = 30;

/// Placeholder receiver phone when the input has no recognizable shape.
const PHONE_SENTINEL: &str = "00000000000";

/// A canonicalized value plus whether the fallback default was substituted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Canonical<T> {
    pub value: T,
    pub fallback_used: bool,
}

impl<T> Canonical<T> {
    fn exact(value: T) -> Self {
        Self { value, fallback_used: false }
    }

    fn fallback(value: T) -> Self {
        Self { value, fallback_used: true }
    }
}

/// Normalize a phone number to the carrier's 11-digit national format.
///
/// Digits are extracted first; then a 10-digit number starting with the
/// mobile trunk digit gets a leading zero, an 11-digit number passes
/// through, and a 12-digit number with the country code has "20" replaced
/// by a leading zero. Anything else becomes the all-zero placeholder.
pub fn normalize_phone(raw: &str) -> Canonical<String> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    match digits.len() {
        10 if digits.starts_with('1') => Canonical::exact(format!("0{digits}")),
        11 => Canonical::exact(digits),
        12 if digits.starts_with("20") => Canonical::exact(format!("0{}", &digits[2..])),
        _ => Canonical::fallback(PHONE_SENTINEL.to_string()),
    }
}

/// Map a city name into the carrier vocabulary, defaulting to the home
/// governorate.
pub fn canonical_city(directory: &CarrierDirectory, input: &str) -> Canonical<String> {
    match directory.city(input.trim()) {
        Some(city) => Canonical::exact(city.to_string()),
        None => Canonical::fallback(directory.default_city.to_string()),
    }
}

/// Map an area name into the carrier vocabulary, defaulting to the home
/// area.
pub fn canonical_area(directory: &CarrierDirectory, input: &str) -> Canonical<String> {
    match directory.area(input.trim()) {
        Some(area) => Canonical::exact(area.to_string()),
        None => Canonical::fallback(directory.default_area.to_string()),
    }
}

/// One carrier manifest row: exactly 22 ordered fields.
#[derive(Clone, Debug, Serialize)]
pub struct ShipmentRecord(pub [String; 22]);

impl ShipmentRecord {
    pub fn to_tsv(&self) -> String {
        self.0.join("\t")
    }

    /// Column headers, for display only; the import file itself carries none.
    pub fn headers() -> [&'static str; 22] {
        [
            "S.O.",
            "Goods type",
            "Goods name",
            "Quantity",
            "Weight",
            "COD",
            "Insure price",
            "Whether to allow the package to be opened",
            "Remark",
            "Name",
            "Telephone",
            "City",
            "Area",
            "Senders address",
            "Sender Email",
            "Name",
            "Telephone",
            "City",
            "Area",
            "Receivers address",
            "Receiver Email",
            "Delivery Type",
        ]
    }
}

/// Result of a batch export. Orders missing receiver essentials are
/// skipped, never aborting the batch.
#[derive(Clone, Debug, Serialize)]
pub struct ExportBatch {
    pub content: String,
    pub row_count: usize,
    pub skipped: usize,
}

/// Orders in these states are eligible for manifest export.
pub const EXPORTABLE_STATUSES: [OrderStatus; 3] = [
    OrderStatus::Pending,
    OrderStatus::Confirmed,
    OrderStatus::Processing,
];

pub struct ShipmentFormatter<'a> {
    directory: &'a CarrierDirectory,
}

impl<'a> ShipmentFormatter<'a> {
    pub fn new(directory: &'a CarrierDirectory) -> Self {
        Self { directory }
    }

    /// Project one order into a carrier row using the given sender profile.
    pub fn format(&self, order: &Order, sender: &SenderProfile) -> ShipmentRecord {
        let sender_phone = normalize_phone(&sender.phone);
        let sender_city = canonical_city(self.directory, &sender.city);
        let sender_area = canonical_area(self.directory, &sender.area);

        let receiver_phone = normalize_phone(&order.customer.phone);
        if receiver_phone.fallback_used {
            tracing::warn!(
                order_id = %order.order_id,
                raw = %order.customer.phone,
                "receiver phone replaced with placeholder"
            );
        }
        let receiver_city = canonical_city(self.directory, &order.shipping.city);
        let receiver_area = canonical_area(
            self.directory,
            order.shipping.area.as_deref().unwrap_or(""),
        );
        if receiver_city.fallback_used || receiver_area.fallback_used {
            tracing::warn!(
                order_id = %order.order_id,
                city = %order.shipping.city,
                "receiver city/area not in carrier vocabulary, using home region"
            );
        }

        ShipmentRecord([
            String::new(),                         // S.O.
            "Normal".to_string(),                  // Goods type
            goods_name(order),                     // Goods name
            "1".to_string(),                       // Quantity: one package
            "1".to_string(),                       // Weight
            order.total.to_string(),               // COD
            String::new(),                         // Insure price
            "No".to_string(),                      // Allow open
            String::new(),                         // Remark
            sender.name.clone(),                   // Sender name
            sender_phone.value,                    // Sender telephone
            sender_city.value,                     // Sender city
            sender_area.value,                     // Sender area
            sender.address.clone(),                // Sender address
            String::new(),                         // Sender email
            order.customer.name.trim().to_string(),// Receiver name
            receiver_phone.value,                  // Receiver telephone
            receiver_city.value,                   // Receiver city
            receiver_area.value,                   // Receiver area
            receiver_address(order),               // Receiver address
            String::new(),                         // Receiver email
            "Deliver".to_string(),                 // Delivery type
        ])
    }

    /// Build the manifest for a batch of orders, resolving each order's
    /// sender from its primary merchant. Ineligible orders are skipped and
    /// logged; a partial batch is still a successful batch.
    pub fn generate_csv_content(
        &self,
        orders: &[Order],
        registry: &MerchantRegistry,
    ) -> ExportBatch {
        let mut rows = Vec::new();
        let mut skipped = 0;
        for order in orders {
            if order.customer.name.trim().is_empty()
                || order.customer.phone.trim().is_empty()
                || order.shipping.city.trim().is_empty()
            {
                tracing::warn!(
                    order_id = %order.order_id,
                    "skipping export row: missing receiver name, phone or city"
                );
                skipped += 1;
                continue;
            }
            let sender = registry.sender_profile(order.primary_merchant_id().unwrap_or(""));
            rows.push(self.format(order, sender).to_tsv());
        }
        ExportBatch {
            row_count: rows.len(),
            content: rows.join("\n"),
            skipped,
        }
    }
}

/// First line item's title, shortened to the carrier's column width.
fn goods_name(order: &Order) -> String {
    let title = order
        .line_items
        .first()
        .map(|l| l.title.as_str())
        .unwrap_or("منتجات تسوق");
    truncate_chars(title, GOODS_NAME_MAX)
}

fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let head: String = s.chars().take(max.saturating_sub(3)).collect();
    format!("{head}...")
}

/// Join the present address sub-fields the way local couriers expect.
fn receiver_address(order: &Order) -> String {
    let shipping = &order.shipping;
    let mut parts: Vec<String> = Vec::new();
    if !shipping.address.trim().is_empty() {
        parts.push(shipping.address.trim().to_string());
    }
    if let Some(building) = non_empty(&shipping.building) {
        parts.push(format!("مبنى {building}"));
    }
    if let Some(floor) = non_empty(&shipping.floor) {
        parts.push(format!("دور {floor}"));
    }
    if let Some(apartment) = non_empty(&shipping.apartment) {
        parts.push(format!("شقة {apartment}"));
    }
    if let Some(landmark) = non_empty(&shipping.landmark) {
        parts.push(format!("بجوار {landmark}"));
    }
    if parts.is_empty() {
        return "عنوان غير محدد".to_string();
    }
    parts.join("، ")
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
