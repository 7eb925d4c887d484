//! Order book document

use std::fs;
use std::path::PathBuf;

use crate::domain::order::{Order, OrderStatus};
use crate::domain::shipment::EXPORTABLE_STATUSES;
use crate::{Result, StorefrontError};

pub struct OrderStore {
    path: PathBuf,
}

impl OrderStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// All orders, newest first. A missing file is an empty book.
    pub fn load(&self) -> Result<Vec<Order>> {
        if !self.path.exists() {
            return Ok(vec![]);
        }
        let raw = fs::read_to_string(&self.path)?;
        let mut orders: Vec<Order> = serde_json::from_str(&raw)?;
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    pub fn save(&self, orders: &[Order]) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(orders)?;
        super::write_atomic(&self.path, &bytes)
    }

    /// Append a new order to the book.
    pub fn append(&self, order: &Order) -> Result<()> {
        let mut orders = self.load()?;
        orders.push(order.clone());
        self.save(&orders)
    }

    pub fn find(&self, order_id: &str) -> Result<Order> {
        self.load()?
            .into_iter()
            .find(|o| o.order_id == order_id)
            .ok_or_else(|| StorefrontError::OrderNotFound(order_id.to_string()))
    }

    /// Transition one order's status and persist the whole book.
    pub fn update_status(
        &self,
        order_id: &str,
        new_status: OrderStatus,
        note: Option<String>,
    ) -> Result<Order> {
        let mut orders = self.load()?;
        let order = orders
            .iter_mut()
            .find(|o| o.order_id == order_id)
            .ok_or_else(|| StorefrontError::OrderNotFound(order_id.to_string()))?;
        order.update_status(new_status, note);
        let updated = order.clone();
        self.save(&orders)?;
        Ok(updated)
    }

    /// Orders awaiting carrier pickup: pending, confirmed or processing.
    pub fn exportable(&self) -> Result<Vec<Order>> {
        Ok(self
            .load()?
            .into_iter()
            .filter(|o| EXPORTABLE_STATUSES.contains(&o.status))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::merchant::MerchantRegistry;
    use crate::domain::order::{Customer, ShippingAddress};
    use crate::domain::product::Product;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("argento-orders-{name}-{}.json", std::process::id()))
    }

    fn sample_order(name: &str) -> Order {
        let registry = MerchantRegistry::builtin();
        let customer = Customer {
            name: name.to_string(),
            phone: "01012345678".to_string(),
            ..Default::default()
        };
        let shipping = ShippingAddress {
            address: "شارع النور".to_string(),
            city: "الزقازيق".to_string(),
            ..Default::default()
        };
        let mut order = Order::create(customer, shipping);
        let product: Product = serde_json::from_value(serde_json::json!({
            "id": "P1",
            "title": "منتج",
            "price": "100",
            "merchant_id": "FOFO",
        }))
        .unwrap();
        order
            .add_line(&product, 1, registry.lookup("FOFO"), None)
            .unwrap();
        order
    }

    #[test]
    fn test_append_find_roundtrip() {
        let path = temp_path("roundtrip");
        let store = OrderStore::new(&path);
        let order = sample_order("أحمد");
        store.append(&order).unwrap();

        let found = store.find(&order.order_id).unwrap();
        assert_eq!(found.customer.name, "أحمد");
        assert_eq!(found.subtotal, order.subtotal);
        assert!(matches!(
            store.find("ORD-00000000-XXXXXXXX"),
            Err(StorefrontError::OrderNotFound(_))
        ));
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_update_status_persists_audit_trail() {
        let path = temp_path("status");
        let store = OrderStore::new(&path);
        let order = sample_order("سارة");
        store.append(&order).unwrap();

        let updated = store
            .update_status(&order.order_id, OrderStatus::Confirmed, Some("ok".to_string()))
            .unwrap();
        assert_eq!(updated.status, OrderStatus::Confirmed);

        let reloaded = store.find(&order.order_id).unwrap();
        assert_eq!(reloaded.status, OrderStatus::Confirmed);
        assert_eq!(reloaded.status_log.len(), 1);
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_exportable_filters_shipped_and_cancelled() {
        let path = temp_path("exportable");
        let store = OrderStore::new(&path);
        let mut orders = vec![
            sample_order("a"),
            sample_order("b"),
            sample_order("c"),
        ];
        orders[1].update_status(OrderStatus::Shipped, None);
        orders[2].update_status(OrderStatus::Cancelled, None);
        store.save(&orders).unwrap();

        let exportable = store.exportable().unwrap();
        assert_eq!(exportable.len(), 1);
        assert_eq!(exportable[0].customer.name, "a");
        std::fs::remove_file(path).ok();
    }
}
