use std::fmt::Display;

use chrono::{DateTime, Utc};
use ofe_common::Money;

use crate::{
    order::{Adjustment, Order},
    order_types::{Account, Item},
    status::{OrderStatus, OrderType},
};

/// A financial summary of a paid order.
///
/// An invoice borrows the order and never mutates it; beyond the moment it was issued and the
/// status snapshot taken then, it holds no state of its own. Obtain one through
/// [`Order::invoice`], which refuses to issue before payment has completed.
#[derive(Debug, Clone)]
pub struct Invoice<'a> {
    order: &'a Order,
    status: OrderStatus,
    issued_at: DateTime<Utc>,
}

impl<'a> Invoice<'a> {
    pub(crate) fn new(order: &'a Order, status: OrderStatus) -> Self {
        Self { order, status, issued_at: Utc::now() }
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    pub fn account(&self) -> &Account {
        self.order.account()
    }

    pub fn items(&self) -> &[Item] {
        self.order.items()
    }

    pub fn adjustments(&self) -> &[Adjustment] {
        self.order.adjustments()
    }

    pub fn subtotal(&self) -> Money {
        self.order.subtotal()
    }

    pub fn total_adjustments(&self) -> Money {
        self.order.total_adjustments()
    }

    pub fn grand_total(&self) -> Money {
        self.order.grand_total()
    }

    /// The order status at the moment the invoice was issued.
    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn order_type(&self) -> OrderType {
        self.order.order_type()
    }
}

impl Display for Invoice<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Invoice for {} ({} order, {})", self.account().username, self.order_type(), self.status)?;
        for item in self.items() {
            writeln!(f, "  {} x{} @ {}", item.product.name, item.quantity, item.product.unit_price)?;
        }
        for adjustment in self.adjustments() {
            writeln!(f, "  {}: {}", adjustment.label, adjustment.amount)?;
        }
        writeln!(f, "  Subtotal: {}", self.subtotal())?;
        write!(f, "  Total:    {}", self.grand_total())
    }
}

#[cfg(test)]
mod test {
    use ofe_common::Money;
    use rust_decimal_macros::dec;

    use crate::order_types::{Account, Item, Product, ProductClass};
    use crate::{Order, OrderError, StateError};

    fn digital_order(price: Money) -> Order {
        let item = Item::new(Product::new("SKU-D", "Download", ProductClass::Digital, price), 1);
        Order::digital(vec![item], Account::new(7, "bob")).unwrap()
    }

    #[test]
    fn invoice_requires_payment() {
        let mut order = digital_order(Money::new(dec!(29.99)));
        assert!(matches!(order.invoice(), Err(OrderError::State(StateError::NotPlaced))));
        order.with_payment_method("card").place().unwrap();
        assert!(matches!(order.invoice(), Err(OrderError::State(StateError::NotReached { .. }))));
        order.pay().unwrap();
        assert!(order.invoice().is_ok());
    }

    #[test]
    fn invoice_reflects_the_order_without_mutating_it() {
        let mut order = digital_order(Money::new(dec!(29.99)));
        order.with_payment_method("card").place().unwrap().pay().unwrap();
        let status_before = order.status();
        let invoice = order.invoice().unwrap();
        assert_eq!(invoice.subtotal(), Money::new(dec!(29.99)));
        assert_eq!(invoice.total_adjustments(), Money::new(dec!(-10.00)));
        assert_eq!(invoice.grand_total(), Money::new(dec!(19.99)));
        assert_eq!(invoice.account().username, "bob");
        assert_eq!(Some(invoice.status()), status_before);
        drop(invoice);
        assert_eq!(order.status(), status_before);
    }

    #[test]
    fn invoice_renders_a_summary() {
        let mut order = digital_order(Money::new(dec!(29.99)));
        order.with_payment_method("card").place().unwrap().pay().unwrap();
        let rendered = order.invoice().unwrap().to_string();
        assert!(rendered.contains("Invoice for bob (digital order, Unsent)"));
        assert!(rendered.contains("Voucher: -10.00"));
        assert!(rendered.contains("Total:    19.99"));
    }
}
