use std::{fmt, sync::Arc};

use chrono::{DateTime, Utc};
use log::*;
use ofe_common::Money;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::{
    errors::{OrderError, PreconditionError, StateError},
    order_types::{Account, Address, Item, PaymentMethod},
    shipping::{Parcel, ParcelService},
    status::{OrderStatus, OrderType, Phase},
};

mod invoice;

pub use invoice::Invoice;

/// Label under which a physical order's shipping fee is recorded.
pub const SHIPPING_AND_HANDLING: &str = "Shipping and handling";
/// Label under which a digital order's standing voucher is recorded.
pub const VOUCHER: &str = "Voucher";
/// Every digital order receives this discount when it is placed.
pub const VOUCHER_DISCOUNT: Money = Money::new(dec!(-10));

//--------------------------------------     Adjustment       --------------------------------------------------------
/// A labelled, signed amount applied to the order total. Fees are positive, discounts negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Adjustment {
    pub label: String,
    pub amount: Money,
}

//--------------------------------------      OrderKind       --------------------------------------------------------
/// The variant-specific half of an order. Physical orders additionally carry their destination
/// and the parcel collaborator used to price shipping.
#[derive(Clone)]
pub enum OrderKind {
    Physical {
        shipping_address: Option<Address>,
        parcel_service: Arc<dyn ParcelService>,
    },
    Digital,
    Subscription,
}

impl OrderKind {
    fn order_type(&self) -> OrderType {
        match self {
            OrderKind::Physical { .. } => OrderType::Physical,
            OrderKind::Digital => OrderType::Digital,
            OrderKind::Subscription => OrderType::Subscription,
        }
    }
}

impl fmt::Debug for OrderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderKind::Physical { shipping_address, .. } => {
                f.debug_struct("Physical").field("shipping_address", shipping_address).finish_non_exhaustive()
            },
            OrderKind::Digital => write!(f, "Digital"),
            OrderKind::Subscription => write!(f, "Subscription"),
        }
    }
}

//--------------------------------------        Order         --------------------------------------------------------
/// A commerce order progressing through placement, payment, fulfilment and completion.
///
/// Construct one of the three variants with [`Order::physical`], [`Order::digital`] or
/// [`Order::subscription`], attach a payment method, then drive the order through
/// `place → pay → fulfill → complete`. Every transition validates the current phase before
/// touching any state, and every mutator hands the same order back so calls can be chained.
///
/// An order is not safe for concurrent mutation; the embedding service must serialise lifecycle
/// calls per order instance.
#[derive(Debug, Clone)]
pub struct Order {
    items: Vec<Item>,
    adjustments: Vec<Adjustment>,
    account: Account,
    payment_method: Option<PaymentMethod>,
    status: Option<OrderStatus>,
    kind: OrderKind,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Order {
    fn new(items: Vec<Item>, account: Account, kind: OrderKind) -> Result<Self, PreconditionError> {
        let order_type = kind.order_type();
        if let Some(item) = items.iter().find(|i| !i.product.classification.allowed_in(order_type)) {
            return Err(PreconditionError::ClassificationMismatch {
                classification: item.product.classification,
                order_type,
            });
        }
        let now = Utc::now();
        Ok(Self {
            items,
            adjustments: Vec::new(),
            account,
            payment_method: None,
            status: None,
            kind,
            created_at: now,
            updated_at: now,
        })
    }

    /// A physical order. Shipping is priced through `parcel_service` when the order is placed.
    pub fn physical(
        items: Vec<Item>,
        account: Account,
        parcel_service: Arc<dyn ParcelService>,
    ) -> Result<Self, PreconditionError> {
        Self::new(items, account, OrderKind::Physical { shipping_address: None, parcel_service })
    }

    pub fn digital(items: Vec<Item>, account: Account) -> Result<Self, PreconditionError> {
        Self::new(items, account, OrderKind::Digital)
    }

    /// A subscription order always covers exactly one item; this takes it directly.
    pub fn subscription(item: Item, account: Account) -> Result<Self, PreconditionError> {
        Self::new(vec![item], account, OrderKind::Subscription)
    }

    /// As [`Order::subscription`], but for callers holding an item list. Rejects any count other
    /// than one.
    pub fn subscription_with_items(mut items: Vec<Item>, account: Account) -> Result<Self, PreconditionError> {
        if items.len() != 1 {
            return Err(PreconditionError::SubscriptionItemCount(items.len()));
        }
        Self::subscription(items.remove(0), account)
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn adjustments(&self) -> &[Adjustment] {
        &self.adjustments
    }

    pub fn account(&self) -> &Account {
        &self.account
    }

    pub fn payment_method(&self) -> Option<&PaymentMethod> {
        self.payment_method.as_ref()
    }

    /// `None` until the order has been placed.
    pub fn status(&self) -> Option<OrderStatus> {
        self.status
    }

    pub fn order_type(&self) -> OrderType {
        self.kind.order_type()
    }

    pub fn shipping_address(&self) -> Option<&Address> {
        match &self.kind {
            OrderKind::Physical { shipping_address, .. } => shipping_address.as_ref(),
            _ => None,
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Attach the payment instrument that will settle this order. Assignment only; nothing is
    /// charged here.
    pub fn with_payment_method<M: Into<PaymentMethod>>(&mut self, method: M) -> &mut Self {
        self.payment_method = Some(method.into());
        self.touch();
        self
    }

    /// Set the destination of a physical order. Fails on digital and subscription orders.
    pub fn with_shipping_address(&mut self, address: Address) -> Result<&mut Self, OrderError> {
        let OrderKind::Physical { shipping_address, .. } = &mut self.kind else {
            return Err(PreconditionError::NotAPhysicalOrder.into());
        };
        *shipping_address = Some(address);
        self.touch();
        Ok(self)
    }

    /// Record a fee or discount against the order. Labels are unique; re-adding a label replaces
    /// its amount and keeps its original position.
    pub fn add_adjustment<S: Into<String>>(&mut self, label: S, amount: Money) -> &mut Self {
        let label = label.into();
        match self.adjustments.iter_mut().find(|a| a.label == label) {
            Some(existing) => existing.amount = amount,
            None => self.adjustments.push(Adjustment { label, amount }),
        }
        self.touch();
        self
    }

    /// The sum of the item line amounts, rounded to two decimals half-up. Rounding is applied
    /// once, to the sum, not per line.
    pub fn subtotal(&self) -> Money {
        self.items.iter().map(Item::subtotal).sum::<Money>().rounded()
    }

    /// The net of all fees and discounts, rounded to two decimals half-up.
    pub fn total_adjustments(&self) -> Money {
        self.adjustments.iter().map(|a| a.amount).sum::<Money>().rounded()
    }

    /// `subtotal() + total_adjustments()`. Both operands are already at two decimals, so the sum
    /// is exact.
    pub fn grand_total(&self) -> Money {
        self.subtotal() + self.total_adjustments()
    }

    /// The current parcel breakdown of a physical order, recomputed from the items and
    /// destination on every call. `None` until a shipping address is set, and always `None` for
    /// digital and subscription orders.
    pub fn parcels(&self) -> Option<Vec<Parcel>> {
        let OrderKind::Physical { shipping_address, parcel_service } = &self.kind else {
            return None;
        };
        let address = shipping_address.as_ref()?;
        Some(parcel_service.breakdown(&self.items, address))
    }

    /// Place the order.
    ///
    /// Requires at least one item, a payment method, and (for physical orders) a shipping
    /// address. On success the variant's standing adjustment is injected — shipping and handling
    /// for physical orders, the voucher discount for digital orders, nothing for subscriptions —
    /// and the status becomes [`OrderStatus::Pending`].
    ///
    /// There is no placed-already guard here; not placing an order twice is the caller's
    /// responsibility. The injection is an upsert, so a repeated call leaves one adjustment per
    /// label.
    pub fn place(&mut self) -> Result<&mut Self, OrderError> {
        if self.items.is_empty() {
            return Err(PreconditionError::NoItems.into());
        }
        if self.payment_method.is_none() {
            return Err(PreconditionError::MissingPaymentMethod.into());
        }
        let standing_adjustment = match &self.kind {
            OrderKind::Physical { shipping_address, parcel_service } => {
                let address = shipping_address.as_ref().ok_or(PreconditionError::MissingShippingAddress)?;
                let parcels = parcel_service.breakdown(&self.items, address);
                let shipping = parcel_service.shipping_cost_of(&parcels);
                debug!("📦️ {} parcel(s) to {}, shipping and handling {shipping}", parcels.len(), address.country);
                Some((SHIPPING_AND_HANDLING, shipping))
            },
            OrderKind::Digital => Some((VOUCHER, VOUCHER_DISCOUNT)),
            OrderKind::Subscription => None,
        };
        if let Some((label, amount)) = standing_adjustment {
            self.add_adjustment(label, amount);
        }
        self.advance(Phase::Placed);
        debug!("🧾 {} order for {} placed. Grand total {}", self.order_type(), self.account.username, self.grand_total());
        Ok(self)
    }

    /// Record that payment has settled and advance to the variant's paid status.
    pub fn pay(&mut self) -> Result<&mut Self, OrderError> {
        self.guard(Phase::Paid)?;
        self.advance(Phase::Paid);
        debug!("💰️ {} order for {} paid", self.order_type(), self.account.username);
        Ok(self)
    }

    /// Confirm fulfilment: carrier handover, download dispatch, or subscription activation.
    /// Subscriptions have no intermediate fulfilled state and jump straight to their
    /// completed-phase status.
    pub fn fulfill(&mut self) -> Result<&mut Self, OrderError> {
        self.guard(Phase::Fulfilled)?;
        let target = match self.order_type() {
            OrderType::Subscription => Phase::Completed,
            _ => Phase::Fulfilled,
        };
        self.advance(target);
        Ok(self)
    }

    /// Mark the order delivered or redeemed. For subscriptions this is a no-op: activation
    /// already represents completion, so the call neither errors nor changes state.
    pub fn complete(&mut self) -> Result<&mut Self, OrderError> {
        if self.order_type() == OrderType::Subscription {
            trace!("🧾 complete() on a subscription order is a no-op");
            return Ok(self);
        }
        self.guard(Phase::Completed)?;
        self.advance(Phase::Completed);
        Ok(self)
    }

    /// A read-only invoice over this order, available from the moment payment completes.
    pub fn invoice(&self) -> Result<Invoice<'_>, OrderError> {
        let current = self.status.ok_or(StateError::NotPlaced)?;
        if current.code() < Phase::Paid.code() {
            return Err(StateError::NotReached { required: Phase::Paid, current }.into());
        }
        Ok(Invoice::new(self, current))
    }

    /// The shared transition guard: advancing to `target` is legal only if the order sits in
    /// `[target.previous(), target)` in phase-code order.
    fn guard(&self, target: Phase) -> Result<(), StateError> {
        let current = self.status.ok_or(StateError::NotPlaced)?;
        if current.code() >= target.code() {
            return Err(StateError::AlreadyReached { phase: target, current });
        }
        if current.code() < target.previous().code() {
            return Err(StateError::NotReached { required: target.previous(), current });
        }
        Ok(())
    }

    fn advance(&mut self, target: Phase) {
        let next = self.order_type().status_at(target);
        trace!("🧾 {} order: {:?} -> {next}", self.order_type(), self.status);
        self.status = Some(next);
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod test {
    use ofe_common::Money;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::order_types::{Product, ProductClass};

    fn account() -> Account {
        Account::new(42, "alice")
    }

    fn physical_item(price: Money, quantity: u32) -> Item {
        Item::new(Product::new("SKU-P", "Widget", ProductClass::Physical, price), quantity)
    }

    fn digital_item(price: Money) -> Item {
        Item::new(Product::new("SKU-D", "Download", ProductClass::Digital, price), 1)
    }

    fn subscription_item(price: Money) -> Item {
        Item::new(Product::new("SKU-S", "Plan", ProductClass::Subscription, price), 1)
    }

    #[derive(Debug)]
    struct FlatRate(Money);

    impl ParcelService for FlatRate {
        fn breakdown(&self, items: &[Item], _address: &Address) -> Vec<Parcel> {
            vec![Parcel::new(items.to_vec())]
        }

        fn shipping_cost_of(&self, parcels: &[Parcel]) -> Money {
            self.0 * parcels.len() as i64
        }
    }

    fn address() -> Address {
        Address {
            street: "1 Main Rd".into(),
            city: "Cape Town".into(),
            zip: "8001".into(),
            country: "ZA".into(),
        }
    }

    #[test]
    fn physical_order_rejects_digital_items() {
        let items = vec![physical_item(Money::new(dec!(5)), 1), digital_item(Money::new(dec!(3)))];
        let err = Order::physical(items, account(), Arc::new(FlatRate(Money::new(dec!(7.50))))).unwrap_err();
        assert_eq!(
            err,
            PreconditionError::ClassificationMismatch {
                classification: ProductClass::Digital,
                order_type: OrderType::Physical,
            }
        );
    }

    #[test]
    fn tax_free_items_are_physical() {
        let item = Item::new(Product::new("SKU-T", "Book", ProductClass::PhysicalTaxFree, Money::new(dec!(12))), 1);
        let order = Order::physical(vec![item], account(), Arc::new(FlatRate(Money::zero()))).unwrap();
        assert_eq!(order.order_type(), OrderType::Physical);
    }

    #[test]
    fn subscription_order_rejects_wrong_item_counts() {
        let item = subscription_item(Money::new(dec!(9.99)));
        let err = Order::subscription_with_items(vec![item.clone(), item.clone()], account()).unwrap_err();
        assert_eq!(err, PreconditionError::SubscriptionItemCount(2));
        let err = Order::subscription_with_items(vec![], account()).unwrap_err();
        assert_eq!(err, PreconditionError::SubscriptionItemCount(0));
        assert!(Order::subscription_with_items(vec![item], account()).is_ok());
    }

    #[test]
    fn subscription_order_rejects_other_classifications() {
        let err = Order::subscription(digital_item(Money::new(dec!(3))), account()).unwrap_err();
        assert!(matches!(err, PreconditionError::ClassificationMismatch { .. }));
    }

    #[test]
    fn place_requires_payment_method() {
        let mut order = Order::digital(vec![digital_item(Money::new(dec!(29.99)))], account()).unwrap();
        let err = order.place().unwrap_err();
        assert_eq!(err, OrderError::Precondition(PreconditionError::MissingPaymentMethod));
    }

    #[test]
    fn place_requires_items() {
        let mut order = Order::digital(vec![], account()).unwrap();
        order.with_payment_method("card");
        let err = order.place().unwrap_err();
        assert_eq!(err, OrderError::Precondition(PreconditionError::NoItems));
    }

    #[test]
    fn physical_place_requires_shipping_address() {
        let items = vec![physical_item(Money::new(dec!(19.99)), 1)];
        let mut order = Order::physical(items, account(), Arc::new(FlatRate(Money::new(dec!(7.50))))).unwrap();
        order.with_payment_method("card");
        let err = order.place().unwrap_err();
        assert_eq!(err, OrderError::Precondition(PreconditionError::MissingShippingAddress));
    }

    #[test]
    fn shipping_address_is_physical_only() {
        let mut order = Order::digital(vec![digital_item(Money::new(dec!(1)))], account()).unwrap();
        let err = order.with_shipping_address(address()).unwrap_err();
        assert_eq!(err, OrderError::Precondition(PreconditionError::NotAPhysicalOrder));
    }

    #[test]
    fn pay_before_place_is_a_state_error() {
        let mut order = Order::digital(vec![digital_item(Money::new(dec!(1)))], account()).unwrap();
        let err = order.pay().unwrap_err();
        assert_eq!(err, OrderError::State(StateError::NotPlaced));
    }

    #[test]
    fn pay_twice_is_a_state_error() {
        let mut order = Order::digital(vec![digital_item(Money::new(dec!(1)))], account()).unwrap();
        order.with_payment_method("card").place().unwrap().pay().unwrap();
        let err = order.pay().unwrap_err();
        assert_eq!(
            err,
            OrderError::State(StateError::AlreadyReached { phase: Phase::Paid, current: OrderStatus::Unsent })
        );
    }

    #[test]
    fn fulfill_before_pay_is_a_state_error() {
        let mut order = Order::digital(vec![digital_item(Money::new(dec!(1)))], account()).unwrap();
        order.with_payment_method("card").place().unwrap();
        let err = order.fulfill().unwrap_err();
        assert_eq!(
            err,
            OrderError::State(StateError::NotReached { required: Phase::Paid, current: OrderStatus::Pending })
        );
    }

    #[test]
    fn complete_before_fulfill_is_a_state_error() {
        let mut order = Order::digital(vec![digital_item(Money::new(dec!(1)))], account()).unwrap();
        order.with_payment_method("card").place().unwrap().pay().unwrap();
        let err = order.complete().unwrap_err();
        assert_eq!(
            err,
            OrderError::State(StateError::NotReached { required: Phase::Fulfilled, current: OrderStatus::Unsent })
        );
    }

    #[test]
    fn failed_transitions_leave_status_untouched() {
        let mut order = Order::digital(vec![digital_item(Money::new(dec!(1)))], account()).unwrap();
        order.with_payment_method("card").place().unwrap();
        let _ = order.fulfill();
        assert_eq!(order.status(), Some(OrderStatus::Pending));
    }

    #[test]
    fn adjustments_upsert_by_label_and_keep_insertion_order() {
        let mut order = Order::digital(vec![digital_item(Money::new(dec!(1)))], account()).unwrap();
        order
            .add_adjustment("Gift wrap", Money::new(dec!(2.00)))
            .add_adjustment("Loyalty", Money::new(dec!(-1.00)))
            .add_adjustment("Gift wrap", Money::new(dec!(3.00)));
        let labels: Vec<&str> = order.adjustments().iter().map(|a| a.label.as_str()).collect();
        assert_eq!(labels, vec!["Gift wrap", "Loyalty"]);
        assert_eq!(order.adjustments()[0].amount, Money::new(dec!(3.00)));
        assert_eq!(order.total_adjustments(), Money::new(dec!(2.00)));
    }

    #[test]
    fn placing_twice_reinjects_nothing_new() {
        // Deliberately unguarded; the standing adjustment upserts rather than duplicates.
        let mut order = Order::digital(vec![digital_item(Money::new(dec!(29.99)))], account()).unwrap();
        order.with_payment_method("card").place().unwrap();
        order.place().unwrap();
        assert_eq!(order.adjustments().len(), 1);
        assert_eq!(order.grand_total(), Money::new(dec!(19.99)));
    }

    #[test]
    fn parcels_recompute_on_demand() {
        let items = vec![physical_item(Money::new(dec!(19.99)), 1), physical_item(Money::new(dec!(2.50)), 2)];
        let mut order = Order::physical(items, account(), Arc::new(FlatRate(Money::new(dec!(7.50))))).unwrap();
        assert!(order.parcels().is_none());
        order.with_shipping_address(address()).unwrap();
        let parcels = order.parcels().unwrap();
        assert_eq!(parcels.len(), 1);
        assert_eq!(parcels[0].items.len(), 2);
    }

    #[test]
    fn subtotal_rounds_once_over_the_sum() {
        // Two lines of 1.004 sum to 2.008, which rounds to 2.01. Per-line rounding would have
        // produced 2.00.
        let items = vec![physical_item(Money::new(dec!(1.004)), 1), physical_item(Money::new(dec!(1.004)), 1)];
        let order = Order::physical(items, account(), Arc::new(FlatRate(Money::zero()))).unwrap();
        assert_eq!(order.subtotal(), Money::new(dec!(2.01)));
    }
}
