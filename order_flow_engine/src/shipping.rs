use ofe_common::Money;

use crate::order_types::{Address, Item};

//--------------------------------------       Parcel         --------------------------------------------------------
/// A shipping unit: the items that travel together in one box.
#[derive(Debug, Clone, PartialEq)]
pub struct Parcel {
    pub items: Vec<Item>,
}

impl Parcel {
    pub fn new(items: Vec<Item>) -> Self {
        Self { items }
    }
}

//--------------------------------------    ParcelService     --------------------------------------------------------
/// Parcel packing and shipping rates live outside the engine.
///
/// Implementations decide how an order's items are boxed for a destination and what the resulting
/// parcels cost to send. Physical orders take a `ParcelService` at construction and use it both to
/// price shipping when the order is placed and to report the current breakdown on demand.
pub trait ParcelService: Send + Sync {
    /// Break the order's items into parcels for the given destination.
    fn breakdown(&self, items: &[Item], address: &Address) -> Vec<Parcel>;

    /// The shipping and handling amount charged for the given parcels.
    fn shipping_cost_of(&self, parcels: &[Parcel]) -> Money;
}
