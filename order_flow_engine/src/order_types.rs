use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use ofe_common::Money;
use serde::{Deserialize, Serialize};

use crate::status::{ConversionError, OrderType};

//--------------------------------------    ProductClass      --------------------------------------------------------
/// The catalogue classification of a product, which decides what kind of order may sell it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductClass {
    /// Stocked goods that ship in parcels.
    Physical,
    /// Physical goods exempt from sales tax. A classification flag only; no tax rules live in
    /// this engine.
    PhysicalTaxFree,
    /// Goods delivered as a download or voucher.
    Digital,
    /// A recurring service plan.
    Subscription,
}

impl ProductClass {
    /// Whether items of this classification may appear on an order of the given type.
    pub const fn allowed_in(self, order_type: OrderType) -> bool {
        matches!(
            (self, order_type),
            (ProductClass::Physical | ProductClass::PhysicalTaxFree, OrderType::Physical)
                | (ProductClass::Digital, OrderType::Digital)
                | (ProductClass::Subscription, OrderType::Subscription)
        )
    }
}

impl Display for ProductClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProductClass::Physical => write!(f, "Physical"),
            ProductClass::PhysicalTaxFree => write!(f, "PhysicalTaxFree"),
            ProductClass::Digital => write!(f, "Digital"),
            ProductClass::Subscription => write!(f, "Subscription"),
        }
    }
}

impl FromStr for ProductClass {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Physical" => Ok(Self::Physical),
            "PhysicalTaxFree" => Ok(Self::PhysicalTaxFree),
            "Digital" => Ok(Self::Digital),
            "Subscription" => Ok(Self::Subscription),
            s => Err(ConversionError(format!("Invalid product classification: {s}"))),
        }
    }
}

//--------------------------------------       Product        --------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub sku: String,
    pub name: String,
    pub classification: ProductClass,
    pub unit_price: Money,
}

impl Product {
    pub fn new<S1, S2>(sku: S1, name: S2, classification: ProductClass, unit_price: Money) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        Self { sku: sku.into(), name: name.into(), classification, unit_price }
    }
}

//--------------------------------------        Item          --------------------------------------------------------
/// A purchased unit: a product and the quantity taken.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub product: Product,
    pub quantity: u32,
}

impl Item {
    pub fn new(product: Product, quantity: u32) -> Self {
        Self { product, quantity }
    }

    /// The raw line amount, unit price times quantity. Deliberately unrounded; orders round once
    /// over the summed lines.
    pub fn subtotal(&self) -> Money {
        self.product.unit_price * i64::from(self.quantity)
    }
}

//--------------------------------------       Account        --------------------------------------------------------
/// Opaque handle to an externally owned account. The engine holds it for invoicing and never
/// looks inside.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn new<S: Into<String>>(id: i64, username: S) -> Self {
        Self { id, username: username.into(), created_at: Utc::now() }
    }
}

//--------------------------------------    PaymentMethod     --------------------------------------------------------
/// A lightweight wrapper around a string naming a payment instrument. Charging is not this
/// engine's concern.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethod(pub String);

impl Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<S: Into<String>> From<S> for PaymentMethod {
    fn from(value: S) -> Self {
        Self(value.into())
    }
}

//--------------------------------------       Address        --------------------------------------------------------
/// A shipping destination. Validation belongs to whatever system captured it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub zip: String,
    pub country: String,
}
