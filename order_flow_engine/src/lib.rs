//! Order Flow Engine
//!
//! The Order Flow Engine models the lifecycle of a commerce order: computing money totals,
//! enforcing per-variant composition rules, and driving an order through a strict sequence of
//! fulfilment states. It is storefront-agnostic and carries no persistence or transport of its
//! own; an embedding service decides how orders are stored and what triggers each transition.
//!
//! The library is divided into three main sections:
//! 1. Collaborator data objects ([`mod@order_types`]). Items, products, accounts, payment methods
//!    and addresses are specified at the interface boundary only: the engine reads a product's
//!    classification and an item's line amount, and treats the rest as opaque.
//! 2. The status scheme ([`mod@status`]). Every variant-specific status carries one of four
//!    numeric phase codes (100/200/300/400), and all generic transition guards compare phase
//!    codes rather than concrete statuses.
//! 3. The [`Order`] aggregate itself, with its three mutually exclusive variants (physical,
//!    digital, subscription), the shipping seam ([`mod@shipping`]) used to price physical
//!    orders, and the read-only [`Invoice`] projection available once payment completes.
mod order;

pub mod errors;
pub mod order_types;
pub mod shipping;
pub mod status;

pub use errors::{OrderError, PreconditionError, StateError};
pub use order::{Adjustment, Invoice, Order, OrderKind, SHIPPING_AND_HANDLING, VOUCHER, VOUCHER_DISCOUNT};
