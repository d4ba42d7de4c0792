use thiserror::Error;

use crate::{
    order_types::ProductClass,
    status::{OrderStatus, OrderType, Phase},
};

/// A structural or input problem, detected at construction or before a transition. Always
/// caller-fixable; the engine never recovers from one internally.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreconditionError {
    #[error("An order must contain at least one item")]
    NoItems,
    #[error("{classification} items cannot be sold on a {order_type} order")]
    ClassificationMismatch { classification: ProductClass, order_type: OrderType },
    #[error("A subscription order covers exactly one item, but {0} were supplied")]
    SubscriptionItemCount(usize),
    #[error("A shipping address must be set before a physical order can be placed")]
    MissingShippingAddress,
    #[error("A payment method must be set before the order can be placed")]
    MissingPaymentMethod,
    #[error("Only physical orders have a shipping address")]
    NotAPhysicalOrder,
}

/// An attempted transition that violates the phase ordering. Signals a protocol violation by the
/// caller, not a data problem.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("The order has not been placed yet")]
    NotPlaced,
    #[error("The order is already at or past the {phase} phase (status is {current})")]
    AlreadyReached { phase: Phase, current: OrderStatus },
    #[error("The order has not reached the {required} phase yet (status is {current})")]
    NotReached { required: Phase, current: OrderStatus },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    #[error("Precondition violated: {0}")]
    Precondition(#[from] PreconditionError),
    #[error("Invalid order state: {0}")]
    State(#[from] StateError),
}
