use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

//--------------------------------------        Phase        ---------------------------------------------------------
/// The four coarse lifecycle phases shared by every order variant.
///
/// The numeric codes collapse the variant-specific statuses into one total order, which is what
/// the generic transition guards compare. Statuses of different variants that share a code (e.g.
/// `NotShipped`, `Unsent` and `PendingActivation` at 200) are at the same phase by contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Phase {
    Placed,
    Paid,
    Fulfilled,
    Completed,
}

impl Phase {
    pub const fn code(self) -> u16 {
        match self {
            Phase::Placed => 100,
            Phase::Paid => 200,
            Phase::Fulfilled => 300,
            Phase::Completed => 400,
        }
    }

    /// The phase an order must already have reached before it may advance to `self`.
    pub const fn previous(self) -> Phase {
        match self {
            Phase::Placed | Phase::Paid => Phase::Placed,
            Phase::Fulfilled => Phase::Paid,
            Phase::Completed => Phase::Fulfilled,
        }
    }
}

impl Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Placed => write!(f, "Placed"),
            Phase::Paid => write!(f, "Paid"),
            Phase::Fulfilled => write!(f, "Fulfilled"),
            Phase::Completed => write!(f, "Completed"),
        }
    }
}

//--------------------------------------     OrderStatus      --------------------------------------------------------
/// The concrete status an order carries. Which values an order moves through depends on its
/// [`OrderType`]; the phase code is what the shared guards reason about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    /// Placed and awaiting payment (all variants).
    Pending,
    /// Paid, waiting on the warehouse (physical).
    NotShipped,
    /// Paid, download not yet sent (digital).
    Unsent,
    /// Paid, activation outstanding (subscription).
    PendingActivation,
    /// Handed to the carrier (physical).
    Shipped,
    /// Download sent to the customer (digital).
    Sent,
    /// Delivered to the customer (physical, terminal).
    Delivered,
    /// Download redeemed (digital, terminal).
    Redeemed,
    /// The subscription is active (subscription, terminal).
    Activated,
}

impl OrderStatus {
    pub const fn phase(self) -> Phase {
        match self {
            OrderStatus::Pending => Phase::Placed,
            OrderStatus::NotShipped | OrderStatus::Unsent | OrderStatus::PendingActivation => Phase::Paid,
            OrderStatus::Shipped | OrderStatus::Sent => Phase::Fulfilled,
            OrderStatus::Delivered | OrderStatus::Redeemed | OrderStatus::Activated => Phase::Completed,
        }
    }

    pub const fn code(self) -> u16 {
        self.phase().code()
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "Pending"),
            OrderStatus::NotShipped => write!(f, "NotShipped"),
            OrderStatus::Unsent => write!(f, "Unsent"),
            OrderStatus::PendingActivation => write!(f, "PendingActivation"),
            OrderStatus::Shipped => write!(f, "Shipped"),
            OrderStatus::Sent => write!(f, "Sent"),
            OrderStatus::Delivered => write!(f, "Delivered"),
            OrderStatus::Redeemed => write!(f, "Redeemed"),
            OrderStatus::Activated => write!(f, "Activated"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid value: {0}")]
pub struct ConversionError(pub String);

impl FromStr for OrderStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "NotShipped" => Ok(Self::NotShipped),
            "Unsent" => Ok(Self::Unsent),
            "PendingActivation" => Ok(Self::PendingActivation),
            "Shipped" => Ok(Self::Shipped),
            "Sent" => Ok(Self::Sent),
            "Delivered" => Ok(Self::Delivered),
            "Redeemed" => Ok(Self::Redeemed),
            "Activated" => Ok(Self::Activated),
            s => Err(ConversionError(format!("Invalid order status: {s}"))),
        }
    }
}

//--------------------------------------      OrderType       --------------------------------------------------------
/// The fixed variant tag of an order, determined at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderType {
    Physical,
    Digital,
    Subscription,
}

impl OrderType {
    /// The concrete status an order of this type carries once it has reached `phase`.
    ///
    /// Subscriptions have no distinct fulfilled-but-not-completed state; their `Fulfilled` entry
    /// is `Activated`, the code-400 value, so fulfilment jumps straight past phase 300.
    pub const fn status_at(self, phase: Phase) -> OrderStatus {
        match (self, phase) {
            (_, Phase::Placed) => OrderStatus::Pending,
            (OrderType::Physical, Phase::Paid) => OrderStatus::NotShipped,
            (OrderType::Digital, Phase::Paid) => OrderStatus::Unsent,
            (OrderType::Subscription, Phase::Paid) => OrderStatus::PendingActivation,
            (OrderType::Physical, Phase::Fulfilled) => OrderStatus::Shipped,
            (OrderType::Digital, Phase::Fulfilled) => OrderStatus::Sent,
            (OrderType::Physical, Phase::Completed) => OrderStatus::Delivered,
            (OrderType::Digital, Phase::Completed) => OrderStatus::Redeemed,
            (OrderType::Subscription, Phase::Fulfilled | Phase::Completed) => OrderStatus::Activated,
        }
    }
}

impl Display for OrderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderType::Physical => write!(f, "physical"),
            OrderType::Digital => write!(f, "digital"),
            OrderType::Subscription => write!(f, "subscription"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn phase_codes_are_strictly_increasing() {
        let codes: Vec<u16> =
            [Phase::Placed, Phase::Paid, Phase::Fulfilled, Phase::Completed].iter().map(|p| p.code()).collect();
        assert_eq!(codes, vec![100, 200, 300, 400]);
        assert!(Phase::Placed < Phase::Paid && Phase::Paid < Phase::Fulfilled && Phase::Fulfilled < Phase::Completed);
    }

    #[test]
    fn paid_statuses_share_a_code_across_variants() {
        assert_eq!(OrderStatus::NotShipped.code(), 200);
        assert_eq!(OrderStatus::Unsent.code(), 200);
        assert_eq!(OrderStatus::PendingActivation.code(), 200);
    }

    #[test]
    fn subscription_fulfilment_lands_on_the_completed_code() {
        let status = OrderType::Subscription.status_at(Phase::Fulfilled);
        assert_eq!(status, OrderStatus::Activated);
        assert_eq!(status.code(), 400);
    }

    #[test]
    fn status_table_matches_phases() {
        for order_type in [OrderType::Physical, OrderType::Digital] {
            for phase in [Phase::Placed, Phase::Paid, Phase::Fulfilled, Phase::Completed] {
                assert_eq!(order_type.status_at(phase).phase(), phase);
            }
        }
    }

    #[test]
    fn status_round_trips_through_strings() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::NotShipped,
            OrderStatus::Unsent,
            OrderStatus::PendingActivation,
            OrderStatus::Shipped,
            OrderStatus::Sent,
            OrderStatus::Delivered,
            OrderStatus::Redeemed,
            OrderStatus::Activated,
        ] {
            assert_eq!(status.to_string().parse::<OrderStatus>().unwrap(), status);
        }
        assert!("Teleported".parse::<OrderStatus>().is_err());
    }
}
