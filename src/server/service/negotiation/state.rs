//! Pure negotiation state machine.
//!
//! `NegotiationState` captures what a transition depends on (chain status, head offer,
//! original price) and decides whether an actor may apply an action. It performs no I/O,
//! so the service applies the returned `Outcome` to the database afterwards.

use chrono::{DateTime, Utc};
use entity::sea_orm_active_enums::{NegotiationStatus, OfferProposer, OfferStatus};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::server::model::negotiation::{AutoAcceptRule, Negotiation};

/// Something a party wants to do with the chain head.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Counter(Decimal),
    Accept,
    Reject,
    Cancel,
}

/// Result of a permitted transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Head becomes `countered`; a new pending offer at `price` becomes the head.
    Countered { price: Decimal },
    /// Head and chain become `accepted` at `final_price`.
    Accepted { final_price: Decimal },
    Rejected,
    Cancelled,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Negotiation is already {0:?}")]
    Resolved(NegotiationStatus),
    #[error("Offer has already been answered")]
    HeadNotPending,
    #[error("Offer has expired")]
    Expired,
    #[error("Waiting for the other party to respond")]
    NotYourTurn,
    #[error("Only the passenger can cancel a negotiation")]
    NotPassenger,
    #[error("{0}")]
    InvalidPrice(&'static str),
}

/// The chain head as seen by the state machine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadOffer {
    pub proposer: OfferProposer,
    pub price: Decimal,
    pub status: OfferStatus,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NegotiationState {
    pub status: NegotiationStatus,
    pub original_price: Decimal,
    pub head: HeadOffer,
}

impl NegotiationState {
    /// Snapshot of a loaded chain, `None` when the chain has no head offer.
    pub fn from_negotiation(negotiation: &Negotiation) -> Option<Self> {
        let head = negotiation.head()?;

        Some(Self {
            status: negotiation.status,
            original_price: negotiation.original_price,
            head: HeadOffer {
                proposer: head.proposer,
                price: head.price,
                status: head.status,
                expires_at: head.expires_at,
            },
        })
    }

    pub fn is_resolved(&self) -> bool {
        !matches!(
            self.status,
            NegotiationStatus::Open | NegotiationStatus::Countered
        )
    }

    /// Decides whether `actor` may apply `action` at `now`.
    ///
    /// Checks run in order: resolved chain, cancel rights, head still pending, turn order,
    /// expiry, then price bounds for counters. `Expired` tells the caller to persist the
    /// expiry of the chain.
    ///
    /// # Arguments
    /// - `actor` - Role of the user acting on the chain
    /// - `action` - Requested action
    /// - `now` - Instant used for the expiry check
    ///
    /// # Returns
    /// - `Ok(Outcome)` - Transition to apply
    /// - `Err(TransitionError)` - Transition not permitted
    pub fn apply(
        &self,
        actor: OfferProposer,
        action: Action,
        now: DateTime<Utc>,
    ) -> Result<Outcome, TransitionError> {
        if self.is_resolved() {
            return Err(TransitionError::Resolved(self.status));
        }

        if action == Action::Cancel {
            return match actor {
                OfferProposer::Passenger => Ok(Outcome::Cancelled),
                OfferProposer::Driver => Err(TransitionError::NotPassenger),
            };
        }

        if self.head.status != OfferStatus::Pending {
            return Err(TransitionError::HeadNotPending);
        }
        if actor == self.head.proposer {
            return Err(TransitionError::NotYourTurn);
        }
        if self.head.expires_at <= now {
            return Err(TransitionError::Expired);
        }

        match action {
            Action::Accept => Ok(Outcome::Accepted {
                final_price: self.head.price,
            }),
            Action::Reject => Ok(Outcome::Rejected),
            Action::Counter(price) => {
                self.check_counter_price(actor, price)?;
                Ok(Outcome::Countered { price })
            }
            Action::Cancel => Ok(Outcome::Cancelled),
        }
    }

    fn check_counter_price(
        &self,
        actor: OfferProposer,
        price: Decimal,
    ) -> Result<(), TransitionError> {
        match actor {
            OfferProposer::Driver => {
                if price <= self.head.price || price >= self.original_price {
                    return Err(TransitionError::InvalidPrice(
                        "Driver counter must be above the passenger's offer and below the original price",
                    ));
                }
            }
            OfferProposer::Passenger => {
                if price <= Decimal::ZERO || price >= self.head.price {
                    return Err(TransitionError::InvalidPrice(
                        "Passenger counter must be positive and below the driver's offer",
                    ));
                }
            }
        }

        Ok(())
    }
}

/// Lowest price a driver's rule accepts automatically for a seat priced `trip_price`.
///
/// `max(trip_price × pct / 100, trip_price − max_discount)`, the second term only when a
/// maximum discount is configured. `None` when the rule is disabled.
pub fn auto_accept_threshold(trip_price: Decimal, rule: &AutoAcceptRule) -> Option<Decimal> {
    if !rule.enabled {
        return None;
    }

    let by_percentage =
        trip_price * Decimal::from(rule.min_price_percentage) / Decimal::from(100);

    Some(match rule.max_discount_amount {
        Some(discount) => by_percentage.max(trip_price - discount),
        None => by_percentage,
    })
}

/// Whether `offer_price` is accepted without the driver's action. Equality accepts.
pub fn should_auto_accept(offer_price: Decimal, trip_price: Decimal, rule: &AutoAcceptRule) -> bool {
    auto_accept_threshold(trip_price, rule).is_some_and(|threshold| offer_price >= threshold)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn dec(value: i64) -> Decimal {
        Decimal::new(value, 0)
    }

    fn state(proposer: OfferProposer, head_price: i64) -> NegotiationState {
        NegotiationState {
            status: NegotiationStatus::Open,
            original_price: dec(100_000),
            head: HeadOffer {
                proposer,
                price: dec(head_price),
                status: OfferStatus::Pending,
                expires_at: Utc::now() + Duration::hours(1),
            },
        }
    }

    fn rule(pct: i32, max_discount: Option<i64>) -> AutoAcceptRule {
        AutoAcceptRule {
            enabled: true,
            min_price_percentage: pct,
            max_discount_amount: max_discount.map(dec),
        }
    }

    /// Expected: only the party that did not propose the head may respond
    #[test]
    fn proposer_cannot_answer_own_offer() {
        let state = state(OfferProposer::Passenger, 80_000);
        let now = Utc::now();

        assert_eq!(
            state.apply(OfferProposer::Passenger, Action::Accept, now),
            Err(TransitionError::NotYourTurn)
        );
        assert_eq!(
            state.apply(OfferProposer::Passenger, Action::Counter(dec(70_000)), now),
            Err(TransitionError::NotYourTurn)
        );
        assert_eq!(
            state.apply(OfferProposer::Driver, Action::Accept, now),
            Ok(Outcome::Accepted {
                final_price: dec(80_000)
            })
        );
    }

    /// Expected: an expired head can be neither countered nor accepted
    #[test]
    fn expired_head_blocks_responses() {
        let mut state = state(OfferProposer::Passenger, 80_000);
        state.head.expires_at = Utc::now() - Duration::minutes(1);
        let now = Utc::now();

        assert_eq!(
            state.apply(OfferProposer::Driver, Action::Accept, now),
            Err(TransitionError::Expired)
        );
        assert_eq!(
            state.apply(OfferProposer::Driver, Action::Counter(dec(90_000)), now),
            Err(TransitionError::Expired)
        );
    }

    /// Expected: driver counters must lie strictly between the offer and the original price
    #[test]
    fn driver_counter_bounds() {
        let state = state(OfferProposer::Passenger, 80_000);
        let now = Utc::now();

        assert!(state
            .apply(OfferProposer::Driver, Action::Counter(dec(90_000)), now)
            .is_ok());
        assert!(state
            .apply(OfferProposer::Driver, Action::Counter(dec(80_000)), now)
            .is_err());
        assert!(state
            .apply(OfferProposer::Driver, Action::Counter(dec(100_000)), now)
            .is_err());
    }

    /// Expected: passenger counters must be positive and below the driver's price
    #[test]
    fn passenger_counter_bounds() {
        let state = state(OfferProposer::Driver, 90_000);
        let now = Utc::now();

        assert_eq!(
            state.apply(OfferProposer::Passenger, Action::Counter(dec(85_000)), now),
            Ok(Outcome::Countered {
                price: dec(85_000)
            })
        );
        assert!(state
            .apply(OfferProposer::Passenger, Action::Counter(dec(90_000)), now)
            .is_err());
        assert!(state
            .apply(OfferProposer::Passenger, Action::Counter(Decimal::ZERO), now)
            .is_err());
    }

    /// Expected: resolved chains reject every action, cancel is passenger only
    #[test]
    fn resolved_and_cancel_rules() {
        let mut state = state(OfferProposer::Passenger, 80_000);
        let now = Utc::now();

        assert_eq!(
            state.apply(OfferProposer::Driver, Action::Cancel, now),
            Err(TransitionError::NotPassenger)
        );
        assert_eq!(
            state.apply(OfferProposer::Passenger, Action::Cancel, now),
            Ok(Outcome::Cancelled)
        );

        state.status = NegotiationStatus::Accepted;
        assert_eq!(
            state.apply(OfferProposer::Driver, Action::Reject, now),
            Err(TransitionError::Resolved(NegotiationStatus::Accepted))
        );
    }

    /// Expected: the percentage threshold accepts at equality and rejects below
    #[test]
    fn auto_accept_percentage_threshold() {
        let rule = rule(80, None);

        assert_eq!(auto_accept_threshold(dec(100_000), &rule), Some(dec(80_000)));
        assert!(should_auto_accept(dec(80_000), dec(100_000), &rule));
        assert!(!should_auto_accept(dec(79_999), dec(100_000), &rule));
    }

    /// Expected: a max discount raises the threshold when it is the stricter bound
    #[test]
    fn auto_accept_uses_stricter_bound() {
        let rule = rule(80, Some(10_000));

        assert_eq!(auto_accept_threshold(dec(100_000), &rule), Some(dec(90_000)));
        assert!(!should_auto_accept(dec(85_000), dec(100_000), &rule));
        assert!(should_auto_accept(dec(90_000), dec(100_000), &rule));
    }

    /// Expected: a disabled rule never accepts
    #[test]
    fn disabled_rule_never_accepts() {
        let rule = AutoAcceptRule::default();

        assert_eq!(auto_accept_threshold(dec(100_000), &rule), None);
        assert!(!should_auto_accept(dec(100_000), dec(100_000), &rule));
    }
}
