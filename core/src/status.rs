// comanda_core/src/status.rs

//! The order status state machine.
//!
//! Statuses form a fixed fulfillment flow:
//!
//! `Pending -> Confirmed -> Processing -> Out for Delivery -> Delivered`
//!
//! with `Cancelled` as a side branch: it is reachable from every state and
//! can never be exited. Requested transitions (admin- or user-driven) may
//! only move forward along the flow; trusted transitions (driven by a
//! verified gateway event) skip the check entirely and are a distinct
//! variant of the public contract, not a hidden special case.

use crate::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
  Pending,
  /// Reserved literal. Parseable and serializable for data compatibility,
  /// but absent from the rank table: the requested-transition validator
  /// rejects it.
  #[serde(rename = "Pending Payment")]
  PendingPayment,
  Confirmed,
  Processing,
  #[serde(rename = "Out for Delivery")]
  OutForDelivery,
  Delivered,
  Cancelled,
}

impl OrderStatus {
  /// Position in the fulfillment flow. `Cancelled` deliberately carries the
  /// highest rank: every state may move to it, and nothing ranks above it,
  /// so it can never be exited. `PendingPayment` has no rank.
  pub fn rank(self) -> Option<u8> {
    match self {
      OrderStatus::Pending => Some(0),
      OrderStatus::Confirmed => Some(1),
      OrderStatus::Processing => Some(2),
      OrderStatus::OutForDelivery => Some(3),
      OrderStatus::Delivered => Some(4),
      OrderStatus::Cancelled => Some(5),
      OrderStatus::PendingPayment => None,
    }
  }

  /// The case-sensitive wire literal. These strings are persisted and must
  /// not change.
  pub fn as_str(self) -> &'static str {
    match self {
      OrderStatus::Pending => "Pending",
      OrderStatus::PendingPayment => "Pending Payment",
      OrderStatus::Confirmed => "Confirmed",
      OrderStatus::Processing => "Processing",
      OrderStatus::OutForDelivery => "Out for Delivery",
      OrderStatus::Delivered => "Delivered",
      OrderStatus::Cancelled => "Cancelled",
    }
  }

  pub fn is_terminal(self) -> bool {
    matches!(self, OrderStatus::Cancelled)
  }
}

impl fmt::Display for OrderStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for OrderStatus {
  type Err = EngineError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "Pending" => Ok(OrderStatus::Pending),
      "Pending Payment" => Ok(OrderStatus::PendingPayment),
      "Confirmed" => Ok(OrderStatus::Confirmed),
      "Processing" => Ok(OrderStatus::Processing),
      "Out for Delivery" => Ok(OrderStatus::OutForDelivery),
      "Delivered" => Ok(OrderStatus::Delivered),
      "Cancelled" => Ok(OrderStatus::Cancelled),
      other => Err(EngineError::Validation(format!("Invalid status value: {}", other))),
    }
  }
}

/// A status change request, tagged by trust level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
  /// Admin- or user-driven. Subject to the monotonicity rule.
  Requested(OrderStatus),
  /// System-driven, from a verified gateway event. Bypasses the rank check.
  Trusted(OrderStatus),
}

impl Transition {
  pub fn target(self) -> OrderStatus {
    match self {
      Transition::Requested(s) | Transition::Trusted(s) => s,
    }
  }
}

/// Validates a transition from `current`, returning the status to apply.
///
/// Requested transitions fail with `InvalidTransition` when the target is
/// unranked or ranks below the current status. A current status without a
/// rank does not block forward movement into the flow.
pub fn validate_transition(current: OrderStatus, transition: Transition) -> EngineResult<OrderStatus> {
  match transition {
    Transition::Trusted(target) => Ok(target),
    Transition::Requested(target) => {
      let target_rank = target.rank().ok_or(EngineError::InvalidTransition {
        from: current,
        to: target,
      })?;
      if let Some(current_rank) = current.rank() {
        if target_rank < current_rank {
          return Err(EngineError::InvalidTransition {
            from: current,
            to: target,
          });
        }
      }
      Ok(target)
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const RANKED: [OrderStatus; 6] = [
    OrderStatus::Pending,
    OrderStatus::Confirmed,
    OrderStatus::Processing,
    OrderStatus::OutForDelivery,
    OrderStatus::Delivered,
    OrderStatus::Cancelled,
  ];

  #[test]
  fn forward_transitions_allowed_backward_rejected() {
    for (i, &from) in RANKED.iter().enumerate() {
      for (j, &to) in RANKED.iter().enumerate() {
        let result = validate_transition(from, Transition::Requested(to));
        if j >= i {
          assert_eq!(result.unwrap(), to, "{} -> {} should be allowed", from, to);
        } else {
          assert!(
            matches!(result, Err(EngineError::InvalidTransition { .. })),
            "{} -> {} should be rejected",
            from,
            to
          );
        }
      }
    }
  }

  #[test]
  fn cancelled_reachable_from_everywhere_exits_nowhere() {
    for &from in &RANKED {
      assert!(validate_transition(from, Transition::Requested(OrderStatus::Cancelled)).is_ok());
      assert_eq!(from.is_terminal(), from == OrderStatus::Cancelled);
    }
    for &to in &RANKED[..5] {
      assert!(validate_transition(OrderStatus::Cancelled, Transition::Requested(to)).is_err());
    }
  }

  #[test]
  fn pending_payment_is_not_a_valid_requested_target() {
    let result = validate_transition(OrderStatus::Pending, Transition::Requested(OrderStatus::PendingPayment));
    assert!(matches!(result, Err(EngineError::InvalidTransition { .. })));
  }

  #[test]
  fn trusted_transition_skips_the_rank_check() {
    // Delivered -> Processing is backward, but a trusted transition applies it.
    let applied = validate_transition(OrderStatus::Delivered, Transition::Trusted(OrderStatus::Processing)).unwrap();
    assert_eq!(applied, OrderStatus::Processing);
  }

  #[test]
  fn wire_literals_are_stable() {
    assert_eq!(OrderStatus::OutForDelivery.as_str(), "Out for Delivery");
    assert_eq!(OrderStatus::PendingPayment.as_str(), "Pending Payment");
    assert_eq!("Out for Delivery".parse::<OrderStatus>().unwrap(), OrderStatus::OutForDelivery);
    assert!("out for delivery".parse::<OrderStatus>().is_err());
  }

  #[test]
  fn serde_round_trip_uses_wire_literals() {
    let json = serde_json::to_string(&OrderStatus::OutForDelivery).unwrap();
    assert_eq!(json, "\"Out for Delivery\"");
    let back: OrderStatus = serde_json::from_str(&json).unwrap();
    assert_eq!(back, OrderStatus::OutForDelivery);
  }
}
