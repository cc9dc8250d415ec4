//! Status transition rules for both work item types.
//!
//! Transitions are forward-only along the defined order. Skipping an
//! intermediate forward state is permitted, but moving backwards or
//! re-entering the current status is not, so a terminal status is entered
//! exactly once and its timestamp stamped exactly once.

use crate::models::{OrderStatus, RelocationStatus};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Invalid state transition from {from} to {to}")]
    NotForward { from: String, to: String },

    #[error("A driver must be bound before the status can advance past assigned")]
    DriverNotBound,

    #[error("Cannot cancel a request that is {status}")]
    NotCancellable { status: String },
}

/// Validates an order status advance. `driver_bound` reflects whether a
/// driver reference is set on the work item at the time of the update.
pub fn advance_order(
    current: OrderStatus,
    next: OrderStatus,
    driver_bound: bool,
) -> Result<(), TransitionError> {
    if next.rank() <= current.rank() {
        return Err(TransitionError::NotForward {
            from: current.as_str().to_string(),
            to: next.as_str().to_string(),
        });
    }
    if next.rank() > OrderStatus::Assigned.rank() && !driver_bound {
        return Err(TransitionError::DriverNotBound);
    }
    Ok(())
}

/// Validates a relocation status advance. `cancelled` is never a valid
/// advance target; it is only reachable through [`cancel_relocation`].
pub fn advance_relocation(
    current: RelocationStatus,
    next: RelocationStatus,
    driver_bound: bool,
) -> Result<(), TransitionError> {
    if next == RelocationStatus::Cancelled
        || current.is_terminal()
        || next.rank() <= current.rank()
    {
        return Err(TransitionError::NotForward {
            from: current.as_str().to_string(),
            to: next.as_str().to_string(),
        });
    }
    if next.rank() > RelocationStatus::Assigned.rank() && !driver_bound {
        return Err(TransitionError::DriverNotBound);
    }
    Ok(())
}

/// Cancellation is rejected once the move is in transit or terminal.
pub fn cancel_relocation(current: RelocationStatus) -> Result<(), TransitionError> {
    match current {
        RelocationStatus::Pending | RelocationStatus::Assigned => Ok(()),
        other => Err(TransitionError::NotCancellable {
            status: other.as_str().to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_progresses_through_the_defined_chain() {
        assert!(advance_order(OrderStatus::Pending, OrderStatus::Assigned, true).is_ok());
        assert!(advance_order(OrderStatus::Assigned, OrderStatus::InTransit, true).is_ok());
        assert!(advance_order(OrderStatus::InTransit, OrderStatus::Delivered, true).is_ok());
    }

    #[test]
    fn order_cannot_move_backwards() {
        let err = advance_order(OrderStatus::InTransit, OrderStatus::Assigned, true).unwrap_err();
        assert_eq!(
            err,
            TransitionError::NotForward {
                from: "in-transit".into(),
                to: "assigned".into(),
            }
        );
    }

    #[test]
    fn unbound_driver_cannot_advance_past_assigned() {
        let err = advance_order(OrderStatus::Assigned, OrderStatus::InTransit, false).unwrap_err();
        assert_eq!(err, TransitionError::DriverNotBound);
    }

    #[test]
    fn repeated_terminal_transition_is_rejected() {
        let err = advance_order(OrderStatus::Delivered, OrderStatus::Delivered, true).unwrap_err();
        assert!(matches!(err, TransitionError::NotForward { .. }));
    }

    #[test]
    fn forward_skips_are_permitted() {
        assert!(advance_order(OrderStatus::Assigned, OrderStatus::Delivered, true).is_ok());
    }

    #[test]
    fn relocation_cannot_advance_into_cancelled() {
        let err = advance_relocation(
            RelocationStatus::Pending,
            RelocationStatus::Cancelled,
            true,
        )
        .unwrap_err();
        assert!(matches!(err, TransitionError::NotForward { .. }));
    }

    #[test]
    fn cancelled_relocation_accepts_no_further_transitions() {
        let err = advance_relocation(
            RelocationStatus::Cancelled,
            RelocationStatus::Completed,
            true,
        )
        .unwrap_err();
        assert!(matches!(err, TransitionError::NotForward { .. }));
    }

    #[test]
    fn cancel_allowed_only_before_transit() {
        assert!(cancel_relocation(RelocationStatus::Pending).is_ok());
        assert!(cancel_relocation(RelocationStatus::Assigned).is_ok());
        assert_eq!(
            cancel_relocation(RelocationStatus::InTransit).unwrap_err(),
            TransitionError::NotCancellable {
                status: "in-transit".into()
            }
        );
        assert!(cancel_relocation(RelocationStatus::Completed).is_err());
        assert!(cancel_relocation(RelocationStatus::Cancelled).is_err());
    }
}
