//! State machine trait for status enums.
//!
//! Status enums declare their direct edges; the trait derives validated
//! single-step transitions and terminal detection from them.

use super::ValidationError;

/// Trait for status enums that represent state machines.
///
/// # Example
///
/// ```ignore
/// let next = TransactionStatus::Pending.transition_to(TransactionStatus::Success)?;
/// assert!(TransactionStatus::Refunded.is_terminal());
/// ```
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// Returns true if there is a direct edge from self to target.
    fn can_transition_to(&self, target: &Self) -> bool;

    /// Returns all direct targets from the current state.
    fn valid_transitions(&self) -> Vec<Self>;

    /// Performs a single-edge transition, returning error if there is no such edge.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(ValidationError::invalid_format(
                "state_transition",
                format!("Cannot transition from {:?} to {:?}", self, target),
            ))
        }
    }

    /// Checks if current state is terminal (no valid outgoing transitions).
    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Light {
        Off,
        Warming,
        On,
        Broken,
    }

    impl StateMachine for Light {
        fn can_transition_to(&self, target: &Self) -> bool {
            self.valid_transitions().contains(target)
        }

        fn valid_transitions(&self) -> Vec<Self> {
            use Light::*;
            match self {
                Off => vec![Warming],
                Warming => vec![On, Broken],
                On => vec![Off, Broken],
                Broken => vec![],
            }
        }
    }

    #[test]
    fn transition_to_follows_direct_edges() {
        assert_eq!(Light::Off.transition_to(Light::Warming), Ok(Light::Warming));
        assert!(Light::Off.transition_to(Light::On).is_err());
    }

    #[test]
    fn terminal_means_no_outgoing_edges() {
        assert!(Light::Broken.is_terminal());
        assert!(!Light::On.is_terminal());
    }
}
