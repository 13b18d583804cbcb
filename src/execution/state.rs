//! Executor state machine.

/// Lifecycle of one execution attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionState {
    /// Nothing has run yet in this attempt.
    #[default]
    Idle,
    /// Command line rendered, process about to start.
    Built,
    /// Process exited with code 0.
    Succeeded,
    /// Process exited non-zero.
    Failed,
    /// Process was stopped by a signal (e.g. Ctrl-C).
    Interrupted,
    /// Process could not be started or waited on.
    Crashed,
}

impl ExecutionState {
    /// Check if transition to target state is valid.
    ///
    /// Valid transitions:
    /// - Idle -> Built
    /// - Idle -> Crashed (nothing to build)
    /// - Built -> Succeeded | Failed | Interrupted | Crashed
    /// - any terminal state -> Idle (next attempt)
    pub fn can_transition_to(&self, target: ExecutionState) -> bool {
        use ExecutionState::*;
        match (*self, target) {
            (Idle, Built) | (Idle, Crashed) => true,
            (Built, Succeeded) | (Built, Failed) | (Built, Interrupted) | (Built, Crashed) => true,
            (from, Idle) => from.is_terminal() || from == Idle,
            _ => false,
        }
    }

    /// Attempt to transition to a new state.
    ///
    /// Returns `Ok(())` if the transition is valid, or an error otherwise.
    pub fn transition_to(&mut self, target: ExecutionState) -> crate::Result<()> {
        if self.can_transition_to(target) {
            *self = target;
            Ok(())
        } else {
            Err(crate::error::ClitoolsError::InvalidStateTransition {
                from: *self,
                to: target,
            })
        }
    }

    /// Check if this is a terminal state for the current attempt.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ExecutionState::Succeeded
                | ExecutionState::Failed
                | ExecutionState::Interrupted
                | ExecutionState::Crashed
        )
    }
}
