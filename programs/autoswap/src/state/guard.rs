//! Reentrancy lock for the engine's mutating entry points.
//!
//! A single lock lives in the [`Config`](crate::state::Config) account. Every
//! state-mutating instruction acquires it after validation and before the
//! first write, and releases it on its success path. A failed invocation
//! discards all account writes, the lock flip included, so the lock can never
//! stay held across invocations; within one invocation any re-entry through
//! the token-collaborator CPI observes the held lock and fails.

use anchor_lang::prelude::*;

use crate::error::ErrorCode;

#[derive(
    AnchorSerialize, AnchorDeserialize, InitSpace, Clone, Copy, Debug, Default, PartialEq, Eq,
)]
pub enum LockState {
    #[default]
    Unlocked,
    Locked,
}

pub struct Lock;

impl Lock {
    /// Check-and-set at entry. Fails immediately if the lock is held.
    pub fn acquire(state: &mut LockState) -> Result<()> {
        match *state {
            LockState::Unlocked => {
                *state = LockState::Locked;
                Ok(())
            }
            LockState::Locked => Err(ErrorCode::ReentrantCall.into()),
        }
    }

    /// Release on the success exit path.
    pub fn release(state: &mut LockState) -> Result<()> {
        match *state {
            LockState::Locked => {
                *state = LockState::Unlocked;
                Ok(())
            }
            // Releasing an unlocked lock means an instruction skipped acquire.
            LockState::Unlocked => Err(ErrorCode::ReentrantCall.into()),
        }
    }

    pub fn is_locked(state: &LockState) -> bool {
        *state == LockState::Locked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_release_cycle() {
        let mut state = LockState::Unlocked;
        assert!(Lock::acquire(&mut state).is_ok());
        assert!(Lock::is_locked(&state));
        assert!(Lock::release(&mut state).is_ok());
        assert!(!Lock::is_locked(&state));
    }

    #[test]
    fn reentrant_acquire_fails() {
        let mut state = LockState::Unlocked;
        Lock::acquire(&mut state).unwrap();
        assert!(Lock::acquire(&mut state).is_err());
        // the failed acquire must not have clobbered the held lock
        assert!(Lock::is_locked(&state));
    }

    #[test]
    fn unmatched_release_fails() {
        let mut state = LockState::Unlocked;
        assert!(Lock::release(&mut state).is_err());
    }
}
