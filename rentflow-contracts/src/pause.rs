//! Emergency pause control for state-changing contract operations.
//!
//! When paused, all mutating entrypoints must reject execution.
//! Read-only queries remain available.

use crate::admin::AdminStorage;
use crate::errors::RentFlowError;
use soroban_sdk::{symbol_short, Address, Env, Symbol};

const PAUSED_KEY: Symbol = symbol_short!("paused");

pub struct PauseControl;

impl PauseControl {
    /// Returns true when the protocol is paused.
    pub fn is_paused(env: &Env) -> bool {
        env.storage().instance().get(&PAUSED_KEY).unwrap_or(false)
    }

    /// Pause or unpause the protocol (admin only).
    pub fn set_paused(env: &Env, admin: &Address, paused: bool) -> Result<(), RentFlowError> {
        admin.require_auth();
        AdminStorage::require_admin(env, admin)?;
        env.storage().instance().set(&PAUSED_KEY, &paused);
        Ok(())
    }

    /// Reject state-changing operations when the protocol is paused.
    pub fn require_not_paused(env: &Env) -> Result<(), RentFlowError> {
        if Self::is_paused(env) {
            return Err(RentFlowError::ContractPaused);
        }
        Ok(())
    }
}
