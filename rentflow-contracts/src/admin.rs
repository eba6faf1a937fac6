//! Admin role management for the RentFlow protocol.
//!
//! Single admin address (MVP design): the admin verifies providers, manages
//! the currency whitelist, configures negotiation timeouts and can pause the
//! contract. The role can be transferred but only set once at initialization.

use crate::errors::RentFlowError;
use soroban_sdk::{symbol_short, Address, Env, Symbol};

/// Storage keys for admin management
pub const ADMIN_KEY: Symbol = symbol_short!("admin");
pub const ADMIN_INITIALIZED_KEY: Symbol = symbol_short!("adm_init");

/// Admin storage and management operations
pub struct AdminStorage;

impl AdminStorage {
    /// Initialize the admin address (can only be called once)
    ///
    /// # Returns
    /// * `Ok(())` if initialization succeeds
    /// * `Err(RentFlowError::OperationNotAllowed)` if admin was already set
    pub fn initialize(env: &Env, admin: &Address) -> Result<(), RentFlowError> {
        let is_initialized: bool = env
            .storage()
            .instance()
            .get(&ADMIN_INITIALIZED_KEY)
            .unwrap_or(false);

        if is_initialized {
            return Err(RentFlowError::OperationNotAllowed);
        }

        admin.require_auth();

        env.storage().instance().set(&ADMIN_KEY, admin);
        env.storage().instance().set(&ADMIN_INITIALIZED_KEY, &true);

        emit_admin_set(env, admin);

        Ok(())
    }

    /// Transfer admin role to a new address
    ///
    /// # Returns
    /// * `Ok(())` if transfer succeeds
    /// * `Err(RentFlowError::NotAdmin)` if caller is not current admin
    pub fn set_admin(
        env: &Env,
        current_admin: &Address,
        new_admin: &Address,
    ) -> Result<(), RentFlowError> {
        current_admin.require_auth();

        if !Self::is_admin(env, current_admin) {
            return Err(RentFlowError::NotAdmin);
        }

        env.storage().instance().set(&ADMIN_KEY, new_admin);

        emit_admin_transferred(env, current_admin, new_admin);

        Ok(())
    }

    /// Get the current admin address
    pub fn get_admin(env: &Env) -> Option<Address> {
        env.storage().instance().get(&ADMIN_KEY)
    }

    /// Check if an address is the admin
    pub fn is_admin(env: &Env, address: &Address) -> bool {
        if let Some(admin) = Self::get_admin(env) {
            admin == *address
        } else {
            false
        }
    }

    /// Require that an address is the admin (authorization helper)
    pub fn require_admin(env: &Env, address: &Address) -> Result<(), RentFlowError> {
        if !Self::is_admin(env, address) {
            return Err(RentFlowError::NotAdmin);
        }
        Ok(())
    }
}

/// Emit event when admin is first initialized
fn emit_admin_set(env: &Env, admin: &Address) {
    env.events().publish(
        (symbol_short!("adm_set"),),
        (admin.clone(), env.ledger().timestamp()),
    );
}

/// Emit event when admin role is transferred
fn emit_admin_transferred(env: &Env, old_admin: &Address, new_admin: &Address) {
    env.events().publish(
        (symbol_short!("adm_trf"),),
        (
            old_admin.clone(),
            new_admin.clone(),
            env.ledger().timestamp(),
        ),
    );
}
