//! Provider verification: registration opens a pending application which the
//! admin either verifies or rejects. Verification is surfaced on offers as a
//! trust signal; it does not gate matching.

use soroban_sdk::{contracttype, symbol_short, Address, Env, String, Symbol, Vec};

use crate::admin::AdminStorage;
use crate::errors::RentFlowError;
use crate::events::{emit_provider_rejected, emit_provider_verified};
use crate::provider::ProviderStorage;

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ProviderVerificationStatus {
    Pending,
    Verified,
    Rejected,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProviderVerification {
    pub provider: Address,
    pub status: ProviderVerificationStatus,
    pub submitted_at: u64,
    pub reviewed_at: Option<u64>,
    pub notes: String,
}

const PENDING_KEY: Symbol = symbol_short!("prv_pnd");
const VERIFIED_KEY: Symbol = symbol_short!("prv_vrf");
const REJECTED_KEY: Symbol = symbol_short!("prv_rej");

pub struct ProviderVerificationStorage;

impl ProviderVerificationStorage {
    fn record_key(provider: &Address) -> (Symbol, Address) {
        (symbol_short!("prv_app"), provider.clone())
    }

    pub fn get_verification(env: &Env, provider: &Address) -> Option<ProviderVerification> {
        env.storage().instance().get(&Self::record_key(provider))
    }

    fn store_verification(env: &Env, verification: &ProviderVerification) {
        env.storage()
            .instance()
            .set(&Self::record_key(&verification.provider), verification);
    }

    pub fn is_provider_verified(env: &Env, provider: &Address) -> bool {
        matches!(
            Self::get_verification(env, provider).map(|v| v.status),
            Some(ProviderVerificationStatus::Verified)
        )
    }

    pub fn get_pending_providers(env: &Env) -> Vec<Address> {
        Self::get_list(env, &PENDING_KEY)
    }

    pub fn get_verified_providers(env: &Env) -> Vec<Address> {
        Self::get_list(env, &VERIFIED_KEY)
    }

    pub fn get_rejected_providers(env: &Env) -> Vec<Address> {
        Self::get_list(env, &REJECTED_KEY)
    }

    fn get_list(env: &Env, key: &Symbol) -> Vec<Address> {
        env.storage()
            .instance()
            .get(key)
            .unwrap_or_else(|| Vec::new(env))
    }

    fn add_to_list(env: &Env, key: &Symbol, provider: &Address) {
        let mut list = Self::get_list(env, key);
        if !list.iter().any(|a| a == *provider) {
            list.push_back(provider.clone());
            env.storage().instance().set(key, &list);
        }
    }

    fn remove_from_list(env: &Env, key: &Symbol, provider: &Address) {
        let list = Self::get_list(env, key);
        let mut new_list = Vec::new(env);
        for a in list.iter() {
            if a != *provider {
                new_list.push_back(a);
            }
        }
        env.storage().instance().set(key, &new_list);
    }
}

/// Open a pending application for a newly registered provider.
pub fn submit_application(env: &Env, provider: &Address) {
    let verification = ProviderVerification {
        provider: provider.clone(),
        status: ProviderVerificationStatus::Pending,
        submitted_at: env.ledger().timestamp(),
        reviewed_at: None,
        notes: String::from_str(env, ""),
    };
    ProviderVerificationStorage::store_verification(env, &verification);
    ProviderVerificationStorage::add_to_list(env, &PENDING_KEY, provider);
}

/// Verify a provider (admin only): flips the profile's `verified` flag and
/// moves the application from the pending to the verified list.
pub fn verify_provider(env: &Env, admin: &Address, provider: &Address) -> Result<(), RentFlowError> {
    admin.require_auth();
    AdminStorage::require_admin(env, admin)?;

    let mut verification = ProviderVerificationStorage::get_verification(env, provider)
        .ok_or(RentFlowError::VerificationNotFound)?;
    if verification.status != ProviderVerificationStatus::Pending {
        return Err(RentFlowError::OperationNotAllowed);
    }

    verification.status = ProviderVerificationStatus::Verified;
    verification.reviewed_at = Some(env.ledger().timestamp());
    ProviderVerificationStorage::store_verification(env, &verification);
    ProviderVerificationStorage::remove_from_list(env, &PENDING_KEY, provider);
    ProviderVerificationStorage::add_to_list(env, &VERIFIED_KEY, provider);

    let mut profile =
        ProviderStorage::get_profile(env, provider).ok_or(RentFlowError::ProviderNotFound)?;
    profile.verified = true;
    ProviderStorage::update_profile(env, &profile);

    emit_provider_verified(env, provider);
    Ok(())
}

/// Reject a provider application (admin only) with a review note.
pub fn reject_provider(
    env: &Env,
    admin: &Address,
    provider: &Address,
    reason: String,
) -> Result<(), RentFlowError> {
    admin.require_auth();
    AdminStorage::require_admin(env, admin)?;

    let mut verification = ProviderVerificationStorage::get_verification(env, provider)
        .ok_or(RentFlowError::VerificationNotFound)?;
    if verification.status != ProviderVerificationStatus::Pending {
        return Err(RentFlowError::OperationNotAllowed);
    }

    verification.status = ProviderVerificationStatus::Rejected;
    verification.reviewed_at = Some(env.ledger().timestamp());
    verification.notes = reason;
    ProviderVerificationStorage::store_verification(env, &verification);
    ProviderVerificationStorage::remove_from_list(env, &PENDING_KEY, provider);
    ProviderVerificationStorage::add_to_list(env, &REJECTED_KEY, provider);

    emit_provider_rejected(env, provider);
    Ok(())
}
