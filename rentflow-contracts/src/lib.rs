#![no_std]
use soroban_sdk::{contract, contractimpl, Address, BytesN, Env, String, Vec};

mod admin;
mod currency;
mod errors;
mod events;
mod matching;
mod negotiation;
mod offer;
mod order;
mod pause;
mod provider;
mod request;
mod verification;
#[cfg(test)]
mod test_lifecycle;
#[cfg(test)]
mod test_order;
#[cfg(test)]
mod test_request;

use admin::AdminStorage;
use currency::CurrencyWhitelist;
use errors::RentFlowError;
use events::{emit_provider_registered, emit_request_cancelled, emit_request_matched,
    emit_request_submitted};
use negotiation::{Actor, NegotiationSession, NegotiationStorage};
use offer::{Offer, OfferStorage};
use order::{Order, OrderStorage};
use pause::PauseControl;
use provider::{ProviderProfile, ProviderStorage};
use request::{RentalItem, RentalRequest, RequestStatus, RequestStorage};
use verification::{ProviderVerification, ProviderVerificationStorage};

#[contract]
pub struct RentFlowContract;

#[contractimpl]
impl RentFlowContract {
    // ============================================================================
    // Admin Management Functions
    // ============================================================================

    /// Initialize the admin address (one-time setup)
    pub fn initialize_admin(env: Env, admin: Address) -> Result<(), RentFlowError> {
        AdminStorage::initialize(&env, &admin)
    }

    /// Transfer admin role to a new address
    ///
    /// # Returns
    /// * `Ok(())` if transfer succeeds
    /// * `Err(RentFlowError::NotAdmin)` if caller is not current admin
    pub fn transfer_admin(env: Env, new_admin: Address) -> Result<(), RentFlowError> {
        let current_admin = AdminStorage::get_admin(&env).ok_or(RentFlowError::NotAdmin)?;
        AdminStorage::set_admin(&env, &current_admin, &new_admin)
    }

    /// Get the current admin address
    pub fn get_admin(env: Env) -> Option<Address> {
        AdminStorage::get_admin(&env)
    }

    /// Pause the contract (admin only). When paused, mutating operations fail
    /// with ContractPaused; getters succeed.
    pub fn pause(env: Env, admin: Address) -> Result<(), RentFlowError> {
        PauseControl::set_paused(&env, &admin, true)
    }

    /// Unpause the contract (admin only).
    pub fn unpause(env: Env, admin: Address) -> Result<(), RentFlowError> {
        PauseControl::set_paused(&env, &admin, false)
    }

    /// Return whether the contract is currently paused.
    pub fn is_paused(env: Env) -> bool {
        PauseControl::is_paused(&env)
    }

    /// Add a token address to the currency whitelist (admin only).
    pub fn add_currency(env: Env, admin: Address, currency: Address) -> Result<(), RentFlowError> {
        CurrencyWhitelist::add_currency(&env, &admin, &currency)
    }

    /// Remove a token address from the currency whitelist (admin only).
    pub fn remove_currency(
        env: Env,
        admin: Address,
        currency: Address,
    ) -> Result<(), RentFlowError> {
        CurrencyWhitelist::remove_currency(&env, &admin, &currency)
    }

    /// Check if a token is allowed for request pricing.
    pub fn is_allowed_currency(env: Env, currency: Address) -> bool {
        CurrencyWhitelist::is_allowed_currency(&env, &currency)
    }

    /// Get all whitelisted token addresses.
    pub fn get_whitelisted_currencies(env: Env) -> Vec<Address> {
        CurrencyWhitelist::get_whitelisted_currencies(&env)
    }

    /// Admin-only: configure negotiation inactivity timeout (hours). Bounds: 1..=336.
    pub fn set_negotiation_timeout_hours(
        env: Env,
        admin: Address,
        hours: u64,
    ) -> Result<u64, RentFlowError> {
        NegotiationStorage::set_timeout_hours(&env, &admin, hours)
    }

    /// Get configured negotiation timeout in hours (returns default 48 if not set)
    pub fn get_negotiation_timeout_hours(env: Env) -> u64 {
        NegotiationStorage::get_timeout_hours(&env)
    }

    // ============================================================================
    // Request Management Functions
    // ============================================================================

    /// Submit a rental request (requester only).
    ///
    /// Items are validated and normalized into per-category totals; the
    /// request starts Open and is immutable apart from its status.
    ///
    /// # Arguments
    /// * `requester` - Address submitting the request
    /// * `items` - Equipment lines (category, quantity, driver option, rental mode)
    /// * `location` - Free-form site location
    /// * `requested_start` - Optional start timestamp
    /// * `currency` - Token the request is priced in
    ///
    /// # Errors
    /// * `InvalidRequest` if items is empty
    /// * `InvalidQuantity` if any line has quantity 0
    /// * `TooManyItems`, `InvalidCategory`, `InvalidLocation`, `InvalidCurrency`
    pub fn submit_request(
        env: Env,
        requester: Address,
        items: Vec<RentalItem>,
        location: String,
        requested_start: Option<u64>,
        currency: Address,
    ) -> Result<BytesN<32>, RentFlowError> {
        PauseControl::require_not_paused(&env)?;
        requester.require_auth();
        CurrencyWhitelist::require_allowed_currency(&env, &currency)?;

        let request = RentalRequest::new(
            &env,
            requester,
            items,
            location,
            requested_start,
            currency,
        )?;
        RequestStorage::store_request(&env, &request);
        emit_request_submitted(&env, &request);

        Ok(request.id)
    }

    /// Get a request by ID.
    pub fn get_request(env: Env, request_id: BytesN<32>) -> Result<RentalRequest, RentFlowError> {
        RequestStorage::get_request(&env, &request_id).ok_or(RentFlowError::RequestNotFound)
    }

    /// Cancel a request (requester only, while still Open).
    pub fn cancel_request(env: Env, request_id: BytesN<32>) -> Result<(), RentFlowError> {
        PauseControl::require_not_paused(&env)?;
        let mut request = RequestStorage::get_request(&env, &request_id)
            .ok_or(RentFlowError::RequestNotFound)?;
        request.requester.require_auth();
        request.cancel()?;
        RequestStorage::update_request(&env, &request);
        emit_request_cancelled(&env, &request);
        Ok(())
    }

    /// Get all request IDs submitted by an address.
    pub fn get_requests_by_requester(env: Env, requester: Address) -> Vec<BytesN<32>> {
        RequestStorage::get_requests_by_requester(&env, &requester)
    }

    // ============================================================================
    // Provider Catalog Functions
    // ============================================================================

    /// Register a provider profile (provider only). Opens a pending
    /// verification application reviewed by the admin.
    pub fn register_provider(
        env: Env,
        provider: Address,
        name: String,
        base_price_per_day: i128,
    ) -> Result<(), RentFlowError> {
        PauseControl::require_not_paused(&env)?;
        provider.require_auth();
        ProviderStorage::register(&env, &provider, name, base_price_per_day)?;
        verification::submit_application(&env, &provider);
        emit_provider_registered(&env, &provider);
        Ok(())
    }

    /// Get a provider profile by address.
    pub fn get_provider(env: Env, provider: Address) -> Result<ProviderProfile, RentFlowError> {
        ProviderStorage::get_profile(&env, &provider).ok_or(RentFlowError::ProviderNotFound)
    }

    /// Get all registered provider addresses.
    pub fn get_registered_providers(env: Env) -> Vec<Address> {
        ProviderStorage::get_registered_providers(&env)
    }

    /// Update available unit count for one equipment category (provider only).
    pub fn update_availability(
        env: Env,
        provider: Address,
        category: String,
        quantity: u32,
    ) -> Result<(), RentFlowError> {
        PauseControl::require_not_paused(&env)?;
        provider.require_auth();
        ProviderStorage::set_availability(&env, &provider, category, quantity)
    }

    /// Set a category-specific day rate (provider only).
    pub fn set_category_rate(
        env: Env,
        provider: Address,
        category: String,
        rate_per_day: i128,
    ) -> Result<(), RentFlowError> {
        PauseControl::require_not_paused(&env)?;
        provider.require_auth();
        ProviderStorage::set_category_rate(&env, &provider, category, rate_per_day)
    }

    /// Remove a category-specific rate; the category falls back to the base rate.
    pub fn clear_category_rate(
        env: Env,
        provider: Address,
        category: String,
    ) -> Result<(), RentFlowError> {
        PauseControl::require_not_paused(&env)?;
        provider.require_auth();
        ProviderStorage::clear_category_rate(&env, &provider, category)
    }

    /// Verify a provider (admin only)
    pub fn verify_provider(
        env: Env,
        admin: Address,
        provider: Address,
    ) -> Result<(), RentFlowError> {
        verification::verify_provider(&env, &admin, &provider)
    }

    /// Reject a provider application (admin only)
    pub fn reject_provider(
        env: Env,
        admin: Address,
        provider: Address,
        reason: String,
    ) -> Result<(), RentFlowError> {
        verification::reject_provider(&env, &admin, &provider, reason)
    }

    /// Get a provider's verification record if available
    pub fn get_provider_verification(env: Env, provider: Address) -> Option<ProviderVerification> {
        ProviderVerificationStorage::get_verification(&env, &provider)
    }

    /// Check if a provider is verified
    pub fn is_provider_verified(env: Env, provider: Address) -> bool {
        ProviderVerificationStorage::is_provider_verified(&env, &provider)
    }

    /// Get all verified providers
    pub fn get_verified_providers(env: Env) -> Vec<Address> {
        ProviderVerificationStorage::get_verified_providers(&env)
    }

    /// Get all pending providers
    pub fn get_pending_providers(env: Env) -> Vec<Address> {
        ProviderVerificationStorage::get_pending_providers(&env)
    }

    /// Get all rejected providers
    pub fn get_rejected_providers(env: Env) -> Vec<Address> {
        ProviderVerificationStorage::get_rejected_providers(&env)
    }

    // ============================================================================
    // Matching Functions
    // ============================================================================

    /// Rank the provider catalog against a request (requester only).
    ///
    /// Takes the current registry as the candidate snapshot, scores each
    /// candidate's fulfillment and price, and replaces the stored offer set
    /// with the ranked result. The top offer is flagged best match only when
    /// it covers the request completely.
    ///
    /// # Returns
    /// * `Ok(Vec<Offer>)` - Ranked offers, possibly empty when nothing fits
    ///
    /// # Errors
    /// * `RequestNotFound`, `RequestNotOpen`, `InvalidRequest`
    pub fn match_request(env: Env, request_id: BytesN<32>) -> Result<Vec<Offer>, RentFlowError> {
        PauseControl::require_not_paused(&env)?;
        let request = RequestStorage::get_request(&env, &request_id)
            .ok_or(RentFlowError::RequestNotFound)?;
        if request.status != RequestStatus::Open {
            return Err(RentFlowError::RequestNotOpen);
        }
        request.requester.require_auth();

        let candidates = ProviderStorage::get_all_profiles(&env);
        let ranked = matching::rank_candidates(&env, &request, &candidates)?;
        OfferStorage::set_offers_for_request(&env, &request_id, &ranked);
        emit_request_matched(&env, &request_id, &ranked);

        Ok(ranked)
    }

    /// Get an offer by ID
    pub fn get_offer(env: Env, offer_id: BytesN<32>) -> Result<Offer, RentFlowError> {
        OfferStorage::get_offer(&env, &offer_id).ok_or(RentFlowError::OfferNotFound)
    }

    /// Get the ranked offers from the last match call for a request
    pub fn get_offers_for_request(env: Env, request_id: BytesN<32>) -> Vec<Offer> {
        OfferStorage::get_offers_for_request(&env, &request_id)
    }

    /// Get the flagged best match for a request, if any
    pub fn get_best_match(env: Env, request_id: BytesN<32>) -> Option<Offer> {
        OfferStorage::get_best_match(&env, &request_id)
    }

    // ============================================================================
    // Negotiation Functions
    // ============================================================================

    /// Open a negotiation session on an offer (requester only). The session
    /// starts Open at the offer price with an empty history.
    pub fn open_negotiation(
        env: Env,
        offer_id: BytesN<32>,
    ) -> Result<NegotiationSession, RentFlowError> {
        PauseControl::require_not_paused(&env)?;
        negotiation::open_negotiation(&env, &offer_id)
    }

    /// Propose a new price (either party).
    ///
    /// Valid from Open or Countered; appends to the history, moves the
    /// session to Countered and makes the proposal the standing price.
    /// `expected_version` must match the session version the caller read;
    /// stale writes fail with `ConcurrentModification`.
    ///
    /// # Errors
    /// * `InvalidTransition` from a terminal state
    /// * `InvalidPrice` if price <= 0
    /// * `ConcurrentModification` on a stale version
    pub fn propose_price(
        env: Env,
        session_id: BytesN<32>,
        actor: Actor,
        price: i128,
        expected_version: u32,
    ) -> Result<NegotiationSession, RentFlowError> {
        PauseControl::require_not_paused(&env)?;
        negotiation::propose_price(&env, &session_id, actor, price, expected_version)
    }

    /// Accept the standing price (either party); the session becomes Accepted
    /// and the current price is final.
    pub fn accept_price(
        env: Env,
        session_id: BytesN<32>,
        actor: Actor,
        expected_version: u32,
    ) -> Result<NegotiationSession, RentFlowError> {
        PauseControl::require_not_paused(&env)?;
        negotiation::accept_price(&env, &session_id, actor, expected_version)
    }

    /// Reject the negotiation (either party); terminal.
    pub fn reject_negotiation(
        env: Env,
        session_id: BytesN<32>,
        actor: Actor,
        expected_version: u32,
    ) -> Result<NegotiationSession, RentFlowError> {
        PauseControl::require_not_paused(&env)?;
        negotiation::reject_negotiation(&env, &session_id, actor, expected_version)
    }

    /// Expire a session whose inactivity window elapsed. Idempotent: returns
    /// false (not an error) for terminal or still-active sessions.
    pub fn expire_negotiation(env: Env, session_id: BytesN<32>) -> Result<bool, RentFlowError> {
        negotiation::expire_negotiation(&env, &session_id)
    }

    /// Expire every eligible session of a request; returns how many flipped.
    pub fn cleanup_expired_negotiations(env: Env, request_id: BytesN<32>) -> u32 {
        negotiation::cleanup_expired_negotiations(&env, &request_id)
    }

    /// Get a negotiation session by ID
    pub fn get_negotiation(
        env: Env,
        session_id: BytesN<32>,
    ) -> Result<NegotiationSession, RentFlowError> {
        NegotiationStorage::get_session(&env, &session_id)
            .ok_or(RentFlowError::NegotiationNotFound)
    }

    /// Get all negotiation session IDs for a request
    pub fn get_negotiations_for_request(env: Env, request_id: BytesN<32>) -> Vec<BytesN<32>> {
        NegotiationStorage::get_sessions_for_request(&env, &request_id)
    }

    // ============================================================================
    // Order Functions
    // ============================================================================

    /// Finalize an accepted negotiation into an immutable order (requester only).
    ///
    /// # Returns
    /// * `Ok((BytesN<32>, Vec<Address>))` - The order id and the providers of
    ///   the superseded offers to notify that the request closed
    ///
    /// # Errors
    /// * `NotAccepted` if the session is not Accepted
    /// * `RequestAlreadyMatched` if another session already produced an order
    pub fn finalize_order(
        env: Env,
        session_id: BytesN<32>,
    ) -> Result<(BytesN<32>, Vec<Address>), RentFlowError> {
        PauseControl::require_not_paused(&env)?;
        order::finalize_order(&env, &session_id)
    }

    /// Get an order by ID
    pub fn get_order(env: Env, order_id: BytesN<32>) -> Result<Order, RentFlowError> {
        OrderStorage::get_order(&env, &order_id).ok_or(RentFlowError::OrderNotFound)
    }

    /// Get the order minted for a session, if finalize ran
    pub fn get_order_for_session(env: Env, session_id: BytesN<32>) -> Option<BytesN<32>> {
        OrderStorage::get_order_id_for_session(&env, &session_id)
    }

    /// Get all order IDs for a requester
    pub fn get_orders_by_requester(env: Env, requester: Address) -> Vec<BytesN<32>> {
        OrderStorage::get_orders_by_requester(&env, &requester)
    }

    /// Get all order IDs for a provider
    pub fn get_orders_by_provider(env: Env, provider: Address) -> Vec<BytesN<32>> {
        OrderStorage::get_orders_by_provider(&env, &provider)
    }

    /// Rate the provider of a finalized order (requester only, once per order).
    /// Ratings are hundredths in 100..=500 and fold into the running average.
    pub fn rate_provider(
        env: Env,
        order_id: BytesN<32>,
        rating: u32,
    ) -> Result<(), RentFlowError> {
        PauseControl::require_not_paused(&env)?;
        order::rate_provider(&env, &order_id, rating)
    }
}
