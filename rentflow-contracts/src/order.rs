//! Order finalization: turns an accepted negotiation into an immutable order
//! record and reports which other providers on the request should be told it
//! closed. Fund movement is out of scope; the marketplace settles off-chain.

use soroban_sdk::{contracttype, symbol_short, Address, BytesN, Env, Map, String, Symbol, Vec};

use crate::errors::RentFlowError;
use crate::events::{emit_offers_superseded, emit_order_created, emit_provider_rated};
use crate::negotiation::{NegotiationState, NegotiationStorage};
use crate::offer::OfferStorage;
use crate::provider::{ProviderStorage, MAX_RATING, MIN_RATING};
use crate::request::{RequestStatus, RequestStorage};

/// Immutable record of a confirmed rental.
///
/// `items_confirmed` is a copied snapshot of the offer's fulfilled items, not
/// a reference, so the order survives later catalog changes.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Order {
    pub id: BytesN<32>,
    pub request_id: BytesN<32>,
    pub provider: Address,
    pub final_price: i128,
    pub currency: Address,
    pub items_confirmed: Map<String, u32>,
    pub created_at: u64,
}

pub struct OrderStorage;

impl OrderStorage {
    fn session_link_key(session_id: &BytesN<32>) -> (Symbol, BytesN<32>) {
        (symbol_short!("ord_sess"), session_id.clone())
    }

    fn requester_key(requester: &Address) -> (Symbol, Address) {
        (symbol_short!("ord_own"), requester.clone())
    }

    fn provider_key(provider: &Address) -> (Symbol, Address) {
        (symbol_short!("ord_prv"), provider.clone())
    }

    fn rated_key(order_id: &BytesN<32>) -> (Symbol, BytesN<32>) {
        (symbol_short!("ord_rtd"), order_id.clone())
    }

    pub fn store_order(env: &Env, order: &Order, requester: &Address) {
        env.storage().instance().set(&order.id, order);
        Self::append_id(env, &Self::requester_key(requester), &order.id);
        Self::append_id(env, &Self::provider_key(&order.provider), &order.id);
    }

    pub fn get_order(env: &Env, order_id: &BytesN<32>) -> Option<Order> {
        env.storage().instance().get(order_id)
    }

    /// The order id already minted for a session, if finalize ran before.
    pub fn get_order_id_for_session(env: &Env, session_id: &BytesN<32>) -> Option<BytesN<32>> {
        env.storage()
            .instance()
            .get(&Self::session_link_key(session_id))
    }

    pub fn link_session(env: &Env, session_id: &BytesN<32>, order_id: &BytesN<32>) {
        env.storage()
            .instance()
            .set(&Self::session_link_key(session_id), order_id);
    }

    pub fn get_orders_by_requester(env: &Env, requester: &Address) -> Vec<BytesN<32>> {
        Self::get_ids(env, &Self::requester_key(requester))
    }

    pub fn get_orders_by_provider(env: &Env, provider: &Address) -> Vec<BytesN<32>> {
        Self::get_ids(env, &Self::provider_key(provider))
    }

    pub fn is_rated(env: &Env, order_id: &BytesN<32>) -> bool {
        env.storage()
            .instance()
            .get(&Self::rated_key(order_id))
            .unwrap_or(false)
    }

    pub fn mark_rated(env: &Env, order_id: &BytesN<32>) {
        env.storage()
            .instance()
            .set(&Self::rated_key(order_id), &true);
    }

    fn get_ids(env: &Env, key: &(Symbol, Address)) -> Vec<BytesN<32>> {
        env.storage()
            .instance()
            .get(key)
            .unwrap_or_else(|| Vec::new(env))
    }

    fn append_id(env: &Env, key: &(Symbol, Address), order_id: &BytesN<32>) {
        let mut ids = Self::get_ids(env, key);
        ids.push_back(order_id.clone());
        env.storage().instance().set(key, &ids);
    }

    /// Generates a unique 32-byte order ID from the ledger timestamp and a counter.
    pub fn generate_unique_order_id(env: &Env) -> BytesN<32> {
        let timestamp = env.ledger().timestamp();
        let counter_key = symbol_short!("ord_cnt");
        let counter: u64 = env.storage().instance().get(&counter_key).unwrap_or(0u64);
        let next_counter = counter.saturating_add(1);
        env.storage().instance().set(&counter_key, &next_counter);

        let mut bytes = [0u8; 32];
        // 'O' 'R' prefix to distinguish from other entity types
        bytes[0] = 0x4F;
        bytes[1] = 0x52;
        bytes[2..10].copy_from_slice(&timestamp.to_be_bytes());
        bytes[10..18].copy_from_slice(&next_counter.to_be_bytes());
        let mix = timestamp.saturating_add(next_counter).saturating_add(0x4F52);
        for i in 18..32 {
            bytes[i] = (mix % 256) as u8;
        }
        BytesN::from_array(env, &bytes)
    }
}

/// Finalize an accepted negotiation into an order.
///
/// Returns the order id plus the providers of every other offer on the
/// request; the caller's notification collaborator tells them the request
/// closed. Replaying finalize on the same session returns the stored order
/// id with an empty notify list instead of minting a duplicate.
///
/// # Errors
/// * `NegotiationNotFound`, `OfferNotFound`, `RequestNotFound`
/// * `NotAccepted` when the session is not in the Accepted state
/// * `RequestAlreadyMatched` when another session already produced the order
/// * `RequestNotOpen` when the request was cancelled meanwhile
pub fn finalize_order(
    env: &Env,
    session_id: &BytesN<32>,
) -> Result<(BytesN<32>, Vec<Address>), RentFlowError> {
    let session = NegotiationStorage::get_session(env, session_id)
        .ok_or(RentFlowError::NegotiationNotFound)?;
    session.requester.require_auth();

    if let Some(existing) = OrderStorage::get_order_id_for_session(env, session_id) {
        return Ok((existing, Vec::new(env)));
    }

    if session.state != NegotiationState::Accepted {
        return Err(RentFlowError::NotAccepted);
    }

    let offer =
        OfferStorage::get_offer(env, &session.offer_id).ok_or(RentFlowError::OfferNotFound)?;
    let mut request = RequestStorage::get_request(env, &session.request_id)
        .ok_or(RentFlowError::RequestNotFound)?;
    match request.status {
        RequestStatus::Open => {}
        RequestStatus::Matched => return Err(RentFlowError::RequestAlreadyMatched),
        RequestStatus::Cancelled => return Err(RentFlowError::RequestNotOpen),
    }

    let order = Order {
        id: OrderStorage::generate_unique_order_id(env),
        request_id: request.id.clone(),
        provider: session.provider.clone(),
        final_price: session.current_price,
        currency: offer.currency.clone(),
        items_confirmed: offer.fulfilled_items.clone(),
        created_at: env.ledger().timestamp(),
    };
    OrderStorage::store_order(env, &order, &session.requester);
    OrderStorage::link_session(env, session_id, &order.id);

    request.status = RequestStatus::Matched;
    RequestStorage::update_request(env, &request);

    let mut superseded: Vec<Address> = Vec::new(env);
    for other in OfferStorage::get_offers_for_request(env, &request.id).iter() {
        if other.provider == order.provider {
            continue;
        }
        if !superseded.iter().any(|a| a == other.provider) {
            superseded.push_back(other.provider.clone());
        }
    }

    emit_order_created(env, &order);
    emit_offers_superseded(env, &request.id, &superseded);

    Ok((order.id, superseded))
}

/// Leave a one-time rating for the provider of a finalized order.
///
/// The requester of the underlying request must authorize. Ratings are
/// hundredths in `[100, 500]` and fold into the provider's running average.
///
/// # Errors
/// * `OrderNotFound`, `RequestNotFound`, `ProviderNotFound`
/// * `InvalidRating` when the value is out of range
/// * `AlreadyRated` when the order was rated before
pub fn rate_provider(
    env: &Env,
    order_id: &BytesN<32>,
    rating: u32,
) -> Result<(), RentFlowError> {
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(RentFlowError::InvalidRating);
    }

    let order = OrderStorage::get_order(env, order_id).ok_or(RentFlowError::OrderNotFound)?;
    let request = RequestStorage::get_request(env, &order.request_id)
        .ok_or(RentFlowError::RequestNotFound)?;
    request.requester.require_auth();

    if OrderStorage::is_rated(env, order_id) {
        return Err(RentFlowError::AlreadyRated);
    }

    let mut profile = ProviderStorage::get_profile(env, &order.provider)
        .ok_or(RentFlowError::ProviderNotFound)?;
    profile.record_review(rating);
    ProviderStorage::update_profile(env, &profile);
    OrderStorage::mark_rated(env, order_id);

    emit_provider_rated(env, &order.provider, rating);
    Ok(())
}
