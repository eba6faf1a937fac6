//! Price negotiation state machine.
//!
//! A session is opened from an offer and moves through
//! Open -> Countered -> Countered/Accepted/Rejected, with Expired reachable
//! from any non-terminal state once the inactivity timeout elapses. History
//! is append-only and `current_price` always mirrors the last proposal (or
//! the originating offer price while the history is empty). Every applied
//! transition bumps `version`; callers pass the version they read and stale
//! writes are rejected instead of silently clobbering a newer transition.

use soroban_sdk::{contracttype, symbol_short, Address, BytesN, Env, Symbol, Vec};

use crate::errors::RentFlowError;
use crate::events::{
    emit_negotiation_accepted, emit_negotiation_expired, emit_negotiation_opened,
    emit_negotiation_rejected, emit_price_proposed,
};
use crate::offer::OfferStorage;
use crate::request::RequestStorage;

// Inactivity timeout stored in hours (admin configurable). Bounds: 1..=336
const DEFAULT_TIMEOUT_HOURS: u64 = 48;
const MIN_TIMEOUT_HOURS: u64 = 1;
const MAX_TIMEOUT_HOURS: u64 = 336;
const TIMEOUT_KEY: Symbol = symbol_short!("neg_ttl");
const SECONDS_PER_HOUR: u64 = 3600;

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Actor {
    User,
    Provider,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum NegotiationState {
    Open,
    Countered,
    Accepted,
    Rejected,
    Expired,
}

/// One entry of the append-only proposal history.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PriceProposal {
    pub actor: Actor,
    pub proposed_price: i128,
    pub timestamp: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NegotiationSession {
    pub id: BytesN<32>,
    pub offer_id: BytesN<32>,
    pub request_id: BytesN<32>,
    pub requester: Address,
    pub provider: Address,
    pub state: NegotiationState,
    pub history: Vec<PriceProposal>,
    pub current_price: i128,
    pub version: u32,
    pub last_activity: u64,
    pub created_at: u64,
}

impl NegotiationSession {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.state,
            NegotiationState::Accepted | NegotiationState::Rejected | NegotiationState::Expired
        )
    }

    /// Whether the inactivity window has elapsed. Terminal sessions never expire.
    pub fn is_expired(&self, now: u64, timeout_seconds: u64) -> bool {
        !self.is_terminal() && now.saturating_sub(self.last_activity) > timeout_seconds
    }

    /// The address that must authorize a transition taken by `actor`.
    pub fn actor_address(&self, actor: &Actor) -> Address {
        match actor {
            Actor::User => self.requester.clone(),
            Actor::Provider => self.provider.clone(),
        }
    }
}

pub struct NegotiationStorage;

impl NegotiationStorage {
    fn request_sessions_key(request_id: &BytesN<32>) -> (Symbol, BytesN<32>) {
        (symbol_short!("negs"), request_id.clone())
    }

    pub fn store_session(env: &Env, session: &NegotiationSession) {
        env.storage().instance().set(&session.id, session);
    }

    pub fn get_session(env: &Env, session_id: &BytesN<32>) -> Option<NegotiationSession> {
        env.storage().instance().get(session_id)
    }

    pub fn get_sessions_for_request(env: &Env, request_id: &BytesN<32>) -> Vec<BytesN<32>> {
        env.storage()
            .instance()
            .get(&Self::request_sessions_key(request_id))
            .unwrap_or_else(|| Vec::new(env))
    }

    fn add_session_to_request(env: &Env, request_id: &BytesN<32>, session_id: &BytesN<32>) {
        let mut sessions = Self::get_sessions_for_request(env, request_id);
        let mut exists = false;
        for id in sessions.iter() {
            if id == *session_id {
                exists = true;
                break;
            }
        }
        if !exists {
            sessions.push_back(session_id.clone());
            env.storage()
                .instance()
                .set(&Self::request_sessions_key(request_id), &sessions);
        }
    }

    /// Get configured inactivity timeout in hours (returns default if not set)
    pub fn get_timeout_hours(env: &Env) -> u64 {
        env.storage()
            .instance()
            .get(&TIMEOUT_KEY)
            .unwrap_or(DEFAULT_TIMEOUT_HOURS)
    }

    pub fn get_timeout_seconds(env: &Env) -> u64 {
        Self::get_timeout_hours(env).saturating_mul(SECONDS_PER_HOUR)
    }

    /// Admin-only: set inactivity timeout in hours. Enforces bounds.
    pub fn set_timeout_hours(
        env: &Env,
        admin: &Address,
        hours: u64,
    ) -> Result<u64, RentFlowError> {
        admin.require_auth();
        crate::admin::AdminStorage::require_admin(env, admin)?;

        if !(MIN_TIMEOUT_HOURS..=MAX_TIMEOUT_HOURS).contains(&hours) {
            return Err(RentFlowError::InvalidAmount);
        }

        env.storage().instance().set(&TIMEOUT_KEY, &hours);
        Ok(hours)
    }

    /// Generates a unique 32-byte session ID from the ledger timestamp and a counter.
    pub fn generate_unique_session_id(env: &Env) -> BytesN<32> {
        let timestamp = env.ledger().timestamp();
        let counter_key = symbol_short!("neg_cnt");
        let counter: u64 = env.storage().instance().get(&counter_key).unwrap_or(0u64);
        let next_counter = counter.saturating_add(1);
        env.storage().instance().set(&counter_key, &next_counter);

        let mut bytes = [0u8; 32];
        // 'N' 'G' prefix to distinguish from other entity types
        bytes[0] = 0x4E;
        bytes[1] = 0x47;
        bytes[2..10].copy_from_slice(&timestamp.to_be_bytes());
        bytes[10..18].copy_from_slice(&next_counter.to_be_bytes());
        let mix = timestamp.saturating_add(next_counter).saturating_add(0x4E47);
        for i in 18..32 {
            bytes[i] = (mix % 256) as u8;
        }
        BytesN::from_array(env, &bytes)
    }
}

fn require_version(session: &NegotiationSession, expected: u32) -> Result<(), RentFlowError> {
    if session.version != expected {
        return Err(RentFlowError::ConcurrentModification);
    }
    Ok(())
}

fn require_negotiable(session: &NegotiationSession) -> Result<(), RentFlowError> {
    match session.state {
        NegotiationState::Open | NegotiationState::Countered => Ok(()),
        _ => Err(RentFlowError::InvalidTransition),
    }
}

/// Open a negotiation session on an offer, starting at the offer price.
///
/// The requester of the underlying request must authorize.
///
/// # Errors
/// * `OfferNotFound`, `RequestNotFound`
/// * `RequestNotOpen` when the request was cancelled or already matched
pub fn open_negotiation(
    env: &Env,
    offer_id: &BytesN<32>,
) -> Result<NegotiationSession, RentFlowError> {
    let offer = OfferStorage::get_offer(env, offer_id).ok_or(RentFlowError::OfferNotFound)?;
    let request = RequestStorage::get_request(env, &offer.request_id)
        .ok_or(RentFlowError::RequestNotFound)?;
    if request.status != crate::request::RequestStatus::Open {
        return Err(RentFlowError::RequestNotOpen);
    }
    request.requester.require_auth();

    let now = env.ledger().timestamp();
    let session = NegotiationSession {
        id: NegotiationStorage::generate_unique_session_id(env),
        offer_id: offer.id.clone(),
        request_id: offer.request_id.clone(),
        requester: request.requester.clone(),
        provider: offer.provider.clone(),
        state: NegotiationState::Open,
        history: Vec::new(env),
        current_price: offer.price,
        version: 0,
        last_activity: now,
        created_at: now,
    };
    NegotiationStorage::store_session(env, &session);
    NegotiationStorage::add_session_to_request(env, &offer.request_id, &session.id);

    emit_negotiation_opened(env, &session);
    Ok(session)
}

/// Propose a new price (either party). Valid from Open or Countered.
///
/// Appends to the history, moves the session to Countered and makes the
/// proposal the standing price.
///
/// # Errors
/// * `NegotiationNotFound`
/// * `InvalidTransition` from a terminal state
/// * `InvalidPrice` when the proposal is not positive
/// * `ConcurrentModification` when `expected_version` is stale
pub fn propose_price(
    env: &Env,
    session_id: &BytesN<32>,
    actor: Actor,
    price: i128,
    expected_version: u32,
) -> Result<NegotiationSession, RentFlowError> {
    let mut session = NegotiationStorage::get_session(env, session_id)
        .ok_or(RentFlowError::NegotiationNotFound)?;
    require_negotiable(&session)?;
    require_version(&session, expected_version)?;
    if price <= 0 {
        return Err(RentFlowError::InvalidPrice);
    }
    session.actor_address(&actor).require_auth();

    let now = env.ledger().timestamp();
    session.history.push_back(PriceProposal {
        actor,
        proposed_price: price,
        timestamp: now,
    });
    session.state = NegotiationState::Countered;
    session.current_price = price;
    session.version = session.version.saturating_add(1);
    session.last_activity = now;
    NegotiationStorage::store_session(env, &session);

    emit_price_proposed(env, &session, price);
    Ok(session)
}

/// Accept the standing price. Valid from Open or Countered; the session
/// becomes Accepted and `current_price` is left untouched as the final price.
pub fn accept_price(
    env: &Env,
    session_id: &BytesN<32>,
    actor: Actor,
    expected_version: u32,
) -> Result<NegotiationSession, RentFlowError> {
    let mut session = NegotiationStorage::get_session(env, session_id)
        .ok_or(RentFlowError::NegotiationNotFound)?;
    require_negotiable(&session)?;
    require_version(&session, expected_version)?;
    session.actor_address(&actor).require_auth();

    session.state = NegotiationState::Accepted;
    session.version = session.version.saturating_add(1);
    session.last_activity = env.ledger().timestamp();
    NegotiationStorage::store_session(env, &session);

    emit_negotiation_accepted(env, &session);
    Ok(session)
}

/// Walk away from the negotiation. Valid from Open or Countered; terminal.
pub fn reject_negotiation(
    env: &Env,
    session_id: &BytesN<32>,
    actor: Actor,
    expected_version: u32,
) -> Result<NegotiationSession, RentFlowError> {
    let mut session = NegotiationStorage::get_session(env, session_id)
        .ok_or(RentFlowError::NegotiationNotFound)?;
    require_negotiable(&session)?;
    require_version(&session, expected_version)?;
    session.actor_address(&actor).require_auth();

    session.state = NegotiationState::Rejected;
    session.version = session.version.saturating_add(1);
    session.last_activity = env.ledger().timestamp();
    NegotiationStorage::store_session(env, &session);

    emit_negotiation_rejected(env, &session);
    Ok(session)
}

/// Lazily expire a session whose inactivity window has elapsed.
///
/// Idempotent: returns `Ok(false)` (not an error) for terminal sessions and
/// for sessions still inside the window. Driven by an external sweep or a
/// check-on-read; the ledger timestamp is the supplied "now".
pub fn expire_negotiation(env: &Env, session_id: &BytesN<32>) -> Result<bool, RentFlowError> {
    let mut session = NegotiationStorage::get_session(env, session_id)
        .ok_or(RentFlowError::NegotiationNotFound)?;
    let now = env.ledger().timestamp();
    if !session.is_expired(now, NegotiationStorage::get_timeout_seconds(env)) {
        return Ok(false);
    }

    session.state = NegotiationState::Expired;
    session.version = session.version.saturating_add(1);
    NegotiationStorage::store_session(env, &session);

    emit_negotiation_expired(env, &session);
    Ok(true)
}

/// Expire every eligible session of a request; returns how many flipped.
pub fn cleanup_expired_negotiations(env: &Env, request_id: &BytesN<32>) -> u32 {
    let mut expired = 0u32;
    for session_id in NegotiationStorage::get_sessions_for_request(env, request_id).iter() {
        if let Ok(true) = expire_negotiation(env, &session_id) {
            expired += 1;
        }
    }
    expired
}
