//! Contract event helpers. Topics are short symbols; payloads carry the ids
//! and amounts an indexer needs to rebuild the marketplace timeline.

use soroban_sdk::{symbol_short, Address, BytesN, Env, Vec};

use crate::negotiation::NegotiationSession;
use crate::offer::Offer;
use crate::order::Order;
use crate::request::RentalRequest;

pub fn emit_request_submitted(env: &Env, request: &RentalRequest) {
    env.events().publish(
        (symbol_short!("req_new"),),
        (
            request.id.clone(),
            request.requester.clone(),
            request.items.len(),
            request.created_at,
        ),
    );
}

pub fn emit_request_cancelled(env: &Env, request: &RentalRequest) {
    env.events().publish(
        (symbol_short!("req_cxl"),),
        (request.id.clone(), request.requester.clone()),
    );
}

pub fn emit_provider_registered(env: &Env, provider: &Address) {
    env.events().publish(
        (symbol_short!("prv_reg"),),
        (provider.clone(), env.ledger().timestamp()),
    );
}

pub fn emit_provider_verified(env: &Env, provider: &Address) {
    env.events().publish(
        (symbol_short!("prv_ver"),),
        (provider.clone(), env.ledger().timestamp()),
    );
}

pub fn emit_provider_rejected(env: &Env, provider: &Address) {
    env.events().publish(
        (symbol_short!("prv_rej"),),
        (provider.clone(), env.ledger().timestamp()),
    );
}

pub fn emit_provider_rated(env: &Env, provider: &Address, rating: u32) {
    env.events()
        .publish((symbol_short!("prv_rate"),), (provider.clone(), rating));
}

/// Emitted once per match call with the ranked offer count.
pub fn emit_request_matched(env: &Env, request_id: &BytesN<32>, offers: &Vec<Offer>) {
    env.events().publish(
        (symbol_short!("matched"),),
        (request_id.clone(), offers.len()),
    );
}

pub fn emit_negotiation_opened(env: &Env, session: &NegotiationSession) {
    env.events().publish(
        (symbol_short!("neg_open"),),
        (
            session.id.clone(),
            session.offer_id.clone(),
            session.current_price,
        ),
    );
}

pub fn emit_price_proposed(env: &Env, session: &NegotiationSession, price: i128) {
    env.events().publish(
        (symbol_short!("neg_prop"),),
        (session.id.clone(), price, session.version),
    );
}

pub fn emit_negotiation_accepted(env: &Env, session: &NegotiationSession) {
    env.events().publish(
        (symbol_short!("neg_acc"),),
        (session.id.clone(), session.current_price),
    );
}

pub fn emit_negotiation_rejected(env: &Env, session: &NegotiationSession) {
    env.events()
        .publish((symbol_short!("neg_rej"),), (session.id.clone(),));
}

pub fn emit_negotiation_expired(env: &Env, session: &NegotiationSession) {
    env.events()
        .publish((symbol_short!("neg_exp"),), (session.id.clone(),));
}

pub fn emit_order_created(env: &Env, order: &Order) {
    env.events().publish(
        (symbol_short!("ord_new"),),
        (
            order.id.clone(),
            order.request_id.clone(),
            order.provider.clone(),
            order.final_price,
        ),
    );
}

/// Notification intent: providers whose offers lost the request.
pub fn emit_offers_superseded(env: &Env, request_id: &BytesN<32>, providers: &Vec<Address>) {
    env.events().publish(
        (symbol_short!("ord_sup"),),
        (request_id.clone(), providers.clone()),
    );
}
