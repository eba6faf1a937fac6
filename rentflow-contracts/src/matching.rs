//! Match engine: scores every catalog candidate against a request and ranks
//! the resulting offers. The scoring and comparison core is a pure function
//! of its inputs; storage is only touched for offer id generation.

use core::cmp::Ordering;
use soroban_sdk::{Env, Map, String, Vec};

use crate::errors::RentFlowError;
use crate::offer::{Offer, OfferStorage};
use crate::provider::ProviderProfile;
use crate::request::RentalRequest;

/// Fulfillment ratios are basis points; 10_000 means the provider covers the
/// whole request.
pub const FULL_FULFILLMENT_BPS: u32 = 10_000;

/// Per-category fulfillment: the minimum of requested and available units.
/// Returns the per-category map plus the fulfilled total.
pub fn compute_fulfillment(
    env: &Env,
    required_by_category: &Map<String, u32>,
    profile: &ProviderProfile,
) -> (Map<String, u32>, u32) {
    let mut fulfilled: Map<String, u32> = Map::new(env);
    let mut total = 0u32;
    for (category, requested) in required_by_category.iter() {
        let available = profile.available_for(&category);
        let covered = requested.min(available);
        if covered > 0 {
            fulfilled.set(category, covered);
            total = total.saturating_add(covered);
        }
    }
    (fulfilled, total)
}

/// Fulfilled share of the request in basis points.
pub fn fulfillment_bps(total_fulfilled: u32, total_required: u32) -> u32 {
    if total_required == 0 {
        return 0;
    }
    ((total_fulfilled as u64).saturating_mul(FULL_FULFILLMENT_BPS as u64)
        / (total_required as u64)) as u32
}

/// Quote for the fulfilled units: per-category rate (falling back to the
/// provider's base day rate) times the covered quantity.
pub fn quote_price(fulfilled: &Map<String, u32>, profile: &ProviderProfile) -> i128 {
    let mut price = 0i128;
    for (category, quantity) in fulfilled.iter() {
        let rate = profile.rate_for(&category);
        price = price.saturating_add(rate.saturating_mul(quantity as i128));
    }
    price
}

/// Ranking order between two offers; `Greater` means `a` ranks higher.
///
/// Keys: fulfillment descending, price ascending, rating descending with
/// unrated providers last, then provider address ascending so the order is
/// total and independent of candidate input order.
pub fn compare_offers(a: &Offer, b: &Offer) -> Ordering {
    if a.fulfillment_bps != b.fulfillment_bps {
        return a.fulfillment_bps.cmp(&b.fulfillment_bps);
    }
    if a.price != b.price {
        return b.price.cmp(&a.price);
    }
    match (a.rating, b.rating) {
        (Some(ra), Some(rb)) if ra != rb => return ra.cmp(&rb),
        (Some(_), None) => return Ordering::Greater,
        (None, Some(_)) => return Ordering::Less,
        _ => {}
    }
    b.provider.cmp(&a.provider)
}

/// Build the unranked offer for one candidate, or None when the candidate
/// fulfills nothing.
fn build_offer(
    env: &Env,
    request: &RentalRequest,
    total_required: u32,
    profile: &ProviderProfile,
) -> Option<Offer> {
    let (fulfilled, total_fulfilled) =
        compute_fulfillment(env, &request.required_by_category, profile);
    if total_fulfilled == 0 {
        return None;
    }
    let price = quote_price(&fulfilled, profile);
    Some(Offer {
        id: OfferStorage::generate_unique_offer_id(env),
        request_id: request.id.clone(),
        provider: profile.provider.clone(),
        fulfilled_items: fulfilled,
        total_required,
        total_fulfilled,
        fulfillment_bps: fulfillment_bps(total_fulfilled, total_required),
        price,
        currency: request.currency.clone(),
        rating: profile.rating,
        is_best_match: false,
        created_at: env.ledger().timestamp(),
    })
}

/// Score and rank every candidate with nonzero fulfillment.
///
/// The top-ranked offer is flagged as best match only when it covers the
/// request completely. An empty result is a normal return, not an error.
///
/// # Errors
/// * `InvalidRequest` when the request has no required items
pub fn rank_candidates(
    env: &Env,
    request: &RentalRequest,
    candidates: &Vec<ProviderProfile>,
) -> Result<Vec<Offer>, RentFlowError> {
    if request.required_by_category.len() == 0 {
        return Err(RentFlowError::InvalidRequest);
    }
    let total_required = request.total_required();

    let mut remaining: Vec<Offer> = Vec::new(env);
    for profile in candidates.iter() {
        if let Some(offer) = build_offer(env, request, total_required, &profile) {
            remaining.push_back(offer);
        }
    }

    let mut ranked: Vec<Offer> = Vec::new(env);
    while remaining.len() > 0 {
        let mut best_idx: u32 = 0;
        let mut best = remaining.get_unchecked(0);
        let mut search_idx: u32 = 1;
        while search_idx < remaining.len() {
            let candidate = remaining.get_unchecked(search_idx);
            if compare_offers(&candidate, &best) == Ordering::Greater {
                best_idx = search_idx;
                best = candidate;
            }
            search_idx += 1;
        }
        ranked.push_back(best);
        let _ = remaining.remove(best_idx);
    }

    if ranked.len() > 0 {
        let mut top = ranked.get_unchecked(0);
        if top.fulfillment_bps == FULL_FULFILLMENT_BPS {
            top.is_best_match = true;
            ranked.set(0, top);
        }
    }

    Ok(ranked)
}
