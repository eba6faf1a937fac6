use soroban_sdk::{contracttype, symbol_short, Address, BytesN, Env, Map, String, Vec};

/// A ranked quote computed by the match engine for one provider against one
/// request. Offers are immutable; re-matching a request replaces the ranked
/// set but earlier offer records stay resolvable by id so negotiations opened
/// on them keep working.
///
/// Invariant: every quantity in `fulfilled_items` is at most the requested
/// quantity and at most the provider's availability for that category.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Offer {
    pub id: BytesN<32>,
    pub request_id: BytesN<32>,
    pub provider: Address,
    pub fulfilled_items: Map<String, u32>,
    pub total_required: u32,
    pub total_fulfilled: u32,
    pub fulfillment_bps: u32,
    pub price: i128,
    pub currency: Address,
    pub rating: Option<u32>,
    pub is_best_match: bool,
    pub created_at: u64,
}

pub struct OfferStorage;

impl OfferStorage {
    fn request_offers_key(request_id: &BytesN<32>) -> (soroban_sdk::Symbol, BytesN<32>) {
        (symbol_short!("offers"), request_id.clone())
    }

    pub fn store_offer(env: &Env, offer: &Offer) {
        env.storage().instance().set(&offer.id, offer);
    }

    pub fn get_offer(env: &Env, offer_id: &BytesN<32>) -> Option<Offer> {
        env.storage().instance().get(offer_id)
    }

    /// Replace the ranked offer index for a request with a fresh match result.
    pub fn set_offers_for_request(env: &Env, request_id: &BytesN<32>, offers: &Vec<Offer>) {
        let mut ids = Vec::new(env);
        for offer in offers.iter() {
            Self::store_offer(env, &offer);
            ids.push_back(offer.id.clone());
        }
        env.storage()
            .instance()
            .set(&Self::request_offers_key(request_id), &ids);
    }

    pub fn get_offer_ids_for_request(env: &Env, request_id: &BytesN<32>) -> Vec<BytesN<32>> {
        env.storage()
            .instance()
            .get(&Self::request_offers_key(request_id))
            .unwrap_or_else(|| Vec::new(env))
    }

    pub fn get_offers_for_request(env: &Env, request_id: &BytesN<32>) -> Vec<Offer> {
        let mut offers = Vec::new(env);
        for offer_id in Self::get_offer_ids_for_request(env, request_id).iter() {
            if let Some(offer) = Self::get_offer(env, &offer_id) {
                offers.push_back(offer);
            }
        }
        offers
    }

    /// The currently flagged best match for a request, if the last match call
    /// produced one.
    pub fn get_best_match(env: &Env, request_id: &BytesN<32>) -> Option<Offer> {
        for offer in Self::get_offers_for_request(env, request_id).iter() {
            if offer.is_best_match {
                return Some(offer);
            }
        }
        None
    }

    /// Generates a unique 32-byte offer ID from the ledger timestamp and a counter.
    pub fn generate_unique_offer_id(env: &Env) -> BytesN<32> {
        let timestamp = env.ledger().timestamp();
        let counter_key = symbol_short!("off_cnt");
        let counter: u64 = env.storage().instance().get(&counter_key).unwrap_or(0u64);
        let next_counter = counter.saturating_add(1);
        env.storage().instance().set(&counter_key, &next_counter);

        let mut bytes = [0u8; 32];
        // 'O' 'F' prefix to distinguish from other entity types
        bytes[0] = 0x4F;
        bytes[1] = 0x46;
        bytes[2..10].copy_from_slice(&timestamp.to_be_bytes());
        bytes[10..18].copy_from_slice(&next_counter.to_be_bytes());
        let mix = timestamp.saturating_add(next_counter).saturating_add(0x4F46);
        for i in 18..32 {
            bytes[i] = (mix % 256) as u8;
        }
        BytesN::from_array(env, &bytes)
    }
}
