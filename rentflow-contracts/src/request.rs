use soroban_sdk::{contracttype, symbol_short, Address, BytesN, Env, Map, String, Vec};

use crate::errors::RentFlowError;

/// Upper bound on line items in a single request.
pub const MAX_ITEMS_PER_REQUEST: u32 = 20;

/// Rental mode selected per line item (per-trip, per-day or per-month billing).
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RentalMode {
    Trip,
    Daily,
    Monthly,
}

/// One line of an equipment request: what, how many, how operated.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RentalItem {
    pub equipment_category: String,
    pub quantity: u32,
    pub with_driver: bool,
    pub mode: RentalMode,
}

/// Request lifecycle: Open until an order is finalized (Matched) or the
/// requester cancels.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RequestStatus {
    Open,
    Matched,
    Cancelled,
}

/// A normalized rental request. Immutable once created apart from `status`.
///
/// `required_by_category` is the canonical form the matcher consumes: item
/// quantities aggregated per equipment category, so duplicate lines for the
/// same category collapse into one total.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RentalRequest {
    pub id: BytesN<32>,
    pub requester: Address,
    pub items: Vec<RentalItem>,
    pub required_by_category: Map<String, u32>,
    pub location: String,
    pub requested_start: Option<u64>,
    pub currency: Address,
    pub status: RequestStatus,
    pub created_at: u64,
}

impl RentalRequest {
    /// Validate and normalize a raw item list into a new Open request.
    ///
    /// # Errors
    /// * `InvalidRequest` if `items` is empty
    /// * `TooManyItems` if more than `MAX_ITEMS_PER_REQUEST` lines
    /// * `InvalidQuantity` if any line has quantity 0
    /// * `InvalidCategory` if any line has an empty category
    /// * `InvalidLocation` if the location string is empty
    pub fn new(
        env: &Env,
        requester: Address,
        items: Vec<RentalItem>,
        location: String,
        requested_start: Option<u64>,
        currency: Address,
    ) -> Result<Self, RentFlowError> {
        if items.len() == 0 {
            return Err(RentFlowError::InvalidRequest);
        }
        if items.len() > MAX_ITEMS_PER_REQUEST {
            return Err(RentFlowError::TooManyItems);
        }
        if location.len() == 0 {
            return Err(RentFlowError::InvalidLocation);
        }

        let mut required_by_category: Map<String, u32> = Map::new(env);
        for item in items.iter() {
            if item.quantity == 0 {
                return Err(RentFlowError::InvalidQuantity);
            }
            if item.equipment_category.len() == 0 {
                return Err(RentFlowError::InvalidCategory);
            }
            let so_far = required_by_category
                .get(item.equipment_category.clone())
                .unwrap_or(0);
            required_by_category.set(
                item.equipment_category.clone(),
                so_far.saturating_add(item.quantity),
            );
        }

        Ok(RentalRequest {
            id: RequestStorage::generate_unique_request_id(env),
            requester,
            items,
            required_by_category,
            location,
            requested_start,
            currency,
            status: RequestStatus::Open,
            created_at: env.ledger().timestamp(),
        })
    }

    /// Total quantity across all categories (denominator of the fulfillment ratio).
    pub fn total_required(&self) -> u32 {
        let mut total = 0u32;
        for (_, quantity) in self.required_by_category.iter() {
            total = total.saturating_add(quantity);
        }
        total
    }

    /// Cancel the request. Only valid while Open.
    pub fn cancel(&mut self) -> Result<(), RentFlowError> {
        if self.status != RequestStatus::Open {
            return Err(RentFlowError::RequestNotOpen);
        }
        self.status = RequestStatus::Cancelled;
        Ok(())
    }
}

pub struct RequestStorage;

impl RequestStorage {
    fn requester_key(requester: &Address) -> (soroban_sdk::Symbol, Address) {
        (symbol_short!("req_own"), requester.clone())
    }

    pub fn store_request(env: &Env, request: &RentalRequest) {
        env.storage().instance().set(&request.id, request);
        Self::add_to_requester_requests(env, &request.requester, &request.id);
    }

    pub fn get_request(env: &Env, request_id: &BytesN<32>) -> Option<RentalRequest> {
        env.storage().instance().get(request_id)
    }

    pub fn update_request(env: &Env, request: &RentalRequest) {
        env.storage().instance().set(&request.id, request);
    }

    pub fn get_requests_by_requester(env: &Env, requester: &Address) -> Vec<BytesN<32>> {
        env.storage()
            .instance()
            .get(&Self::requester_key(requester))
            .unwrap_or_else(|| Vec::new(env))
    }

    fn add_to_requester_requests(env: &Env, requester: &Address, request_id: &BytesN<32>) {
        let key = Self::requester_key(requester);
        let mut requests = Self::get_requests_by_requester(env, requester);
        let mut exists = false;
        for id in requests.iter() {
            if id == *request_id {
                exists = true;
                break;
            }
        }
        if !exists {
            requests.push_back(request_id.clone());
            env.storage().instance().set(&key, &requests);
        }
    }

    /// Generates a unique 32-byte request ID from the ledger timestamp and a counter.
    pub fn generate_unique_request_id(env: &Env) -> BytesN<32> {
        let timestamp = env.ledger().timestamp();
        let counter_key = symbol_short!("req_cnt");
        let counter: u64 = env.storage().instance().get(&counter_key).unwrap_or(0u64);
        let next_counter = counter.saturating_add(1);
        env.storage().instance().set(&counter_key, &next_counter);

        let mut bytes = [0u8; 32];
        // 'R' 'Q' prefix to distinguish from other entity types
        bytes[0] = 0x52;
        bytes[1] = 0x51;
        bytes[2..10].copy_from_slice(&timestamp.to_be_bytes());
        bytes[10..18].copy_from_slice(&next_counter.to_be_bytes());
        let mix = timestamp.saturating_add(next_counter).saturating_add(0x5251);
        for i in 18..32 {
            bytes[i] = (mix % 256) as u8;
        }
        BytesN::from_array(env, &bytes)
    }
}
