//! Provider catalog: per-provider inventory snapshots and day rates queried
//! by the matcher. The catalog is lookup-only; ranking lives in `matching`.

use soroban_sdk::{contracttype, symbol_short, Address, Env, Map, String, Vec};

use crate::errors::RentFlowError;

/// Ratings are stored in hundredths (so 4.9 stars is 490). Contract types
/// carry no floats.
pub const MAX_RATING: u32 = 500;
pub const MIN_RATING: u32 = 100;

/// Inventory and pricing snapshot for one provider.
///
/// `availability` maps equipment category to the number of units the provider
/// can supply. `category_rates` holds per-category day rates; categories
/// without an entry fall back to `base_price_per_day`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProviderProfile {
    pub provider: Address,
    pub name: String,
    pub rating: Option<u32>,
    pub review_count: u32,
    pub verified: bool,
    pub availability: Map<String, u32>,
    pub category_rates: Map<String, i128>,
    pub base_price_per_day: i128,
    pub registered_at: u64,
}

impl ProviderProfile {
    /// Day rate for a category: the category-specific rate when configured,
    /// otherwise the base rate.
    pub fn rate_for(&self, category: &String) -> i128 {
        self.category_rates
            .get(category.clone())
            .unwrap_or(self.base_price_per_day)
    }

    /// Units available for a category (0 when the category is unknown).
    pub fn available_for(&self, category: &String) -> u32 {
        self.availability.get(category.clone()).unwrap_or(0)
    }

    /// Fold one review into the running average rating.
    pub fn record_review(&mut self, rating: u32) {
        let count = self.review_count as u64;
        let new_count = count.saturating_add(1);
        let current = self.rating.unwrap_or(0) as u64;
        let new_average = (current.saturating_mul(count).saturating_add(rating as u64)) / new_count;
        self.rating = Some(new_average as u32);
        self.review_count = new_count as u32;
    }
}

pub struct ProviderStorage;

impl ProviderStorage {
    fn profile_key(provider: &Address) -> (soroban_sdk::Symbol, Address) {
        (symbol_short!("prv"), provider.clone())
    }

    const REGISTRY_KEY: soroban_sdk::Symbol = symbol_short!("providers");

    pub fn store_profile(env: &Env, profile: &ProviderProfile) {
        env.storage()
            .instance()
            .set(&Self::profile_key(&profile.provider), profile);
        Self::add_to_registry(env, &profile.provider);
    }

    pub fn get_profile(env: &Env, provider: &Address) -> Option<ProviderProfile> {
        env.storage().instance().get(&Self::profile_key(provider))
    }

    pub fn update_profile(env: &Env, profile: &ProviderProfile) {
        env.storage()
            .instance()
            .set(&Self::profile_key(&profile.provider), profile);
    }

    pub fn get_registered_providers(env: &Env) -> Vec<Address> {
        env.storage()
            .instance()
            .get(&Self::REGISTRY_KEY)
            .unwrap_or_else(|| Vec::new(env))
    }

    /// Snapshot of every registered profile; this is the candidate set a
    /// match call consumes.
    pub fn get_all_profiles(env: &Env) -> Vec<ProviderProfile> {
        let mut profiles = Vec::new(env);
        for provider in Self::get_registered_providers(env).iter() {
            if let Some(profile) = Self::get_profile(env, &provider) {
                profiles.push_back(profile);
            }
        }
        profiles
    }

    fn add_to_registry(env: &Env, provider: &Address) {
        let mut registry = Self::get_registered_providers(env);
        let mut exists = false;
        for a in registry.iter() {
            if a == *provider {
                exists = true;
                break;
            }
        }
        if !exists {
            registry.push_back(provider.clone());
            env.storage().instance().set(&Self::REGISTRY_KEY, &registry);
        }
    }

    /// Create and store a fresh unverified profile for a new provider.
    ///
    /// # Errors
    /// * `ProviderAlreadyRegistered` if the address already has a profile
    /// * `InvalidName` if the display name is empty
    /// * `InvalidAmount` if the base day rate is not positive
    pub fn register(
        env: &Env,
        provider: &Address,
        name: String,
        base_price_per_day: i128,
    ) -> Result<ProviderProfile, RentFlowError> {
        if Self::get_profile(env, provider).is_some() {
            return Err(RentFlowError::ProviderAlreadyRegistered);
        }
        if name.len() == 0 {
            return Err(RentFlowError::InvalidName);
        }
        if base_price_per_day <= 0 {
            return Err(RentFlowError::InvalidAmount);
        }

        let profile = ProviderProfile {
            provider: provider.clone(),
            name,
            rating: None,
            review_count: 0,
            verified: false,
            availability: Map::new(env),
            category_rates: Map::new(env),
            base_price_per_day,
            registered_at: env.ledger().timestamp(),
        };
        Self::store_profile(env, &profile);
        Ok(profile)
    }

    /// Set the available unit count for one category. Zero is allowed and
    /// means the category is currently out of stock.
    pub fn set_availability(
        env: &Env,
        provider: &Address,
        category: String,
        quantity: u32,
    ) -> Result<(), RentFlowError> {
        if category.len() == 0 {
            return Err(RentFlowError::InvalidCategory);
        }
        let mut profile =
            Self::get_profile(env, provider).ok_or(RentFlowError::ProviderNotFound)?;
        profile.availability.set(category, quantity);
        Self::update_profile(env, &profile);
        Ok(())
    }

    /// Set a category-specific day rate.
    pub fn set_category_rate(
        env: &Env,
        provider: &Address,
        category: String,
        rate_per_day: i128,
    ) -> Result<(), RentFlowError> {
        if category.len() == 0 {
            return Err(RentFlowError::InvalidCategory);
        }
        if rate_per_day <= 0 {
            return Err(RentFlowError::InvalidAmount);
        }
        let mut profile =
            Self::get_profile(env, provider).ok_or(RentFlowError::ProviderNotFound)?;
        profile.category_rates.set(category, rate_per_day);
        Self::update_profile(env, &profile);
        Ok(())
    }

    /// Remove a category-specific rate so the category falls back to the base rate.
    pub fn clear_category_rate(
        env: &Env,
        provider: &Address,
        category: String,
    ) -> Result<(), RentFlowError> {
        let mut profile =
            Self::get_profile(env, provider).ok_or(RentFlowError::ProviderNotFound)?;
        if profile.category_rates.contains_key(category.clone()) {
            profile.category_rates.remove(category);
            Self::update_profile(env, &profile);
        }
        Ok(())
    }
}
