//! End-to-end walk through the marketplace flow: admin setup, provider
//! onboarding, request submission, matching, negotiation and the final order.

use super::*;
use crate::negotiation::NegotiationState;
use crate::request::RentalMode;
use soroban_sdk::{testutils::Address as _, vec, Address, Env, String};

fn item(env: &Env, category: &str, quantity: u32, mode: RentalMode) -> RentalItem {
    RentalItem {
        equipment_category: String::from_str(env, category),
        quantity,
        with_driver: true,
        mode,
    }
}

#[test]
fn test_full_marketplace_lifecycle() {
    let env = Env::default();
    env.mock_all_auths();
    let contract_id = env.register(RentFlowContract, ());
    let client = RentFlowContractClient::new(&env, &contract_id);

    // Admin bootstraps the protocol and whitelists the settlement token
    let admin = Address::generate(&env);
    let token = Address::generate(&env);
    client.initialize_admin(&admin);
    client.add_currency(&admin, &token);
    assert!(client.is_allowed_currency(&token));

    // Two providers onboard; only the first passes verification
    let fleet = Address::generate(&env);
    client.register_provider(&fleet, &String::from_str(&env, "Saudi Heavy Equipment"), &200);
    client.update_availability(&fleet, &String::from_str(&env, "excavator"), &1);
    client.update_availability(&fleet, &String::from_str(&env, "bulldozer"), &1);
    client.update_availability(&fleet, &String::from_str(&env, "forklift"), &2);
    client.set_category_rate(&fleet, &String::from_str(&env, "forklift"), &100);
    client.verify_provider(&admin, &fleet);

    let yard = Address::generate(&env);
    client.register_provider(&yard, &String::from_str(&env, "Modern Construction"), &150);
    client.update_availability(&yard, &String::from_str(&env, "excavator"), &1);

    // Bundle request: excavator + bulldozer + forklift
    let requester = Address::generate(&env);
    let items = vec![
        &env,
        item(&env, "excavator", 1, RentalMode::Daily),
        item(&env, "bulldozer", 1, RentalMode::Daily),
        item(&env, "forklift", 1, RentalMode::Trip),
    ];
    let request_id = client.submit_request(
        &requester,
        &items,
        &String::from_str(&env, "Riyadh, An Narjis"),
        &Some(env.ledger().timestamp() + 86_400),
        &token,
    );

    // Fleet covers everything (200 + 200 + 100 = 500); yard covers a third
    let offers = client.match_request(&request_id);
    assert_eq!(offers.len(), 2);
    let best = client.get_best_match(&request_id).unwrap();
    assert_eq!(best.provider, fleet);
    assert_eq!(best.price, 500);
    assert_eq!(best.total_fulfilled, 3);
    assert!(best.is_best_match);
    // Storage round-trip of the derived offer is lossless
    assert_eq!(client.get_offer(&best.id), best);

    // Haggling: 500 -> 450 (user) -> 470 (provider) -> accepted by user
    let session = client.open_negotiation(&best.id);
    assert_eq!(session.current_price, 500);
    let session = client.propose_price(&session.id, &Actor::User, &450, &0);
    let session = client.propose_price(&session.id, &Actor::Provider, &470, &1);
    let session = client.accept_price(&session.id, &Actor::User, &2);
    assert_eq!(session.state, NegotiationState::Accepted);
    assert_eq!(session.current_price, 470);
    assert_eq!(session.history.len(), 2);

    // Order confirmation closes the request and flags the losing provider
    let (order_id, superseded) = client.finalize_order(&session.id);
    let order = client.get_order(&order_id);
    assert_eq!(order.final_price, 470);
    assert_eq!(order.currency, token);
    assert_eq!(
        order.items_confirmed.get(String::from_str(&env, "forklift")),
        Some(1)
    );
    assert_eq!(client.get_request(&request_id).status, RequestStatus::Matched);
    assert_eq!(superseded, vec![&env, yard.clone()]);

    // Post-rental review lands on the provider profile
    client.rate_provider(&order_id, &490);
    let profile = client.get_provider(&fleet);
    assert_eq!(profile.rating, Some(490));
    assert_eq!(profile.review_count, 1);
}

#[test]
fn test_pause_blocks_mutations_but_not_queries() {
    let env = Env::default();
    env.mock_all_auths();
    let contract_id = env.register(RentFlowContract, ());
    let client = RentFlowContractClient::new(&env, &contract_id);

    let admin = Address::generate(&env);
    let requester = Address::generate(&env);
    let currency = Address::generate(&env);
    client.initialize_admin(&admin);

    let items = vec![&env, item(&env, "excavator", 1, RentalMode::Daily)];
    let request_id = client.submit_request(
        &requester,
        &items,
        &String::from_str(&env, "Riyadh"),
        &None,
        &currency,
    );

    client.pause(&admin);
    assert!(client.is_paused());

    let result = client.try_submit_request(
        &requester,
        &items,
        &String::from_str(&env, "Riyadh"),
        &None,
        &currency,
    );
    assert_eq!(result, Err(Ok(RentFlowError::ContractPaused)));
    let result = client.try_match_request(&request_id);
    assert_eq!(result, Err(Ok(RentFlowError::ContractPaused)));

    // Queries keep working while paused
    assert_eq!(client.get_request(&request_id).status, RequestStatus::Open);

    client.unpause(&admin);
    assert!(!client.is_paused());
    client.match_request(&request_id);
}

#[test]
fn test_admin_transfer() {
    let env = Env::default();
    env.mock_all_auths();
    let contract_id = env.register(RentFlowContract, ());
    let client = RentFlowContractClient::new(&env, &contract_id);

    let admin = Address::generate(&env);
    let successor = Address::generate(&env);
    client.initialize_admin(&admin);
    assert_eq!(client.get_admin(), Some(admin.clone()));

    // Re-initialization is rejected
    let result = client.try_initialize_admin(&successor);
    assert_eq!(result, Err(Ok(RentFlowError::OperationNotAllowed)));

    client.transfer_admin(&successor);
    assert_eq!(client.get_admin(), Some(successor.clone()));

    // The new admin holds the privileged operations
    client.pause(&successor);
    let result = client.try_pause(&admin);
    assert_eq!(result, Err(Ok(RentFlowError::NotAdmin)));
}
