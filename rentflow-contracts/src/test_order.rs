use super::*;
use crate::negotiation::NegotiationState;
use crate::request::RentalMode;
use soroban_sdk::{testutils::Address as _, vec, Address, Env, String};

struct OrderSetup<'a> {
    env: Env,
    client: RentFlowContractClient<'a>,
    requester: Address,
    full_provider: Address,
    partial_provider: Address,
    request_id: soroban_sdk::BytesN<32>,
    full_offer: Offer,
    partial_offer: Offer,
}

/// Two providers against a 2-excavator request: one covers it fully at
/// 250/day (offer price 500), one covers half at 90/day.
fn setup() -> OrderSetup<'static> {
    let env = Env::default();
    env.mock_all_auths();
    let contract_id = env.register(RentFlowContract, ());
    let client = RentFlowContractClient::new(&env, &contract_id);

    let requester = Address::generate(&env);
    let currency = Address::generate(&env);

    let full_provider = Address::generate(&env);
    client.register_provider(&full_provider, &String::from_str(&env, "Fleet Co"), &250);
    client.update_availability(&full_provider, &String::from_str(&env, "excavator"), &2);

    let partial_provider = Address::generate(&env);
    client.register_provider(&partial_provider, &String::from_str(&env, "Half Co"), &90);
    client.update_availability(&partial_provider, &String::from_str(&env, "excavator"), &1);

    let items = vec![
        &env,
        RentalItem {
            equipment_category: String::from_str(&env, "excavator"),
            quantity: 2,
            with_driver: true,
            mode: RentalMode::Daily,
        },
    ];
    let request_id = client.submit_request(
        &requester,
        &items,
        &String::from_str(&env, "Riyadh"),
        &None,
        &currency,
    );
    let offers = client.match_request(&request_id);
    let full_offer = offers.get_unchecked(0);
    let partial_offer = offers.get_unchecked(1);
    assert!(full_offer.is_best_match);

    OrderSetup {
        env,
        client,
        requester,
        full_provider,
        partial_provider,
        request_id,
        full_offer,
        partial_offer,
    }
}

#[test]
fn test_finalize_order_happy_path() {
    let setup = setup();

    let session = setup.client.open_negotiation(&setup.full_offer.id);
    assert_eq!(session.current_price, 500);
    setup
        .client
        .propose_price(&session.id, &Actor::User, &450, &0);
    setup.client.accept_price(&session.id, &Actor::Provider, &1);

    let (order_id, superseded) = setup.client.finalize_order(&session.id);

    let order = setup.client.get_order(&order_id);
    assert_eq!(order.final_price, 450);
    assert_eq!(order.request_id, setup.request_id);
    assert_eq!(order.provider, setup.full_provider);
    assert_eq!(
        order
            .items_confirmed
            .get(String::from_str(&setup.env, "excavator")),
        Some(2)
    );

    // The request is closed and the losing provider gets notified
    assert_eq!(
        setup.client.get_request(&setup.request_id).status,
        RequestStatus::Matched
    );
    assert_eq!(superseded.len(), 1);
    assert!(superseded.contains(&setup.partial_provider));

    // Indexes and the session link point at the order
    assert_eq!(
        setup.client.get_order_for_session(&session.id),
        Some(order_id.clone())
    );
    assert!(setup
        .client
        .get_orders_by_requester(&setup.requester)
        .contains(&order_id));
    assert!(setup
        .client
        .get_orders_by_provider(&setup.full_provider)
        .contains(&order_id));
}

#[test]
fn test_finalize_requires_accepted_state() {
    let setup = setup();

    // Open session
    let open_session = setup.client.open_negotiation(&setup.full_offer.id);
    let result = setup.client.try_finalize_order(&open_session.id);
    assert_eq!(result, Err(Ok(RentFlowError::NotAccepted)));

    // Countered session
    let countered = setup
        .client
        .propose_price(&open_session.id, &Actor::User, &450, &0);
    let result = setup.client.try_finalize_order(&countered.id);
    assert_eq!(result, Err(Ok(RentFlowError::NotAccepted)));

    // Rejected session
    setup
        .client
        .reject_negotiation(&countered.id, &Actor::Provider, &1);
    let result = setup.client.try_finalize_order(&countered.id);
    assert_eq!(result, Err(Ok(RentFlowError::NotAccepted)));
}

#[test]
fn test_finalize_twice_is_idempotent() {
    let setup = setup();

    let session = setup.client.open_negotiation(&setup.full_offer.id);
    setup.client.accept_price(&session.id, &Actor::User, &0);

    let (order_id, superseded) = setup.client.finalize_order(&session.id);
    assert_eq!(superseded.len(), 1);

    // Replay returns the stored order id and notifies nobody again
    let (replayed_id, replayed_superseded) = setup.client.finalize_order(&session.id);
    assert_eq!(replayed_id, order_id);
    assert_eq!(replayed_superseded.len(), 0);

    assert_eq!(
        setup.client.get_orders_by_requester(&setup.requester).len(),
        1
    );
}

#[test]
fn test_second_accepted_session_cannot_double_book() {
    let setup = setup();

    // Both negotiations accepted before either is finalized
    let s1 = setup.client.open_negotiation(&setup.full_offer.id);
    let s2 = setup.client.open_negotiation(&setup.partial_offer.id);
    setup.client.accept_price(&s1.id, &Actor::User, &0);
    setup.client.accept_price(&s2.id, &Actor::User, &0);

    setup.client.finalize_order(&s1.id);

    let result = setup.client.try_finalize_order(&s2.id);
    assert_eq!(result, Err(Ok(RentFlowError::RequestAlreadyMatched)));
}

#[test]
fn test_order_snapshot_survives_catalog_changes() {
    let setup = setup();

    let session = setup.client.open_negotiation(&setup.full_offer.id);
    setup.client.accept_price(&session.id, &Actor::User, &0);
    let (order_id, _) = setup.client.finalize_order(&session.id);

    // Provider inventory changes after the fact
    setup.client.update_availability(
        &setup.full_provider,
        &String::from_str(&setup.env, "excavator"),
        &0,
    );

    let order = setup.client.get_order(&order_id);
    assert_eq!(
        order
            .items_confirmed
            .get(String::from_str(&setup.env, "excavator")),
        Some(2)
    );
    assert_eq!(order.final_price, 500);
}

#[test]
fn test_finalize_on_cancelled_request() {
    let setup = setup();

    let session = setup.client.open_negotiation(&setup.full_offer.id);
    setup.client.accept_price(&session.id, &Actor::User, &0);
    setup.client.cancel_request(&setup.request_id);

    let result = setup.client.try_finalize_order(&session.id);
    assert_eq!(result, Err(Ok(RentFlowError::RequestNotOpen)));
}

#[test]
fn test_accepted_session_survives_finalize() {
    let setup = setup();

    let session = setup.client.open_negotiation(&setup.full_offer.id);
    setup.client.accept_price(&session.id, &Actor::User, &0);
    setup.client.finalize_order(&session.id);

    // Finalize is a read of the session, not a transition
    assert_eq!(
        setup.client.get_negotiation(&session.id).state,
        NegotiationState::Accepted
    );
}

#[test]
fn test_rate_provider() {
    let setup = setup();

    let session = setup.client.open_negotiation(&setup.full_offer.id);
    setup.client.accept_price(&session.id, &Actor::User, &0);
    let (order_id, _) = setup.client.finalize_order(&session.id);

    setup.client.rate_provider(&order_id, &490);
    let profile = setup.client.get_provider(&setup.full_provider);
    assert_eq!(profile.rating, Some(490));
    assert_eq!(profile.review_count, 1);

    // One rating per order
    let result = setup.client.try_rate_provider(&order_id, &400);
    assert_eq!(result, Err(Ok(RentFlowError::AlreadyRated)));
}

#[test]
fn test_rate_provider_bounds() {
    let setup = setup();

    let session = setup.client.open_negotiation(&setup.full_offer.id);
    setup.client.accept_price(&session.id, &Actor::User, &0);
    let (order_id, _) = setup.client.finalize_order(&session.id);

    let result = setup.client.try_rate_provider(&order_id, &600);
    assert_eq!(result, Err(Ok(RentFlowError::InvalidRating)));
    let result = setup.client.try_rate_provider(&order_id, &50);
    assert_eq!(result, Err(Ok(RentFlowError::InvalidRating)));
}

#[test]
fn test_rating_feeds_back_into_matching() {
    let setup = setup();

    let session = setup.client.open_negotiation(&setup.full_offer.id);
    setup.client.accept_price(&session.id, &Actor::User, &0);
    let (order_id, _) = setup.client.finalize_order(&session.id);
    setup.client.rate_provider(&order_id, &480);

    // A later request sees the provider's new rating on its offers
    let items = vec![
        &setup.env,
        RentalItem {
            equipment_category: String::from_str(&setup.env, "excavator"),
            quantity: 1,
            with_driver: false,
            mode: RentalMode::Monthly,
        },
    ];
    let next_request = setup.client.submit_request(
        &setup.requester,
        &items,
        &String::from_str(&setup.env, "Dammam"),
        &None,
        &Address::generate(&setup.env),
    );
    let offers = setup.client.match_request(&next_request);
    let mut seen = false;
    for offer in offers.iter() {
        if offer.provider == setup.full_provider {
            assert_eq!(offer.rating, Some(480));
            seen = true;
        }
    }
    assert!(seen);
}

#[test]
fn test_order_not_found() {
    let setup = setup();
    let missing = soroban_sdk::BytesN::from_array(&setup.env, &[9u8; 32]);
    let result = setup.client.try_get_order(&missing);
    assert_eq!(result, Err(Ok(RentFlowError::OrderNotFound)));
}
