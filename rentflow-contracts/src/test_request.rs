use super::*;
use crate::request::{RentalMode, MAX_ITEMS_PER_REQUEST};
use soroban_sdk::{testutils::Address as _, vec, Address, Env, String, Vec};

fn item(env: &Env, category: &str, quantity: u32) -> RentalItem {
    RentalItem {
        equipment_category: String::from_str(env, category),
        quantity,
        with_driver: true,
        mode: RentalMode::Daily,
    }
}

fn setup(env: &Env) -> RentFlowContractClient<'_> {
    env.mock_all_auths();
    let contract_id = env.register(RentFlowContract, ());
    RentFlowContractClient::new(env, &contract_id)
}

#[test]
fn test_submit_request() {
    let env = Env::default();
    let client = setup(&env);

    let requester = Address::generate(&env);
    let currency = Address::generate(&env);
    let items = vec![&env, item(&env, "excavator", 2), item(&env, "loader", 1)];

    let request_id = client.submit_request(
        &requester,
        &items,
        &String::from_str(&env, "Riyadh, An Narjis"),
        &None,
        &currency,
    );

    let request = client.get_request(&request_id);
    assert_eq!(request.requester, requester);
    assert_eq!(request.items.len(), 2);
    assert_eq!(request.status, RequestStatus::Open);
    assert_eq!(request.currency, currency);
    assert_eq!(
        request
            .required_by_category
            .get(String::from_str(&env, "excavator")),
        Some(2)
    );
    assert_eq!(
        request
            .required_by_category
            .get(String::from_str(&env, "loader")),
        Some(1)
    );
    assert_eq!(request.total_required(), 3);
}

#[test]
fn test_submit_request_merges_duplicate_categories() {
    let env = Env::default();
    let client = setup(&env);

    let requester = Address::generate(&env);
    let currency = Address::generate(&env);
    // Two lines for the same category with different driver options
    let mut bulldozer = item(&env, "bulldozer", 2);
    bulldozer.with_driver = false;
    let items = vec![&env, item(&env, "bulldozer", 1), bulldozer];

    let request_id = client.submit_request(
        &requester,
        &items,
        &String::from_str(&env, "Jeddah"),
        &None,
        &currency,
    );

    let request = client.get_request(&request_id);
    // Normalization collapses them into one per-category total
    assert_eq!(
        request
            .required_by_category
            .get(String::from_str(&env, "bulldozer")),
        Some(3)
    );
    assert_eq!(request.required_by_category.len(), 1);
    assert_eq!(request.items.len(), 2);
}

#[test]
fn test_submit_request_empty_items() {
    let env = Env::default();
    let client = setup(&env);

    let requester = Address::generate(&env);
    let currency = Address::generate(&env);
    let items: Vec<RentalItem> = Vec::new(&env);

    let result = client.try_submit_request(
        &requester,
        &items,
        &String::from_str(&env, "Riyadh"),
        &None,
        &currency,
    );
    assert_eq!(result, Err(Ok(RentFlowError::InvalidRequest)));
}

#[test]
fn test_submit_request_zero_quantity() {
    let env = Env::default();
    let client = setup(&env);

    let requester = Address::generate(&env);
    let currency = Address::generate(&env);
    let items = vec![&env, item(&env, "crane", 0)];

    let result = client.try_submit_request(
        &requester,
        &items,
        &String::from_str(&env, "Riyadh"),
        &None,
        &currency,
    );
    assert_eq!(result, Err(Ok(RentFlowError::InvalidQuantity)));
}

#[test]
fn test_submit_request_too_many_items() {
    let env = Env::default();
    let client = setup(&env);

    let requester = Address::generate(&env);
    let currency = Address::generate(&env);
    let mut items = Vec::new(&env);
    for _ in 0..(MAX_ITEMS_PER_REQUEST + 1) {
        items.push_back(item(&env, "forklift", 1));
    }

    let result = client.try_submit_request(
        &requester,
        &items,
        &String::from_str(&env, "Riyadh"),
        &None,
        &currency,
    );
    assert_eq!(result, Err(Ok(RentFlowError::TooManyItems)));
}

#[test]
fn test_submit_request_empty_location() {
    let env = Env::default();
    let client = setup(&env);

    let requester = Address::generate(&env);
    let currency = Address::generate(&env);
    let items = vec![&env, item(&env, "excavator", 1)];

    let result = client.try_submit_request(
        &requester,
        &items,
        &String::from_str(&env, ""),
        &None,
        &currency,
    );
    assert_eq!(result, Err(Ok(RentFlowError::InvalidLocation)));
}

#[test]
fn test_submit_request_empty_category() {
    let env = Env::default();
    let client = setup(&env);

    let requester = Address::generate(&env);
    let currency = Address::generate(&env);
    let items = vec![&env, item(&env, "", 1)];

    let result = client.try_submit_request(
        &requester,
        &items,
        &String::from_str(&env, "Riyadh"),
        &None,
        &currency,
    );
    assert_eq!(result, Err(Ok(RentFlowError::InvalidCategory)));
}

#[test]
fn test_currency_whitelist_enforced() {
    let env = Env::default();
    let client = setup(&env);

    let admin = Address::generate(&env);
    let requester = Address::generate(&env);
    let allowed = Address::generate(&env);
    let other = Address::generate(&env);

    client.initialize_admin(&admin);
    client.add_currency(&admin, &allowed);

    let items = vec![&env, item(&env, "excavator", 1)];
    let result = client.try_submit_request(
        &requester,
        &items,
        &String::from_str(&env, "Riyadh"),
        &None,
        &other,
    );
    assert_eq!(result, Err(Ok(RentFlowError::InvalidCurrency)));

    // The whitelisted token works
    let request_id = client.submit_request(
        &requester,
        &items,
        &String::from_str(&env, "Riyadh"),
        &None,
        &allowed,
    );
    assert_eq!(client.get_request(&request_id).currency, allowed);
}

#[test]
fn test_empty_whitelist_allows_all() {
    let env = Env::default();
    let client = setup(&env);

    let requester = Address::generate(&env);
    let currency = Address::generate(&env);
    let items = vec![&env, item(&env, "excavator", 1)];

    // No whitelist configured: any token is accepted
    client.submit_request(
        &requester,
        &items,
        &String::from_str(&env, "Riyadh"),
        &None,
        &currency,
    );
}

#[test]
fn test_cancel_request() {
    let env = Env::default();
    let client = setup(&env);

    let requester = Address::generate(&env);
    let currency = Address::generate(&env);
    let items = vec![&env, item(&env, "excavator", 1)];
    let request_id = client.submit_request(
        &requester,
        &items,
        &String::from_str(&env, "Riyadh"),
        &None,
        &currency,
    );

    client.cancel_request(&request_id);
    assert_eq!(
        client.get_request(&request_id).status,
        RequestStatus::Cancelled
    );

    // Cancelling twice is rejected
    let result = client.try_cancel_request(&request_id);
    assert_eq!(result, Err(Ok(RentFlowError::RequestNotOpen)));

    // And a cancelled request can no longer be matched
    let result = client.try_match_request(&request_id);
    assert_eq!(result, Err(Ok(RentFlowError::RequestNotOpen)));
}

#[test]
fn test_get_requests_by_requester() {
    let env = Env::default();
    let client = setup(&env);

    let requester = Address::generate(&env);
    let other = Address::generate(&env);
    let currency = Address::generate(&env);
    let items = vec![&env, item(&env, "excavator", 1)];

    let first = client.submit_request(
        &requester,
        &items,
        &String::from_str(&env, "Riyadh"),
        &None,
        &currency,
    );
    let second = client.submit_request(
        &requester,
        &items,
        &String::from_str(&env, "Dammam"),
        &None,
        &currency,
    );

    let ids = client.get_requests_by_requester(&requester);
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&first));
    assert!(ids.contains(&second));
    assert_eq!(client.get_requests_by_requester(&other).len(), 0);
}

#[test]
fn test_request_not_found() {
    let env = Env::default();
    let client = setup(&env);

    let missing = soroban_sdk::BytesN::from_array(&env, &[7u8; 32]);
    let result = client.try_get_request(&missing);
    assert_eq!(result, Err(Ok(RentFlowError::RequestNotFound)));
}
