mod common;

use action_keeper::*;
use action_storage::FIRST_ACTION_ID;
use action_types::{Action, ActionState, ActionType, Coin, ErrorKind};
use common::*;
use proptest::prelude::*;

fn request(h: &Harness, action_type: &str, metadata: String, price: &str) -> MsgRequestAction {
    MsgRequestAction {
        creator: h.creator.address.clone(),
        action_type: action_type.to_string(),
        metadata,
        price: price.to_string(),
        expiration_time: String::new(),
        file_size_kbs: 0,
    }
}

fn assert_no_trace(h: &Harness) {
    assert_eq!(h.balance(&h.creator.address), CREATOR_FUNDS);
    assert_eq!(h.ledger.module_balance(DENOM), 0);
    assert_eq!(
        h.keeper.list_actions(None, None, PageRequest::default()).unwrap().total,
        0
    );
    assert!(h.events.events().is_empty());
}

#[test]
fn test_malformed_requests_leave_no_trace() {
    let h = Harness::new();
    let other_signer = TestAccount::new(0x44);

    let cascade = |metadata: String, price: &str| request(&h, "CASCADE", metadata, price);
    let no_data_hash = r#"{"file_name":"a","rq_ids_ic":0,"signatures":"a.b"}"#;
    let signed = || cascade_request(&h.creator);

    let cases = vec![
        (cascade(signed(), "lots"), ErrorKind::InvalidPrice),
        (cascade(signed(), "10099ulume"), ErrorKind::InvalidPrice),
        (cascade(signed(), "100000uatom"), ErrorKind::InvalidPrice),
        (cascade(signed(), "2000000ulume"), ErrorKind::InsufficientFunds),
        (cascade(cascade_request(&other_signer), "100000ulume"), ErrorKind::InvalidSignature),
        (cascade(no_data_hash.into(), "100000ulume"), ErrorKind::InvalidMetadata),
        (cascade("not json".into(), "100000ulume"), ErrorKind::InvalidMetadata),
        (
            request(&h, "SENSE", r#"{"data_hash":"abc"}"#.into(), "100000ulume"),
            ErrorKind::InvalidMetadata,
        ),
        (request(&h, "STORAGE", sense_request(), "100000ulume"), ErrorKind::InvalidMetadata),
    ];

    for (msg, expected) in cases {
        let label = format!("{} {} {}", msg.action_type, msg.price, msg.metadata);
        let err = h.msg_server.request_action(ctx(1), msg).unwrap_err();
        assert_eq!(err.kind(), expected, "{}", label);
        assert_no_trace(&h);
    }

    let mut bad_creator = request(&h, "SENSE", sense_request(), "100000ulume");
    bad_creator.creator = "cosmos1notours".to_string();
    let err = h.msg_server.request_action(ctx(1), bad_creator).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidAddress);
    assert_no_trace(&h);

    // Failed requests do not consume ids
    assert_eq!(h.request_sense(ctx(2), "100000ulume", "").unwrap(), FIRST_ACTION_ID.to_string());
}

#[test]
fn test_price_must_cover_declared_size() {
    let h = Harness::new();
    assert_eq!(h.keeper.get_action_fee(1000).unwrap(), Coin::new(110_000, DENOM));

    let mut msg = request(&h, "SENSE", sense_request(), "100000ulume");
    msg.file_size_kbs = 1000;
    let err = h.msg_server.request_action(ctx(1), msg.clone()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidPrice);

    msg.price = "110000ulume".to_string();
    h.msg_server.request_action(ctx(1), msg).unwrap();
    assert_eq!(h.balance(&h.creator.address), CREATOR_FUNDS - 110_000);
}

#[test]
fn test_minimum_fee_floor_is_inclusive() {
    let h = Harness::new();
    h.request_sense(ctx(1), "10100ulume", "").unwrap();
    assert_eq!(h.ledger.module_balance(DENOM), 10_100);
}

#[test]
fn test_expiration_inputs() {
    let h = Harness::new();
    let now = ctx(1).time;

    let never = h.request_sense(ctx(1), "20000ulume", "0").unwrap();
    assert_eq!(h.keeper.get_action(&never).unwrap().expiration_time, 0);

    let explicit = h
        .request_sense(ctx(1), "20000ulume", &(now + 60).to_string())
        .unwrap();
    assert_eq!(h.keeper.get_action(&explicit).unwrap().expiration_time, now + 60);

    for past in [now.to_string(), (now - 1).to_string(), "yesterday".to_string()] {
        let err = h.request_sense(ctx(1), "20000ulume", &past).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidExpiration, "{}", past);
    }
}

#[test]
fn test_direct_registration_rejects_assigned_fields() {
    let h = Harness::new();
    let metadata = h
        .keeper
        .registry()
        .handler(ActionType::Sense)
        .unwrap()
        .process(
            sense_request().as_bytes(),
            action_types::MessageKind::Request,
            &h.keeper.params().unwrap(),
        )
        .unwrap();
    let creator = h.creator.address.clone();
    let fresh = Action::new(creator, ActionType::Sense, metadata, "20000ulume", 0);

    let mut with_id = fresh.clone();
    with_id.id = "7".to_string();
    let err = h.keeper.register_action(ctx(1), with_id).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);

    let mut already_done = fresh.clone();
    already_done.state = ActionState::Done;
    let err = h.keeper.register_action(ctx(1), already_done).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);

    let mut negative = fresh.clone();
    negative.expiration_time = -1;
    let err = h.keeper.register_action(ctx(1), negative).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidExpiration);

    // Super node lists supplied by the caller are discarded
    let mut seeded = fresh;
    seeded.super_nodes.push(h.sn(0).address.clone());
    let id = h.keeper.register_action(ctx(1), seeded).unwrap();
    let stored = h.keeper.get_action(&id).unwrap();
    assert!(stored.super_nodes.is_empty());
    assert_eq!(stored.state, ActionState::Pending);
}

#[test]
fn test_registration_is_indexed() {
    let h = Harness::new();
    let id = h.request_cascade(ctx(9), "100000ulume", "").unwrap();

    let by_creator = h
        .keeper
        .list_actions_by_creator(&h.creator.address, PageRequest::default())
        .unwrap();
    assert_eq!(by_creator.total, 1);
    assert_eq!(by_creator.items[0].id, id);

    let by_height = h
        .keeper
        .list_actions_by_block_height(9, PageRequest::default())
        .unwrap();
    assert_eq!(by_height.total, 1);

    let pending = h
        .keeper
        .list_actions(Some(ActionState::Pending), Some(ActionType::Cascade), PageRequest::default())
        .unwrap();
    assert_eq!(pending.total, 1);

    let event = &h.events.events()[0];
    assert_eq!(event.kind, ActionEventKind::Registered);
    assert_eq!(event.action_id, id);
    assert_eq!(event.attribute("price"), Some("100000ulume"));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_ids_are_dense_across_failures(
        outcomes in proptest::collection::vec(any::<bool>(), 1..12)
    ) {
        let h = Harness::new();
        let mut assigned = Vec::new();

        for ok in outcomes {
            let price = if ok { "10100ulume" } else { "10099ulume" };
            match h.request_sense(ctx(1), price, "") {
                Ok(id) => assigned.push(id.parse::<u64>().unwrap()),
                Err(e) => prop_assert_eq!(e.kind(), ErrorKind::InvalidPrice),
            }
        }

        let expected: Vec<u64> = (0..assigned.len() as u64).map(|i| FIRST_ACTION_ID + i).collect();
        prop_assert_eq!(assigned, expected);
    }
}
