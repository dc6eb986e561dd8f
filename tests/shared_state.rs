use serde_json::json;
use tablesync::sync::{SharedState, Slot, UserIdentity};
use tablesync::Endpoint;

#[test]
fn test_slots_start_empty() {
    let shared = SharedState::new();
    assert!(shared.user.get().is_none());
    assert!(shared.current_table.get().is_none());
    assert!(shared.table_state.get().is_none());
    assert!(!shared.is_connected());
}

#[test]
fn test_slot_keeps_latest_value_only() {
    let slot = Slot::new();
    slot.set(1);
    slot.set(2);
    assert_eq!(slot.get(), Some(2));

    slot.clear();
    assert_eq!(slot.get(), None);
}

#[test]
fn test_clear_if_only_matching_value() {
    let slot = Slot::new();
    slot.set("a".to_string());

    assert!(!slot.clear_if(|v| v == "b"));
    assert_eq!(slot.get().as_deref(), Some("a"));

    assert!(slot.clear_if(|v| v == "a"));
    assert!(!slot.is_set());
}

#[tokio::test]
async fn test_subscriber_sees_latest_write() {
    let shared = SharedState::new();
    let mut rx = shared.table_state.subscribe();

    shared.table_state.set(json!({"pot": 1}));
    shared.table_state.set(json!({"pot": 2}));

    rx.changed().await.unwrap();
    assert_eq!(*rx.borrow_and_update(), Some(json!({"pot": 2})));
}

#[test]
fn test_user_and_table_slots() {
    let shared = SharedState::new();
    let user: UserIdentity =
        serde_json::from_value(json!({"id": "u1", "username": "ann", "chips": 1000})).unwrap();

    shared.user.set(user.clone());
    shared.current_table.set(Endpoint::from(3));

    assert_eq!(shared.user.get(), Some(user));
    assert_eq!(shared.current_table.get().unwrap().as_str(), "3");
}
