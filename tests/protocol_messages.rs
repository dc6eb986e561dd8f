use serde_json::json;
use tablesync::error::Error;
use tablesync::protocol::messages::{Frame, StateUpdate};

#[test]
fn test_update_deserialization() {
    let json = r#"{
        "type": "update",
        "table_id": "table-1",
        "seq": 12,
        "state": {"pot": 150, "street": "flop"},
        "events": [{"kind": "bet", "amount": 50}]
    }"#;

    let frame = Frame::decode(json).unwrap();

    match frame {
        Frame::Update(update) => {
            assert_eq!(update.table_id.as_deref(), Some("table-1"));
            assert_eq!(update.seq, Some(12));
            assert_eq!(update.state, json!({"pot": 150, "street": "flop"}));
            assert_eq!(update.events.len(), 1);
        }
        _ => panic!("Expected Update"),
    }
}

#[test]
fn test_minimal_update() {
    let frame = Frame::decode(r#"{"type":"update","state":[1,2,3]}"#).unwrap();

    assert_eq!(
        frame,
        Frame::Update(StateUpdate {
            state: json!([1, 2, 3]),
            table_id: None,
            seq: None,
            events: vec![],
        })
    );
    assert_eq!(frame.kind(), "update");
}

#[test]
fn test_unknown_type_is_not_an_error() {
    let frame = Frame::decode(r#"{"type":"chat","text":"gg"}"#).unwrap();

    assert_eq!(
        frame,
        Frame::Unknown {
            kind: "chat".to_string()
        }
    );
}

#[test]
fn test_missing_type_is_decode_fault() {
    let err = Frame::decode(r#"{"state":{}}"#).unwrap_err();
    assert!(matches!(err, Error::DecodeFault(_)));
}

#[test]
fn test_update_without_state_is_decode_fault() {
    let err = Frame::decode(r#"{"type":"update","seq":3}"#).unwrap_err();
    assert!(matches!(err, Error::DecodeFault(_)));
}

#[test]
fn test_malformed_payload_is_decode_fault() {
    for payload in ["not json", "[1,2]", "", r#"{"type": 5}"#] {
        let err = Frame::decode(payload).unwrap_err();
        assert!(matches!(err, Error::DecodeFault(_)), "payload {:?}", payload);
    }
}

#[test]
fn test_numeric_table_id_is_kept_as_string() {
    let frame = Frame::decode(r#"{"type":"update","table_id":7,"state":{}}"#).unwrap();

    match frame {
        Frame::Update(update) => {
            assert_eq!(update.table_id.as_deref(), Some("7"));
            assert_eq!(update.state, json!({}));
        }
        _ => panic!("Expected Update"),
    }
}

#[test]
fn test_null_events_still_decodes() {
    let frame = Frame::decode(r#"{"type":"update","events":null,"state":{"pot":1}}"#).unwrap();

    match frame {
        Frame::Update(update) => {
            assert!(update.events.is_empty());
            assert_eq!(update.state, json!({"pot": 1}));
        }
        _ => panic!("Expected Update"),
    }
}

#[test]
fn test_negative_seq_still_decodes() {
    let frame = Frame::decode(r#"{"type":"update","seq":-1,"state":"S"}"#).unwrap();

    match frame {
        Frame::Update(update) => {
            assert_eq!(update.seq, None);
            assert_eq!(update.state, json!("S"));
        }
        _ => panic!("Expected Update"),
    }
}

#[test]
fn test_odd_metadata_shapes_do_not_drop_snapshot() {
    let frame = Frame::decode(
        r#"{"type":"update","table_id":{"id":1},"seq":"3","events":"none","state":[1]}"#,
    )
    .unwrap();

    assert_eq!(
        frame,
        Frame::Update(StateUpdate {
            state: json!([1]),
            table_id: None,
            seq: None,
            events: vec![],
        })
    );
}
