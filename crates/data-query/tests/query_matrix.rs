use proptest::prelude::*;
use sponge_data_query::{DataQuery, QueryError};

#[test]
fn query_render_parse_roundtrip_matrix() {
    let cases = ["", "a", "a.b", "a.b.c", "player.stats.health", "a..b", "a."];

    for text in cases {
        let query = DataQuery::from(text);
        assert_eq!(query.to_string(), text, "roundtrip for {text:?}");
    }
}

#[test]
fn query_separator_matrix() {
    let query = DataQuery::of(["world", "chunks", "0"]);
    assert_eq!(query.as_string('.'), "world.chunks.0");
    assert_eq!(query.as_string('/'), "world/chunks/0");
    assert_eq!(DataQuery::of_separated('/', "world/chunks/0"), query);
}

#[test]
fn query_decomposition_relationships() {
    let query = DataQuery::from("a.b.c");
    let head = DataQuery::from(query.first().expect("has first"));
    assert_eq!(head.then(&query.pop_first()), query);
    assert_eq!(query.parent().expect("has parent").then_key("c"), query);
    assert!(query.is_child_of(&DataQuery::from("a.b")));
    assert_eq!(DataQuery::empty().parent(), Err(QueryError::NoParent));
}

#[test]
fn query_serde_as_string() {
    let query = DataQuery::from("a.b");
    let json = serde_json::to_string(&query).expect("serialize");
    assert_eq!(json, "\"a.b\"");
    let back: DataQuery = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, query);
}

#[test]
fn query_serde_keeps_dotted_segments() {
    let query = DataQuery::of(["a.b", "c"]);
    let json = serde_json::to_string(&query).expect("serialize");
    assert_eq!(json, r#""a\\.b.c""#);
    let back: DataQuery = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, query);
    assert_eq!(back.parts(), ["a.b", "c"]);
}

proptest! {
    #[test]
    fn then_is_associative(
        a in proptest::collection::vec("[a-z]{1,4}", 0..4),
        b in proptest::collection::vec("[a-z]{1,4}", 0..4),
        c in proptest::collection::vec("[a-z]{1,4}", 0..4),
    ) {
        let (a, b, c) = (DataQuery::from(a), DataQuery::from(b), DataQuery::from(c));
        prop_assert_eq!(a.then(&b).then(&c), a.then(&b.then(&c)));
        prop_assert_eq!(a.then(&b).len(), a.len() + b.len());
    }

    #[test]
    fn separated_text_roundtrips(parts in proptest::collection::vec("[a-z0-9]{1,6}", 1..6)) {
        let query = DataQuery::of(parts.clone());
        let parsed: DataQuery = query.to_string().parse().unwrap();
        prop_assert_eq!(parsed.parts(), parts.as_slice());
    }

    #[test]
    fn segments_with_separator_or_escape_roundtrip(
        parts in proptest::collection::vec(r"[a-c.\\/]{1,5}", 1..5),
    ) {
        let query = DataQuery::of(parts);
        prop_assert_eq!(&DataQuery::from(query.to_string()), &query);
        prop_assert_eq!(&DataQuery::of_separated('/', &query.as_string('/')), &query);

        let json = serde_json::to_string(&query).expect("serialize");
        let back: DataQuery = serde_json::from_str(&json).expect("deserialize");
        prop_assert_eq!(back, query);
    }
}
