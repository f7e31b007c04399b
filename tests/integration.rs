use pretty_assertions::assert_eq;
use treeson::decoder::decode;
use treeson::encoder::encode;
use treeson::node::Node;
use treeson::patch::{apply, diff, PatchBuilder};
use treeson::pointer::{resolve, reverse_pointer};
use treeson::CodecOptions;

#[test]
fn nested_document_round_trips() {
    let doc = Node::object(vec![
        Node::string("hello").with_key("greeting"),
        Node::object(vec![Node::int(7).with_key("depth")]).with_key("nested"),
        Node::array(vec![Node::int(1), Node::int(2), Node::int(3)]).with_key("list"),
    ]);

    let bytes = encode(&doc, CodecOptions::default()).unwrap();
    let decoded = decode(&bytes, CodecOptions::default()).unwrap();
    assert_eq!(decoded, doc);
}

#[test]
fn uuid_detection_round_trips_through_binary_subtype_4() {
    let opts = CodecOptions {
        detect_uuids: true,
        use_extended_types: false,
    };
    let doc = Node::object(vec![
        Node::string("550e8400-e29b-41d4-a716-446655440000").with_key("id"),
    ]);

    let bytes = encode(&doc, opts).unwrap();
    // Type byte for the "id" field is binary (0x05), not string (0x02).
    assert_eq!(bytes[4], 0x05);

    let decoded = decode(&bytes, opts).unwrap();
    assert_eq!(decoded, doc);
}

#[test]
fn extended_types_surface_uuid_node_directly() {
    let opts = CodecOptions {
        detect_uuids: true,
        use_extended_types: true,
    };
    let doc = Node::object(vec![
        Node::string("550e8400-e29b-41d4-a716-446655440000").with_key("id"),
    ]);
    let bytes = encode(&doc, opts).unwrap();
    let decoded = decode(&bytes, opts).unwrap();
    match &decoded.get_object_item("id").unwrap().kind {
        treeson::NodeKind::Uuid(_) => {}
        other => panic!("expected a Uuid node, got {other:?}"),
    }
}

#[test]
fn pointer_and_reverse_pointer_agree() {
    let root = Node::object(vec![Node::array(vec![
        Node::object(vec![Node::string("x").with_key("name")]),
        Node::object(vec![Node::string("y").with_key("name")]),
    ])
    .with_key("items")]);

    let target = root
        .get_object_item("items")
        .unwrap()
        .get_array_item(1)
        .unwrap();

    let pointer = reverse_pointer(&root, target).unwrap();
    assert_eq!(pointer, "/items/1");
    assert_eq!(resolve(&root, &pointer).unwrap(), target);
}

#[test]
fn patch_sequence_stops_at_first_error_without_rollback() {
    let mut root = Node::object(vec![Node::int(1).with_key("a")]);
    let patches = PatchBuilder::new()
        .push_add("/b", Node::int(2))
        .push_remove("/does-not-exist")
        .push_add("/c", Node::int(3))
        .build();

    let err = apply(&mut root, &patches).unwrap_err();
    assert_eq!(err, treeson::patch::PatchError::ParentNotFound);

    // The first add (which succeeded before the failing remove) is not
    // rolled back; the third add (after the failure) never ran.
    assert!(root.get_object_item("b").is_some());
    assert!(root.get_object_item("c").is_none());
}

#[test]
fn diff_round_trip_across_a_document_rewrite() {
    let from = Node::object(vec![
        Node::int(1).with_key("version"),
        Node::string("draft").with_key("status"),
    ]);
    let to = Node::object(vec![
        Node::int(2).with_key("version"),
        Node::string("published").with_key("status"),
        Node::bool(true).with_key("reviewed"),
    ]);

    let patches = diff(&from, &to);
    let mut applied = from.clone();
    apply(&mut applied, &patches).unwrap();
    assert_eq!(applied, to);
}
