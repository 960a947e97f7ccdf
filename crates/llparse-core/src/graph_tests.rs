use crate::{
    Code, CodeKind, EdgeKey, GraphError, MulAddOptions, Property, PropertyType, Signature,
    SourceGraph, SourceKind, Transform,
};

#[test]
fn builder_names_nodes_after_their_role() {
    let mut g = SourceGraph::new();
    let on_data = g.span_cb("on_data");
    let span = g.new_span(on_data).unwrap();
    let check = g.match_cb("check");

    let error = g.error(1, "bad");
    let pause = g.pause(2, "wait");
    let consume = g.consume("length");
    let invoke = g.invoke(check, &[]).unwrap();
    let start = g.span_start(span);
    let end = g.span_end(span);

    assert_eq!(g.node(error).name, "error");
    assert_eq!(g.node(pause).name, "pause");
    assert_eq!(g.node(consume).name, "consume_length");
    assert_eq!(g.node(invoke).name, "invoke_check");
    assert_eq!(g.node(start).name, "span_start_on_data");
    assert_eq!(g.node(end).name, "span_end_on_data");
    assert_eq!(g.len(), 6);
}

#[test]
fn match_edges_record_advance_and_value() {
    let mut g = SourceGraph::new();
    let start = g.match_node("start");
    let next = g.match_node("next");

    g.match_bytes(start, "ab", next).unwrap();
    g.peek(start, b'c', next).unwrap();
    g.select(start, "d", 7, next).unwrap();

    let edges = g.node(start).edges();
    assert_eq!(edges.len(), 3);
    assert_eq!(edges[0].key, EdgeKey::Bytes(b"ab".to_vec()));
    assert!(!edges[0].no_advance);
    assert!(edges[1].no_advance);
    assert_eq!(edges[2].value, Some(7));
    assert_eq!(edges[2].bytes(), Some(&b"d"[..]));
    assert_eq!(edges[2].code(), None);
}

#[test]
fn invoke_edges_are_keyed_by_return_code() {
    let mut g = SourceGraph::new();
    let check = g.match_cb("check");
    let a = g.match_node("a");
    let b = g.match_node("b");

    let invoke = g.invoke(check, &[(0, a), (1, b)]).unwrap();

    let node = g.node(invoke);
    assert_eq!(node.kind, SourceKind::Invoke { code: check });
    let codes: Vec<_> = node.edges().iter().map(|e| e.code()).collect();
    assert_eq!(codes, vec![Some(0), Some(1)]);
    assert!(node.edges().iter().all(|e| e.no_advance));
}

#[test]
fn invoke_rejects_duplicate_codes() {
    let mut g = SourceGraph::new();
    let check = g.match_cb("check");
    let a = g.match_node("a");

    let err = g.invoke(check, &[(0, a), (0, a)]).unwrap_err();

    assert_eq!(
        err,
        GraphError::DuplicateKey {
            node: "invoke_check".into(),
            key: "0".into(),
        }
    );
}

#[test]
fn otherwise_and_skip_to_differ_in_advance() {
    let mut g = SourceGraph::new();
    let a = g.match_node("a");
    let b = g.match_node("b");
    let next = g.match_node("next");

    g.otherwise(a, next).unwrap();
    g.skip_to(b, next).unwrap();

    assert!(g.node(a).otherwise().unwrap().no_advance);
    assert!(!g.node(b).otherwise().unwrap().no_advance);
}

#[test]
fn second_otherwise_is_rejected() {
    let mut g = SourceGraph::new();
    let a = g.match_node("a");
    let next = g.match_node("next");
    g.otherwise(a, next).unwrap();

    let err = g.skip_to(a, next).unwrap_err();

    assert_eq!(err, GraphError::DuplicateOtherwise { node: "a".into() });
}

#[test]
fn error_nodes_are_terminal() {
    let mut g = SourceGraph::new();
    let error = g.error(1, "bad");
    let next = g.match_node("next");

    assert_eq!(
        g.otherwise(error, next).unwrap_err(),
        GraphError::TerminalOtherwise {
            node: "error".into()
        }
    );
    assert_eq!(
        g.match_bytes(error, "a", next).unwrap_err(),
        GraphError::EdgesNotAllowed {
            node: "error".into()
        }
    );
}

#[test]
fn match_key_validation() {
    let mut g = SourceGraph::new();
    let a = g.match_node("a");
    let next = g.match_node("next");
    g.match_bytes(a, "x", next).unwrap();

    assert_eq!(
        g.match_bytes(a, "", next).unwrap_err(),
        GraphError::EmptyKey { node: "a".into() }
    );
    assert_eq!(
        g.peek(a, b'x', next).unwrap_err(),
        GraphError::DuplicateKey {
            node: "a".into(),
            key: "x".into(),
        }
    );

    g.select(a, "\n", 1, next).unwrap();
    assert_eq!(g.node(a).edges().len(), 2);
    assert_eq!(
        g.match_bytes(a, "\n", next).unwrap_err(),
        GraphError::DuplicateKey {
            node: "a".into(),
            key: "\\n".into(),
        }
    );
}

#[test]
fn span_requires_span_callback() {
    let mut g = SourceGraph::new();
    let on_value = g.value_cb("on_value");

    let err = g.new_span(on_value).unwrap_err();

    assert_eq!(
        err,
        GraphError::WrongSignature {
            code: "on_value".into(),
            signature: Signature::Value,
            expected: Signature::Span,
        }
    );
    assert_eq!(
        err.to_string(),
        "callback `on_value` has signature `value`, expected `span`"
    );
}

#[test]
fn transform_only_applies_to_match_nodes() {
    let mut g = SourceGraph::new();
    let a = g.match_node("a");
    let consume = g.consume("len");

    g.set_transform(a, Transform::to_lower_unsafe()).unwrap();
    let err = g.set_transform(consume, Transform::to_lower_unsafe());

    assert_eq!(
        g.node(a).kind,
        SourceKind::Match {
            transform: Some(Transform::new("to_lower_unsafe"))
        }
    );
    assert_eq!(
        err,
        Err(GraphError::TransformOnNonMatch {
            node: "consume_len".into()
        })
    );
}

#[test]
fn code_signatures_and_fields() {
    let mut g = SourceGraph::new();
    let options = MulAddOptions {
        base: 10,
        ..Default::default()
    };
    let cases = [
        (g.is_equal("eq", "f", 1), Signature::Match, Some("f")),
        (g.load("ld", "f"), Signature::Match, Some("f")),
        (g.test("t", "f", 2), Signature::Match, Some("f")),
        (g.mul_add("ma", "f", options), Signature::Value, Some("f")),
        (g.or("o", "f", 4), Signature::Value, Some("f")),
        (g.store("st", "f"), Signature::Value, Some("f")),
        (g.update("up", "f", 3), Signature::Value, Some("f")),
        (g.match_cb("m"), Signature::Match, None),
        (g.value_cb("v"), Signature::Value, None),
        (g.span_cb("s"), Signature::Span, None),
    ];

    for (code, signature, field) in cases {
        assert_eq!(g.code(code).signature(), signature);
        assert_eq!(g.code(code).field(), field);
    }
    assert_eq!(
        *g.code(cases[3].0),
        Code::new(
            "ma",
            CodeKind::MulAdd {
                field: "f".into(),
                options
            }
        )
    );
}

#[test]
fn successors_list_keyed_edges_before_otherwise() {
    let mut g = SourceGraph::new();
    let start = g.match_node("start");
    let a = g.match_node("a");
    let b = g.match_node("b");
    let fallback = g.match_node("fallback");
    g.match_bytes(start, "a", a).unwrap();
    g.match_bytes(start, "b", b).unwrap();
    g.otherwise(start, fallback).unwrap();

    let succs: Vec<_> = g.node(start).successors().collect();

    assert_eq!(succs, vec![a, b, fallback]);
}

#[test]
fn properties_deserialize_from_json() {
    let json = r#"[{"type": "i64", "name": "content_length"}, {"type": "ptr", "name": "data"}]"#;

    let props: Vec<Property> = serde_json::from_str(json).unwrap();

    assert_eq!(
        props,
        vec![
            Property::new(PropertyType::I64, "content_length"),
            Property::new(PropertyType::Ptr, "data"),
        ]
    );
}
