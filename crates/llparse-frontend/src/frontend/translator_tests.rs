use llparse_core::{MulAddOptions, SourceGraph, Transform as SourceTransform};

use crate::code::{CodeId, CodeKind, Transform};
use crate::node::{NodeId, NodeKind};
use crate::test_utils::{Recorder, compile, dump, n};
use crate::{Error, Frontend, FrontendOptions, FrontendResult};

fn invoke_code<I: crate::Implementation>(result: &FrontendResult<I>, id: NodeId) -> CodeId {
    match result.graph.node(id).kind {
        NodeKind::Invoke { code, .. } => code,
        ref kind => panic!("expected invoke, got {kind:?}"),
    }
}

fn otherwise_of<I: crate::Implementation>(result: &FrontendResult<I>, id: NodeId) -> NodeId {
    result.graph.node(id).otherwise().unwrap().node
}

#[test]
fn self_loop_translates_once() {
    let mut g = SourceGraph::new();
    let start = g.match_node("start");
    let error = g.error(1, "bad");
    g.match_bytes(start, "a", start).unwrap();
    g.otherwise(start, error).unwrap();

    let result = compile(&g, start).unwrap();

    assert_eq!(result.graph.len(), 2);
    insta::assert_snapshot!(dump(&result), @r#"
    root = p__n_start

    p__n_start: single
      'a' => p__n_start
      otherwise => p__n_error
    p__n_error: error 1 "bad"
    "#);
}

#[test]
fn cycle_through_several_kinds_terminates() {
    let mut g = SourceGraph::new();
    let start = g.match_node("start");
    let consume = g.consume("length");
    let pause = g.pause(2, "wait");
    let error = g.error(1, "bad");
    g.match_bytes(start, "x", consume).unwrap();
    g.otherwise(start, error).unwrap();
    g.otherwise(consume, pause).unwrap();
    g.otherwise(pause, start).unwrap();

    let result = compile(&g, start).unwrap();

    assert_eq!(result.graph.len(), 4);
    let names: Vec<_> = result.graph.nodes().map(|(_, node)| node.name()).collect();
    assert_eq!(
        names,
        [n("start"), n("consume_length"), n("pause"), n("error")]
    );
}

#[test]
fn shared_target_is_one_node() {
    let mut g = SourceGraph::new();
    let start = g.match_node("start");
    let left = g.pause(1, "left");
    let right = g.pause(2, "right");
    let shared = g.consume("length");
    let error = g.error(3, "bad");
    g.match_bytes(start, "l", left).unwrap();
    g.match_bytes(start, "r", right).unwrap();
    g.otherwise(start, error).unwrap();
    g.otherwise(left, shared).unwrap();
    g.otherwise(right, shared).unwrap();
    g.otherwise(shared, start).unwrap();

    let result = compile(&g, start).unwrap();

    let NodeKind::Single { edges, .. } = &result.graph.node(result.root).kind else {
        panic!("expected single root");
    };
    let left = otherwise_of(&result, edges[0].node);
    let right = otherwise_of(&result, edges[1].node);
    assert_eq!(left, right);
    assert_eq!(result.graph.node(left).name(), n("consume_length"));
}

#[test]
fn missing_otherwise_names_the_node() {
    let mut g = SourceGraph::new();
    let start = g.match_node("start");
    let consume = g.consume("length");
    g.otherwise(start, consume).unwrap();

    let err = compile(&g, start).err().unwrap();

    assert_eq!(
        err,
        Error::MissingOtherwise {
            node: "consume_length".into()
        }
    );
    assert_eq!(err.to_string(), "node `consume_length` has no `.otherwise()`");
}

#[test]
fn match_without_otherwise_is_rejected() {
    let mut g = SourceGraph::new();
    let start = g.match_node("start");
    let error = g.error(1, "bad");
    g.match_bytes(start, "a", error).unwrap();

    let err = compile(&g, start).err().unwrap();

    assert_eq!(
        err,
        Error::MissingOtherwise {
            node: "start".into()
        }
    );
}

#[test]
fn match_without_edges_is_empty() {
    let mut g = SourceGraph::new();
    let start = g.match_node("start");
    let consume = g.consume("length");
    g.otherwise(start, consume).unwrap();
    g.otherwise(consume, start).unwrap();

    let result = compile(&g, start).unwrap();

    let (_, empty) = result.graph.nodes().next().unwrap();
    assert_eq!(empty.kind, NodeKind::Empty);
    assert_eq!(result.graph.node(result.root).name(), n("consume_length"));
    insta::assert_snapshot!(dump(&result), @r"
    root = p__n_consume_length

    p__n_consume_length: consume length
      otherwise => p__n_consume_length
    ");
}

#[test]
fn otherwise_reaches_every_trie_node() {
    let mut g = SourceGraph::new();
    let start = g.match_node("start");
    let get = g.pause(1, "get");
    let post = g.pause(2, "post");
    let error = g.error(3, "unknown method");
    g.match_bytes(start, "GET", get).unwrap();
    g.match_bytes(start, "POST", post).unwrap();
    g.otherwise(start, error).unwrap();
    g.otherwise(get, start).unwrap();
    g.otherwise(post, start).unwrap();

    let result = compile(&g, start).unwrap();

    let trie: Vec<_> = result
        .graph
        .nodes()
        .filter(|(_, node)| node.id.original == "start")
        .map(|(id, _)| id)
        .collect();
    assert_eq!(trie.len(), 3);
    for id in trie {
        let otherwise = result.graph.node(id).otherwise().unwrap();
        assert!(otherwise.no_advance);
        assert_eq!(result.graph.node(otherwise.node).name(), n("error"));
    }
}

#[test]
fn skip_to_keeps_advance_flag() {
    let mut g = SourceGraph::new();
    let start = g.match_node("start");
    let error = g.error(1, "bad");
    g.match_bytes(start, "\r\n", error).unwrap();
    g.skip_to(start, start).unwrap();

    let result = compile(&g, start).unwrap();

    insta::assert_snapshot!(dump(&result), @r#"
    root = p__n_start

    p__n_start: sequence "\r\n"
      match => p__n_error
      skip_to => p__n_start
    p__n_error: error 1 "bad"
    "#);
}

#[test]
fn select_value_rides_on_edge() {
    let mut g = SourceGraph::new();
    let start = g.match_node("start");
    let store = g.store("store_method", "method");
    let next = g.invoke(store, &[]).unwrap();
    let error = g.error(1, "bad");
    g.select(start, "GET", 1, next).unwrap();
    g.select(start, "PUT", 2, next).unwrap();
    g.otherwise(start, error).unwrap();
    g.otherwise(next, error).unwrap();

    let result = compile(&g, start).unwrap();

    insta::assert_snapshot!(dump(&result), @r#"
    root = p__n_start

    p__n_start: single
      'G' => p__n_start_1
      'P' => p__n_start_2
      otherwise => p__n_error
    p__n_error: error 1 "bad"
    p__n_start_1: sequence "ET"
      match value=1 => p__n_invoke_store_method
      otherwise => p__n_error
    p__n_invoke_store_method: invoke p__c_store_method
      otherwise => p__n_error
    p__n_start_2: sequence "UT"
      match value=2 => p__n_invoke_store_method
      otherwise => p__n_error
    "#);
}

#[test]
fn invoke_edges_follow_return_codes() {
    let mut g = SourceGraph::new();
    let check = g.match_cb("check");
    let zero = g.pause(0, "zero");
    let one = g.pause(1, "one");
    let error = g.error(2, "other");
    let invoke = g.invoke(check, &[(0, zero), (1, one)]).unwrap();
    g.otherwise(invoke, error).unwrap();
    g.otherwise(zero, invoke).unwrap();
    g.otherwise(one, invoke).unwrap();

    let result = compile(&g, invoke).unwrap();

    insta::assert_snapshot!(dump(&result), @r#"
    root = p__n_invoke_check

    p__n_invoke_check: invoke check
      0 => p__n_pause
      1 => p__n_pause_1
      otherwise => p__n_error
    p__n_error: error 2 "other"
    p__n_pause: pause 0 "zero"
      otherwise => p__n_invoke_check
    p__n_pause_1: pause 1 "one"
      otherwise => p__n_invoke_check
    "#);
}

#[test]
fn span_callback_cannot_be_invoked() {
    let mut g = SourceGraph::new();
    let on_data = g.span_cb("on_data");
    let error = g.error(1, "bad");
    let invoke = g.invoke(on_data, &[]).unwrap();
    g.otherwise(invoke, error).unwrap();

    let err = compile(&g, invoke).err().unwrap();

    assert_eq!(
        err,
        Error::SpanCallbackInInvoke {
            node: "invoke_on_data".into(),
            code: "on_data".into(),
        }
    );
}

#[test]
fn equal_operations_share_one_code() {
    let mut g = SourceGraph::new();
    let first = g.is_equal("check", "method", 1);
    let same = g.is_equal("check", "method", 1);
    let other = g.is_equal("check", "method", 2);
    let error = g.error(1, "done");
    let a = g.invoke(first, &[]).unwrap();
    let b = g.invoke(same, &[]).unwrap();
    let c = g.invoke(other, &[]).unwrap();
    g.otherwise(a, b).unwrap();
    g.otherwise(b, c).unwrap();
    g.otherwise(c, error).unwrap();

    let result = compile(&g, a).unwrap();

    let a = result.root;
    let b = otherwise_of(&result, a);
    let c = otherwise_of(&result, b);
    assert_eq!(invoke_code(&result, a), invoke_code(&result, b));
    assert_ne!(invoke_code(&result, a), invoke_code(&result, c));

    let codes: Vec<_> = result
        .graph
        .codes()
        .map(|(_, code)| (code.name.as_str(), code.cache_key().to_string()))
        .collect();
    assert_eq!(
        codes,
        [
            ("p__c_check", "is_equal_method_1".to_owned()),
            ("p__c_check_1", "is_equal_method_2".to_owned()),
        ]
    );
}

#[test]
fn mul_add_is_signed_unless_stated() {
    let mut g = SourceGraph::new();
    let options = MulAddOptions {
        base: 10,
        ..Default::default()
    };
    let mul_add = g.mul_add("digit", "length", options);
    let error = g.error(1, "overflow");
    let invoke = g.invoke(mul_add, &[]).unwrap();
    g.otherwise(invoke, error).unwrap();

    let result = compile(&g, invoke).unwrap();

    let code = result.graph.code(invoke_code(&result, result.root));
    assert_eq!(
        code.kind,
        CodeKind::MulAdd {
            field: "length".into(),
            base: 10,
            max: None,
            signed: true,
        }
    );
}

#[test]
fn transform_applies_to_all_trie_nodes() {
    let mut g = SourceGraph::new();
    let start = g.match_node("start");
    let error = g.error(1, "bad");
    let done = g.pause(0, "done");
    g.match_bytes(start, "keep-alive", done).unwrap();
    g.match_bytes(start, "close", done).unwrap();
    g.otherwise(start, error).unwrap();
    g.otherwise(done, start).unwrap();
    g.set_transform(start, SourceTransform::to_lower_unsafe())
        .unwrap();

    let result = compile(&g, start).unwrap();

    let transforms: Vec<_> = result
        .graph
        .nodes()
        .filter_map(|(_, node)| node.kind.transform())
        .map(|id| result.graph.transform(id))
        .collect();
    assert_eq!(transforms, [Transform::ToLowerUnsafe; 3]);
    assert_eq!(result.graph.transforms().count(), 1);
}

#[test]
fn unsupported_transform_is_fatal() {
    let mut g = SourceGraph::new();
    let start = g.match_node("start");
    let error = g.error(1, "bad");
    g.match_bytes(start, "a", error).unwrap();
    g.otherwise(start, error).unwrap();
    g.set_transform(start, SourceTransform::new("to_upper"))
        .unwrap();

    let err = compile(&g, start).err().unwrap();

    assert_eq!(
        err,
        Error::UnsupportedTransform {
            node: "start".into(),
            name: "to_upper".into(),
        }
    );
}

#[test]
fn zero_table_width_fails_before_translation() {
    let options = FrontendOptions {
        max_table_elem_width: 0,
        ..Default::default()
    };

    let err = Frontend::new("p", (), options).err().unwrap();

    assert_eq!(err, Error::InvalidMaxTableElemWidth(0));
}

#[test]
fn hooks_run_once_per_object_in_creation_order() {
    let mut g = SourceGraph::new();
    let start = g.match_node("start");
    let on_match = g.match_cb("on_match");
    let invoke = g.invoke(on_match, &[]).unwrap();
    let again = g.invoke(on_match, &[]).unwrap();
    let error = g.error(1, "bad");
    g.match_bytes(start, "a", invoke).unwrap();
    g.otherwise(start, error).unwrap();
    g.otherwise(invoke, again).unwrap();
    g.otherwise(again, start).unwrap();

    let result = Frontend::new("p", Recorder, FrontendOptions::default())
        .unwrap()
        .compile_default(&g, start)
        .unwrap();

    assert_eq!(
        result.nodes,
        [
            "node 0 p__n_start",
            "node 1 p__n_invoke_on_match",
            "node 2 p__n_invoke_on_match_1",
            "node 3 p__n_error",
        ]
    );
    assert_eq!(result.codes, ["code 0 on_match"]);
    assert_eq!(result.transforms, ["transform 0 id"]);
}

#[test]
fn properties_are_passed_through() {
    let mut g = SourceGraph::new();
    g.property(llparse_core::PropertyType::I64, "content_length");
    let start = g.error(1, "done");

    let result = compile(&g, start).unwrap();

    assert_eq!(result.prefix, "p");
    assert_eq!(result.properties, g.properties());
}
