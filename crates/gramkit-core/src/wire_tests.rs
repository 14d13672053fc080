use crate::wire::*;

fn grammar_with(nodes: Vec<NodeJson>, rx_nodes: Vec<RegexJson>) -> TopLevelGrammar {
    TopLevelGrammar {
        grammars: vec![GrammarWithLexer {
            nodes,
            rx_nodes,
            ..GrammarWithLexer::empty()
        }],
        max_tokens: None,
        test_trace: false,
    }
}

#[test]
fn node_payload_flattens_props() {
    let node = NodeJson::String(NodeString {
        literal: "hi".into(),
        props: NodeProps {
            max_tokens: Some(3),
            name: None,
            capture_name: Some("greeting".into()),
        },
    });
    let json = serde_json::to_string(&node).unwrap();
    insta::assert_snapshot!(json, @r#"{"String":{"literal":"hi","max_tokens":3,"capture_name":"greeting"}}"#);
}

#[test]
fn gen_omits_absent_optionals() {
    let node = NodeJson::Gen(NodeGen {
        body_rx: RegexSpec::Id(0),
        stop_rx: RegexSpec::end_of_output(),
        stop_capture_name: None,
        lazy: None,
        temperature: None,
        props: NodeProps::default(),
    });
    let json = serde_json::to_string(&node).unwrap();
    insta::assert_snapshot!(json, @r#"{"Gen":{"body_rx":0,"stop_rx":""}}"#);
}

#[test]
fn regex_variants_are_externally_tagged() {
    let rx = vec![
        RegexJson::Literal("a".into()),
        RegexJson::Repeat(0, 1, None),
        RegexJson::Or(vec![0, 1]),
        RegexJson::NoMatch {},
        RegexJson::EmptyString {},
    ];
    let json = serde_json::to_string(&rx).unwrap();
    insta::assert_snapshot!(json, @r#"[{"Literal":"a"},{"Repeat":[0,1,null]},{"Or":[0,1]},{"NoMatch":{}},{"EmptyString":{}}]"#);
}

#[test]
fn top_level_grammar_parses_back() {
    let json = indoc::indoc! {r#"
        {
          "grammars": [
            {
              "nodes": [
                { "Join": { "sequence": [1, 2] } },
                { "Gen": { "body_rx": 0, "stop_rx": ".", "capture_name": "x" } },
                { "String": { "literal": "." } }
              ],
              "greedy_lexer": false,
              "rx_nodes": [ { "Regex": "[0-9]+" } ]
            }
          ],
          "max_tokens": 10
        }
    "#};

    let top = TopLevelGrammar::from_json(json).unwrap();
    assert_eq!(top.max_tokens, Some(10));
    assert!(!top.test_trace);

    let g = &top.grammars[0];
    assert_eq!(g.nodes.len(), 3);
    assert_eq!(g.contextual, None);
    let NodeJson::Gen(node) = &g.nodes[1] else {
        panic!("expected Gen, got {:?}", g.nodes[1]);
    };
    assert_eq!(node.stop_rx, RegexSpec::Source(".".into()));
    assert_eq!(node.props.capture_name.as_deref(), Some("x"));
    assert_eq!(g.rx_nodes[0], RegexJson::Regex("[0-9]+".into()));
}

#[test]
fn compact_json_survives_a_trip_through_the_parser() {
    let top = grammar_with(
        vec![NodeJson::Select(NodeSelect {
            among: vec![],
            props: NodeProps::default(),
        })],
        vec![RegexJson::ByteSet(vec![0, 0, 0, 0, 1, 0, 0, 0])],
    );
    let parsed = TopLevelGrammar::from_json(&top.to_json().unwrap()).unwrap();
    assert_eq!(parsed, top);
}

#[test]
fn props_accessor_reaches_every_variant() {
    let mut node = NodeJson::Join(NodeJoin {
        sequence: vec![],
        props: NodeProps::default(),
    });
    node.props_mut().max_tokens = Some(7);
    assert_eq!(node.props().max_tokens, Some(7));
}
