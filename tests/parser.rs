//! Parse engine behavior on the documented message shapes

use rstest::rstest;
use wametuelewa::message::grammars::{
    COARSE, DEMOGRAPHICS, DEMOGRAPHICS_MULTIPATH, OPTIONAL_TAIL, SIMPLE, TAGGED_DEMOGRAPHICS,
};
use wametuelewa::message::matching::{delimiter, missing, word, Grammar};
use wametuelewa::message::{parse, process, tokenize, Diagnostic, Item, Outcome, Token};

fn phrase() -> Vec<Token> {
    tokenize("John Smith , 16 M").unwrap()
}

fn render(outcome: &Outcome) -> String {
    outcome.to_string()
}

fn label(outcome: &Outcome) -> &str {
    outcome
        .diagnostic()
        .map(Diagnostic::label)
        .unwrap_or("<none>")
}

#[test]
fn test_simple_grammar() {
    insta::assert_snapshot!(
        render(&parse(&SIMPLE, &phrase())),
        @"['John' (W), 'Smith' (W), 16 (I), 'M' (W)]"
    );
}

#[test]
fn test_optional_tail_matches_full_and_names_only() {
    insta::assert_snapshot!(
        render(&parse(&OPTIONAL_TAIL, &phrase())),
        @"['John' (W), 'Smith' (W), 16 (I), 'M' (W)]"
    );
    insta::assert_snapshot!(
        render(&parse(&OPTIONAL_TAIL, &phrase()[..2])),
        @"['John' (W), 'Smith' (W)]"
    );
}

#[test]
fn test_coarse_grammar() {
    assert!(parse(&COARSE, &phrase()).is_match());
    let outcome = parse(&COARSE, &phrase()[..4]);
    assert_eq!(label(&outcome), "age and sex");
    let outcome = parse(&COARSE, &phrase()[..3]);
    assert_eq!(label(&outcome), "age and sex");
}

#[rstest]
#[case("John Smith , 16 M", None)]
#[case("John Smith , 16", Some("sex"))]
#[case("John Smith ,", Some("age"))]
#[case("John Smith , John", Some("age"))]
#[case("John Smith , 16 16", Some("sex"))]
fn test_demographics_feedback(#[case] source: &str, #[case] expected: Option<&str>) {
    let outcome = process(&DEMOGRAPHICS, source).unwrap();
    match expected {
        None => assert!(outcome.is_match(), "{} should match: {}", source, outcome),
        Some(expected) => assert_eq!(label(&outcome), expected, "for {}", source),
    }
}

#[test]
fn test_demographics_names_only_is_a_match() {
    let outcome = process(&DEMOGRAPHICS, "John Smith").unwrap();
    insta::assert_snapshot!(render(&outcome), @"['John' (W), 'Smith' (W)]");
}

#[test]
fn test_demographics_reports_position() {
    let outcome = process(&DEMOGRAPHICS, "John Smith , 16").unwrap();
    assert_eq!(outcome, Outcome::Diagnostic(Diagnostic::new("sex", 3)));
}

#[test]
fn test_missing_name_when_message_starts_with_number() {
    let outcome = process(&DEMOGRAPHICS, "16 M").unwrap();
    assert_eq!(outcome, Outcome::Diagnostic(Diagnostic::new("name", 0)));
}

#[test]
fn test_multipath_prefers_deepest_diagnostic() {
    let outcome = process(&DEMOGRAPHICS_MULTIPATH, "John Smith ,").unwrap();
    assert_eq!(label(&outcome), "age");
}

#[test]
fn test_multipath_takes_clean_alternative_path() {
    let outcome = process(&DEMOGRAPHICS_MULTIPATH, "John Smith , 16").unwrap();
    insta::assert_snapshot!(render(&outcome), @"['John' (W), 'Smith' (W), 16 (I)]");
}

#[test]
fn test_tagged_fields() {
    let outcome = process(&TAGGED_DEMOGRAPHICS, "John Smith, 16 M").unwrap();
    insta::assert_snapshot!(
        render(&outcome),
        @"[name=['John' (W), 'Smith' (W)], age=[16 (I)], sex=['M' (W)]]"
    );

    let outcome = process(&TAGGED_DEMOGRAPHICS, "John Smith, 16").unwrap();
    assert_eq!(label(&outcome), "sex");
}

#[test]
fn test_shape_mismatch_is_no_match() {
    let outcome = process(&SIMPLE, "John , 16 M").unwrap();
    assert_eq!(outcome, Outcome::NoMatch);
    let outcome = process(&OPTIONAL_TAIL, "John Smith , 16 M extra").unwrap();
    assert_eq!(outcome, Outcome::NoMatch);
}

#[test]
fn test_equal_depth_keeps_first_declared_alternative() {
    let grammar: Grammar =
        word() & ((delimiter() & missing("first")) | (delimiter() & missing("second")));
    let outcome = process(&grammar, "John ,").unwrap();
    assert_eq!(outcome, Outcome::Diagnostic(Diagnostic::new("first", 1)));

    let grammar: Grammar =
        word() & ((delimiter() & missing("second")) | (delimiter() & missing("first")));
    let outcome = process(&grammar, "John ,").unwrap();
    assert_eq!(outcome, Outcome::Diagnostic(Diagnostic::new("second", 1)));
}

#[test]
fn test_deeper_diagnostic_beats_earlier_alternative() {
    let grammar: Grammar = (missing("early") & word().repeat(..))
        | (word() & word() % missing("late") & word() % missing("later"));
    let outcome = process(&grammar, "John 16").unwrap();
    assert_eq!(outcome, Outcome::Diagnostic(Diagnostic::new("late", 1)));
}

#[test]
fn test_parse_is_idempotent() {
    let tokens = tokenize("John Smith , 16").unwrap();
    let first = parse(&DEMOGRAPHICS, &tokens);
    let second = parse(&DEMOGRAPHICS, &tokens);
    assert_eq!(first, second);
}

#[test]
fn test_shared_grammar_across_threads() {
    let messages = ["John Smith , 16 M", "John Smith , 16", "John Smith ,", "16"];
    let expected: Vec<Outcome> = messages
        .iter()
        .map(|m| process(&DEMOGRAPHICS, m).unwrap())
        .collect();

    std::thread::scope(|scope| {
        let handles: Vec<_> = messages
            .iter()
            .map(|m| scope.spawn(move || process(&DEMOGRAPHICS, m).unwrap()))
            .collect();
        for (handle, expected) in handles.into_iter().zip(&expected) {
            assert_eq!(&handle.join().unwrap(), expected);
        }
    });
}

#[test]
fn test_match_items_are_tokens_without_delimiters() {
    let outcome = parse(&SIMPLE, &phrase());
    let items = outcome.items().unwrap();
    assert!(items.iter().all(|item| matches!(item, Item::Token { .. })));
    assert!(items
        .iter()
        .filter_map(Item::as_token)
        .all(|token| !token.is_delimiter()));
}

#[test]
fn test_json_outcome() {
    let outcome = process(&DEMOGRAPHICS, "John ,").unwrap();
    let json = serde_json::to_string(&outcome).unwrap();
    assert_eq!(
        json,
        r#"{"outcome":"diagnostic","result":{"label":"age","position":1}}"#
    );
}

#[test]
fn test_long_message_parses_on_a_default_thread() {
    let names = vec!["Ann"; 20_000].join(" ");
    let outcome = process(&DEMOGRAPHICS, &names).unwrap();
    assert_eq!(outcome.items().map(<[Item]>::len), Some(20_000));

    let outcome = process(&DEMOGRAPHICS, &format!("{}, 16 F", names)).unwrap();
    assert_eq!(outcome.items().map(<[Item]>::len), Some(20_002));
}
