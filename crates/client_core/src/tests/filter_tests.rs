use super::filter_employees;
use crate::test_support::{ana, employee};

fn roster() -> Vec<shared::domain::Employee> {
    vec![
        employee("1", "Ana Silva", "111", "ana@x.com"),
        employee("2", "Ali Khan", "22233", "ali@corp.io"),
        employee("3", "Carla Dias", "98765", "carla@x.com"),
        employee("4", "Diego Ramos", "ANA-4", "diego@y.org"),
    ]
}

fn ids(list: &[shared::domain::Employee]) -> Vec<&str> {
    list.iter().map(|employee| employee.id.as_str()).collect()
}

#[test]
fn blank_term_returns_everything_in_order() {
    let all = roster();
    assert_eq!(filter_employees(&all, ""), all);
    assert_eq!(filter_employees(&all, "   \t"), all);
}

#[test]
fn matching_is_case_insensitive() {
    let all = roster();
    assert_eq!(ids(&filter_employees(&all, "ALI")), vec!["2"]);
}

#[test]
fn term_is_trimmed_before_matching() {
    let all = roster();
    assert_eq!(ids(&filter_employees(&all, "  carla  ")), vec!["3"]);
}

#[test]
fn matches_name_email_or_document_preserving_order() {
    let all = roster();
    // "ana" hits 1 by name and email, 4 by document.
    assert_eq!(ids(&filter_employees(&all, "ana")), vec!["1", "4"]);
    assert_eq!(ids(&filter_employees(&all, "x.com")), vec!["1", "3"]);
    assert_eq!(ids(&filter_employees(&all, "987")), vec!["3"]);
}

#[test]
fn result_is_an_ordered_subsequence_for_every_term() {
    let all = roster();
    for term in ["", "a", "an", "i", "x", ".", "zzz", "1", "DIEGO", " k "] {
        let displayed = filter_employees(&all, term);
        let mut cursor = all.iter();
        for shown in &displayed {
            assert!(
                cursor.any(|candidate| candidate == shown),
                "term {term:?} produced an out-of-order or foreign record"
            );
        }
    }
}

#[test]
fn single_record_scenario() {
    let all = vec![ana()];
    assert_eq!(filter_employees(&all, "ana"), all);
    assert!(filter_employees(&all, "zzz").is_empty());
}
