//! Expression language integration tests.
//!
//! Compiles full expressions into query requests and checks both the
//! accepted surface and the rejection messages.

use pretty_assertions::assert_eq;
use serde_json::json;
use supaplay::client::{Target, Verb};
use supaplay::expr::{compile, parse};

#[test]
fn test_compile_select_with_filters_and_modifiers() {
    let request = compile(
        "supabase.from('orders')\
         .select('id,total,customer(name)')\
         .gte('total', 100)\
         .neq('status', 'cancelled')\
         .order('total', {ascending: false})\
         .range(0, 24)",
    )
    .unwrap();

    assert_eq!(request.target, Target::Table("orders".to_string()));
    assert_eq!(request.verb, Verb::Select);
    assert_eq!(request.columns, Some("id,total,customer(name)".to_string()));
    assert_eq!(request.filters.len(), 2);
    assert_eq!(request.filters[0].rhs(), "gte.100");
    assert_eq!(request.filters[1].rhs(), "neq.cancelled");
    assert_eq!(request.order[0].render(), "total.desc");
    assert_eq!(request.offset, Some(0));
    assert_eq!(request.limit, Some(25));
}

#[test]
fn test_compile_insert_array_payload() {
    let request = compile(
        "supabase.from('users').insert([{name: 'Ada', age: 36}, {name: 'Grace'}]).select('id')",
    )
    .unwrap();

    assert_eq!(request.verb, Verb::Insert);
    assert_eq!(
        request.payload,
        Some(json!([{"name": "Ada", "age": 36}, {"name": "Grace"}]))
    );
    assert!(request.returning);
    assert_eq!(request.columns, Some("id".to_string()));
}

#[test]
fn test_compile_update_with_eq() {
    let request =
        compile("supabase.from('users').update({active: false}).eq('id', 7)").unwrap();

    assert_eq!(request.verb, Verb::Update);
    assert_eq!(request.payload, Some(json!({"active": false})));
    assert_eq!(request.filters[0].rhs(), "eq.7");
}

#[test]
fn test_compile_delete_with_in_filter() {
    let request =
        compile("supabase.from('notes').delete().in('id', [1, 2, 3])").unwrap();

    assert_eq!(request.verb, Verb::Delete);
    assert_eq!(request.filters[0].rhs(), "in.(1,2,3)");
}

#[test]
fn test_compile_is_null_and_like() {
    let request = compile(
        "supabase.from('users').select().is('deleted_at', null).ilike('email', '%@example.com')",
    )
    .unwrap();

    assert_eq!(request.filters[0].rhs(), "is.null");
    assert_eq!(request.filters[1].rhs(), "ilike.%@example.com");
}

#[test]
fn test_compile_rpc_with_single() {
    let request = compile("supabase.rpc('current_plan', {user_id: 42}).single()").unwrap();

    assert_eq!(
        request.target,
        Target::Rpc {
            function: "current_plan".to_string(),
            args: json!({"user_id": 42}),
        }
    );
    assert!(request.single);
}

#[test]
fn test_compile_accepts_double_quoted_strings() {
    let request = compile("supabase.from(\"users\").select(\"id\")").unwrap();
    assert_eq!(request.target, Target::Table("users".to_string()));
    assert_eq!(request.columns, Some("id".to_string()));
}

#[test]
fn test_parse_keeps_call_order() {
    let chain = parse("supabase.from('t').select().eq('a', 1).limit(1)").unwrap();
    let methods: Vec<&str> = chain.calls.iter().map(|call| call.method.as_str()).collect();
    assert_eq!(methods, ["from", "select", "eq", "limit"]);
}

#[test]
fn test_rejections() {
    let cases = [
        ("", "expected an identifier"),
        ("1+", "unexpected character"),
        ("supabase", "must call a method"),
        ("client.from('t').select()", "unknown identifier 'client'"),
        ("supabase.from('t').selct()", "unknown method 'selct'"),
        ("supabase.from('t')", "never picks an operation"),
        ("supabase.from('t').eq('a', 1)", "after a query verb"),
        ("supabase.from('t').select().limit('ten')", "non-negative integer"),
        ("supabase.from('t').insert('row')", "a record or an array of records"),
        ("supabase.from('t').select('id'", "unterminated argument list"),
        ("supabase.from('t).select()", "unterminated string"),
    ];

    for (expression, expected) in cases {
        let err = compile(expression).unwrap_err();
        assert!(
            err.to_string().contains(expected),
            "expression {expression:?}: expected {expected:?} in {:?}",
            err.to_string()
        );
    }
}
