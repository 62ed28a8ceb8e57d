//! Interpreter mapping a parsed call chain onto the query surface.
//!
//! The chain must be rooted at the client binding and may only use the
//! whitelisted builder methods; anything else is rejected. This replaces
//! evaluating the expression as code: the chain is data, and the only
//! effects it can have are the ones `RequestBuilder` allows.

use serde_json::{json, Value};

use super::parser::{Call, CallChain};
use crate::client::{FilterOp, QueryRequest, RequestBuilder};
use crate::error::{PlayError, Result};

/// The name the client handle is bound to inside expressions.
pub const CLIENT_BINDING: &str = "supabase";

/// Interprets a call chain into a query request.
pub fn interpret(chain: &CallChain) -> Result<QueryRequest> {
    if chain.root != CLIENT_BINDING {
        return Err(PlayError::expression(format!(
            "unknown identifier '{}'; the client is bound as '{CLIENT_BINDING}'",
            chain.root
        )));
    }

    let mut calls = chain.calls.iter();
    let first = calls.next().ok_or_else(|| {
        PlayError::expression(format!(
            "the expression must call a method on '{CLIENT_BINDING}', e.g. {CLIENT_BINDING}.from('table').select()"
        ))
    })?;

    let mut builder = root_call(first)?;
    for call in calls {
        apply(&mut builder, call)?;
    }

    builder.build()
}

/// Handles the first call in the chain: `from(table)` or `rpc(fn[, args])`.
fn root_call(call: &Call) -> Result<RequestBuilder> {
    match call.method.as_str() {
        "from" => {
            expect_arity(call, 1, 1)?;
            let table = string_arg(&call.args[0], "from", "a table name")?;
            Ok(RequestBuilder::table(table))
        }
        "rpc" => {
            expect_arity(call, 1, 2)?;
            let function = string_arg(&call.args[0], "rpc", "a function name")?;
            let args = match call.args.get(1) {
                Some(value @ Value::Object(_)) => value.clone(),
                Some(_) => {
                    return Err(PlayError::expression(
                        "rpc() expects its arguments as an object, e.g. rpc('fn', {x: 1})",
                    ));
                }
                None => json!({}),
            };
            Ok(RequestBuilder::rpc(function, args))
        }
        other => Err(PlayError::expression(format!(
            "'{other}' is not available on '{CLIENT_BINDING}'; start with from() or rpc()"
        ))),
    }
}

/// Applies one chained call to the builder.
fn apply(builder: &mut RequestBuilder, call: &Call) -> Result<()> {
    let method = call.method.as_str();

    if let Some(op) = FilterOp::parse(method) {
        expect_arity(call, 2, 2)?;
        let column = string_arg(&call.args[0], method, "a column name")?;
        let value = call.args[1].clone();
        if op == FilterOp::In && !value.is_array() {
            return Err(PlayError::expression(
                "in() expects an array of values, e.g. in('status', ['a', 'b'])",
            ));
        }
        return builder.filter(op, column, value);
    }

    match method {
        "select" => {
            expect_arity(call, 0, 1)?;
            let columns = match call.args.first() {
                Some(value) => Some(string_arg(value, "select", "a column list")?),
                None => None,
            };
            builder.select(columns.as_deref())
        }
        "insert" => builder.insert(payload_arg(call, "insert")?),
        "upsert" => builder.upsert(payload_arg(call, "upsert")?),
        "update" => builder.update(payload_arg(call, "update")?),
        "delete" => {
            expect_arity(call, 0, 0)?;
            builder.delete()
        }
        "order" => {
            expect_arity(call, 1, 2)?;
            let column = string_arg(&call.args[0], "order", "a column name")?;
            let ascending = match call.args.get(1) {
                Some(Value::Object(options)) => match options.get("ascending") {
                    Some(Value::Bool(b)) => *b,
                    Some(_) => {
                        return Err(PlayError::expression(
                            "order() expects 'ascending' to be a boolean",
                        ));
                    }
                    None => true,
                },
                Some(_) => {
                    return Err(PlayError::expression(
                        "order() expects options as an object, e.g. order('id', {ascending: false})",
                    ));
                }
                None => true,
            };
            builder.order(column, ascending)
        }
        "limit" => {
            expect_arity(call, 1, 1)?;
            builder.limit(count_arg(&call.args[0], "limit")?)
        }
        "range" => {
            expect_arity(call, 2, 2)?;
            let from = count_arg(&call.args[0], "range")?;
            let to = count_arg(&call.args[1], "range")?;
            builder.range(from, to)
        }
        "single" => {
            expect_arity(call, 0, 0)?;
            builder.single()
        }
        other => Err(PlayError::expression(format!(
            "unknown method '{other}' in the query chain"
        ))),
    }
}

fn expect_arity(call: &Call, min: usize, max: usize) -> Result<()> {
    let count = call.args.len();
    if count < min || count > max {
        let expected = if min == max {
            format!("{min}")
        } else {
            format!("{min} to {max}")
        };
        return Err(PlayError::expression(format!(
            "{}() expects {expected} argument(s), got {count}",
            call.method
        )));
    }
    Ok(())
}

fn string_arg(value: &Value, method: &str, what: &str) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        other => Err(PlayError::expression(format!(
            "{method}() expects {what} as a string, got {other}"
        ))),
    }
}

fn count_arg(value: &Value, method: &str) -> Result<u64> {
    value.as_u64().ok_or_else(|| {
        PlayError::expression(format!("{method}() expects a non-negative integer, got {value}"))
    })
}

/// A mutation payload: one record or an array of records.
fn payload_arg(call: &Call, method: &str) -> Result<Value> {
    expect_arity(call, 1, 1)?;
    match &call.args[0] {
        value @ (Value::Object(_) | Value::Array(_)) => Ok(value.clone()),
        other => Err(PlayError::expression(format!(
            "{method}() expects a record or an array of records, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{Target, Verb};
    use crate::expr::parse;
    use serde_json::json;

    fn compile(input: &str) -> Result<QueryRequest> {
        interpret(&parse(input)?)
    }

    #[test]
    fn test_interpret_select_chain() {
        let request = compile(
            "supabase.from('users').select('id,name').eq('active', true).order('id', {ascending: false}).limit(10)",
        )
        .unwrap();

        assert_eq!(request.target, Target::Table("users".to_string()));
        assert_eq!(request.verb, Verb::Select);
        assert_eq!(request.columns, Some("id,name".to_string()));
        assert_eq!(request.filters.len(), 1);
        assert_eq!(request.filters[0].rhs(), "eq.true");
        assert_eq!(request.order[0].render(), "id.desc");
        assert_eq!(request.limit, Some(10));
    }

    #[test]
    fn test_interpret_placeholder_expression() {
        // The form's placeholder expression must interpret cleanly.
        let request = compile("supabase.from('table').select()").unwrap();
        assert_eq!(request.verb, Verb::Select);
        assert_eq!(request.columns, Some("*".to_string()));
    }

    #[test]
    fn test_interpret_insert_with_returning() {
        let request =
            compile("supabase.from('users').insert({name: 'Ada'}).select()").unwrap();
        assert_eq!(request.verb, Verb::Insert);
        assert!(request.returning);
    }

    #[test]
    fn test_interpret_rpc() {
        let request = compile("supabase.rpc('top_customers', {count: 5})").unwrap();
        assert_eq!(
            request.target,
            Target::Rpc {
                function: "top_customers".to_string(),
                args: json!({"count": 5}),
            }
        );
    }

    #[test]
    fn test_interpret_rpc_without_args() {
        let request = compile("supabase.rpc('version')").unwrap();
        assert_eq!(
            request.target,
            Target::Rpc {
                function: "version".to_string(),
                args: json!({}),
            }
        );
    }

    #[test]
    fn test_interpret_wrong_root() {
        let err = compile("client.from('users').select()").unwrap_err();
        assert!(err.to_string().contains("unknown identifier 'client'"));
    }

    #[test]
    fn test_interpret_bare_root() {
        let err = compile("supabase").unwrap_err();
        assert!(err.to_string().contains("must call a method"));
    }

    #[test]
    fn test_interpret_unknown_method() {
        let err = compile("supabase.from('users').selct()").unwrap_err();
        assert!(err.to_string().contains("unknown method 'selct'"));
    }

    #[test]
    fn test_interpret_unknown_root_method() {
        let err = compile("supabase.table('users')").unwrap_err();
        assert!(err.to_string().contains("start with from() or rpc()"));
    }

    #[test]
    fn test_interpret_wrong_arity() {
        let err = compile("supabase.from('users').select('a', 'b')").unwrap_err();
        assert!(err.to_string().contains("expects 0 to 1 argument(s)"));
    }

    #[test]
    fn test_interpret_in_requires_array() {
        let err = compile("supabase.from('users').select().in('id', 1)").unwrap_err();
        assert!(err.to_string().contains("expects an array"));
    }

    #[test]
    fn test_interpret_limit_rejects_negative() {
        let err = compile("supabase.from('users').select().limit(-1)").unwrap_err();
        assert!(err.to_string().contains("non-negative integer"));
    }

    #[test]
    fn test_interpret_order_defaults_ascending() {
        let request = compile("supabase.from('users').select().order('id')").unwrap();
        assert_eq!(request.order[0].render(), "id.asc");
    }
}
