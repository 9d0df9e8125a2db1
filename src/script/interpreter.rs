//! Evaluator for the restricted script dialect.
//!
//! Executes parsed statements against a single global scope. There are no
//! closures and no local scopes: a function body runs directly against the
//! globals, which is exactly what registration hooks need, since their
//! whole purpose is to assign into the shared `APIStructures` container.
//!
//! Data values round-trip as [`serde_json::Value`]; with the
//! `preserve_order` feature enabled, object literals keep their declared
//! key order all the way into harvesting.

use std::collections::HashMap;
use std::rc::Rc;

use serde_json::Value;

use super::parser::{Expr, Stmt};
use super::ScriptError;

/// A named global binding.
#[derive(Debug, Clone)]
pub enum Binding {
    /// A plain data value.
    Data(Value),
    /// A declared function (its statement body).
    Function(Rc<Vec<Stmt>>),
}

/// The result of evaluating an expression.
#[derive(Debug, Clone)]
enum EvalValue {
    Json(Value),
    Function(Rc<Vec<Stmt>>),
    Undefined,
}

/// Statement-level control flow.
enum Flow {
    Normal,
    Return,
}

/// The global scope a fragment sequence executes against.
#[derive(Debug, Default)]
pub struct Scope {
    bindings: HashMap<String, Binding>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defines (or replaces) a data global.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.bindings.insert(name.into(), Binding::Data(value));
    }

    /// Returns a data global, if defined and not a function.
    pub fn get(&self, name: &str) -> Option<&Value> {
        match self.bindings.get(name) {
            Some(Binding::Data(value)) => Some(value),
            _ => None,
        }
    }

    fn lookup(&self, name: &str) -> Option<&Binding> {
        self.bindings.get(name)
    }
}

/// Executes a statement list against the scope.
pub fn execute(scope: &mut Scope, program: &[Stmt]) -> Result<(), ScriptError> {
    execute_block(scope, program)?;
    Ok(())
}

fn execute_block(scope: &mut Scope, statements: &[Stmt]) -> Result<Flow, ScriptError> {
    for statement in statements {
        match execute_statement(scope, statement)? {
            Flow::Normal => {}
            Flow::Return => return Ok(Flow::Return),
        }
    }
    Ok(Flow::Normal)
}

fn execute_statement(scope: &mut Scope, statement: &Stmt) -> Result<Flow, ScriptError> {
    match statement {
        Stmt::VarDecl { name, init } => {
            let value = match init {
                Some(expr) => evaluate(scope, expr)?,
                None => EvalValue::Undefined,
            };
            bind(scope, name, value);
            Ok(Flow::Normal)
        }
        Stmt::FunctionDecl { name, body } => {
            scope
                .bindings
                .insert(name.clone(), Binding::Function(Rc::new(body.clone())));
            Ok(Flow::Normal)
        }
        Stmt::If {
            condition,
            then_branch,
            else_branch,
        } => {
            if is_truthy(&evaluate(scope, condition)?) {
                execute_block(scope, then_branch)
            } else if let Some(else_branch) = else_branch {
                execute_block(scope, else_branch)
            } else {
                Ok(Flow::Normal)
            }
        }
        Stmt::Return(value) => {
            if let Some(expr) = value {
                evaluate(scope, expr)?;
            }
            Ok(Flow::Return)
        }
        Stmt::Expr(expr) => {
            evaluate(scope, expr)?;
            Ok(Flow::Normal)
        }
    }
}

fn bind(scope: &mut Scope, name: &str, value: EvalValue) {
    let binding = match value {
        EvalValue::Json(json) => Binding::Data(json),
        EvalValue::Function(body) => Binding::Function(body),
        EvalValue::Undefined => Binding::Data(Value::Null),
    };
    scope.bindings.insert(name.to_string(), binding);
}

fn evaluate(scope: &mut Scope, expr: &Expr) -> Result<EvalValue, ScriptError> {
    match expr {
        Expr::Literal(value) => Ok(EvalValue::Json(value.clone())),
        Expr::Undefined => Ok(EvalValue::Undefined),

        Expr::Ident(name) => match scope.lookup(name) {
            Some(Binding::Data(value)) => Ok(EvalValue::Json(value.clone())),
            Some(Binding::Function(body)) => Ok(EvalValue::Function(body.clone())),
            None => Err(ScriptError::Eval(format!("'{}' is not defined", name))),
        },

        Expr::Member { object, property } => {
            read_property(scope, object, &Value::String(property.clone()))
        }

        Expr::Index { object, index } => {
            let key = match evaluate(scope, index)? {
                EvalValue::Json(value) => value,
                _ => return Err(ScriptError::Eval("invalid index expression".to_string())),
            };
            read_property(scope, object, &key)
        }

        Expr::Assign { target, value } => {
            let value = evaluate(scope, value)?;
            assign(scope, target, value.clone())?;
            Ok(value)
        }

        Expr::Call { callee, args } => {
            // Arguments are evaluated for effect but not passed: the
            // dialect only supports zero-parameter functions.
            for arg in args {
                evaluate(scope, arg)?;
            }
            let function = match evaluate(scope, callee)? {
                EvalValue::Function(body) => body,
                _ => {
                    return Err(ScriptError::Eval(
                        "called value is not a function".to_string(),
                    ))
                }
            };
            execute_block(scope, &function)?;
            Ok(EvalValue::Undefined)
        }

        Expr::Typeof(operand) => {
            // typeof never throws on an undefined identifier.
            let value = match operand.as_ref() {
                Expr::Ident(name) if scope.lookup(name).is_none() => EvalValue::Undefined,
                other => evaluate(scope, other)?,
            };
            Ok(EvalValue::Json(Value::String(type_of(&value).to_string())))
        }

        Expr::Not(operand) => {
            let value = evaluate(scope, operand)?;
            Ok(EvalValue::Json(Value::Bool(!is_truthy(&value))))
        }

        Expr::Eq {
            left,
            right,
            negated,
        } => {
            let left = evaluate(scope, left)?;
            let right = evaluate(scope, right)?;
            let equal = values_equal(&left, &right);
            Ok(EvalValue::Json(Value::Bool(equal != *negated)))
        }

        Expr::Object(entries) => {
            let mut object = serde_json::Map::new();
            for (key, value_expr) in entries {
                let value = match evaluate(scope, value_expr)? {
                    EvalValue::Json(json) => json,
                    EvalValue::Undefined => Value::Null,
                    EvalValue::Function(_) => {
                        return Err(ScriptError::Eval(
                            "functions are not supported as object values".to_string(),
                        ))
                    }
                };
                object.insert(key.clone(), value);
            }
            Ok(EvalValue::Json(Value::Object(object)))
        }

        Expr::Array(elements) => {
            let mut array = Vec::with_capacity(elements.len());
            for element in elements {
                match evaluate(scope, element)? {
                    EvalValue::Json(json) => array.push(json),
                    EvalValue::Undefined => array.push(Value::Null),
                    EvalValue::Function(_) => {
                        return Err(ScriptError::Eval(
                            "functions are not supported as array values".to_string(),
                        ))
                    }
                }
            }
            Ok(EvalValue::Json(Value::Array(array)))
        }
    }
}

fn read_property(scope: &mut Scope, object: &Expr, key: &Value) -> Result<EvalValue, ScriptError> {
    let container = match evaluate(scope, object)? {
        EvalValue::Json(value) => value,
        _ => {
            return Err(ScriptError::Eval(
                "property access on a non-object value".to_string(),
            ))
        }
    };

    let result = match (&container, key) {
        (Value::Object(map), Value::String(name)) => map.get(name).cloned(),
        (Value::Array(items), Value::Number(n)) => n
            .as_u64()
            .and_then(|index| items.get(index as usize))
            .cloned(),
        _ => None,
    };

    Ok(result.map(EvalValue::Json).unwrap_or(EvalValue::Undefined))
}

/// Writes through an assignment target, creating the root global when it
/// does not exist yet (undeclared assignment creates a global, as in the
/// language the dialect mimics).
fn assign(scope: &mut Scope, target: &Expr, value: EvalValue) -> Result<(), ScriptError> {
    match target {
        Expr::Ident(name) => {
            bind(scope, name, value);
            Ok(())
        }
        Expr::Member { .. } | Expr::Index { .. } => {
            let (root, path) = resolve_path(scope, target)?;
            let json = match value {
                EvalValue::Json(json) => json,
                EvalValue::Undefined => Value::Null,
                EvalValue::Function(_) => {
                    return Err(ScriptError::Eval(
                        "functions are not supported as container values".to_string(),
                    ))
                }
            };
            write_path(scope, &root, &path, json)
        }
        _ => Err(ScriptError::Eval("invalid assignment target".to_string())),
    }
}

/// Flattens a member/index chain into its root identifier and key path.
fn resolve_path(scope: &mut Scope, target: &Expr) -> Result<(String, Vec<String>), ScriptError> {
    match target {
        Expr::Ident(name) => Ok((name.clone(), Vec::new())),
        Expr::Member { object, property } => {
            let (root, mut path) = resolve_path(scope, object)?;
            path.push(property.clone());
            Ok((root, path))
        }
        Expr::Index { object, index } => {
            let key = match evaluate(scope, index)? {
                EvalValue::Json(Value::String(s)) => s,
                EvalValue::Json(Value::Number(n)) => n.to_string(),
                _ => {
                    return Err(ScriptError::Eval(
                        "container keys must be strings or numbers".to_string(),
                    ))
                }
            };
            let (root, mut path) = resolve_path(scope, object)?;
            path.push(key);
            Ok((root, path))
        }
        _ => Err(ScriptError::Eval("invalid assignment target".to_string())),
    }
}

fn write_path(
    scope: &mut Scope,
    root: &str,
    path: &[String],
    value: Value,
) -> Result<(), ScriptError> {
    let binding = scope
        .bindings
        .get_mut(root)
        .ok_or_else(|| ScriptError::Eval(format!("'{}' is not defined", root)))?;

    let mut current = match binding {
        Binding::Data(data) => data,
        Binding::Function(_) => {
            return Err(ScriptError::Eval(format!(
                "'{}' is a function, not a container",
                root
            )))
        }
    };

    for key in &path[..path.len() - 1] {
        let map = current.as_object_mut().ok_or_else(|| {
            ScriptError::Eval(format!("'{}' is not an object along the path", key))
        })?;
        current = map
            .get_mut(key)
            .ok_or_else(|| ScriptError::Eval(format!("'{}' is undefined along the path", key)))?;
    }

    let map = current
        .as_object_mut()
        .ok_or_else(|| ScriptError::Eval("assignment into a non-object value".to_string()))?;
    map.insert(path[path.len() - 1].clone(), value);
    Ok(())
}

fn is_truthy(value: &EvalValue) -> bool {
    match value {
        EvalValue::Undefined => false,
        EvalValue::Function(_) => true,
        EvalValue::Json(json) => match json {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
            Value::String(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) => true,
        },
    }
}

fn type_of(value: &EvalValue) -> &'static str {
    match value {
        EvalValue::Undefined => "undefined",
        EvalValue::Function(_) => "function",
        EvalValue::Json(json) => match json {
            // typeof null is "object", faithfully.
            Value::Null => "object",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) | Value::Object(_) => "object",
        },
    }
}

fn values_equal(left: &EvalValue, right: &EvalValue) -> bool {
    match (left, right) {
        (EvalValue::Undefined, EvalValue::Undefined) => true,
        (EvalValue::Json(a), EvalValue::Json(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::parser::parse;
    use serde_json::json;

    fn run(scope: &mut Scope, source: &str) -> Result<(), ScriptError> {
        execute(scope, &parse(source)?)
    }

    fn scope_with_container() -> Scope {
        let mut scope = Scope::new();
        scope.set("APIStructures", json!({}));
        scope
    }

    #[test]
    fn test_index_assignment_into_container() {
        let mut scope = scope_with_container();
        run(&mut scope, "APIStructures['dog'] = {name: 'Dog'};").unwrap();
        assert_eq!(
            scope.get("APIStructures").unwrap(),
            &json!({"dog": {"name": "Dog"}})
        );
    }

    #[test]
    fn test_dot_assignment_into_container() {
        let mut scope = scope_with_container();
        run(&mut scope, "APIStructures.cat = {name: 'Cat'};").unwrap();
        assert_eq!(
            scope.get("APIStructures").unwrap(),
            &json!({"cat": {"name": "Cat"}})
        );
    }

    #[test]
    fn test_container_keys_keep_insertion_order() {
        let mut scope = scope_with_container();
        run(
            &mut scope,
            "APIStructures['b'] = {}; APIStructures['a'] = {};",
        )
        .unwrap();
        let keys: Vec<&String> = scope
            .get("APIStructures")
            .unwrap()
            .as_object()
            .unwrap()
            .keys()
            .collect();
        assert_eq!(keys, vec!["b", "a"]);
    }

    #[test]
    fn test_undeclared_assignment_creates_global() {
        let mut scope = Scope::new();
        run(&mut scope, "x = 42;").unwrap();
        assert_eq!(scope.get("x").unwrap(), &json!(42));
    }

    #[test]
    fn test_function_declaration_and_call() {
        let mut scope = scope_with_container();
        run(
            &mut scope,
            "function populate() { APIStructures['dog'] = {name: 'Dog'}; } populate();",
        )
        .unwrap();
        assert_eq!(
            scope.get("APIStructures").unwrap(),
            &json!({"dog": {"name": "Dog"}})
        );
    }

    #[test]
    fn test_typeof_undefined_identifier_does_not_throw() {
        let mut scope = Scope::new();
        run(&mut scope, "x = typeof missing;").unwrap();
        assert_eq!(scope.get("x").unwrap(), &json!("undefined"));
    }

    #[test]
    fn test_typeof_function() {
        let mut scope = Scope::new();
        run(&mut scope, "function f() {} t = typeof f;").unwrap();
        assert_eq!(scope.get("t").unwrap(), &json!("function"));
    }

    #[test]
    fn test_if_guard_skips_when_hook_missing() {
        let mut scope = scope_with_container();
        run(
            &mut scope,
            "if (typeof populate === 'function') { populate(); } else { APIStructures['x'] = {}; }",
        )
        .unwrap();
        assert_eq!(scope.get("APIStructures").unwrap(), &json!({"x": {}}));
    }

    #[test]
    fn test_referencing_undefined_identifier_is_an_error() {
        let mut scope = Scope::new();
        let result = run(&mut scope, "x = missing;");
        assert!(matches!(result, Err(ScriptError::Eval(_))));
    }

    #[test]
    fn test_calling_non_function_is_an_error() {
        let mut scope = Scope::new();
        let result = run(&mut scope, "var x = 1; x();");
        assert!(matches!(result, Err(ScriptError::Eval(_))));
    }

    #[test]
    fn test_error_leaves_prior_assignments_visible() {
        let mut scope = scope_with_container();
        let result = run(
            &mut scope,
            "APIStructures['kept'] = {name: 'Kept'}; boom();",
        );
        assert!(result.is_err());
        assert_eq!(
            scope.get("APIStructures").unwrap(),
            &json!({"kept": {"name": "Kept"}})
        );
    }

    #[test]
    fn test_return_stops_function_body() {
        let mut scope = Scope::new();
        run(
            &mut scope,
            "function f() { a = 1; return; b = 2; } f();",
        )
        .unwrap();
        assert_eq!(scope.get("a").unwrap(), &json!(1));
        assert!(scope.get("b").is_none());
    }

    #[test]
    fn test_nested_member_read() {
        let mut scope = Scope::new();
        scope.set("config", json!({"inner": {"value": 7}}));
        run(&mut scope, "x = config.inner.value;").unwrap();
        assert_eq!(scope.get("x").unwrap(), &json!(7));
    }

    #[test]
    fn test_strict_equality_on_strings() {
        let mut scope = Scope::new();
        run(&mut scope, "x = 'a' === 'a'; y = 'a' !== 'b';").unwrap();
        assert_eq!(scope.get("x").unwrap(), &json!(true));
        assert_eq!(scope.get("y").unwrap(), &json!(true));
    }

    #[test]
    fn test_truthiness_of_double_negation() {
        let mut scope = Scope::new();
        run(&mut scope, "function f() {} x = !!f;").unwrap();
        assert_eq!(scope.get("x").unwrap(), &json!(true));
    }
}
