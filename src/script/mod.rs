//! Restricted script engine for structure-registration fragments.
//!
//! Collection authors register structure definitions by assigning object
//! literals into a global `APIStructures` container from inside their test
//! scripts. Running those fragments does not need a full scripting runtime:
//! the dialect below covers literals, member assignment, zero-argument
//! functions, `typeof` guards, and `if`/`else`, which is the entire surface
//! the registration protocol uses. Everything else is rejected, and the
//! extraction layer treats a rejected or failing fragment as a skipped
//! fragment, never as a failed build.
//!
//! One [`Engine`] instance lives for exactly one extraction pass. Globals
//! accumulate across fragments within that pass (a hook function declared
//! by one fragment stays visible to later ones) and are discarded with the
//! engine, so state never leaks between collection builds.

pub mod interpreter;
pub mod lexer;
pub mod parser;

use serde_json::Value;

use interpreter::Scope;

/// Errors produced while running a fragment.
///
/// Always swallowed by the extraction layer; carried as a type so tests
/// and diagnostics can tell the phases apart.
#[derive(Debug)]
pub enum ScriptError {
    /// The fragment failed to tokenize.
    Lex {
        /// What went wrong.
        message: String,
        /// 1-based source line.
        line: usize,
    },

    /// The fragment tokenized but failed to parse.
    Parse {
        /// What went wrong.
        message: String,
        /// 1-based source line.
        line: usize,
    },

    /// The fragment failed while executing.
    Eval(String),
}

impl std::fmt::Display for ScriptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScriptError::Lex { message, line } => {
                write!(f, "script lex error at line {}: {}", line, message)
            }
            ScriptError::Parse { message, line } => {
                write!(f, "script parse error at line {}: {}", line, message)
            }
            ScriptError::Eval(message) => write!(f, "script execution error: {}", message),
        }
    }
}

impl std::error::Error for ScriptError {}

/// A script engine holding one global scope.
#[derive(Debug, Default)]
pub struct Engine {
    scope: Scope,
}

impl Engine {
    /// Creates an engine with an empty global scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Defines (or replaces) a data global.
    pub fn set_global(&mut self, name: impl Into<String>, value: Value) {
        self.scope.set(name, value);
    }

    /// Returns a data global, if defined.
    pub fn global(&self, name: &str) -> Option<&Value> {
        self.scope.get(name)
    }

    /// Parses and executes one source text against the global scope.
    ///
    /// Statements run in order; execution stops at the first error, but
    /// side effects of already-executed statements remain visible, so a
    /// fragment that registers two structures and then throws still
    /// contributes the two registrations.
    pub fn run(&mut self, source: &str) -> Result<(), ScriptError> {
        let program = parser::parse(source)?;
        interpreter::execute(&mut self.scope, &program)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_engine_runs_registration_fragment() {
        let mut engine = Engine::new();
        engine.set_global("APIStructures", json!({}));
        engine
            .run("APIStructures['dog'] = {name: 'Dog', description: 'A greater animal', fields: []};")
            .unwrap();

        let container = engine.global("APIStructures").unwrap();
        assert_eq!(container["dog"]["name"], json!("Dog"));
    }

    #[test]
    fn test_globals_accumulate_across_runs() {
        let mut engine = Engine::new();
        engine.set_global("APIStructures", json!({}));
        engine.run("function hook() { APIStructures['a'] = {}; }").unwrap();
        engine.run("hook();").unwrap();

        let container = engine.global("APIStructures").unwrap();
        assert!(container.as_object().unwrap().contains_key("a"));
    }

    #[test]
    fn test_failed_run_keeps_earlier_side_effects() {
        let mut engine = Engine::new();
        engine.set_global("APIStructures", json!({}));
        let result = engine.run("APIStructures['a'] = {}; nope();");
        assert!(result.is_err());
        assert!(engine
            .global("APIStructures")
            .unwrap()
            .as_object()
            .unwrap()
            .contains_key("a"));
    }
}
