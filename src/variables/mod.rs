//! Environment variable substitution.
//!
//! Collection files may reference environment variables with the
//! `{{name}}` placeholder syntax. Substitution is a pure text transform
//! over the raw file bytes, applied before any structural parsing, so it is
//! agnostic to which wire format the file turns out to be.
//!
//! Substitution is a single pass: if a substituted value itself contains a
//! `{{other}}` token, no second pass resolves it. This mirrors how the
//! exporting client treats environments and keeps the transform total.

use std::collections::HashMap;

/// An environment: variable name to replacement value.
///
/// Callers distinguish "no environment supplied" (`Option::None` in the
/// builder options) from an empty environment; both leave input bytes
/// unmodified.
pub type Environment = HashMap<String, String>;

/// Replaces every literal `{{name}}` occurrence for every variable in the
/// environment, in mapping-iteration order.
///
/// Values are substituted verbatim; a value containing `{{other}}` is NOT
/// re-expanded. Returns the input unchanged when the environment is empty
/// or when no placeholder matches.
///
/// # Arguments
///
/// * `contents` - Raw file bytes, prior to JSON parsing
/// * `variables` - The substitution environment
pub fn substitute(contents: &[u8], variables: &Environment) -> Vec<u8> {
    let mut output = contents.to_vec();
    for (name, value) in variables {
        let placeholder = format!("{{{{{}}}}}", name);
        output = replace_bytes(&output, placeholder.as_bytes(), value.as_bytes());
    }
    output
}

/// Replaces every non-overlapping occurrence of `needle` in `haystack`.
fn replace_bytes(haystack: &[u8], needle: &[u8], replacement: &[u8]) -> Vec<u8> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return haystack.to_vec();
    }

    let mut output = Vec::with_capacity(haystack.len());
    let mut position = 0;
    while position < haystack.len() {
        if haystack[position..].starts_with(needle) {
            output.extend_from_slice(replacement);
            position += needle.len();
        } else {
            output.push(haystack[position]);
            position += 1;
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn env(entries: &[(&str, &str)]) -> Environment {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_substitute_single_variable() {
        let variables = env(&[("domain", "localhost")]);
        let output = substitute(b"http://{{domain}}/api", &variables);
        assert_eq!(output, b"http://localhost/api");
    }

    #[test]
    fn test_substitute_leaves_other_bytes_untouched() {
        let variables = env(&[("domain", "localhost")]);
        let input = br#"{"url": "http://{{domain}}/api", "other": "{{unknown}}"}"#;
        let output = substitute(input, &variables);
        assert_eq!(
            output,
            br#"{"url": "http://localhost/api", "other": "{{unknown}}"}"#
        );
    }

    #[test]
    fn test_substitute_every_occurrence() {
        let variables = env(&[("host", "api.example.com")]);
        let output = substitute(b"{{host}} and {{host}}", &variables);
        assert_eq!(output, b"api.example.com and api.example.com");
    }

    #[test]
    fn test_substitute_single_pass_only() {
        // A value introducing a new placeholder is not re-expanded: once
        // every key has had its pass, no further pass runs.
        let variables = env(&[("a", "{{b}}")]);
        let output = substitute(b"{{a}}", &variables);
        assert_eq!(output, b"{{b}}");
    }

    #[test]
    fn test_substitute_empty_environment_is_noop() {
        let variables = Environment::new();
        let input = b"http://{{domain}}/api";
        assert_eq!(substitute(input, &variables), input);
    }

    #[test]
    fn test_substitute_empty_input() {
        let variables = env(&[("domain", "localhost")]);
        assert_eq!(substitute(b"", &variables), b"");
    }

    #[test]
    fn test_replace_bytes_adjacent_occurrences() {
        let output = replace_bytes(b"ababab", b"ab", b"x");
        assert_eq!(output, b"xxx");
    }

    proptest! {
        #[test]
        fn prop_substitution_without_placeholders_is_identity(
            input in "[a-zA-Z0-9 :/._-]{0,64}",
            key in "[a-z]{1,8}",
            value in "[a-z0-9]{0,8}",
        ) {
            let variables = env(&[(key.as_str(), value.as_str())]);
            let output = substitute(input.as_bytes(), &variables);
            prop_assert_eq!(output, input.as_bytes());
        }

        #[test]
        fn prop_substitution_replaces_exactly_the_placeholder(
            prefix in "[a-z ]{0,16}",
            suffix in "[a-z ]{0,16}",
            key in "[a-z]{1,8}",
            value in "[a-z0-9]{0,8}",
        ) {
            let input = format!("{}{{{{{}}}}}{}", prefix, key, suffix);
            let variables = env(&[(key.as_str(), value.as_str())]);
            let output = substitute(input.as_bytes(), &variables);
            let expected = format!("{}{}{}", prefix, value, suffix);
            prop_assert_eq!(output, expected.as_bytes());
        }
    }
}
