//! `${...}` expression interpolation for descriptor values.

use std::sync::LazyLock;

use regex::{Captures, Regex};

static EXPRESSION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").unwrap());

/// Nested expressions are resolved up to this depth.
const MAX_PASSES: usize = 10;

/// Replace every `${name}` in `value` for which `lookup` knows a value.
///
/// Unknown expressions are left in place. Values that themselves contain
/// expressions are resolved again, so `${a}` with `a = ${b}` works.
pub fn interpolate<F>(value: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut current = value.to_string();
    for _ in 0..MAX_PASSES {
        if !EXPRESSION.is_match(&current) {
            break;
        }
        let next = EXPRESSION
            .replace_all(&current, |caps: &Captures<'_>| {
                lookup(caps[1].trim()).unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned();
        if next == current {
            break;
        }
        current = next;
    }
    current
}

/// Whether `value` still contains an unresolved expression.
pub fn has_expression(value: &str) -> bool {
    EXPRESSION.is_match(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn props() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("project.version", "1.2.3"),
            ("guava.version", "33.0"),
            ("nested", "${project.version}-SNAPSHOT"),
        ])
    }

    fn lookup(key: &str) -> Option<String> {
        props().get(key).map(|v| v.to_string())
    }

    #[test]
    fn test_simple_expression() {
        assert_eq!(interpolate("${guava.version}", lookup), "33.0");
        assert_eq!(interpolate("v${project.version}!", lookup), "v1.2.3!");
    }

    #[test]
    fn test_nested_expression() {
        assert_eq!(interpolate("${nested}", lookup), "1.2.3-SNAPSHOT");
    }

    #[test]
    fn test_unknown_expression_is_kept() {
        assert_eq!(interpolate("${missing}", lookup), "${missing}");
        assert!(has_expression(&interpolate("${missing}", lookup)));
    }

    #[test]
    fn test_self_reference_terminates() {
        let looping = |key: &str| (key == "a").then(|| "${a}".to_string());
        assert_eq!(interpolate("${a}", looping), "${a}");
    }
}
