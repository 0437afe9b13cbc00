//! Identifier helpers.

/// Upper-case the first character.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Convert a `-`, `_`, `.` or space separated name to lower camel case.
///
/// `jar-tests-maven-artifact` becomes `jarTestsMavenArtifact`.
pub fn to_lower_camel_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for (i, word) in s
        .split(|c: char| c == '-' || c == '_' || c == '.' || c.is_whitespace())
        .filter(|w| !w.is_empty())
        .enumerate()
    {
        if i == 0 {
            let mut chars = word.chars();
            if let Some(first) = chars.next() {
                out.extend(first.to_lowercase());
                out.push_str(chars.as_str());
            }
        } else {
            out.push_str(&capitalize(word));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lower_camel_case() {
        assert_eq!(to_lower_camel_case("jar-maven-artifact"), "jarMavenArtifact");
        assert_eq!(
            to_lower_camel_case("test-jar-tests-maven-artifact"),
            "testJarTestsMavenArtifact"
        );
        assert_eq!(to_lower_camel_case("Pom_dump"), "pomDump");
        assert_eq!(to_lower_camel_case(""), "");
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("test"), "Test");
        assert_eq!(capitalize(""), "");
    }
}
