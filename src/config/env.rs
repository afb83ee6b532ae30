//! Environment placeholder expansion for configuration strings.
use regex::{Captures, Regex};
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}|\$([A-Za-z_][A-Za-z0-9_]*)").unwrap()
});

/// Replace `${NAME}` and `$NAME` with values from `lookup`.
///
/// Unknown names are left untouched, placeholder and all.
pub fn expand<F>(input: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    PLACEHOLDER
        .replace_all(input, |caps: &Captures| {
            let name = caps
                .get(1)
                .or_else(|| caps.get(2))
                .map(|m| m.as_str())
                .unwrap_or_default();

            lookup(name).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars() -> HashMap<&'static str, &'static str> {
        HashMap::from([("TAG", "v1.0.0"), ("BUILD_NUMBER", "42")])
    }

    fn lookup(name: &str) -> Option<String> {
        vars().get(name).map(|v| v.to_string())
    }

    #[test]
    fn expands_braced_and_bare_placeholders() {
        assert_eq!(expand("${TAG}", lookup), "v1.0.0");
        assert_eq!(expand("build-$BUILD_NUMBER", lookup), "build-42");
        assert_eq!(expand("$TAG..${BUILD_NUMBER}", lookup), "v1.0.0..42");
    }

    #[test]
    fn leaves_unknown_placeholders_untouched() {
        assert_eq!(expand("${MISSING}/$ALSO_MISSING", lookup), "${MISSING}/$ALSO_MISSING");
    }

    #[test]
    fn leaves_plain_text_alone() {
        assert_eq!(expand("ABC, XYZ", lookup), "ABC, XYZ");
        assert_eq!(expand("costs $5", lookup), "costs $5");
        assert_eq!(expand("", lookup), "");
    }
}
