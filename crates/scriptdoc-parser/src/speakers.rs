//! Speaker extraction.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

/// Matches both `[name="X"]` and the bracketless `name="X"]`.
static SPEAKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"name\s*=\s*"([^"]+)"\]"#).unwrap());

/// Distinct speaker names in order of first appearance.
///
/// # Example
///
/// ```
/// use scriptdoc_parser::extract_speakers;
///
/// let text = "[name=\"Amiya\"]Doctor?\nname=\"Kal'tsit\"]Wait.\n[name=\"Amiya\"]Okay.";
/// assert_eq!(extract_speakers(text), vec!["Amiya", "Kal'tsit"]);
/// ```
#[must_use]
pub fn extract_speakers(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    SPEAKER_RE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|name| !name.is_empty() && seen.insert(*name))
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_first_appearance_order() {
        let text = "name=\"W\"]hm\n[name=\"Amiya\"]a\n[name=\"W\"]b\n[name = \" Ines \"]c";
        assert_eq!(extract_speakers(text), vec!["W", "Amiya", "Ines"]);
    }

    #[test]
    fn test_blank_names_ignored() {
        assert!(extract_speakers("[name=\"  \"]x\nplain text").is_empty());
    }
}
