use std::collections::{HashMap, HashSet};
use regex::{Captures, Regex};
use lazy_static::lazy_static;


lazy_static! {
    /// Matches `{{name}}`. Names cannot span lines.
    pub(crate) static ref PLACEHOLDER_MATCH_RE: Regex = Regex::new(r"\{\{([^\r\n]*?)\}\}").unwrap();
}

/// Replaces every placeholder that has a filling value. Placeholders without a value are left as they are.
///
/// Values are inserted verbatim, so a value that itself looks like `{{x}}` is not expanded again.
pub(crate) fn replace_all_placeholders(original: &str, mapping: &HashMap<String, Option<String>>) -> String {
    let new_string = PLACEHOLDER_MATCH_RE.replace_all(original, |captures: &Captures| {
        let key = &captures[1];
        match mapping.get(key).and_then(Option::as_ref) {
            Some(value) => value.clone(),
            None => captures[0].to_string(),
        }
    });
    new_string.into_owned()
}

pub(crate) fn get_placeholders(string: &str) -> HashSet<String> {
    PLACEHOLDER_MATCH_RE.captures_iter(string)
        .map(|captures| captures[1].to_string())
        .collect()
}

/// The literal text in front of the first placeholder, or `None` if the template has no placeholder.
pub(crate) fn text_before_first_placeholder(template: &str) -> Option<&str> {
    PLACEHOLDER_MATCH_RE.find(template).map(|m| &template[..m.start()])
}
