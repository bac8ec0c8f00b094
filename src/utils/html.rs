// src/utils/html.rs

use std::sync::LazyLock;

use regex::Regex;

/// `&lt;` that cannot open a tag once decoded (`<=`, `<=>`, `a < b`).
static INERT_LT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&lt;([^A-Za-z/!?]|$)").expect("lt pattern must compile"));

/// Strips unsafe markup from admin-authored question text.
///
/// Whitelist based (ammonia): formatting tags such as `<b>` or `<sub>` stay,
/// `<script>`, `<iframe>` and event-handler attributes are removed.
/// The entities ammonia writes for formula shorthand (`->`, `<=>`, `x >= 0`,
/// `A & B`) are decoded again so the formula normalizer still sees them.
/// A `<` followed by a letter, `/`, `!` or `?` stays escaped.
pub fn clean_html(input: &str) -> String {
    let cleaned = ammonia::clean(input);
    let decoded = INERT_LT.replace_all(&cleaned, "<${1}");
    // `&amp;` last, so typed entity text such as "&lt;" round-trips literally
    decoded.replace("&gt;", ">").replace("&amp;", "&")
}

/// Sanitizes an optional field, dropping it when nothing is left.
pub fn clean_optional(input: Option<&str>) -> Option<String> {
    input
        .map(clean_html)
        .filter(|cleaned| !cleaned.trim().is_empty())
}
