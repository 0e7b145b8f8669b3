//! SQL utility functions

/// Quote an SQL identifier (table or column name).
///
/// Wraps the name in double quotes and doubles any embedded quote, so a
/// catalog column can never break out of its identifier position.
///
/// # Example
///
/// ```
/// use poremap_server::utils::sql::quote_identifier;
///
/// assert_eq!(quote_identifier("pore_diameter"), "\"pore_diameter\"");
/// assert_eq!(quote_identifier("we\"ird"), "\"we\"\"ird\"");
/// ```
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Build a comma separated list of `?` placeholders
pub fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}
