//! Name conversions between wire names, operation names and command names.

/// Converts a string to kebab-case
///
/// Used for leaf command names (`"CreateServiceId"` -> "create-service-id")
/// and flag names (`"account_id"` -> "account-id").
///
/// - Apostrophes are removed entirely: "Organization's" -> "organizations"
/// - Consecutive non-alphanumeric characters are collapsed: "a---b" -> "a-b"
/// - Acronyms followed by a word are split: `"IAMPolicy"` -> "iam-policy"
#[must_use]
pub fn to_kebab_case(s: &str) -> String {
    let mut result = String::new();
    let mut chars = s.chars().peekable();
    let mut last_was_sep = true;
    let mut last_was_lower = false;

    while let Some(ch) = chars.next() {
        match ch {
            '\'' => {} // Skip apostrophes
            c if c.is_alphanumeric() => {
                let is_upper = c.is_uppercase();

                // Insert hyphen at word boundaries
                if !last_was_sep && is_upper && last_was_lower {
                    result.push('-');
                } else if !last_was_sep
                    && is_upper
                    && chars.peek().is_some_and(|&next| next.is_lowercase())
                    && !result.is_empty()
                {
                    // Handle acronym followed by word (e.g., "HTTPSConnection" -> "https-connection")
                    result.push('-');
                }

                // Use proper Unicode lowercase conversion
                for lower_ch in c.to_lowercase() {
                    result.push(lower_ch);
                }

                last_was_sep = false;
                last_was_lower = c.is_lowercase() || c.is_numeric();
            }
            _ => {
                // Convert other chars to hyphen, but avoid consecutive hyphens
                if !last_was_sep && !result.is_empty() {
                    result.push('-');
                    last_was_sep = true;
                    last_was_lower = false;
                }
            }
        }
    }

    result.trim_end_matches('-').to_string()
}

/// Converts an action name to the `PascalCase` name of its sub-service accessor.
///
/// `"access-groups"` -> `"AccessGroups"`, `"service_ids"` -> `"ServiceIds"`.
/// Already `PascalCase` input is returned unchanged.
#[must_use]
pub fn to_pascal_case(s: &str) -> String {
    s.split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(capitalize_first)
        .collect()
}

/// Converts a kebab-case command name to a title: `"add-widget"` -> `"Add Widget"`.
#[must_use]
pub fn to_title_case(s: &str) -> String {
    s.split(['-', '_', ' '])
        .filter(|part| !part.is_empty())
        .map(capitalize_first)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Capitalizes the first letter of a string
#[must_use]
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// Normalizes a key for loose matching: lower-cased with `-` and `_` removed.
#[must_use]
pub fn normalize_key(s: &str) -> String {
    s.chars()
        .filter(|c| *c != '-' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}
