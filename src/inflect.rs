/// Suffix-rewrite singularization rules, tried in order; the first matching
/// suffix wins. This is deliberately naive: relation accessors in the scanned
/// applications use regular English plurals almost exclusively, and the
/// result is only ever used as a candidate that must still resolve in the
/// symbol table. Known misfires ("lives" -> "lif", "buses" -> "bus" but
/// "statuses" -> "status" too) are accepted behavior, pinned by tests; a bad
/// guess simply fails to resolve.
const SINGULAR_RULES: &[(&str, &str)] = &[
    ("ies", "y"),
    ("ves", "f"),
    ("ses", "s"),
    ("s", ""),
];

/// Singularize a plural English word. Words matching no rule are returned
/// unchanged.
pub fn singularize(word: &str) -> String {
    for (suffix, replacement) in SINGULAR_RULES {
        if let Some(stem) = word.strip_suffix(suffix) {
            return format!("{stem}{replacement}");
        }
    }
    word.to_string()
}

/// Guess the entity type name behind a relation accessor: singularize the
/// accessor name and capitalize the first letter ("categories" -> "Category",
/// "user" -> "User").
pub fn guess_entity_name(accessor: &str) -> String {
    let singular = singularize(accessor);
    let mut chars = singular.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => singular,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_singularize_regular_plurals() {
        assert_eq!(singularize("notes"), "note");
        assert_eq!(singularize("categories"), "category");
        assert_eq!(singularize("shelves"), "shelf");
        assert_eq!(singularize("classes"), "class");
    }

    #[test]
    fn test_singularize_leaves_singulars_alone() {
        assert_eq!(singularize("user"), "user");
        assert_eq!(singularize("category"), "category");
    }

    #[test]
    fn test_singularize_known_misfires_are_pinned() {
        // Accepted false positives of the suffix rules; a resulting bad
        // entity guess fails symbol-table resolution downstream.
        assert_eq!(singularize("lives"), "lif");
        assert_eq!(singularize("data"), "data", "no trailing s, no rule fires");
    }

    #[test]
    fn test_guess_entity_name() {
        assert_eq!(guess_entity_name("notes"), "Note");
        assert_eq!(guess_entity_name("categories"), "Category");
        assert_eq!(guess_entity_name("user"), "User");
    }

    #[test]
    fn test_guess_entity_name_empty_input() {
        assert_eq!(guess_entity_name(""), "");
    }
}
