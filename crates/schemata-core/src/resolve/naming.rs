//! Naming rules shared by the assembler and the resolver.

/// Key a schema is registered under: `name`, or `namespace_name`.
pub fn schema_key(namespace: Option<&str>, name: &str) -> String {
    match namespace {
        Some(ns) => format!("{}_{}", ns, name),
        None => name.to_string(),
    }
}

/// Upper-case the first character.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Lower-case the first character: `TodoUser` becomes `todoUser`.
pub fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn is_vowel(c: char) -> bool {
    matches!(c.to_ascii_lowercase(), 'a' | 'e' | 'i' | 'o' | 'u')
}

/// English plural of a word, regular forms only.
pub fn pluralize(word: &str) -> String {
    if word.ends_with('s')
        || word.ends_with('x')
        || word.ends_with('z')
        || word.ends_with("ch")
        || word.ends_with("sh")
    {
        return format!("{}es", word);
    }

    let mut rev = word.chars().rev();
    if let (Some('y'), Some(before)) = (rev.next(), rev.next()) {
        if !is_vowel(before) {
            return format!("{}ies", &word[..word.len() - 1]);
        }
    }

    format!("{}s", word)
}

/// English singular of a word, regular forms only.
///
/// Irregular nouns need an explicit relationship target.
pub fn singularize(word: &str) -> String {
    if let Some(stem) = word.strip_suffix("ies") {
        return format!("{}y", stem);
    }
    for suffix in ["sses", "xes", "zes", "ches", "shes"] {
        if word.ends_with(suffix) {
            return word[..word.len() - 2].to_string();
        }
    }
    if word.ends_with('s') && !word.ends_with("ss") {
        return word[..word.len() - 1].to_string();
    }
    word.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_key() {
        assert_eq!(schema_key(None, "Todo"), "Todo");
        assert_eq!(schema_key(Some("app"), "Todo"), "app_Todo");
    }

    #[test]
    fn test_casing() {
        assert_eq!(capitalize("user"), "User");
        assert_eq!(capitalize(""), "");
        assert_eq!(lower_first("TodoUser"), "todoUser");
    }

    #[test]
    fn test_pluralize() {
        assert_eq!(pluralize("Todo"), "Todos");
        assert_eq!(pluralize("TodoUser"), "TodoUsers");
        assert_eq!(pluralize("Category"), "Categories");
        assert_eq!(pluralize("Day"), "Days");
        assert_eq!(pluralize("Box"), "Boxes");
        assert_eq!(pluralize("Address"), "Addresses");
        assert_eq!(pluralize("Match"), "Matches");
    }

    #[test]
    fn test_singularize() {
        assert_eq!(singularize("todos"), "todo");
        assert_eq!(singularize("categories"), "category");
        assert_eq!(singularize("addresses"), "address");
        assert_eq!(singularize("boxes"), "box");
        assert_eq!(singularize("matches"), "match");
        assert_eq!(singularize("class"), "class");
    }

    #[test]
    fn test_round_trip_regular_words() {
        for word in ["todo", "user", "category", "box", "wish", "tag"] {
            assert_eq!(singularize(&pluralize(word)), word);
        }
    }
}
