use heck::{ToKebabCase, ToLowerCamelCase, ToUpperCamelCase};

const JS_RESERVED: &[&str] = &[
    "await", "break", "case", "catch", "class", "const", "continue", "debugger",
    "default", "delete", "do", "else", "enum", "export", "extends", "false",
    "finally", "for", "function", "if", "import", "in", "instanceof", "let",
    "new", "null", "return", "static", "super", "switch", "this", "throw",
    "true", "try", "typeof", "var", "void", "while", "with", "yield",
];

pub fn module_type_name(source: &str) -> String {
    let mut words: Vec<String> = source
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(|word| word.to_upper_camel_case())
        .collect();
    // collapse standalone leading "go" words so the prefix is not doubled
    while words.len() > 1 && words[0].eq_ignore_ascii_case("go") {
        words.remove(0);
    }
    if words.is_empty() {
        return "GoModule".to_string();
    }
    let name = words.concat();
    if name.len() >= 2 && name[..2].eq_ignore_ascii_case("go") {
        format!("Go{}", &name[2..])
    } else {
        format!("Go{name}")
    }
}

pub fn file_stem(type_name: &str) -> String {
    type_name.to_kebab_case()
}

pub fn method_name(func: &str) -> String {
    func.to_lower_camel_case()
}

pub fn wrapper_name(func: &str) -> String {
    format!("gowasm{}", func.to_upper_camel_case())
}

// Only the first letter is lowered; heck would also flatten acronyms.
pub fn default_alias(field: &str) -> String {
    let mut chars = field.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn js_ident(name: &str) -> String {
    if JS_RESERVED.contains(&name) {
        format!("{name}_")
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_name_gains_a_go_prefix() {
        assert_eq!(module_type_name("hash"), "GoHash");
        assert_eq!(module_type_name("image_utils"), "GoImageUtils");
    }

    #[test]
    fn type_name_collapses_existing_go_prefixes() {
        assert_eq!(module_type_name("go-hash"), "GoHash");
        assert_eq!(module_type_name("go-go-hash"), "GoHash");
        assert_eq!(module_type_name("gohash"), "Gohash");
    }

    #[test]
    fn type_name_empty_input_default() {
        assert_eq!(module_type_name(""), "GoModule");
        assert_eq!(module_type_name("--"), "GoModule");
    }

    #[test]
    fn file_stem_is_kebab_case() {
        assert_eq!(file_stem("GoHash"), "go-hash");
        assert_eq!(file_stem("GoImageUtils"), "go-image-utils");
    }

    #[test]
    fn method_name_is_lower_camel() {
        assert_eq!(method_name("HashData"), "hashData");
        assert_eq!(method_name("Greet"), "greet");
    }

    #[test]
    fn default_alias_lowers_only_the_first_letter() {
        assert_eq!(default_alias("Name"), "name");
        assert_eq!(default_alias("URL"), "uRL");
        assert_eq!(default_alias(""), "");
    }

    #[test]
    fn reserved_js_words_get_a_suffix() {
        assert_eq!(js_ident("new"), "new_");
        assert_eq!(js_ident("name"), "name");
    }
}
