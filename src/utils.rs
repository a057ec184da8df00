pub(crate) fn upper_first(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upper_cases_only_the_first_character() {
        assert_eq!(upper_first("blogPost"), "BlogPost");
        assert_eq!(upper_first(""), "");
    }
}
