use regex::{NoExpand, RegexBuilder};

pub fn without_spaces(value: &str) -> String {
    value.chars().filter(|c| !c.is_whitespace()).collect()
}

// Case-insensitive, first occurrence only. The needle is matched literally.
pub fn replace_first_match(value: &str, needle: &str, replace_with: &str) -> String {
    if needle.is_empty() {
        return value.to_string();
    }

    match RegexBuilder::new(&regex::escape(needle))
        .case_insensitive(true)
        .build()
    {
        Ok(pattern) => pattern.replace(value, NoExpand(replace_with)).into_owned(),
        Err(_) => value.to_string(),
    }
}

pub fn java_package_to_dir_path(package: &str) -> String {
    package.replace('.', "/")
}
