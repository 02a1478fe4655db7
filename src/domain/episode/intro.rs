/// Spoken preamble naming the source post and the tools involved.
pub fn build_intro(blog_url: Option<&str>, was_edited: bool, tools: &[String]) -> String {
    let mut parts = Vec::new();

    if let Some(url) = blog_url.map(str::trim).filter(|url| !url.is_empty()) {
        parts.push(format!(
            "This episode is based on a blog post available at {url}."
        ));
    }

    if was_edited {
        parts.push("The text has been lightly edited for language.".to_string());
    }

    if !tools.is_empty() {
        parts.push(format!(
            "This audio was generated using {}.",
            join_naturally(tools)
        ));
    }

    parts.join(" ")
}

/// "a", "a and b", "a, b and c"
pub(crate) fn join_naturally(items: &[String]) -> String {
    match items {
        [] => String::new(),
        [only] => only.clone(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}
