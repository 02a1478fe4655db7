use html2text::render::text_renderer::TrivialDecorator;
use once_cell::sync::Lazy;
use regex::Regex;

static SCRIPT_OR_STYLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<script\b.*?</script\s*>|<style\b.*?</style\s*>")
        .expect("script pattern is valid")
});

static URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"https?://[^\s)\]]+").expect("url pattern is valid"));

static SPACES: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+").expect("space pattern is valid"));

static EXTRA_BLANK_LINES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{3,}").expect("blank line pattern is valid"));

/// Convert article HTML to speakable text, keeping paragraph breaks.
///
/// Script and style content and bare URLs are dropped.
pub fn html_to_text(html: &str) -> String {
    let without_scripts = SCRIPT_OR_STYLE.replace_all(html, "");
    let plain = html2text::from_read_with_decorator(
        without_scripts.as_bytes(),
        usize::MAX,
        TrivialDecorator::new(),
    );

    let without_urls = URL.replace_all(&plain, "");
    let lines: Vec<String> = without_urls
        .lines()
        .map(|line| SPACES.replace_all(line, " ").trim().to_string())
        .collect();

    EXTRA_BLANK_LINES
        .replace_all(&lines.join("\n"), "\n\n")
        .trim()
        .to_string()
}
