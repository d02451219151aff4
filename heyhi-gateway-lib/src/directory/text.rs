/// Plain-text form of a search query: tags removed, whitespace collapsed
pub fn sanitize_query(raw: &str) -> String {
    collapse_whitespace(&strip_tags(raw))
}

/// Keep the first `max_words` words of `text`, appending `…` when cut
///
/// Markup is stripped first so a tag never counts as a word.
pub fn trim_words(text: &str, max_words: usize) -> String {
    let plain = strip_tags(text);
    let words: Vec<&str> = plain.split_whitespace().collect();
    if words.len() <= max_words {
        return words.join(" ");
    }
    let mut out = words[..max_words].join(" ");
    out.push('…');
    out
}

fn strip_tags(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_tag = false;
    for c in text.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                out.push(' ');
            }
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_query() {
        assert_eq!(sanitize_query("  <b>rust</b>\n  async\t"), "rust async");
        assert_eq!(sanitize_query("<script>x</script>"), "x");
        assert_eq!(sanitize_query("   "), "");
    }

    #[test]
    fn test_trim_words() {
        assert_eq!(trim_words("one two three", 5), "one two three");
        assert_eq!(trim_words("one two three four", 2), "one two…");
        assert_eq!(trim_words("<p>one</p><p>two</p>", 5), "one two");
    }
}
