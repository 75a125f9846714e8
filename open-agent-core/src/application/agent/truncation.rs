/// Cap a tool result at `max_chars` characters.
///
/// Longer results keep their first `max_chars` characters followed by a marker with the
/// original length, so the model knows content was dropped.
pub fn truncate_result(text: String, max_chars: usize) -> String {
    let Some((cut, _)) = text.char_indices().nth(max_chars) else {
        return text;
    };
    let total = text.chars().count();
    let mut truncated = text;
    truncated.truncate(cut);
    truncated.push_str(&format!(
        "\n\n[Result truncated: original length was {total} characters]"
    ));
    truncated
}
