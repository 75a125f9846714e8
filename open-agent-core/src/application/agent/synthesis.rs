use crate::domain::types::CollectedToolResult;

/// Best-effort answer built from the tool results gathered so far in a turn.
pub fn synthesize_response(user_message: &str, results: &[CollectedToolResult]) -> String {
    if results.is_empty() {
        return format!(
            "Sorry, I could not complete your request \"{user_message}\". \
Please try again or rephrase it."
        );
    }

    let mut response = format!(
        "I could not finish composing an answer to \"{user_message}\", \
but here is what the tools returned:"
    );
    for result in results {
        response.push_str(&format!("\n\n### {}\n{}", result.tool, result.result));
    }
    response
}
