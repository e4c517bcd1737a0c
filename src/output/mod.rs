// Output formatting: terminal display, charts and report generation.

pub mod export;
pub mod markdown;
pub mod radar;
pub mod terminal;

/// Shorten an item prompt for a report cell.
///
/// Keeps the first `max_chars` characters and marks the cut with "...".
/// The cut is taken at a char boundary, so accented prompts are safe.
pub fn shorten_prompt(prompt: &str, max_chars: usize) -> String {
    match prompt.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &prompt[..cut]),
        None => prompt.to_string(),
    }
}
