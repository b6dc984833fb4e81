/// Rough characters-per-token ratio used for prompt sizing.
const CHARS_PER_TOKEN: usize = 4;

/// Room that must remain before a truncated paragraph is worth appending.
const MIN_TAIL_TOKENS: usize = 100;

/// Estimated token count of `text`.
#[must_use]
pub const fn estimate_tokens(text: &str) -> usize {
    text.len() / CHARS_PER_TOKEN
}

/// Shrink a prompt to fit `max_tokens`.
///
/// A prompt that already fits is returned unchanged. Otherwise whole
/// paragraphs are kept while they fit in 90% of the ceiling, then one
/// truncated paragraph ending in `...` is added if enough room is left.
#[must_use]
pub fn fit_prompt(prompt: &str, max_tokens: u32) -> String {
    let max_tokens = max_tokens as usize;
    if estimate_tokens(prompt) <= max_tokens {
        return prompt.to_string();
    }

    let soft_limit = max_tokens * 9 / 10;
    let mut kept: Vec<String> = Vec::new();
    let mut used = 0usize;

    for paragraph in prompt.split("\n\n") {
        let cost = estimate_tokens(paragraph);
        if used + cost <= soft_limit {
            kept.push(paragraph.to_string());
            used += cost;
            continue;
        }

        let remaining = max_tokens.saturating_sub(used).saturating_sub(50);
        if remaining > MIN_TAIL_TOKENS {
            let head = truncate_chars(paragraph, remaining * CHARS_PER_TOKEN);
            kept.push(format!("{head}..."));
        }
        break;
    }

    kept.join("\n\n")
}

fn truncate_chars(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
