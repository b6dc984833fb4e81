//! Text repairs over a string-literal-aware scanner.
//!
//! Every repair walks the input once with a three-state automaton so that
//! braces, commas and control characters inside string literals are never
//! mistaken for structure.

/// Scanner position relative to string literals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lex {
    Outside,
    InString,
    /// Inside a string, right after a backslash.
    Escape,
}

impl Lex {
    /// Advance over `c`.
    const fn step(self, c: char) -> Self {
        match (self, c) {
            (Self::Outside, '"') => Self::InString,
            (Self::Outside, _) => Self::Outside,
            (Self::InString, '\\') => Self::Escape,
            (Self::InString, '"') => Self::Outside,
            (Self::InString, _) | (Self::Escape, _) => Self::InString,
        }
    }
}

/// Remove an enclosing code fence (labelled or bare) from the outer boundary.
///
/// Text without an opening fence is returned trimmed but otherwise unchanged.
#[must_use]
pub fn strip_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(after_ticks) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Drop the info string (`json`, `JSON`, ...) up to the first newline
    let body = match after_ticks.find('\n') {
        Some(newline) => &after_ticks[newline + 1..],
        None => after_ticks,
    };
    let body = body.trim_end();
    body.strip_suffix("```").unwrap_or(body).trim()
}

/// Structural repair: drop trailing commas, escape raw control characters
/// inside strings, and close a string and any aggregates left open at end of input.
#[must_use]
pub fn structural_repair(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len() + 8);
    let mut open: Vec<char> = Vec::new();
    let mut state = Lex::Outside;

    for (i, &c) in chars.iter().enumerate() {
        match state {
            Lex::Outside => match c {
                ',' if next_significant(&chars, i + 1).is_some_and(|n| n == '}' || n == ']') => {
                    state = state.step(c);
                    continue;
                }
                '{' => open.push('}'),
                '[' => open.push(']'),
                '}' | ']' => {
                    if open.last() == Some(&c) {
                        open.pop();
                    }
                }
                _ => {}
            },
            Lex::InString => match c {
                '\n' => {
                    out.push_str("\\n");
                    continue;
                }
                '\r' => {
                    out.push_str("\\r");
                    continue;
                }
                '\t' => {
                    out.push_str("\\t");
                    continue;
                }
                _ => {}
            },
            Lex::Escape => {}
        }
        out.push(c);
        state = state.step(c);
    }

    match state {
        Lex::Outside => {}
        Lex::InString => out.push('"'),
        Lex::Escape => {
            // A dangling backslash would escape the closing quote
            out.pop();
            out.push('"');
        }
    }

    // A comma may now sit right before the closers we are about to add
    if state == Lex::Outside && !open.is_empty() {
        let keep = out.trim_end().trim_end_matches(',').len();
        out.truncate(keep);
    }

    while let Some(closer) = open.pop() {
        out.push(closer);
    }

    out
}

/// Quote bare identifier keys that follow `{` or `,` and precede `:`.
#[must_use]
pub fn quote_bare_keys(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len() + 16);
    let mut state = Lex::Outside;
    let mut expect_key = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if state == Lex::Outside {
            if expect_key && is_ident_start(c) {
                let start = i;
                let mut end = i;
                while end < chars.len() && is_ident_continue(chars[end]) {
                    end += 1;
                }
                if next_significant(&chars, end) == Some(':') {
                    out.push('"');
                    out.extend(&chars[start..end]);
                    out.push('"');
                    i = end;
                    expect_key = false;
                    continue;
                }
            }

            match c {
                '{' | ',' => expect_key = true,
                c if c.is_whitespace() => {}
                _ => expect_key = false,
            }
        }

        out.push(c);
        state = state.step(c);
        i += 1;
    }

    out
}

/// First `{...}` span whose braces balance outside string literals.
#[must_use]
pub fn first_balanced_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut state = Lex::Outside;

    for (offset, c) in text[start..].char_indices() {
        if state == Lex::Outside {
            match c {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(&text[start..start + offset + c.len_utf8()]);
                    }
                }
                _ => {}
            }
        }
        state = state.step(c);
    }

    None
}

fn next_significant(chars: &[char], from: usize) -> Option<char> {
    chars.iter().skip(from).copied().find(|c| !c.is_whitespace())
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
