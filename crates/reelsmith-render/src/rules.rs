//! Failure classification and source repair
//!
//! A failed render is matched against [`REPAIR_ORDER`] top to bottom and the
//! first rule whose predicate holds patches the script. When nothing matches
//! the attempt is still consumed with [`RepairRule::NoOp`].

use regex::{Captures, Regex};
use serde::Serialize;
use std::sync::LazyLock;

/// One known failure class and the patch that answers it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display, strum::IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RepairRule {
    /// Append closers for `(`, `[` and `{` left open.
    CloseDelimiters,
    /// Replace indexing into `self.mobjects` with a stored group or a guarded access.
    GuardMobjectAccess,
    /// Rename every deprecated animation name in the table.
    RenameDeprecated,
    /// Make color interpolation explicit, or collapse it to a constant.
    ExplicitColor,
    NoOp,
}

/// Rules in the order they are tried, most specific first.
pub const REPAIR_ORDER: [RepairRule; 4] = [
    RepairRule::CloseDelimiters,
    RepairRule::GuardMobjectAccess,
    RepairRule::RenameDeprecated,
    RepairRule::ExplicitColor,
];

/// Deprecated animation names and their current replacements.
pub const DEPRECATED_NAMES: &[(&str, &str)] = &[
    ("ShowCreation", "Create"),
    ("ShowIncreasingSubsets", "Create"),
    ("ShowSubmobjectsOneByOne", "Create"),
    ("ShowCreationThenDestruction", "ShowPassingFlash"),
    ("WiggleOutThenIn", "Wiggle"),
    ("CircleIndicate", "Indicate"),
    ("PointwiseBecome", "Transform"),
    ("TurnInsideOut", "ApplyComplexFunction"),
];

const DELIMITERS: [(char, char); 3] = [('(', ')'), ('[', ']'), ('{', '}')];

/// Replacement for an accessor when no stored group precedes it.
///
/// It must not match [`MOBJECT_ACCESS`] itself, or the rule would fire forever.
const GUARDED_ACCESS: &str = "(self.mobjects or [Dot()])[0]";

const STAR_IMPORT: &str = "from manim import *";
const MANIM_COLOR_IMPORT: &str = "from manim.utils.color import ManimColor";

static MOBJECT_ACCESS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"self\.mobjects\[-?\d+\](?:\[[^\]\n]*\])*")
        .expect("static mobject accessor regex is valid")
});

static STORED_GROUP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*([A-Za-z_][A-Za-z0-9_]*)[ \t]*=[ \t]*VGroup\(")
        .expect("static stored group regex is valid")
});

static DEPRECATED: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    DEPRECATED_NAMES
        .iter()
        .map(|(old, new)| {
            let pattern = format!(r"\b{}\b", regex::escape(old));
            (
                Regex::new(&pattern).expect("escaped identifier regex is valid"),
                *new,
            )
        })
        .collect()
});

static COLOR_ASSIGNMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bcolor[ \t]*=[ \t]*interpolate_color\(")
        .expect("static color assignment regex is valid")
});

static INTERPOLATE_CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\binterpolate_color\(").expect("static interpolate call regex is valid")
});

static PRIMARY_DEFINED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bPRIMARY[ \t]*=").expect("static PRIMARY regex is valid")
});

impl RepairRule {
    /// Whether this rule recognises `reason` and has something to patch in `source`.
    #[must_use]
    pub fn matches(self, reason: &str, source: &str) -> bool {
        match self {
            Self::CloseDelimiters => {
                mentions_syntax_error(reason)
                    && DELIMITERS
                        .iter()
                        .any(|&(open, close)| deficit(source, open, close) > 0)
            }
            Self::GuardMobjectAccess => {
                (reason.contains("IndexError") || reason.contains("AttributeError"))
                    && MOBJECT_ACCESS.is_match(source)
            }
            Self::RenameDeprecated => DEPRECATED.iter().any(|(re, _)| re.is_match(source)),
            Self::ExplicitColor => {
                mentions_color_failure(reason) && INTERPOLATE_CALL.is_match(source)
            }
            Self::NoOp => true,
        }
    }

    /// The patched source. Applying a rule that does not match returns the
    /// source unchanged.
    #[must_use]
    pub fn apply(self, source: &str) -> String {
        match self {
            Self::CloseDelimiters => close_delimiters(source),
            Self::GuardMobjectAccess => guard_mobject_access(source),
            Self::RenameDeprecated => rename_deprecated(source),
            Self::ExplicitColor => explicit_color(source),
            Self::NoOp => source.to_string(),
        }
    }
}

/// First rule in [`REPAIR_ORDER`] that matches, or [`RepairRule::NoOp`].
#[must_use]
pub fn classify(reason: &str, source: &str) -> RepairRule {
    REPAIR_ORDER
        .into_iter()
        .find(|rule| rule.matches(reason, source))
        .unwrap_or(RepairRule::NoOp)
}

/// Classify `reason` and apply the chosen rule.
#[must_use]
pub fn repair(reason: &str, source: &str) -> (RepairRule, String) {
    let rule = classify(reason, source);
    (rule, rule.apply(source))
}

/// Number of `open` characters without a matching `close`, by raw count.
#[must_use]
pub fn deficit(source: &str, open: char, close: char) -> usize {
    source
        .matches(open)
        .count()
        .saturating_sub(source.matches(close).count())
}

fn mentions_syntax_error(reason: &str) -> bool {
    reason.contains("SyntaxError")
        || reason.contains("was never closed")
        || reason.contains("unexpected EOF")
}

fn mentions_color_failure(reason: &str) -> bool {
    reason.contains("interpolate_color")
        || reason.contains("has no attribute 'interpolate'")
        || reason.contains("ManimColor")
}

fn close_delimiters(source: &str) -> String {
    let mut remaining = DELIMITERS.map(|(open, close)| deficit(source, open, close));
    if remaining.iter().all(|&n| n == 0) {
        return source.to_string();
    }

    // Unmatched openers, innermost last, so closers nest where they can.
    let mut open_stack = Vec::new();
    for ch in source.chars() {
        if let Some(kind) = DELIMITERS.iter().position(|&(open, _)| open == ch) {
            open_stack.push(kind);
        } else if let Some(kind) = DELIMITERS.iter().position(|&(_, close)| close == ch)
            && open_stack.last() == Some(&kind)
        {
            open_stack.pop();
        }
    }

    let mut suffix = String::new();
    for &kind in open_stack.iter().rev() {
        if remaining[kind] > 0 {
            suffix.push(DELIMITERS[kind].1);
            remaining[kind] -= 1;
        }
    }
    for (kind, &(_, close)) in DELIMITERS.iter().enumerate() {
        suffix.extend(std::iter::repeat_n(close, remaining[kind]));
    }

    // A trailing comment would swallow closers appended to its line.
    let mut patched = source.to_string();
    if !patched.is_empty() && !patched.ends_with('\n') {
        patched.push('\n');
    }
    patched.push_str(&suffix);
    patched.push('\n');
    patched
}

fn guard_mobject_access(source: &str) -> String {
    let groups: Vec<(usize, &str)> = STORED_GROUP
        .captures_iter(source)
        .filter_map(|caps| caps.get(1).map(|name| (name.start(), name.as_str())))
        .collect();

    MOBJECT_ACCESS
        .replace_all(source, |caps: &Captures| {
            let at = caps.get(0).map_or(0, |m| m.start());
            groups
                .iter()
                .rev()
                .find(|(start, _)| *start < at)
                .map_or_else(|| GUARDED_ACCESS.to_string(), |(_, name)| (*name).to_string())
        })
        .into_owned()
}

fn rename_deprecated(source: &str) -> String {
    DEPRECATED
        .iter()
        .fold(source.to_string(), |text, (re, new)| {
            re.replace_all(&text, *new).into_owned()
        })
}

fn explicit_color(source: &str) -> String {
    let constant = if PRIMARY_DEFINED.is_match(source) {
        "self.PRIMARY"
    } else {
        "WHITE"
    };
    let collapsed = collapse_color_assignments(source, constant);
    let wrapped = wrap_interpolated_colors(&collapsed);
    ensure_manim_color_import(&wrapped)
}

/// `color = interpolate_color(...)` becomes `color = <constant>`.
fn collapse_color_assignments(source: &str, constant: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut cursor = 0;
    for found in COLOR_ASSIGNMENT.find_iter(source) {
        if found.start() < cursor {
            continue;
        }
        let Some(end) = call_end(source, found.end() - 1) else {
            continue;
        };
        out.push_str(&source[cursor..found.start()]);
        out.push_str("color = ");
        out.push_str(constant);
        cursor = end;
    }
    out.push_str(&source[cursor..]);
    out
}

/// Wrap the two color arguments of remaining `interpolate_color` calls in `ManimColor`.
fn wrap_interpolated_colors(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut cursor = 0;
    for found in INTERPOLATE_CALL.find_iter(source) {
        if found.start() < cursor {
            continue;
        }
        let open = found.end() - 1;
        let Some(end) = call_end(source, open) else {
            continue;
        };
        let args = split_args(&source[open + 1..end - 1]);
        if args.len() < 3 {
            continue;
        }

        let rewritten: Vec<String> = args
            .iter()
            .enumerate()
            .map(|(index, arg)| {
                let arg = arg.trim();
                if index < 2 && !arg.starts_with("ManimColor(") {
                    format!("ManimColor({arg})")
                } else {
                    arg.to_string()
                }
            })
            .collect();

        out.push_str(&source[cursor..found.start()]);
        out.push_str("interpolate_color(");
        out.push_str(&rewritten.join(", "));
        out.push(')');
        cursor = end;
    }
    out.push_str(&source[cursor..]);
    out
}

fn ensure_manim_color_import(source: &str) -> String {
    if !source.contains("ManimColor") || source.contains(MANIM_COLOR_IMPORT) {
        return source.to_string();
    }
    match source.find(STAR_IMPORT) {
        Some(at) => {
            let split = at + STAR_IMPORT.len();
            format!(
                "{}\n{MANIM_COLOR_IMPORT}{}",
                &source[..split],
                &source[split..]
            )
        }
        None => format!("{MANIM_COLOR_IMPORT}\n{source}"),
    }
}

/// Byte index just past the `)` matching the `(` at `open`.
fn call_end(source: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (offset, ch) in source[open..].char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + offset + 1);
                }
            }
            _ => {}
        }
    }
    None
}

/// Split call arguments at top-level commas.
fn split_args(inner: &str) -> Vec<&str> {
    let mut args = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (index, ch) in inner.char_indices() {
        match ch {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                args.push(&inner[start..index]);
                start = index + 1;
            }
            _ => {}
        }
    }
    if !inner[start..].trim().is_empty() {
        args.push(&inner[start..]);
    }
    args
}
