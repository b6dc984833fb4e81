//! Extraction of renderable scene source from free-form generator text.

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

const SCENE_IMPORT: &str = "from manim import *";
const IMPORT_PREAMBLE: &str = "from manim import *\nimport numpy as np\n\n";

static PYTHON_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```python[^\n]*\n(.*?)```").expect("python fence regex is valid")
});

static BARE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```[^\n]*\n(.*?)```").expect("bare fence regex is valid")
});

/// Elements a scene module must contain.
const SCENE_MARKERS: [&str; 3] = ["class", "Scene", "def construct"];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("Generated code missing required element: {missing}")]
    NotASceneSource { missing: &'static str },
}

/// Pull scene source out of generator text.
///
/// Takes the first `python` fence, else the first bare fence, else the whole
/// text; drops prose before the first import; ensures the scene import.
///
/// # Errors
///
/// Returns [`ExtractionError::NotASceneSource`] when the result lacks a scene
/// class with a `construct` method.
///
/// # Example
///
/// ```rust
/// use reelsmith_extraction::extract_source;
///
/// let text = "Here you go:\n```python\nclass Intro(Scene):\n    def construct(self):\n        pass\n```";
/// let source = extract_source(text).unwrap();
/// assert!(source.starts_with("from manim import *"));
/// ```
pub fn extract_source(text: &str) -> Result<String, ExtractionError> {
    let body = PYTHON_FENCE
        .captures(text)
        .or_else(|| BARE_FENCE.captures(text))
        .and_then(|caps| caps.get(1))
        .map_or(text, |m| m.as_str());

    let mut code = drop_leading_prose(body.trim());
    if !code.contains(SCENE_IMPORT) {
        code = format!("{IMPORT_PREAMBLE}{code}");
    }

    check_scene(&code)?;
    Ok(code.trim().to_string())
}

/// Whether `code` has a scene class with a `construct` method.
#[must_use]
pub fn looks_like_scene(code: &str) -> bool {
    check_scene(code).is_ok()
}

fn check_scene(code: &str) -> Result<(), ExtractionError> {
    match SCENE_MARKERS.iter().find(|marker| !code.contains(**marker)) {
        Some(missing) => Err(ExtractionError::NotASceneSource { missing }),
        None => Ok(()),
    }
}

/// Drop non-comment lines that precede the first import.
///
/// Text without any import line is returned unchanged.
fn drop_leading_prose(code: &str) -> String {
    let is_import = |line: &str| {
        let line = line.trim_start();
        line.starts_with("from ") || line.starts_with("import ")
    };

    let Some(first_import) = code.lines().position(is_import) else {
        return code.to_string();
    };

    code.lines()
        .enumerate()
        .filter(|(index, line)| {
            let trimmed = line.trim();
            *index >= first_import || trimmed.is_empty() || trimmed.starts_with('#')
        })
        .map(|(_, line)| line)
        .collect::<Vec<_>>()
        .join("\n")
}
