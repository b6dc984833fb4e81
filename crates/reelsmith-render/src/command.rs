use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;

/// Argv-style description of a renderer invocation.
///
/// Arguments are kept as discrete elements and never joined into a shell
/// string, so a script path with spaces or quotes reaches the renderer intact.
///
/// # Example
///
/// ```rust
/// use reelsmith_render::CommandSpec;
/// use std::ffi::OsString;
///
/// let cmd = CommandSpec::new("manim")
///     .arg("-ql")
///     .args(["--media_dir", "output/media"])
///     .arg("output/scene.py");
///
/// assert_eq!(cmd.program, OsString::from("manim"));
/// assert_eq!(cmd.args.len(), 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: OsString,
    pub args: Vec<OsString>,
    pub cwd: Option<PathBuf>,
}

impl CommandSpec {
    #[must_use]
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    #[must_use]
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// Build the process. Output is captured and the child is killed if the
    /// handle is dropped before it exits.
    #[must_use]
    pub fn to_command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(cwd) = &self.cwd {
            command.current_dir(cwd);
        }
        command
    }

    /// Program and arguments as one lossy string, for logs only.
    #[must_use]
    pub fn display(&self) -> String {
        std::iter::once(&self.program)
            .chain(&self.args)
            .map(|part| part.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arguments_with_metacharacters_stay_discrete() {
        let cmd = CommandSpec::new("manim").arg("my scene; rm -rf /.py");
        assert_eq!(cmd.args, vec![OsString::from("my scene; rm -rf /.py")]);

        let std_cmd = cmd.to_command();
        let args: Vec<_> = std_cmd.as_std().get_args().collect();
        assert_eq!(args.len(), 1);
    }

    #[test]
    fn test_cwd_is_applied() {
        let cmd = CommandSpec::new("manim").cwd("/tmp/work");
        let built = cmd.to_command();
        assert_eq!(
            built.as_std().get_current_dir(),
            Some(std::path::Path::new("/tmp/work"))
        );
    }

    #[test]
    fn test_display_joins_parts() {
        let cmd = CommandSpec::new("manim").args(["-ql", "scene.py"]);
        assert_eq!(cmd.display(), "manim -ql scene.py");
    }
}
