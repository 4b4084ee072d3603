// Minimal shell-command simulator.
// Extracts the recognized directory mutations (`mkdir`, `cd`) from a
// step's arguments and replays them against the virtual filesystem.
// Deliberately not a shell grammar: no quoting, pipes, redirection, or
// expansion.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::error::PathError;
use crate::path_tree::VirtualFs;

/// Flag that introduces an inline multi-line script.
const INLINE_SCRIPT_FLAG: &str = "-c";

/// Whether `entrypoint` names a POSIX shell whose arguments should be
/// simulated. Anything else runs no directory commands.
pub fn is_shell(entrypoint: &str) -> bool {
    matches!(entrypoint, "/bin/bash" | "/bin/sh" | "sh")
}

/// A directory-mutation verb bound into the dispatch table.
pub type CommandFn = fn(&mut VirtualFs, &[String]) -> Result<(), PathError>;

/// One resolved operation: a verb implementation bound to its arguments.
pub struct ShellOp {
    run: CommandFn,
    args: Vec<String>,
}

impl ShellOp {
    pub fn apply(&self, fs: &mut VirtualFs) -> Result<(), PathError> {
        (self.run)(fs, &self.args)
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

static DEFAULT_COMMANDS: Lazy<HashMap<&'static str, CommandFn>> = Lazy::new(|| {
    let mut table: HashMap<&'static str, CommandFn> = HashMap::new();
    table.insert("mkdir", mkdir as CommandFn);
    table.insert("cd", cd as CommandFn);
    table
});

/// Turns step arguments into an ordered sequence of directory operations.
///
/// The verb dispatch table is an immutable value owned by the instance;
/// tests can inject their own via `with_commands`.
pub struct ShellInterpreter {
    commands: HashMap<&'static str, CommandFn>,
}

impl ShellInterpreter {
    pub fn new() -> Self {
        Self {
            commands: DEFAULT_COMMANDS.clone(),
        }
    }

    pub fn with_commands(commands: HashMap<&'static str, CommandFn>) -> Self {
        Self { commands }
    }

    /// Extract the recognized directory mutations from a step's arguments.
    ///
    /// With a leading `-c` flag the next argument is one multi-line script,
    /// split into one logical command per line; otherwise each argument is
    /// already a separate command. Commands are tokenized on single spaces
    /// into a verb and positional arguments. Unmatched verbs are silently
    /// skipped.
    pub fn parse(&self, entrypoint: &str, args: &[String]) -> Vec<ShellOp> {
        if !is_shell(entrypoint) {
            return Vec::new();
        }

        let commands: Vec<String> = if args.first().map(String::as_str) == Some(INLINE_SCRIPT_FLAG)
        {
            match args.get(1) {
                Some(script) => script.split('\n').map(str::to_string).collect(),
                None => Vec::new(),
            }
        } else {
            args.to_vec()
        };

        let mut ops = Vec::new();
        for command in &commands {
            let mut tokens = command.split(' ');
            let verb = tokens.next().unwrap_or_default();
            let Some(&run) = self.commands.get(verb) else {
                tracing::debug!(target: "shell", "Skipping unrecognized command: {}", command);
                continue;
            };
            ops.push(ShellOp {
                run,
                args: tokens.map(str::to_string).collect(),
            });
        }
        ops
    }

    /// Apply `ops` in order. The first failure aborts the remaining
    /// operations; already-applied mutations are not rolled back.
    pub fn apply(&self, ops: &[ShellOp], fs: &mut VirtualFs) -> Result<(), PathError> {
        for op in ops {
            op.apply(fs)?;
        }
        Ok(())
    }
}

impl Default for ShellInterpreter {
    fn default() -> Self {
        Self::new()
    }
}

/// `mkdir [-p] <path>`: a literal `-p` anywhere enables recursive
/// creation; the final positional argument is the target path.
fn mkdir(fs: &mut VirtualFs, args: &[String]) -> Result<(), PathError> {
    let args: Vec<&str> = args
        .iter()
        .map(|a| a.trim_end_matches(['\n', '\r']))
        .collect();

    let recursive = args.iter().any(|a| *a == "-p");
    let Some(target) = args.iter().filter(|a| **a != "-p").last() else {
        return Ok(());
    };
    fs.make_directory(target, recursive)
}

/// `cd <path>`: navigate, failing when any segment is absent.
fn cd(fs: &mut VirtualFs, args: &[String]) -> Result<(), PathError> {
    match args.first() {
        Some(path) => fs.navigate(path.trim_end_matches(['\n', '\r'])),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn inline_script_yields_one_op_per_recognized_line() {
        let shell = ShellInterpreter::new();
        let ops = shell.parse("/bin/sh", &strings(&["-c", "mkdir -p foo\ncd foo\nmkdir bar"]));
        assert_eq!(ops.len(), 3);

        let mut fs = VirtualFs::new();
        shell.apply(&ops, &mut fs).unwrap();
        assert_eq!(fs.cwd_path(), "/workspace/foo");
        fs.reset_to_root();
        fs.navigate("workspace/foo/bar").unwrap();
    }

    #[test]
    fn unrecognized_verb_produces_no_ops() {
        let shell = ShellInterpreter::new();
        let ops = shell.parse("/bin/sh", &strings(&["-c", "echo hi"]));
        assert!(ops.is_empty());
    }

    #[test]
    fn non_shell_entrypoint_produces_no_ops() {
        let shell = ShellInterpreter::new();
        let ops = shell.parse("/usr/bin/gcloud", &strings(&["-c", "mkdir foo"]));
        assert!(ops.is_empty());
    }

    #[test]
    fn args_without_flag_are_separate_commands() {
        let shell = ShellInterpreter::new();
        let ops = shell.parse("sh", &strings(&["mkdir app", "cd app"]));
        assert_eq!(ops.len(), 2);

        let mut fs = VirtualFs::new();
        shell.apply(&ops, &mut fs).unwrap();
        assert_eq!(fs.cwd_path(), "/workspace/app");
    }

    #[test]
    fn mkdir_without_dash_p_fails_fast_without_rollback() {
        let shell = ShellInterpreter::new();
        let ops = shell.parse("/bin/bash", &strings(&["-c", "mkdir a\nmkdir b/c/d\nmkdir e"]));
        assert_eq!(ops.len(), 3);

        let mut fs = VirtualFs::new();
        let err = shell.apply(&ops, &mut fs);
        assert!(err.is_err());
        // The first mkdir survives; the third never ran.
        fs.navigate("a").unwrap();
        assert!(fs.navigate("/workspace/e").is_err());
    }

    #[test]
    fn mkdir_strips_trailing_line_breaks() {
        let shell = ShellInterpreter::new();
        let ops = shell.parse("/bin/sh", &strings(&["mkdir foo\n"]));
        assert_eq!(ops.len(), 1);

        let mut fs = VirtualFs::new();
        shell.apply(&ops, &mut fs).unwrap();
        fs.navigate("foo").unwrap();
    }

    #[test]
    fn mkdir_dash_p_in_any_position() {
        let shell = ShellInterpreter::new();
        let ops = shell.parse("/bin/sh", &strings(&["mkdir x/y -p"]));
        let mut fs = VirtualFs::new();
        shell.apply(&ops, &mut fs).unwrap();
        fs.navigate("x/y").unwrap();
    }

    #[test]
    fn injected_dispatch_table_limits_verbs() {
        let mut table: HashMap<&'static str, CommandFn> = HashMap::new();
        table.insert("cd", super::cd as CommandFn);
        let shell = ShellInterpreter::with_commands(table);

        let ops = shell.parse("/bin/sh", &strings(&["mkdir foo", "cd .."]));
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].args(), ["..".to_string()]);
    }
}
