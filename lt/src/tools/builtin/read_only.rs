//! Read-only command classification
//!
//! Decides whether a shell command can skip operator confirmation. This is a
//! static allow-list heuristic over the command text, not a sandbox: anything
//! it cannot vouch for is treated as mutating.

use tracing::debug;

/// Commands that only inspect state, matched as a whole word prefix
const READ_ONLY_COMMANDS: &[&str] = &[
    "ls",
    "cat",
    "head",
    "tail",
    "grep",
    "find",
    "pwd",
    "echo",
    "printf",
    "wc",
    "sort",
    "uniq",
    "diff",
    "which",
    "whereis",
    "type",
    "file",
    "stat",
    "ps",
    "top",
    "df",
    "du",
    "free",
    "uname",
    "date",
    "cal",
    "env",
    "printenv",
    "git log",
    "git status",
    "git diff",
    "git show",
    "docker ps",
    "docker images",
    "docker inspect",
    "kubectl get",
    "kubectl describe",
];

/// Long flags that print and exit wherever they appear
const INFO_LONG_FLAGS: &[&str] = &["--help", "--version"];

/// Short flags that only mean help/version as the sole argument (`ls -h` does not)
const INFO_SHORT_FLAGS: &[&str] = &["-h", "-v"];

/// `find` predicates that write or run other programs
const FIND_ACTIONS: &[&str] = &["-delete", "-exec", "-execdir", "-ok", "-okdir", "-fprint", "-fprintf", "-fls"];

/// Check whether a command is likely read-only
///
/// Compound commands (`&&`, `||`, `;`, `|`, newlines) are read-only only if
/// every segment is. Redirection, command substitution and backgrounding are
/// always mutating.
pub fn is_read_only_command(command: &str) -> bool {
    debug!(%command, "is_read_only_command: called");
    let command = command.trim().to_lowercase();
    if command.is_empty() {
        return false;
    }

    if has_side_effect_syntax(&command) {
        debug!("is_read_only_command: side-effect syntax");
        return false;
    }

    let segments = segments(&command);
    if segments.is_empty() {
        return false;
    }

    let read_only = segments.iter().all(|s| is_read_only_segment(s));
    debug!(%read_only, segment_count = %segments.len(), "is_read_only_command: classified");
    read_only
}

fn has_side_effect_syntax(command: &str) -> bool {
    if command.contains('>') || command.contains('`') || command.contains("$(") {
        return true;
    }
    // Control characters other than line breaks and tabs
    if command.chars().any(|c| c.is_control() && !matches!(c, '\n' | '\r' | '\t')) {
        return true;
    }
    // A lone `&` backgrounds a job
    command.replace("&&", "").contains('&')
}

fn segments(command: &str) -> Vec<&str> {
    command
        .split("&&")
        .flat_map(|s| s.split("||"))
        .flat_map(|s| s.split([';', '|', '\n', '\r']))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

fn is_read_only_segment(segment: &str) -> bool {
    let tokens: Vec<&str> = segment.split_whitespace().collect();

    if tokens.iter().any(|t| INFO_LONG_FLAGS.contains(t)) {
        return true;
    }
    if tokens.len() == 2 && INFO_SHORT_FLAGS.contains(&tokens[1]) {
        return true;
    }

    let normalized = tokens.join(" ");
    let Some(prefix) = READ_ONLY_COMMANDS
        .iter()
        .find(|p| normalized == **p || normalized.starts_with(&format!("{} ", p)))
    else {
        return false;
    };

    match *prefix {
        // `env CMD` runs CMD
        "env" => tokens.len() == 1,
        "find" => !tokens.iter().any(|t| FIND_ACTIONS.contains(t)),
        _ => true,
    }
}
