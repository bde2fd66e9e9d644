//! Utilities related to displaying things.

/// Renders an argument list as a single command line suitable for echoing
/// into the run log. Arguments containing whitespace are single-quoted so
/// the echoed line is unambiguous. The rendered form is for display only:
/// execution always uses the original argument list, never a shell string.
pub fn render_command(argv: &[String]) -> String {
    argv.iter()
        .map(|arg| quote(arg))
        .collect::<Vec<_>>()
        .join(" ")
}

fn quote(arg: &str) -> String {
    if arg.is_empty() || arg.chars().any(char::is_whitespace) {
        format!("'{}'", arg.replace('\'', r"'\''"))
    } else {
        arg.to_string()
    }
}
