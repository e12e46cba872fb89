//! Line codec for the remote command protocol.
//!
//! Requests are newline-delimited UTF-8 text of the form `name` or
//! `name(arg1,arg2,...)`. Replies are plain text lines; error replies carry
//! a fixed `Error: ` prefix so they can be recognized during session
//! teardown. There is no escaping: argument values must not contain commas
//! or unbalanced parentheses.

/// Prefix carried by every error reply.
pub const ERROR_PREFIX: &str = "Error: ";

/// A parsed request line: command name plus its raw string arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub name: String,
    pub args: Vec<String>,
}

/// Parse one request line into a [`Command`].
///
/// The line is split at the first `(`; everything before it is the name.
/// The substring after `(` up to the final `)` is split on `,` to produce
/// the arguments — empty elements are preserved, so `name()` yields one
/// empty argument. Argument count and types are not validated here; that is
/// each handler's job.
pub fn parse(line: &str) -> Command {
    match line.split_once('(') {
        None => Command {
            name: line.to_string(),
            args: Vec::new(),
        },
        Some((name, rest)) => {
            let inner = match rest.rfind(')') {
                Some(idx) => &rest[..idx],
                None => rest,
            };
            Command {
                name: name.to_string(),
                args: inner.split(',').map(str::to_string).collect(),
            }
        }
    }
}

/// Frame a reply for the wire: the display form plus a single trailing
/// newline. Callers must not construct multi-line replies.
pub fn frame(reply: &str) -> String {
    format!("{reply}\n")
}

/// Whether a reply line is an error reply. Error replies are exempt from
/// the teardown short-circuit in `Session::send`.
pub fn is_error(reply: &str) -> bool {
    reply.starts_with(ERROR_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bare_name() {
        let cmd = parse("chat.post");
        assert_eq!(cmd.name, "chat.post");
        assert!(cmd.args.is_empty());
    }

    #[test]
    fn parse_with_args() {
        let cmd = parse("world.setBlock(1,2,3,STONE)");
        assert_eq!(cmd.name, "world.setBlock");
        assert_eq!(cmd.args, vec!["1", "2", "3", "STONE"]);
    }

    #[test]
    fn parse_empty_parens_yields_one_empty_arg() {
        let cmd = parse("setPlayer()");
        assert_eq!(cmd.name, "setPlayer");
        assert_eq!(cmd.args, vec![""]);
    }

    #[test]
    fn parse_preserves_empty_elements() {
        let cmd = parse("foo(a,,b)");
        assert_eq!(cmd.args, vec!["a", "", "b"]);
    }

    #[test]
    fn parse_splits_at_first_paren_only() {
        // Inner parens end up in the argument text; only the final `)` is
        // stripped.
        let cmd = parse("foo(bar(1),2)");
        assert_eq!(cmd.name, "foo");
        assert_eq!(cmd.args, vec!["bar(1", "2"]);
    }

    #[test]
    fn parse_missing_close_paren() {
        let cmd = parse("foo(a,b");
        assert_eq!(cmd.name, "foo");
        assert_eq!(cmd.args, vec!["a", "b"]);
    }

    #[test]
    fn frame_appends_newline() {
        assert_eq!(frame("STONE"), "STONE\n");
    }

    #[test]
    fn error_classification() {
        assert!(is_error("Error: no such command: foo.bar"));
        assert!(!is_error("STONE"));
        assert!(!is_error("error: lowercase does not count"));
    }
}
