//! Operator command-line tokenizer (§6). A stripped-down cousin of the
//! teacher's `parser::tokenize`: the command surface here only ever needs
//! space-separated positional arguments, so quoting/escaping is dropped.

/// A tokenized operator line: a verb and its positional arguments.
#[derive(Debug, PartialEq)]
pub struct Command {
    pub verb: String,
    pub args: Vec<String>,
}

/// Split a line on whitespace into a verb and its arguments. Returns
/// `None` for a blank line (including one that is only whitespace).
pub fn parse_line(line: &str) -> Option<Command> {
    let mut words = line.split_whitespace().map(str::to_string);
    let verb = words.next()?;
    let args = words.collect();
    Some(Command { verb, args })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_line_is_none() {
        assert!(parse_line("").is_none());
        assert!(parse_line("   ").is_none());
    }

    #[test]
    fn verb_with_no_args() {
        let cmd = parse_line("printers").unwrap();
        assert_eq!(cmd.verb, "printers");
        assert!(cmd.args.is_empty());
    }

    #[test]
    fn verb_and_args_are_split_on_whitespace() {
        let cmd = parse_line("printer  p1   txt").unwrap();
        assert_eq!(cmd.verb, "printer");
        assert_eq!(cmd.args, vec!["p1".to_string(), "txt".to_string()]);
    }
}
