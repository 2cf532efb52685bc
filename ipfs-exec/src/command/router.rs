//! Request splitting, alias expansion, and permissive option parsing.

use std::collections::HashSet;

use clap::{ArgAction, ArgMatches};

use super::CommandDescriptor;
use crate::error::ExecError;

/// First tokens that are shorthands for a `files` subcommand.
pub const ALIASES: [&str; 3] = ["cat", "add", "get"];

/// Command the aliases expand into.
pub const ALIAS_TARGET: &str = "files";

/// Splits a request string on whitespace into tokens.
pub fn split_request(request: &str) -> Vec<String> {
    request.split_whitespace().map(String::from).collect()
}

/// Prefixes `files` when the first token is an alias. Other tokens keep their order.
pub fn expand_aliases(mut tokens: Vec<String>) -> Vec<String> {
    if tokens
        .first()
        .is_some_and(|first| ALIASES.contains(&first.as_str()))
    {
        tokens.insert(0, ALIAS_TARGET.to_string());
    }
    tokens
}

/// Parses `argv` (command name first) against the descriptor's declared options.
///
/// Undeclared flags are dropped before parsing, together with a following
/// value token when the flag has no `=value`. Positionals beyond what the
/// (sub)command declares are dropped too. Tokens after `--` are kept as-is.
pub fn parse_options(
    descriptor: &CommandDescriptor,
    argv: &[String],
) -> Result<ArgMatches, ExecError> {
    let cmd = descriptor.options();
    let declared = DeclaredFlags::collect(&cmd);
    let argv = drop_surplus_positionals(&cmd, declared.retain_known(argv));
    cmd.try_get_matches_from(argv)
        .map_err(|e| ExecError::OptionParse(e.to_string().trim().to_string()))
}

/// A token read as a flag name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Flag<'t> {
    Long(&'t str),
    Short(char),
}

impl<'t> Flag<'t> {
    /// `--name[=v]` or `-c...`. Negative numbers, `-` and `--` are not flags.
    fn parse(token: &'t str) -> Option<Self> {
        if let Some(long) = token.strip_prefix("--") {
            let name = long.split('=').next().unwrap_or(long);
            return (!name.is_empty()).then_some(Flag::Long(name));
        }
        let c = token.strip_prefix('-')?.chars().next()?;
        (!c.is_ascii_digit()).then_some(Flag::Short(c))
    }

    fn matches(&self, arg: &clap::Arg) -> bool {
        match *self {
            Flag::Long(name) => {
                arg.get_long() == Some(name)
                    || arg
                        .get_all_aliases()
                        .is_some_and(|aliases| aliases.contains(&name))
            }
            Flag::Short(c) => {
                arg.get_short() == Some(c)
                    || arg
                        .get_all_short_aliases()
                        .is_some_and(|aliases| aliases.contains(&c))
            }
        }
    }
}

/// Long and short flag names declared anywhere in a command tree.
#[derive(Debug, Default)]
struct DeclaredFlags {
    longs: HashSet<String>,
    shorts: HashSet<char>,
}

impl DeclaredFlags {
    fn collect(cmd: &clap::Command) -> Self {
        let mut flags = Self::default();
        flags.visit(cmd);
        flags
    }

    fn visit(&mut self, cmd: &clap::Command) {
        for arg in cmd.get_arguments() {
            if let Some(long) = arg.get_long() {
                self.longs.insert(long.to_string());
            }
            if let Some(aliases) = arg.get_all_aliases() {
                self.longs.extend(aliases.into_iter().map(String::from));
            }
            if let Some(short) = arg.get_short() {
                self.shorts.insert(short);
            }
            if let Some(aliases) = arg.get_all_short_aliases() {
                self.shorts.extend(aliases);
            }
        }
        for sub in cmd.get_subcommands() {
            self.visit(sub);
        }
    }

    fn is_undeclared(&self, token: &str) -> bool {
        match Flag::parse(token) {
            Some(Flag::Long(name)) => !self.longs.contains(name),
            Some(Flag::Short(c)) => !self.shorts.contains(&c),
            None => false,
        }
    }

    fn retain_known(&self, argv: &[String]) -> Vec<String> {
        let mut kept = Vec::with_capacity(argv.len());
        let mut tokens = argv.iter().peekable();
        let mut passthrough = false;
        while let Some(token) = tokens.next() {
            if passthrough || !self.is_undeclared(token) {
                passthrough |= token == "--";
                kept.push(token.clone());
                continue;
            }
            tracing::debug!(flag = %token, "ignoring undeclared option");
            if !token.contains('=') && tokens.peek().is_some_and(|next| !next.starts_with('-')) {
                tokens.next();
            }
        }
        kept
    }
}

/// Maximum number of positional values `cmd` accepts.
fn positional_capacity(cmd: &clap::Command) -> usize {
    cmd.get_positionals()
        .map(|arg| match arg.get_action() {
            ArgAction::Append => usize::MAX,
            _ => arg.get_num_args().map_or(1, |range| range.max_values()),
        })
        .fold(0, usize::saturating_add)
}

/// Whether `flag`, as written in `token`, consumes the next token as its value.
fn consumes_next(cmd: &clap::Command, flag: Flag<'_>, token: &str) -> bool {
    let inline_value = match flag {
        Flag::Long(_) => token.contains('='),
        Flag::Short(_) => token.chars().count() > 2,
    };
    !inline_value
        && cmd
            .get_arguments()
            .find(|arg| flag.matches(arg))
            .is_some_and(|arg| arg.get_action().takes_values())
}

/// Walks `argv` down the subcommand tree and drops positionals past each
/// command's declared capacity.
fn drop_surplus_positionals(cmd: &clap::Command, argv: Vec<String>) -> Vec<String> {
    let mut tokens = argv.into_iter();
    let mut kept: Vec<String> = tokens.next().into_iter().collect();
    let mut current = cmd;
    let mut capacity = positional_capacity(current);
    let mut used = 0usize;
    let mut passthrough = false;
    while let Some(token) = tokens.next() {
        if passthrough {
            kept.push(token);
            continue;
        }
        if token == "--" {
            passthrough = true;
            kept.push(token);
            continue;
        }
        if let Some(flag) = Flag::parse(&token) {
            let takes_value = consumes_next(current, flag, &token);
            kept.push(token);
            if takes_value {
                kept.extend(tokens.next());
            }
            continue;
        }
        if used == 0 {
            if let Some(sub) = current.find_subcommand(&token) {
                current = sub;
                capacity = positional_capacity(current);
                kept.push(token);
                continue;
            }
        }
        if used < capacity {
            used += 1;
            kept.push(token);
        } else {
            tracing::debug!(value = %token, "ignoring surplus positional");
        }
    }
    kept
}
