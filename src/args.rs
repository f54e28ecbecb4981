// Option parsing for the handlers.
//
// Each handler declares the options it understands with an `ArgSpec`
// (boolean, string or inferred values, aliases and defaults) and gets back
// a `ParsedArgs`: option values keyed by canonical name plus the ordered
// positional tokens. Range and presence checks are left to the caller, and
// options nobody declared are ignored.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fmt;

use clap::{Arg, ArgAction, Command};

use crate::error::{CliError, CliResult};

const POSITIONALS: &str = "positionals";

/// A parsed option or positional value.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl ArgValue {
    /// Numeric literals become numbers, `true`/`false` booleans, anything
    /// else stays text.
    pub fn infer(raw: &str) -> Self {
        match raw {
            "true" => return ArgValue::Bool(true),
            "false" => return ArgValue::Bool(false),
            _ => {}
        }
        if looks_numeric(raw) {
            if let Ok(n) = raw.parse::<f64>() {
                return ArgValue::Number(n);
            }
        }
        ArgValue::Text(raw.to_string())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ArgValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The value as an integer, if it is a whole, finite, exactly
    /// representable number.
    pub fn as_integer(&self) -> Option<i64> {
        const MAX_SAFE: f64 = 9_007_199_254_740_991.0;
        match *self {
            ArgValue::Number(n) if n.is_finite() && n.fract() == 0.0 && n.abs() <= MAX_SAFE => {
                Some(n as i64)
            }
            _ => None,
        }
    }
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgValue::Bool(b) => write!(f, "{b}"),
            ArgValue::Number(n) => write!(f, "{n}"),
            ArgValue::Text(s) => f.write_str(s),
        }
    }
}

fn looks_numeric(raw: &str) -> bool {
    let unsigned = raw.trim_start_matches(['-', '+']);
    unsigned.starts_with(|c: char| c.is_ascii_digit() || c == '.')
        && raw
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'))
}

/// A token that starts an option: `-x...` or `--name...`, but not a
/// negative number.
pub fn is_option(token: &str) -> bool {
    token.len() > 1 && token.starts_with('-') && !looks_numeric(token)
}

/// Drops empty-string and NaN entries (and absent ones), keeping the order
/// of the rest.
pub fn filter_positionals<I>(values: I) -> Vec<ArgValue>
where
    I: IntoIterator,
    I::Item: Into<Option<ArgValue>>,
{
    values
        .into_iter()
        .filter_map(Into::<Option<ArgValue>>::into)
        .filter(|value| match value {
            ArgValue::Text(s) => !s.is_empty(),
            ArgValue::Number(n) => !n.is_nan(),
            ArgValue::Bool(_) => true,
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Boolean,
    String,
    Inferred,
}

#[derive(Debug, Clone)]
struct OptionDecl {
    name: &'static str,
    kind: Kind,
    aliases: Vec<&'static str>,
    default: Option<String>,
}

/// Declares the options one handler accepts.
#[derive(Debug, Clone, Default)]
pub struct ArgSpec {
    options: Vec<OptionDecl>,
}

impl ArgSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn boolean(mut self, name: &'static str) -> Self {
        self.decl_mut(name).kind = Kind::Boolean;
        self
    }

    pub fn string(mut self, name: &'static str) -> Self {
        self.decl_mut(name).kind = Kind::String;
        self
    }

    /// An option whose value type is inferred from its text.
    pub fn value(mut self, name: &'static str) -> Self {
        self.decl_mut(name).kind = Kind::Inferred;
        self
    }

    pub fn alias(mut self, name: &'static str, alias: &'static str) -> Self {
        self.decl_mut(name).aliases.push(alias);
        self
    }

    pub fn default_value(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.decl_mut(name).default = Some(value.into());
        self
    }

    fn decl_mut(&mut self, name: &'static str) -> &mut OptionDecl {
        let idx = match self.options.iter().position(|o| o.name == name) {
            Some(idx) => idx,
            None => {
                self.options.push(OptionDecl {
                    name,
                    kind: Kind::Inferred,
                    aliases: Vec::new(),
                    default: None,
                });
                self.options.len() - 1
            }
        };
        &mut self.options[idx]
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new("backoffice")
            .no_binary_name(true)
            .disable_help_flag(true)
            .disable_version_flag(true)
            .args_override_self(true)
            .arg(
                Arg::new(POSITIONALS)
                    .action(ArgAction::Append)
                    .num_args(1..)
                    .allow_negative_numbers(true),
            );

        for decl in &self.options {
            let mut arg = Arg::new(decl.name).long(decl.name);
            arg = match decl.kind {
                Kind::Boolean => arg.action(ArgAction::SetTrue),
                Kind::String => arg
                    .action(ArgAction::Set)
                    .allow_negative_numbers(true)
                    .num_args(0..=1)
                    .default_missing_value(""),
                Kind::Inferred => arg
                    .action(ArgAction::Set)
                    .allow_negative_numbers(true)
                    .num_args(0..=1)
                    .default_missing_value("true"),
            };
            if decl.kind != Kind::Boolean {
                if let Some(default) = &decl.default {
                    arg = arg.default_value(default.clone());
                }
            }
            let mut has_short = false;
            for alias in &decl.aliases {
                let mut chars = alias.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if !has_short => {
                        arg = arg.short(c);
                        has_short = true;
                    }
                    (Some(c), None) => arg = arg.short_alias(c),
                    _ => arg = arg.alias(*alias),
                }
            }
            cmd = cmd.arg(arg);
        }
        cmd
    }

    fn declares(&self, name: &str) -> bool {
        self.options
            .iter()
            .any(|o| o.name == name || o.aliases.contains(&name))
    }

    /// Removes options nobody declared, like `--verbose` or `-x`. An
    /// undeclared `--name` without `=value` also takes the following token
    /// when that token is not itself an option. Everything after `--` is
    /// kept as is.
    fn drop_undeclared(&self, tokens: impl Iterator<Item = OsString>) -> Vec<OsString> {
        let mut kept = Vec::new();
        let mut tokens = tokens.peekable();
        while let Some(token) = tokens.next() {
            let Some(text) = token.to_str() else {
                kept.push(token);
                continue;
            };
            if text == "--" {
                kept.push(token);
                kept.extend(tokens.by_ref());
                break;
            }
            if let Some(long) = text.strip_prefix("--") {
                let (name, inline_value) = match long.split_once('=') {
                    Some((name, _)) => (name, true),
                    None => (long, false),
                };
                if self.declares(name) {
                    kept.push(token);
                    continue;
                }
                let next_is_value = tokens
                    .peek()
                    .and_then(|next| next.to_str())
                    .is_some_and(|next| !is_option(next));
                if !inline_value && next_is_value {
                    tokens.next();
                }
                continue;
            }
            if is_option(text) {
                let short: String = text[1..].chars().take(1).collect();
                if !self.declares(&short) {
                    continue;
                }
            }
            kept.push(token);
        }
        kept
    }

    pub fn parse<I, T>(&self, tokens: I) -> CliResult<ParsedArgs>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let tokens = self.drop_undeclared(tokens.into_iter().map(Into::into));
        let matches = self
            .command()
            .try_get_matches_from(tokens)
            .map_err(|err| {
                let rendered = err.to_string();
                let first = rendered.lines().next().unwrap_or_default();
                CliError::usage(format!("Error: {}", first.trim_start_matches("error: ")))
            })?;

        let mut values = BTreeMap::new();
        let mut aliases = BTreeMap::new();
        for decl in &self.options {
            for alias in &decl.aliases {
                aliases.insert(alias.to_string(), decl.name.to_string());
            }
            let value = match decl.kind {
                Kind::Boolean => Some(ArgValue::Bool(matches.get_flag(decl.name))),
                Kind::String => matches
                    .get_one::<String>(decl.name)
                    .map(|v| ArgValue::Text(v.clone())),
                Kind::Inferred => matches
                    .get_one::<String>(decl.name)
                    .map(|v| ArgValue::infer(v)),
            };
            if let Some(value) = value {
                values.insert(decl.name.to_string(), value);
            }
        }

        let positionals = matches
            .get_many::<String>(POSITIONALS)
            .map(|vals| vals.map(|v| ArgValue::infer(v)).collect())
            .unwrap_or_default();

        Ok(ParsedArgs {
            values,
            aliases,
            positionals,
        })
    }
}

/// Option values by canonical name plus the positional tokens in order.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedArgs {
    values: BTreeMap<String, ArgValue>,
    aliases: BTreeMap<String, String>,
    positionals: Vec<ArgValue>,
}

impl ParsedArgs {
    /// Looks an option up by its canonical name or any of its aliases.
    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        let canonical = self.aliases.get(name).map(String::as_str).unwrap_or(name);
        self.values.get(canonical)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(ArgValue::as_text)
    }

    pub fn flag(&self, name: &str) -> bool {
        matches!(self.get(name), Some(ArgValue::Bool(true)))
    }

    pub fn positionals(&self) -> &[ArgValue] {
        &self.positionals
    }

    pub fn into_positionals(self) -> Vec<ArgValue> {
        self.positionals
    }
}
