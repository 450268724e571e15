//! Command stream model and line parser
//!
//! One command per line, shaped `name(args)`. All blanks are stripped from
//! the line before parsing, so `write( /a/f , 5 MB )` and `write(/a/f,5MB)`
//! are the same command. Blank lines and `#` comments are skipped. Anything
//! else that fails to parse is a fatal syntax error: a misspelled script is
//! not worth running.
//!
//! Unit vocabularies are per command: capacities come in MB|GB|TB, block
//! sizes in KB|MB, write sizes in B|KB|MB|GB. A bare `0` write size (the only
//! unitless spelling allowed) requests a delete.

use crate::error::{LogdiskError, Result};
use crate::units::SizeUnit;
use regex::Regex;

/// Line shape: lowercase-led name, one parenthesized argument list, nothing
/// but an optional comment after the closing parenthesis.
const SHAPE_PATTERN: &str = r"^([a-z][^()]*)\(([^)]*)\)(?:#.*)?$";

/// A parsed script command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    DiskCapacity { size: u64, unit: SizeUnit },
    BlockSize { size: u64, unit: SizeUnit },
    Mkdir { paths: Vec<String> },
    Chdir { path: String },
    Write { path: String, size: u64, unit: SizeUnit },
    Read { path: String },
}

impl Command {
    /// Script-facing command name.
    pub fn name(&self) -> &'static str {
        match self {
            Command::DiskCapacity { .. } => "diskCapacity",
            Command::BlockSize { .. } => "blockSize",
            Command::Mkdir { .. } => "mkdir",
            Command::Chdir { .. } => "chdir",
            Command::Write { .. } => "write",
            Command::Read { .. } => "read",
        }
    }
}

/// Line parser holding the compiled shape pattern.
pub struct ScriptParser {
    shape: Regex,
}

impl ScriptParser {
    pub fn new() -> Self {
        ScriptParser {
            shape: Regex::new(SHAPE_PATTERN).unwrap(),
        }
    }

    /// Parse one script line. `None` means the line carries no command
    /// (blank or comment).
    pub fn parse_line(&self, raw: &str) -> Result<Option<Command>> {
        let line: String = raw.chars().filter(|c| *c != ' ' && *c != '\t').collect();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let caps = self
            .shape
            .captures(&line)
            .ok_or_else(|| LogdiskError::Syntax(line.clone()))?;
        let name = caps.get(1).map_or("", |m| m.as_str());
        let args = caps.get(2).map_or("", |m| m.as_str());

        let command = match name {
            "diskCapacity" => {
                let (size, unit) = parse_geometry_arg(
                    args,
                    "diskCapacity",
                    &[SizeUnit::MB, SizeUnit::GB, SizeUnit::TB],
                )?;
                Command::DiskCapacity { size, unit }
            }
            "blockSize" => {
                let (size, unit) =
                    parse_geometry_arg(args, "blockSize", &[SizeUnit::KB, SizeUnit::MB])?;
                Command::BlockSize { size, unit }
            }
            "mkdir" => Command::Mkdir {
                paths: parse_mkdir_args(args),
            },
            "chdir" => Command::Chdir {
                path: args.to_string(),
            },
            "write" => {
                let (path, size, unit) = parse_write_args(args)?;
                Command::Write { path, size, unit }
            }
            "read" => Command::Read {
                path: args.to_string(),
            },
            other => return Err(LogdiskError::UnknownCommand(other.to_string())),
        };
        Ok(Some(command))
    }
}

impl Default for ScriptParser {
    fn default() -> Self {
        Self::new()
    }
}

fn is_whole_number(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn parse_quantity(digits: &str) -> Result<u64> {
    digits
        .parse::<u64>()
        .map_err(|_| LogdiskError::BadQuantity(digits.to_string()))
}

/// Parse a `<digits><unit>` geometry argument with a two-character unit.
fn parse_geometry_arg(
    args: &str,
    command: &'static str,
    allowed: &[SizeUnit],
) -> Result<(u64, SizeUnit)> {
    if args.len() < 3 || !args.is_ascii() {
        return Err(LogdiskError::Syntax(format!("{command}({args})")));
    }
    let (digits, unit_token) = args.split_at(args.len() - 2);
    if !is_whole_number(digits) {
        return Err(LogdiskError::BadQuantity(digits.to_string()));
    }
    let unit = SizeUnit::parse(unit_token)
        .filter(|u| allowed.contains(u))
        .ok_or_else(|| LogdiskError::BadUnit {
            unit: unit_token.to_string(),
            command,
        })?;
    Ok((parse_quantity(digits)?, unit))
}

/// Split `<path>,<size>` write arguments: exactly one comma, path before it.
fn parse_write_args(args: &str) -> Result<(String, u64, SizeUnit)> {
    let comma = match args.find(',') {
        None | Some(0) => {
            return Err(LogdiskError::Syntax(format!("write({args})")));
        }
        Some(pos) if args[pos + 1..].contains(',') => {
            return Err(LogdiskError::Syntax(format!("write({args})")));
        }
        Some(pos) => pos,
    };
    let path = &args[..comma];
    let (size, unit) = parse_write_size(&args[comma + 1..])?;
    Ok((path.to_string(), size, unit))
}

/// Parse a write size token. `0` on its own deletes; every other size must
/// carry a unit ending in `B`.
fn parse_write_size(token: &str) -> Result<(u64, SizeUnit)> {
    if token.is_empty() || !token.is_ascii() {
        return Err(LogdiskError::Syntax(format!("write size: {token}")));
    }
    if token.len() == 1 {
        if token == "0" {
            return Ok((0, SizeUnit::B));
        }
        return Err(LogdiskError::Syntax(format!(
            "write size {token}: only 0 may omit the unit"
        )));
    }

    let (head, last) = token.split_at(token.len() - 1);
    if last != "B" {
        return Err(LogdiskError::BadUnit {
            unit: last.to_string(),
            command: "write",
        });
    }
    if is_whole_number(head) {
        return Ok((parse_quantity(head)?, SizeUnit::B));
    }

    // Not plain bytes, so the tail must be a two-character unit.
    let (digits, unit_token) = token.split_at(token.len() - 2);
    if !is_whole_number(digits) {
        return Err(LogdiskError::BadQuantity(digits.to_string()));
    }
    let unit = SizeUnit::parse(unit_token)
        .filter(|u| matches!(u, SizeUnit::KB | SizeUnit::MB | SizeUnit::GB))
        .ok_or_else(|| LogdiskError::BadUnit {
            unit: unit_token.to_string(),
            command: "write",
        })?;
    Ok((parse_quantity(digits)?, unit))
}

/// Split mkdir arguments on commas. Empty tokens between commas vanish; a
/// lone argument passes through even when empty, resolving to the current
/// directory.
fn parse_mkdir_args(args: &str) -> Vec<String> {
    if args.contains(',') {
        args.split(',')
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .collect()
    } else {
        vec![args.to_string()]
    }
}
