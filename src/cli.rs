//! Minimal CLI parsing.

use std::env;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print the episode parse of each path
    Parse(Vec<String>),
    /// Print the resolution tag found in a file name
    Resolution(String),
    /// Print the effective organize options
    Pattern,
    /// Print the organization log, newest first
    Results { limit: Option<usize> },
    /// Remove every logged result
    ClearLog,
    Help,
}

#[derive(Debug, Clone)]
pub struct CliOptions {
    pub command: Command,
    pub log_json: Option<bool>,
}

impl Default for CliOptions {
    fn default() -> Self {
        Self {
            command: Command::Help,
            log_json: None,
        }
    }
}

impl CliOptions {
    pub fn from_args() -> Self {
        Self::parse(env::args().skip(1))
    }

    pub fn parse(args: impl IntoIterator<Item = String>) -> Self {
        let mut options = CliOptions::default();
        let mut args = args.into_iter();
        let mut positional = Vec::new();
        let mut limit = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--json-logs" => options.log_json = Some(true),
                "--plain-logs" => options.log_json = Some(false),
                "--limit" => {
                    if let Some(value) = args.next() {
                        limit = value.parse().ok();
                    }
                }
                _ if arg.starts_with("--limit=") => {
                    limit = arg.split_once('=').and_then(|(_, v)| v.parse().ok());
                }
                _ => positional.push(arg),
            }
        }

        let mut positional = positional.into_iter();
        options.command = match positional.next().as_deref() {
            Some("parse") => {
                let paths: Vec<String> = positional.collect();
                if paths.is_empty() {
                    Command::Help
                } else {
                    Command::Parse(paths)
                }
            }
            Some("resolution") => match positional.next() {
                Some(name) => Command::Resolution(name),
                None => Command::Help,
            },
            Some("pattern") => Command::Pattern,
            Some("results") => Command::Results { limit },
            Some("clear-log") => Command::ClearLog,
            _ => Command::Help,
        };

        options
    }
}

pub const USAGE: &str = "\
usage: auto-organize <command> [options]

commands:
  parse <path>...       print the episode parse of each path as JSON
  resolution <name>     print the resolution tag of a file name
  pattern               print the effective organize options
  results [--limit N]   print the organization log
  clear-log             remove every logged result

options:
  --json-logs | --plain-logs";
