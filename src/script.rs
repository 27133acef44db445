//! Edit scripts: a line-oriented way to drive a slot without a GUI.
//!
//! ```text
//! # comments and blank lines are skipped
//! insert a<b.c>
//! backspace 2
//! caret 1,0,0
//! select 0,1 1,0,1
//! wrap 0,0 0,1 (
//! ```
//!
//! - `insert TEXT`: type everything after the first space
//! - `backspace [N]`, `delete [N]`: repeat N times (default 1)
//! - `caret PATH`: move the caret; paths are comma-separated indices
//! - `select PATH PATH`: delete the selection
//! - `wrap PATH PATH CHAR`: type CHAR over the selection
//! - `clear`: blank the slot

use serde::Serialize;
use thiserror::Error;

use crate::perf;
use crate::slot::{CaretPos, Component, SlotEditor};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Insert(String),
    Backspace(usize),
    Delete(usize),
    Caret(CaretPos),
    Select(CaretPos, CaretPos),
    Wrap(CaretPos, CaretPos, char),
    Clear,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScriptError {
    #[error("line {line}: unknown command `{command}`")]
    UnknownCommand { line: usize, command: String },

    #[error("line {line}: `{command}` expects {expected}")]
    MissingArgument {
        line: usize,
        command: &'static str,
        expected: &'static str,
    },

    #[error("line {line}: invalid caret path `{text}`")]
    InvalidPath { line: usize, text: String },

    #[error("line {line}: invalid repeat count `{text}`")]
    InvalidCount { line: usize, text: String },

    #[error("line {line}: expected a single character, found `{text}`")]
    InvalidChar { line: usize, text: String },
}

/// Parse a whole script; line numbers in errors are 1-based.
pub fn parse_script(source: &str) -> Result<Vec<Command>, ScriptError> {
    source
        .lines()
        .enumerate()
        .filter_map(|(i, line)| parse_line(i + 1, line).transpose())
        .collect()
}

/// Parse one line, returning `None` for blank lines and comments.
pub fn parse_line(line: usize, text: &str) -> Result<Option<Command>, ScriptError> {
    let trimmed = text.trim_start();
    if trimmed.trim_end().is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }
    let (name, rest) = trimmed.split_once(' ').unwrap_or((trimmed.trim_end(), ""));
    let args = rest.split_whitespace().collect::<Vec<_>>();

    let command = match name {
        // Insert keeps its argument verbatim: spaces matter for `new `.
        "insert" => Command::Insert(rest.to_string()),
        "backspace" => Command::Backspace(parse_count(line, args.first().copied())?),
        "delete" => Command::Delete(parse_count(line, args.first().copied())?),
        "caret" => match args.as_slice() {
            [path] => Command::Caret(parse_path(line, path)?),
            _ => {
                return Err(ScriptError::MissingArgument {
                    line,
                    command: "caret",
                    expected: "one path",
                });
            }
        },
        "select" => match args.as_slice() {
            [from, to] => Command::Select(parse_path(line, from)?, parse_path(line, to)?),
            _ => {
                return Err(ScriptError::MissingArgument {
                    line,
                    command: "select",
                    expected: "two paths",
                });
            }
        },
        "wrap" => match args.as_slice() {
            [from, to, c] => Command::Wrap(
                parse_path(line, from)?,
                parse_path(line, to)?,
                parse_char(line, c)?,
            ),
            _ => {
                return Err(ScriptError::MissingArgument {
                    line,
                    command: "wrap",
                    expected: "two paths and a character",
                });
            }
        },
        "clear" => Command::Clear,
        other => {
            return Err(ScriptError::UnknownCommand {
                line,
                command: other.to_string(),
            });
        }
    };
    Ok(Some(command))
}

fn parse_count(line: usize, text: Option<&str>) -> Result<usize, ScriptError> {
    text.map_or(Ok(1), |text| {
        text.parse().map_err(|_| ScriptError::InvalidCount {
            line,
            text: text.to_string(),
        })
    })
}

fn parse_path(line: usize, text: &str) -> Result<CaretPos, ScriptError> {
    text.split(',')
        .map(|part| part.trim().parse::<usize>())
        .collect::<Result<Vec<_>, _>>()
        .ok()
        .filter(|path| path.len() >= 2)
        .map(CaretPos::new)
        .ok_or_else(|| ScriptError::InvalidPath {
            line,
            text: text.to_string(),
        })
}

fn parse_char(line: usize, text: &str) -> Result<char, ScriptError> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(ScriptError::InvalidChar {
            line,
            text: text.to_string(),
        }),
    }
}

/// What a host would show after one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub step: usize,
    pub state: String,
    pub caret: CaretPos,
    pub editor: String,
    pub target: String,
    pub components: Vec<Component>,
}

/// A slot and its caret, advanced one command at a time.
#[derive(Debug)]
pub struct Session {
    slot: SlotEditor,
    caret: CaretPos,
    steps: usize,
}

impl Session {
    pub fn new(slot: SlotEditor) -> Self {
        let caret = slot.end_pos();
        Self {
            slot,
            caret,
            steps: 0,
        }
    }

    pub const fn slot(&self) -> &SlotEditor {
        &self.slot
    }

    pub const fn caret(&self) -> &CaretPos {
        &self.caret
    }

    pub fn apply(&mut self, command: &Command) -> Snapshot {
        let _scope = perf::scope("script.apply");
        self.caret = match command {
            Command::Insert(text) => self.slot.insert(&self.caret, text),
            Command::Backspace(n) => {
                (0..*n).fold(self.caret.clone(), |caret, _| self.slot.backspace(&caret))
            }
            Command::Delete(n) => {
                (0..*n).fold(self.caret.clone(), |caret, _| self.slot.delete(&caret))
            }
            Command::Caret(pos) if self.slot.root().is_valid_path(pos.path()) => pos.clone(),
            Command::Caret(_) => self.caret.clone(),
            Command::Select(from, to) => self.slot.delete_selection(from, to),
            Command::Wrap(from, to, c) => self.slot.insert_with_selection(from, to, *c),
            Command::Clear => {
                self.slot.blank();
                self.slot.start_pos()
            }
        };
        self.steps += 1;
        let snapshot = self.snapshot();
        perf::record_edit(self.steps, &describe(command), &snapshot.state);
        snapshot
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            step: self.steps,
            state: self.slot.annotated(Some(&self.caret)),
            caret: self.caret.clone(),
            editor: self.slot.editor_text(),
            target: self.slot.target_code(),
            components: self.slot.render(),
        }
    }
}

fn describe(command: &Command) -> String {
    match command {
        Command::Insert(text) => format!("insert {text}"),
        Command::Backspace(n) => format!("backspace {n}"),
        Command::Delete(n) => format!("delete {n}"),
        Command::Caret(pos) => format!("caret {pos}"),
        Command::Select(from, to) => format!("select {from} {to}"),
        Command::Wrap(from, to, c) => format!("wrap {from} {to} {c}"),
        Command::Clear => "clear".to_string(),
    }
}
