//! Command tables of the language.
//!
//! The defaults describe OSCScript. Any subset of the tables can be
//! overridden from TOML; omitted tables keep their defaults.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::Deserialize;

/// Error produced while loading a vocabulary file.
#[derive(Debug, thiserror::Error)]
pub enum VocabularyError {
    /// The file could not be read.
    #[error("cannot read vocabulary {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid vocabulary TOML.
    #[error("invalid vocabulary: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Recognized commands, keywords, and block pairs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Vocabulary {
    /// Ordinary commands.
    pub commands: BTreeSet<String>,
    /// Control keywords (openers, continuations, `break`, ...).
    pub control_keywords: BTreeSet<String>,
    /// Block opener to its required closer.
    pub block_openers: BTreeMap<String, String>,
    pub block_closers: BTreeSet<String>,
    /// Commands whose first argument names another script.
    pub include_commands: BTreeSet<String>,
    /// Commands whose first argument defines a variable.
    pub assignment_commands: BTreeSet<String>,
    /// Variables provided by the runtime, without the `$` sigil.
    pub builtin_variables: BTreeSet<String>,
    /// Extensions tried, in order, for extension-less includes.
    pub script_extensions: Vec<String>,
    pub subroutine_keyword: String,
    pub call_keyword: String,
    pub conditional_keyword: String,
    /// `else` / `elseif`.
    pub continuation_keywords: BTreeSet<String>,
    pub loop_keyword: String,
    pub break_keyword: String,
    pub return_keyword: String,
}

impl Vocabulary {
    /// Parse a vocabulary from TOML text.
    pub fn from_toml_str(input: &str) -> Result<Self, VocabularyError> {
        let vocabulary: Self = toml::from_str(input)?;
        Ok(vocabulary.normalized())
    }

    /// Read and parse a vocabulary file.
    pub fn load(path: &Path) -> Result<Self, VocabularyError> {
        let input = std::fs::read_to_string(path).map_err(|source| VocabularyError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&input)
    }

    /// Whether the case-folded command is recognized at all.
    #[must_use]
    pub fn is_known(&self, command: &str) -> bool {
        self.commands.contains(command)
            || self.control_keywords.contains(command)
            || self.block_closers.contains(command)
    }

    /// The closer a block opened by `command` requires.
    #[must_use]
    pub fn closer_for(&self, command: &str) -> Option<&str> {
        self.block_openers.get(command).map(String::as_str)
    }

    #[must_use]
    pub fn is_closer(&self, command: &str) -> bool {
        self.block_closers.contains(command)
    }

    #[must_use]
    pub fn is_include(&self, command: &str) -> bool {
        self.include_commands.contains(command)
    }

    #[must_use]
    pub fn is_assignment(&self, command: &str) -> bool {
        self.assignment_commands.contains(command)
    }

    #[must_use]
    pub fn is_continuation(&self, command: &str) -> bool {
        self.continuation_keywords.contains(command)
    }

    #[must_use]
    pub fn is_builtin_variable(&self, name: &str) -> bool {
        self.builtin_variables.contains(name)
    }

    /// Whether `path` carries one of the script extensions.
    #[must_use]
    pub fn is_script_path(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                self.script_extensions
                    .iter()
                    .any(|known| known.eq_ignore_ascii_case(ext))
            })
    }

    fn normalized(self) -> Self {
        let fold = |set: BTreeSet<String>| -> BTreeSet<String> {
            set.into_iter().map(|s| s.to_lowercase()).collect()
        };
        let word = |s: String| s.to_lowercase();
        Self {
            commands: fold(self.commands),
            control_keywords: fold(self.control_keywords),
            block_openers: self
                .block_openers
                .into_iter()
                .map(|(open, close)| (open.to_lowercase(), close.to_lowercase()))
                .collect(),
            block_closers: fold(self.block_closers),
            include_commands: fold(self.include_commands),
            assignment_commands: fold(self.assignment_commands),
            builtin_variables: self
                .builtin_variables
                .into_iter()
                .map(|s| s.trim_start_matches('$').to_lowercase())
                .collect(),
            script_extensions: self
                .script_extensions
                .into_iter()
                .map(|ext| ext.trim_start_matches('.').to_string())
                .collect(),
            subroutine_keyword: word(self.subroutine_keyword),
            call_keyword: word(self.call_keyword),
            conditional_keyword: word(self.conditional_keyword),
            continuation_keywords: fold(self.continuation_keywords),
            loop_keyword: word(self.loop_keyword),
            break_keyword: word(self.break_keyword),
            return_keyword: word(self.return_keyword),
        }
    }
}

fn set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            commands: set(&[
                "seti",
                "sets",
                "userinput",
                "print",
                "println",
                "wait",
                "sleep",
                "exit",
                "include",
                "loadscript",
                "sendosc",
                "sendbuffer",
                "sendscratchpad",
                "connect",
                "disconnect",
                "listen",
                "receive",
                "clearbuffer",
                "clearscratchpad",
                "setbyte",
                "getbyte",
                "add",
                "sub",
                "mul",
                "div",
                "mod",
                "concat",
                "length",
                "random",
                "log",
            ]),
            control_keywords: set(&[
                "if",
                "elseif",
                "else",
                "while",
                "break",
                "subroutine",
                "returnsub",
                "gosub",
                "setbuffer",
                "setscratchpad",
            ]),
            block_openers: [
                ("if", "endif"),
                ("while", "done"),
                ("subroutine", "endsubroutine"),
                ("setbuffer", "endbuffer"),
                ("setscratchpad", "endscratchpad"),
            ]
            .into_iter()
            .map(|(open, close)| (open.to_string(), close.to_string()))
            .collect(),
            block_closers: set(&["endif", "done", "endsubroutine", "endbuffer", "endscratchpad"]),
            include_commands: set(&["include", "loadscript"]),
            assignment_commands: set(&["seti", "sets", "userinput"]),
            builtin_variables: set(&[
                "result",
                "error",
                "time",
                "date",
                "random",
                "scriptname",
                "scriptdir",
                "buffersize",
                "scratchpadsize",
            ]),
            script_extensions: vec!["osc".to_string(), "oscscript".to_string()],
            subroutine_keyword: "subroutine".to_string(),
            call_keyword: "gosub".to_string(),
            conditional_keyword: "if".to_string(),
            continuation_keywords: set(&["else", "elseif"]),
            loop_keyword: "while".to_string(),
            break_keyword: "break".to_string(),
            return_keyword: "returnsub".to_string(),
        }
    }
}
