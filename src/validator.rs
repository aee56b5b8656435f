//! Structural and symbol-resolution checks for one document.
//!
//! A single forward pass keeps a stack of open blocks and collects
//! include arguments and call sites. Includes are resolved only after
//! the pass, then every call is checked against the subroutines
//! defined locally or anywhere in an included closure.

use std::collections::HashSet;
use std::path::Path;

use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::include::resolve_include_path;
use crate::index::Indexer;
use crate::lexer::{
    find_inline_comment_index, first_non_whitespace_index, strip_surrounding_quotes,
    tokenize_with_ranges,
};
use crate::subroutines::SubroutineIndexer;
use crate::token::{Span, Token};
use crate::vocabulary::Vocabulary;

/// Validate `text`, the current content of the script at `path`.
///
/// `path` is used only to resolve includes. The result is the full
/// diagnostic list for the document, in discovery order.
#[must_use]
pub fn validate(path: &Path, text: &str, vocabulary: &Vocabulary) -> Vec<Diagnostic> {
    let mut validator = Validator::new(vocabulary);
    for (line, raw) in text.lines().enumerate() {
        validator.check_line(line, raw);
    }
    validator.finish(path)
}

#[derive(Debug)]
struct OpenBlock {
    opener: String,
    expected: String,
    line: usize,
    span: Span,
}

#[derive(Debug)]
struct PendingInclude {
    command: Span,
    argument: Option<Token>,
    line: usize,
}

#[derive(Debug)]
struct PendingCall {
    target: Token,
    line: usize,
}

struct Validator<'v> {
    vocabulary: &'v Vocabulary,
    stack: Vec<OpenBlock>,
    local_subroutines: HashSet<String>,
    includes: Vec<PendingInclude>,
    calls: Vec<PendingCall>,
    diagnostics: Vec<Diagnostic>,
}

impl<'v> Validator<'v> {
    fn new(vocabulary: &'v Vocabulary) -> Self {
        Self {
            vocabulary,
            stack: Vec::new(),
            local_subroutines: HashSet::new(),
            includes: Vec::new(),
            calls: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    fn report(&mut self, span: Span, kind: DiagnosticKind) {
        self.diagnostics.push(Diagnostic::new(span, kind));
    }

    fn check_line(&mut self, line: usize, raw: &str) {
        if raw.trim().is_empty() {
            return;
        }

        let comment = find_inline_comment_index(raw);
        if comment == first_non_whitespace_index(raw) {
            return;
        }
        if let Some(start) = comment {
            let end = raw.chars().count();
            self.report(Span { line, start, end }, DiagnosticKind::InlineComment);
        }

        // Only the text before the comment is code here, so a `#` glued
        // to an argument never ends up inside a call target or path.
        let tokens = match comment {
            Some(col) => tokenize_with_ranges(&raw.chars().take(col).collect::<String>()),
            None => tokenize_with_ranges(raw),
        };
        let Some(first) = tokens.first() else {
            return;
        };
        let command_span = first.span(line);

        if is_mixed_case(&first.text) {
            self.report(
                command_span,
                DiagnosticKind::MixedCaseCommand {
                    command: first.text.clone(),
                },
            );
        }

        let vocabulary = self.vocabulary;
        let command = first.text.to_lowercase();
        if !vocabulary.is_known(&command) {
            self.report(
                command_span,
                DiagnosticKind::UnknownCommand {
                    command: first.text.clone(),
                },
            );
            return;
        }

        let argument = tokens.get(1);
        self.collect_symbols(&command, command_span, argument, line);

        if let Some(expected) = vocabulary.closer_for(&command) {
            self.stack.push(OpenBlock {
                opener: command.clone(),
                expected: expected.to_string(),
                line,
                span: command_span,
            });
            return;
        }

        if vocabulary.is_continuation(&command) {
            self.check_continuation(&command, command_span);
        } else if vocabulary.is_closer(&command) {
            self.check_closer(&command, command_span);
        } else if command == vocabulary.break_keyword {
            self.check_enclosed(&command, command_span, &vocabulary.loop_keyword);
        } else if command == vocabulary.return_keyword {
            self.check_enclosed(&command, command_span, &vocabulary.subroutine_keyword);
        }
    }

    fn collect_symbols(
        &mut self,
        command: &str,
        command_span: Span,
        argument: Option<&Token>,
        line: usize,
    ) {
        if command == self.vocabulary.subroutine_keyword {
            if let Some(name) = argument {
                self.local_subroutines.insert(name.text.to_lowercase());
            }
        }

        if self.vocabulary.is_include(command) {
            self.includes.push(PendingInclude {
                command: command_span,
                argument: argument.cloned(),
                line,
            });
        }

        if command == self.vocabulary.call_keyword {
            match argument {
                Some(target) => self.calls.push(PendingCall {
                    target: target.clone(),
                    line,
                }),
                None => self.report(
                    command_span,
                    DiagnosticKind::MissingCallTarget {
                        command: command.to_string(),
                    },
                ),
            }
        }
    }

    fn check_continuation(&mut self, keyword: &str, span: Span) {
        let vocabulary = self.vocabulary;
        let conditional = &vocabulary.conditional_keyword;
        let inside = self
            .stack
            .last()
            .is_some_and(|top| &top.opener == conditional);
        if !inside {
            let kind = DiagnosticKind::MisplacedContinuation {
                keyword: keyword.to_string(),
                opener: conditional.clone(),
                closer: self.closer_name(conditional),
            };
            self.report(span, kind);
        }
    }

    fn check_closer(&mut self, closer: &str, span: Span) {
        let Some(top) = self.stack.last() else {
            let kind = DiagnosticKind::UnexpectedCloser {
                closer: closer.to_string(),
            };
            self.report(span, kind);
            return;
        };

        if top.expected == closer {
            self.stack.pop();
            return;
        }

        let kind = DiagnosticKind::MismatchedCloser {
            closer: closer.to_string(),
            expected: top.expected.clone(),
            opener: top.opener.clone(),
            opened_on: top.line,
        };
        self.report(span, kind);
    }

    /// `break` and `returnsub` may sit at any depth below their block.
    fn check_enclosed(&mut self, keyword: &str, span: Span, opener: &str) {
        if self.stack.iter().any(|block| block.opener == opener) {
            return;
        }
        let fields = (keyword.to_string(), opener.to_string(), self.closer_name(opener));
        let kind = if keyword == self.vocabulary.break_keyword {
            DiagnosticKind::MisplacedBreak {
                keyword: fields.0,
                opener: fields.1,
                closer: fields.2,
            }
        } else {
            DiagnosticKind::MisplacedReturn {
                keyword: fields.0,
                opener: fields.1,
                closer: fields.2,
            }
        };
        self.report(span, kind);
    }

    fn closer_name(&self, opener: &str) -> String {
        self.vocabulary.closer_for(opener).unwrap_or_default().to_string()
    }

    fn finish(mut self, path: &Path) -> Vec<Diagnostic> {
        for block in std::mem::take(&mut self.stack) {
            self.report(
                block.span,
                DiagnosticKind::MissingCloser {
                    opener: block.opener,
                    expected: block.expected,
                },
            );
        }

        let mut visible = std::mem::take(&mut self.local_subroutines);
        let indexer = SubroutineIndexer::new(self.vocabulary);

        for include in std::mem::take(&mut self.includes) {
            let raw = include.argument.as_ref().map_or("", |t| t.text.as_str());
            match resolve_include_path(path, raw, self.vocabulary) {
                Some(target) => {
                    let index = indexer.index(&target, None);
                    visible.extend(index.definitions.into_keys());
                }
                None => {
                    let span = include
                        .argument
                        .as_ref()
                        .map_or(include.command, |t| t.span(include.line));
                    self.report(
                        span,
                        DiagnosticKind::IncludeNotFound {
                            target: strip_surrounding_quotes(raw).to_string(),
                        },
                    );
                }
            }
        }

        for call in std::mem::take(&mut self.calls) {
            let name = call.target.text.to_lowercase();
            if !visible.contains(&name) {
                let span = call.target.span(call.line);
                self.report(span, DiagnosticKind::UnknownSubroutine { name });
            }
        }

        self.diagnostics
    }
}

fn is_mixed_case(command: &str) -> bool {
    command.chars().any(|c| c.is_ascii_lowercase())
        && command.chars().any(|c| c.is_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(text: &str) -> Vec<Diagnostic> {
        validate(Path::new("/mem/main.osc"), text, &Vocabulary::default())
    }

    fn messages(text: &str) -> Vec<String> {
        check(text).iter().map(Diagnostic::message).collect()
    }

    #[test]
    fn empty_if_block_is_clean() {
        assert!(check("if a eq b\nendif\n").is_empty());
    }

    #[test]
    fn unclosed_if_reported_at_opener() {
        let diags = check("print 1\n  if a eq b\nprint 2\n");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].span, Span { line: 1, start: 2, end: 4 });
        assert_eq!(diags[0].message(), "Missing endif for if block opened here.");
    }

    #[test]
    fn stray_done() {
        let diags = check("done\n");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].span.line, 0);
        assert_eq!(diags[0].message(), "Unexpected done without a matching opener.");
    }

    #[test]
    fn mismatched_closer_does_not_pop() {
        let msgs = messages("if a eq b\ndone\nendif\n");
        assert_eq!(msgs, ["Unexpected done; expected endif for if opened on line 1."]);
    }

    #[test]
    fn mixed_case_command_warns_once() {
        let diags = check("SetI $x 1\n");
        assert_eq!(diags.len(), 1);
        assert!(!diags[0].is_error());
        assert!(check("SETI $x 1\nseti $y 2\n").is_empty());
    }

    #[test]
    fn unknown_command_skips_line_checks() {
        let msgs = messages("frobnicate\nendif-ish\n");
        assert_eq!(msgs, ["Unknown command: frobnicate", "Unknown command: endif-ish"]);
    }

    #[test]
    fn unknown_opener_is_not_pushed() {
        // `repeat` opens a block but is missing from the known tables.
        let vocab = Vocabulary::from_toml_str("[block_openers]\nrepeat = \"until\"\n")
            .expect("valid vocabulary");
        let diags = validate(Path::new("/mem/main.osc"), "repeat\nprint 1\n", &vocab);
        let msgs: Vec<_> = diags.iter().map(Diagnostic::message).collect();
        assert_eq!(msgs, ["Unknown command: repeat"]);
    }

    #[test]
    fn unknown_break_is_not_checked() {
        let vocab = Vocabulary::from_toml_str("control_keywords = [\"while\"]\n")
            .expect("valid vocabulary");
        let diags = validate(Path::new("/mem/main.osc"), "break\n", &vocab);
        let msgs: Vec<_> = diags.iter().map(Diagnostic::message).collect();
        assert_eq!(msgs, ["Unknown command: break"]);
    }

    #[test]
    fn comment_glued_to_call_target() {
        let msgs = messages("subroutine foo\nendsubroutine\ngosub foo#note\n");
        assert_eq!(
            msgs,
            ["Inline comments are not allowed. Comments must start the line with #."]
        );
    }

    #[test]
    fn comment_glued_to_command_keeps_command() {
        let diags = check("endif# closing\n");
        assert_eq!(diags.len(), 2);
        assert_eq!(diags[1].message(), "Unexpected endif without a matching opener.");
        assert_eq!(diags[1].span, Span { line: 0, start: 0, end: 5 });
    }

    #[test]
    fn inline_comment_warns_and_line_still_checked() {
        let diags = check("seti $x 1 # note\ndone # stray\n");
        assert_eq!(diags.len(), 3);
        assert_eq!(diags[0].span, Span { line: 0, start: 10, end: 16 });
        assert!(!diags[0].is_error());
        assert_eq!(diags[2].message(), "Unexpected done without a matching opener.");
    }

    #[test]
    fn quoted_hash_is_not_a_comment() {
        assert!(check("print \"#1\"\n").is_empty());
    }

    #[test]
    fn continuation_outside_if() {
        let msgs = messages("else\nwhile x\nelseif y\ndone\n");
        assert_eq!(
            msgs,
            [
                "else must appear inside an if/endif block.",
                "elseif must appear inside an if/endif block."
            ]
        );
        assert!(check("if a\nelseif b\nelse\nendif\n").is_empty());
    }

    #[test]
    fn break_nested_in_conditional_inside_loop() {
        assert!(check("while a\nif b\nbreak\nendif\ndone\n").is_empty());
        assert_eq!(
            messages("if b\nbreak\nendif\n"),
            ["break must be used inside a while/done block."]
        );
    }

    #[test]
    fn returnsub_needs_subroutine() {
        assert_eq!(
            messages("returnsub\n"),
            ["returnsub must be used inside a subroutine/endsubroutine block."]
        );
        assert!(check("subroutine s\nwhile a\nreturnsub\ndone\nendsubroutine\n").is_empty());
    }

    #[test]
    fn gosub_without_target() {
        let msgs = messages("gosub\n");
        assert_eq!(msgs, ["gosub requires a subroutine name."]);
    }

    #[test]
    fn unknown_subroutine_then_defined_later() {
        let diags = check("gosub foo\n");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].message(), "Unknown subroutine: foo");
        assert_eq!(diags[0].span, Span { line: 0, start: 6, end: 9 });

        assert!(check("gosub FOO\nsubroutine foo\nendsubroutine\n").is_empty());
    }

    #[test]
    fn missing_include() {
        let diags = check("include \"nowhere.osc\"\n");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].message(), "Included script not found: nowhere.osc");
        assert_eq!(diags[0].span, Span { line: 0, start: 8, end: 21 });

        let diags = check("loadscript\n");
        assert_eq!(diags[0].message(), "Included script not found: (missing path)");
        assert_eq!(diags[0].span, Span { line: 0, start: 0, end: 10 });
    }

    #[test]
    fn every_open_block_reported() {
        let msgs = messages("subroutine a\nsetbuffer 0\n");
        assert_eq!(
            msgs,
            [
                "Missing endsubroutine for subroutine block opened here.",
                "Missing endbuffer for setbuffer block opened here."
            ]
        );
    }

    #[test]
    fn mixed_case_opener_still_pushes() {
        let diags = check("While x\ndone\n");
        assert_eq!(diags.len(), 1);
        assert!(matches!(diags[0].kind, DiagnosticKind::MixedCaseCommand { .. }));
    }
}
