use form_core::{FormCommand, OutcomeKind, RowsPerPage};
use shared::domain::{Certainty, EntryId};
use thiserror::Error;

pub const HELP: &str = "\
reason <text>                      set \"the reason we exist\"
tag add <text> | tag rm <text>     add or remove a person served
tag input <text> | tag enter       type into the tag field, press Enter
tag backspace | tag pop            backspace in the tag field, drop last tag
assume add <text>                  add an assumption
assume new <text> | assume submit  type into the add-new row, press Enter
assume edit <id> | assume draft <text> | assume commit | assume cancel
assume rm <id> | assume certainty <id> <very|moderate|uncertain>
assume rows <5|10|20> | assume page <n> | assume prev | assume next
outcome <direct|indirect|ultimate> add <text> | edit <id> | draft <text>
outcome <kind> commit | cancel | rm <id> | toggle
show | json | save | help | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorCommand {
    Form(FormCommand),
    Save,
    Show,
    Json,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command '{0}' (try 'help')")]
    Unknown(String),
    #[error("missing {0}")]
    Missing(&'static str),
    #[error("invalid {what}: '{value}'")]
    Invalid { what: &'static str, value: String },
}

/// Splits off the first word. The remainder keeps its spacing apart from the one
/// separating space, so drafts can carry leading or trailing blanks.
fn split_word(input: &str) -> (&str, &str) {
    let input = input.trim_start();
    match input.find(char::is_whitespace) {
        Some(at) => {
            let rest = &input[at..];
            let separator = rest.chars().next().map_or(0, char::len_utf8);
            (&input[..at], &rest[separator..])
        }
        None => (input, ""),
    }
}

fn required<'a>(value: &'a str, what: &'static str) -> Result<&'a str, CommandError> {
    if value.trim().is_empty() {
        Err(CommandError::Missing(what))
    } else {
        Ok(value)
    }
}

fn entry_id(value: &str) -> Result<EntryId, CommandError> {
    required(value, "entry id").map(|id| EntryId::new(id.trim()))
}

pub fn parse(line: &str) -> Result<EditorCommand, CommandError> {
    let (verb, rest) = split_word(line.trim_end_matches(['\r', '\n']));
    let command = match verb {
        "" | "show" => EditorCommand::Show,
        "json" => EditorCommand::Json,
        "save" => EditorCommand::Save,
        "help" | "?" => EditorCommand::Help,
        "quit" | "exit" => EditorCommand::Quit,
        "reason" => EditorCommand::Form(FormCommand::SetReason(rest.to_string())),
        "tag" => EditorCommand::Form(parse_tag(rest)?),
        "assume" | "assumption" => EditorCommand::Form(parse_assumption(rest)?),
        "outcome" => EditorCommand::Form(parse_outcome(rest)?),
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(command)
}

fn parse_tag(input: &str) -> Result<FormCommand, CommandError> {
    let (action, rest) = split_word(input);
    let command = match action {
        "add" => FormCommand::AddTag(rest.to_string()),
        "rm" | "remove" => FormCommand::RemoveTag(required(rest, "tag")?.trim().to_string()),
        "input" => FormCommand::SetTagInput(rest.to_string()),
        "enter" => FormCommand::SubmitTagInput,
        "backspace" => FormCommand::TagBackspace,
        "pop" => FormCommand::RemoveLastTag,
        "" => return Err(CommandError::Missing("tag action")),
        other => return Err(CommandError::Unknown(format!("tag {other}"))),
    };
    Ok(command)
}

fn parse_assumption(input: &str) -> Result<FormCommand, CommandError> {
    let (action, rest) = split_word(input);
    let command = match action {
        "add" => FormCommand::AddAssumption(rest.to_string()),
        "new" => FormCommand::SetNewAssumptionText(rest.to_string()),
        "submit" => FormCommand::SubmitNewAssumption,
        "edit" => FormCommand::StartEditAssumption(entry_id(rest)?),
        "draft" => FormCommand::UpdateAssumptionDraft(rest.to_string()),
        "commit" => FormCommand::CommitAssumptionEdit,
        "cancel" => FormCommand::CancelAssumptionEdit,
        "rm" | "delete" => FormCommand::DeleteAssumption(entry_id(rest)?),
        "certainty" => {
            let (id, level) = split_word(rest);
            let id = entry_id(id)?;
            let level = required(level, "certainty")?;
            let certainty = Certainty::parse(level).ok_or_else(|| CommandError::Invalid {
                what: "certainty",
                value: level.trim().to_string(),
            })?;
            FormCommand::SetCertainty { id, certainty }
        }
        "rows" => {
            let raw = required(rest, "rows per page")?.trim();
            let rows = raw
                .parse()
                .ok()
                .and_then(RowsPerPage::from_count)
                .ok_or_else(|| CommandError::Invalid {
                    what: "rows per page",
                    value: raw.to_string(),
                })?;
            FormCommand::SetRowsPerPage(rows)
        }
        "page" => {
            let raw = required(rest, "page number")?.trim();
            let page = raw
                .parse::<usize>()
                .ok()
                .filter(|page| *page >= 1)
                .ok_or_else(|| CommandError::Invalid {
                    what: "page number",
                    value: raw.to_string(),
                })?;
            FormCommand::SetAssumptionPage(page - 1)
        }
        "prev" => FormCommand::PreviousAssumptionPage,
        "next" => FormCommand::NextAssumptionPage,
        "" => return Err(CommandError::Missing("assumption action")),
        other => return Err(CommandError::Unknown(format!("assume {other}"))),
    };
    Ok(command)
}

fn parse_outcome(input: &str) -> Result<FormCommand, CommandError> {
    let (kind, rest) = split_word(input);
    let kind = OutcomeKind::parse(required(kind, "outcome list")?).ok_or_else(|| {
        CommandError::Invalid {
            what: "outcome list",
            value: kind.to_string(),
        }
    })?;

    let (action, rest) = split_word(rest);
    let command = match action {
        "add" => FormCommand::AddOutcome {
            kind,
            text: rest.to_string(),
        },
        "edit" => FormCommand::StartEditOutcome {
            kind,
            id: entry_id(rest)?,
        },
        "draft" => FormCommand::UpdateOutcomeDraft {
            kind,
            text: rest.to_string(),
        },
        "commit" => FormCommand::CommitOutcomeEdit(kind),
        "cancel" => FormCommand::CancelOutcomeEdit(kind),
        "rm" | "delete" => FormCommand::DeleteOutcome {
            kind,
            id: entry_id(rest)?,
        },
        "toggle" => FormCommand::ToggleOutcomes(kind),
        "" => return Err(CommandError::Missing("outcome action")),
        other => return Err(CommandError::Unknown(format!("outcome {other}"))),
    };
    Ok(command)
}

#[cfg(test)]
#[path = "tests/commands_tests.rs"]
mod tests;
