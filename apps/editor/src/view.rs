use std::{fmt::Write, time::Instant};

use chrono::Local;
use form_core::{DraftEditing, FormAggregator, OutcomeKind, OutcomeList, REASON_MAX_CHARS};

pub fn render(form: &FormAggregator, now: Instant) -> String {
    let mut out = String::new();

    let reason_len = form.reason().chars().count();
    let _ = writeln!(out, "The reason we exist ({reason_len}/{REASON_MAX_CHARS})");
    let _ = writeln!(out, "  {}", placeholder(form.reason(), "(empty)"));

    let tags = form.tags();
    let _ = writeln!(out, "\nPeople we serve");
    let chips: Vec<String> = tags.tags().iter().map(|tag| format!("[{tag} x]")).collect();
    let _ = writeln!(out, "  {} > {}", chips.join(" "), tags.input());

    render_assumptions(&mut out, form);
    for kind in OutcomeKind::ALL {
        render_outcomes(&mut out, form.outcomes(kind));
    }

    let _ = writeln!(out, "\n{}", status_line(form, now));
    out
}

fn placeholder<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() {
        fallback
    } else {
        value
    }
}

fn render_assumptions(out: &mut String, form: &FormAggregator) {
    let table = form.assumptions();
    let _ = writeln!(out, "\nAssumptions ({} per page)", table.rows_per_page());
    for row in table.visible_rows() {
        let description = match table.draft() {
            Some(draft) if draft.target == row.id => format!("{}_ (editing)", draft.text),
            _ => row.description.clone(),
        };
        let _ = writeln!(
            out,
            "  {:<6} {:<20} {}",
            row.id.as_str(),
            row.certainty.label(),
            description
        );
    }
    let _ = writeln!(out, "  + {}", placeholder(table.new_row_text(), "Add new assumption"));

    let summary = table.page_summary();
    let previous = if summary.has_previous() { "<" } else { " " };
    let next = if summary.has_next() { ">" } else { " " };
    let _ = writeln!(
        out,
        "  {}   {previous} {} {next}",
        summary.showing_label(),
        summary.page_label()
    );
}

fn render_outcomes(out: &mut String, list: &OutcomeList) {
    let style = list.style();
    let _ = writeln!(out, "\n{} ({})", style.title, style.border_color.to_hex());
    let _ = writeln!(out, "  {}", style.subtitle);
    for (index, item) in list.visible().iter().enumerate() {
        let marker = if list.is_highlighted(index) { "*" } else { "-" };
        let text = match list.draft() {
            Some(draft) if draft.target == item.id => format!("{}_ (editing)", draft.text),
            _ => item.text.clone(),
        };
        let _ = writeln!(out, "  {marker} {:<6} {text}", item.id.as_str());
    }
    if list.shows_toggle() {
        let label = if list.is_expanded() { "Show less" } else { "Show more" };
        let hidden = list.len() - list.visible().len();
        if hidden > 0 {
            let _ = writeln!(out, "  {label} (+{hidden})");
        } else {
            let _ = writeln!(out, "  {label}");
        }
    }
    let _ = writeln!(
        out,
        "  [{}] ({} on {})",
        style.footer_text,
        style.footer_foreground.to_hex(),
        style.footer_background.to_hex()
    );
}

pub fn status_line(form: &FormAggregator, now: Instant) -> String {
    let mut parts = Vec::new();
    if let Some(message) = form.confirmation_message(now) {
        parts.push(message.to_string());
    }
    if let Some(failure) = form.last_failure() {
        parts.push(format!("Save failed: {}", failure.message));
    }
    parts.push(if form.is_dirty() {
        "unsaved changes".to_string()
    } else {
        "no unsaved changes".to_string()
    });
    if let Some(saved_at) = form.last_saved_at() {
        parts.push(format!(
            "last saved {}",
            saved_at.with_timezone(&Local).format("%H:%M:%S")
        ));
    }
    parts.join(" | ")
}

#[cfg(test)]
#[path = "tests/view_tests.rs"]
mod tests;
