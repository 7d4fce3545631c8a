use std::fmt;
use std::io::{self, Write};

use idiom_core::session::CardSide;
use services::{CardView, Command, CommandOutcome, DueStatus, EntryRow, SessionStats};

/// One line of user input, translated for the study loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellInput {
    Command(Command),
    Stats,
    Help,
    Quit,
    Nothing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    Unknown(String),
    InvalidEntry(String),
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputError::Unknown(raw) => write!(f, "unknown command: {raw} (type `help`)"),
            InputError::InvalidEntry(raw) => {
                write!(f, "invalid entry number: {raw} (entries are numbered from 1)")
            }
        }
    }
}

impl std::error::Error for InputError {}

/// Parse a typed line. Entry numbers are 1-based, as printed by the list.
pub fn parse_input(line: &str) -> Result<ShellInput, InputError> {
    let mut words = line.split_whitespace();
    let Some(first) = words.next() else {
        return Ok(ShellInput::Nothing);
    };

    match first.to_ascii_lowercase().as_str() {
        "quit" | "exit" | "q" => return Ok(ShellInput::Quit),
        "help" | "?" => return Ok(ShellInput::Help),
        "stats" => return Ok(ShellInput::Stats),
        "select" | "go" => {
            let raw = words.next().unwrap_or_default();
            return parse_entry(raw).map(|index| ShellInput::Command(Command::Select(index)));
        }
        _ => {}
    }

    if first.chars().all(|c| c.is_ascii_digit()) {
        return parse_entry(first).map(|index| ShellInput::Command(Command::Select(index)));
    }

    Command::from_action(first)
        .map(ShellInput::Command)
        .ok_or_else(|| InputError::Unknown(first.to_owned()))
}

fn parse_entry(raw: &str) -> Result<usize, InputError> {
    raw.parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .ok_or_else(|| InputError::InvalidEntry(raw.to_owned()))
}

pub fn print_help(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "Commands:")?;
    writeln!(out, "  flip                 show the other side of the card")?;
    writeln!(out, "  again | good | easy  record a review (+1 / +3 / +7 days) and move on")?;
    writeln!(out, "  next | previous      move without reviewing")?;
    writeln!(out, "  select <n> | <n>     jump to entry n of the list")?;
    writeln!(out, "  list                 show or hide the entries list")?;
    writeln!(out, "  stats                show deck counts")?;
    writeln!(out, "  quit")
}

fn due_text(due: &DueStatus) -> String {
    if due.is_overdue() {
        format!("{due} (overdue)")
    } else {
        due.to_string()
    }
}

pub fn render_card(out: &mut impl Write, view: &CardView) -> io::Result<()> {
    writeln!(out)?;
    writeln!(
        out,
        "[{}/{}] #{}  due: {}",
        view.index + 1,
        view.total,
        view.id,
        due_text(&view.due)
    )?;

    let mut meta = Vec::new();
    if let Some(category) = &view.category {
        meta.push(format!("Category: {category}"));
    }
    if let Some(level) = &view.level {
        meta.push(format!("Level: {level}"));
    }
    if !meta.is_empty() {
        writeln!(out, "{}", meta.join("   "))?;
    }

    match view.side {
        CardSide::Front => {
            writeln!(out, "  {}", view.front_text)?;
            if let Some(image) = &view.image {
                writeln!(out, "  [image: {image}]")?;
            }
            writeln!(out, "(front; type `flip` to reveal)")
        }
        CardSide::Back => {
            writeln!(out, "  {}", view.back_emoji)?;
            for line in &view.details {
                writeln!(out, "  {}: {}", line.label, line.text)?;
            }
            writeln!(out, "(back; rate with again / good / easy)")
        }
    }
}

pub fn render_entries(out: &mut impl Write, rows: &[EntryRow]) -> io::Result<()> {
    writeln!(out, "     #  ID        Idiom                                    Due")?;
    for row in rows {
        let marker = if row.highlighted { '>' } else { ' ' };
        writeln!(
            out,
            "{marker} {:>4}  {:<8}  {:<40} {}",
            row.index + 1,
            row.id,
            row.idiom,
            due_text(&row.due)
        )?;
    }
    Ok(())
}

pub fn render_stats(out: &mut impl Write, stats: &SessionStats) -> io::Result<()> {
    writeln!(
        out,
        "{} cards: {} due ({} overdue), {} unseen, {} reviewed this session",
        stats.total, stats.due_now, stats.overdue, stats.unseen, stats.reviewed
    )
}

pub fn render_outcome(out: &mut impl Write, outcome: &CommandOutcome) -> io::Result<()> {
    match outcome {
        CommandOutcome::Reviewed(result) => {
            write!(
                out,
                "{} -> next due {}",
                result.log.outcome, result.log.due_date
            )?;
            if result.persisted {
                writeln!(out)
            } else {
                writeln!(out, " (not saved)")
            }
        }
        CommandOutcome::Flipped(_)
        | CommandOutcome::Moved { .. }
        | CommandOutcome::ListToggled { .. } => Ok(()),
    }
}
