//! Interactive selection boundary.
//!
//! The pipeline depends on a capability, not a widget: given a titled list of
//! pre-selected items, return which remain selected or whether the user
//! canceled. Cancellation aborts the destructive step entirely; an empty
//! selection means "nothing to do". Neither is an error.

use anyhow::{Context, Result};
use colored::Colorize;
use std::io::{BufRead, Write};

/// One selectable row: a label (path), a detail column (size or manager
/// name), and its current selection state.
#[derive(Debug, Clone)]
pub struct SelectableItem {
    pub label: String,
    pub detail: String,
    pub selected: bool,
}

impl SelectableItem {
    pub fn new(label: impl Into<String>, detail: impl Into<String>) -> Self {
        SelectableItem {
            label: label.into(),
            detail: detail.into(),
            selected: true,
        }
    }
}

/// Outcome of one selection interaction.
#[derive(Debug)]
pub struct Selection {
    pub items: Vec<SelectableItem>,
    pub canceled: bool,
}

/// The capability the flows consume. Implementations own the interaction
/// loop; the pipeline never mutates `selected` itself.
pub trait Selector {
    fn select(&self, title: &str, items: Vec<SelectableItem>) -> Result<Selection>;
}

/// Line-oriented terminal checklist. Prints the numbered item list, then
/// reads commands from stdin until the selection is confirmed or canceled.
pub struct TermSelector;

impl Selector for TermSelector {
    fn select(&self, title: &str, items: Vec<SelectableItem>) -> Result<Selection> {
        let stdin = std::io::stdin();
        let mut input = stdin.lock();
        let stdout = std::io::stdout();
        let mut output = stdout.lock();
        run_selection(title, items, &mut input, &mut output)
    }
}

/// The interaction loop, split out from the terminal wiring so it can be
/// driven by a scripted reader in tests.
fn run_selection<R: BufRead, W: Write>(
    title: &str,
    mut items: Vec<SelectableItem>,
    input: &mut R,
    output: &mut W,
) -> Result<Selection> {
    writeln!(output, "\n{}", title.bold())?;
    render_items(&items, output)?;
    writeln!(
        output,
        "{}",
        "Toggle with numbers (comma separated), 'a' all, 'n' none, 'i' invert; \
         blank line confirms, 'q' cancels."
            .dimmed()
    )?;

    loop {
        write!(output, "> ")?;
        output.flush()?;

        let mut line = String::new();
        let read = input
            .read_line(&mut line)
            .context("failed to read selection input")?;
        // EOF counts as cancellation: never delete on a closed stdin.
        if read == 0 {
            return Ok(Selection {
                items,
                canceled: true,
            });
        }

        match line.trim() {
            "" => {
                return Ok(Selection {
                    items,
                    canceled: false,
                })
            }
            "q" | "Q" => {
                return Ok(Selection {
                    items,
                    canceled: true,
                })
            }
            "a" => items.iter_mut().for_each(|i| i.selected = true),
            "n" => items.iter_mut().for_each(|i| i.selected = false),
            "i" => items.iter_mut().for_each(|i| i.selected = !i.selected),
            other => {
                for token in other.split(',') {
                    match token.trim().parse::<usize>() {
                        Ok(n) if n >= 1 && n <= items.len() => {
                            items[n - 1].selected = !items[n - 1].selected;
                        }
                        _ => {
                            writeln!(output, "{}", format!("ignored: '{}'", token.trim()).yellow())?;
                        }
                    }
                }
            }
        }
        render_items(&items, output)?;
    }
}

fn render_items<W: Write>(items: &[SelectableItem], output: &mut W) -> Result<()> {
    for (i, item) in items.iter().enumerate() {
        let mark = if item.selected { "[x]" } else { "[ ]" };
        writeln!(
            output,
            "{:>3}. {} {}  {}",
            i + 1,
            mark,
            item.label,
            item.detail.cyan()
        )?;
    }
    let count = items.iter().filter(|i| i.selected).count();
    writeln!(output, "{}", format!("  {count}/{} selected", items.len()).dimmed())?;
    Ok(())
}
