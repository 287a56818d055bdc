//! Line-driven front-end for the explorer form.
//!
//! Each input line either sets a control or fires an [`Event`] through the
//! wired [`EventRouter`]. Handler failures are printed and the session
//! keeps going; only I/O errors on the terminal end it.

use std::io::{BufRead, Write};

use crate::error::DataScoutError;
use crate::hub::{DatasetHub, Split};

use super::{Event, EventRouter, FormState, MAX_EXAMPLES, MIN_EXAMPLES};

const HELP: &str = "\
Commands:
  search [QUERY]      search dataset ids (empty query lists the first results)
  select [N|ID]       pick a dataset by result number or id (no argument clears)
  split SPLIT         train, test, or validation
  examples N          number of example rows (1-20)
  explore             show schema, examples and statistics
  column NAME         column to export
  export              export the chosen column as CSV
  show                print the current form values
  help                this text
  quit                leave the session";

/// Whether the session should keep reading input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Interactive explorer session over any [`DatasetHub`].
pub struct Shell<'a> {
    hub: &'a dyn DatasetHub,
    router: EventRouter,
    state: FormState,
}

impl<'a> Shell<'a> {
    pub fn new(hub: &'a dyn DatasetHub) -> Self {
        Self::with_router(hub, EventRouter::wired())
    }

    pub fn with_router(hub: &'a dyn DatasetHub, router: EventRouter) -> Self {
        Self {
            hub,
            router,
            state: FormState::default(),
        }
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    /// Read commands until `quit` or end of input.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> Result<(), DataScoutError> {
        writeln!(out, "DataScout - Hugging Face dataset explorer. Type 'help' for commands.")?;
        write!(out, "> ")?;
        out.flush()?;

        for line in input.lines() {
            if self.execute(&line?, out)? == Flow::Quit {
                return Ok(());
            }
            write!(out, "> ")?;
            out.flush()?;
        }
        writeln!(out)?;
        Ok(())
    }

    /// Execute a single command line.
    pub fn execute<W: Write>(&mut self, line: &str, out: &mut W) -> Result<Flow, DataScoutError> {
        let line = line.trim();
        let (command, arg) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        match command {
            "" => {}
            "quit" | "exit" => return Ok(Flow::Quit),
            "help" => writeln!(out, "{HELP}")?,
            "search" => {
                self.state.query = arg.to_string();
                if self.fire(Event::SearchClicked, out)? {
                    self.print_results(out)?;
                }
            }
            "select" => {
                self.state.selected = self.resolve_selection(arg);
                if self.fire(Event::DatasetChanged, out)? {
                    match self.state.selected.as_deref() {
                        Some(dataset) => writeln!(
                            out,
                            "Selected {dataset}. Columns: {}",
                            self.state.column_choices.join(", ")
                        )?,
                        None => writeln!(out, "Selection cleared.")?,
                    }
                }
            }
            "split" => match arg.parse::<Split>() {
                Ok(split) => {
                    self.state.split = split;
                    writeln!(out, "Split: {split}")?;
                }
                Err(message) => writeln!(out, "Error: {message}")?,
            },
            "examples" => match arg.parse::<usize>() {
                Ok(n) if (MIN_EXAMPLES..=MAX_EXAMPLES).contains(&n) => {
                    self.state.num_examples = n;
                    writeln!(out, "Examples: {n}")?;
                }
                _ => writeln!(
                    out,
                    "Error: example count must be a number from {MIN_EXAMPLES} to {MAX_EXAMPLES}"
                )?,
            },
            "explore" => {
                if self.fire(Event::ExploreClicked, out)? {
                    if let Some(report) = self.state.report.as_ref() {
                        write!(out, "{report}")?;
                    }
                }
            }
            "column" => {
                self.state.column = (!arg.is_empty()).then(|| arg.to_string());
                writeln!(out, "Column: {}", self.state.column.as_deref().unwrap_or("-"))?;
            }
            "export" => {
                if self.fire(Event::ExportClicked, out)? {
                    if let Some(export) = self.state.export.as_ref() {
                        writeln!(out, "{}", export.status)?;
                        write!(out, "{}", export.csv)?;
                    }
                }
            }
            "show" => self.print_state(out)?,
            other => writeln!(out, "Unknown command '{other}' (type 'help')")?,
        }

        Ok(Flow::Continue)
    }

    /// Dispatch `event`; handler errors are shown, not propagated.
    fn fire<W: Write>(&mut self, event: Event, out: &mut W) -> Result<bool, DataScoutError> {
        match self.router.dispatch(event, &mut self.state, self.hub) {
            Ok(()) => Ok(true),
            Err(error) => {
                writeln!(out, "Error: {error}")?;
                Ok(false)
            }
        }
    }

    /// A result number (1-based) picks from the last search, anything else
    /// is taken as a dataset id.
    fn resolve_selection(&self, arg: &str) -> Option<String> {
        if arg.is_empty() {
            return None;
        }
        arg.parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|idx| self.state.results.get(idx).cloned())
            .or_else(|| Some(arg.to_string()))
    }

    fn print_results<W: Write>(&self, out: &mut W) -> Result<(), DataScoutError> {
        if self.state.results.is_empty() {
            writeln!(out, "No datasets found.")?;
        }
        for (idx, id) in self.state.results.iter().enumerate() {
            writeln!(out, "{:>3}. {}", idx + 1, id)?;
        }
        Ok(())
    }

    fn print_state<W: Write>(&self, out: &mut W) -> Result<(), DataScoutError> {
        let s = &self.state;
        writeln!(out, "Query:    {}", s.query)?;
        writeln!(out, "Results:  {}", s.results.len())?;
        writeln!(out, "Dataset:  {}", s.selected.as_deref().unwrap_or("-"))?;
        writeln!(out, "Split:    {}", s.split)?;
        writeln!(out, "Examples: {}", s.num_examples)?;
        writeln!(out, "Columns:  {}", s.column_choices.join(", "))?;
        writeln!(out, "Column:   {}", s.column.as_deref().unwrap_or("-"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use serde_json::json;

    use super::*;
    use crate::app::DEFAULT_EXAMPLES;
    use crate::hub::MemoryHub;
    use crate::table::SplitTable;

    fn reviews() -> SplitTable {
        SplitTable::new(
            vec!["text".into(), "label".into()],
            vec!["T".into(), "L".into()],
            vec![
                vec![json!("good"), json!(1)],
                vec![json!("bad"), json!(0)],
            ],
        )
    }

    fn hub() -> MemoryHub {
        MemoryHub::with_ids(["glue", "stanfordnlp/imdb"])
            .with_split("stanfordnlp/imdb", Split::Train, reviews())
            .with_split("stanfordnlp/imdb", Split::Test, reviews())
    }

    fn session<'a>(hub: &'a MemoryHub, script: &str) -> (Shell<'a>, String) {
        let mut shell = Shell::new(hub);
        let mut out = Vec::new();
        shell
            .run(Cursor::new(script.to_string()), &mut out)
            .expect("run session");
        (shell, String::from_utf8(out).expect("utf8"))
    }

    #[test]
    fn search_select_export_walkthrough() {
        let hub = hub();
        let (shell, out) = session(
            &hub,
            "search imdb\nselect 1\nsplit test\ncolumn label\nexport\nquit\n",
        );

        assert!(out.contains("  1. stanfordnlp/imdb"));
        assert!(out.contains("Columns: text, label"));
        assert!(out.contains("CSV für Spalte 'label' erzeugt.\nlabel\n1\n0\n"));
        assert_eq!(shell.state().split, Split::Test);
    }

    #[test]
    fn handler_errors_do_not_end_the_session() {
        let hub = hub();
        let (shell, out) = session(&hub, "explore\nselect unknown/ds\nexamples 3\n");

        assert!(out.contains("Error: No dataset selected"));
        assert!(out.contains("Error: Hugging Face Hub API error for unknown/ds"));
        assert_eq!(shell.state().num_examples, 3);
    }

    #[test]
    fn out_of_range_controls_are_rejected() {
        let hub = hub();
        let (shell, out) = session(&hub, "examples 0\nexamples 21\nsplit dev\n");

        assert_eq!(out.matches("example count must be a number").count(), 2);
        assert!(out.contains("unknown split 'dev'"));
        assert_eq!(shell.state().num_examples, DEFAULT_EXAMPLES);
        assert_eq!(shell.state().split, Split::Train);
    }

    #[test]
    fn export_of_unknown_column_prints_status() {
        let hub = hub();
        let (_, out) = session(&hub, "select stanfordnlp/imdb\ncolumn nonexistent_col\nexport\n");
        assert!(out.contains("Spalte nicht gefunden."));
    }

    #[test]
    fn explore_prints_report() {
        let hub = hub();
        let (_, out) = session(&hub, "select stanfordnlp/imdb\nexamples 1\nexplore\n");
        assert!(out.contains("stanfordnlp/imdb (train)"));
        assert!(out.contains("Anzahl Samples"));
    }
}
