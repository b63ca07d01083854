//! Line-oriented interactive loop over a [`Calculator`].

use std::io::{self, BufRead, Write};

use abacus_engine::{Calculator, CalculatorError};

/// Printed when Ctrl-C arrives; the session keeps running.
pub const INTERRUPT_HINT: &str =
    "Interrupted. Type 'cancel' to abort an operation or 'exit' to save and quit.";

enum Input {
    Line(String),
    Cancelled,
    Eof,
}

/// Run the REPL until `exit` or end of input.
pub fn run<R: BufRead, W: Write>(calc: &mut Calculator, mut input: R, mut out: W) -> io::Result<()> {
    writeln!(out, "Calculator started. Type 'help' for commands.")?;

    loop {
        let command = match prompt(&mut input, &mut out, "\nEnter command: ")? {
            Input::Line(line) => line.to_lowercase(),
            Input::Cancelled => continue,
            Input::Eof => {
                writeln!(out, "\nInput terminated. Exiting...")?;
                break;
            }
        };

        match command.as_str() {
            "" => {}
            "help" => print_help(calc, &mut out)?,
            "exit" => {
                match calc.save_history() {
                    Ok(()) => writeln!(out, "History saved successfully.")?,
                    Err(e) => writeln!(out, "Warning: Could not save history: {e}")?,
                }
                writeln!(out, "Goodbye!")?;
                break;
            }
            "history" => {
                let mut entries = calc.show_history().peekable();
                if entries.peek().is_none() {
                    writeln!(out, "No calculations in history")?;
                } else {
                    writeln!(out, "\nCalculation History:")?;
                    for entry in entries {
                        writeln!(out, "{entry}")?;
                    }
                }
            }
            "clear" => {
                calc.clear_history();
                writeln!(out, "History cleared")?;
            }
            "undo" => match calc.undo() {
                Ok(()) => writeln!(out, "Operation undone")?,
                Err(CalculatorError::NothingToUndo) => writeln!(out, "Nothing to undo")?,
                Err(e) => writeln!(out, "Error: {e}")?,
            },
            "redo" => match calc.redo() {
                Ok(()) => writeln!(out, "Operation redone")?,
                Err(CalculatorError::NothingToRedo) => writeln!(out, "Nothing to redo")?,
                Err(e) => writeln!(out, "Error: {e}")?,
            },
            "save" => match calc.save_history() {
                Ok(()) => writeln!(out, "History saved successfully")?,
                Err(e) => writeln!(out, "Error saving history: {e}")?,
            },
            "load" => match calc.load_history() {
                Ok(()) => writeln!(out, "History loaded successfully")?,
                Err(e) => writeln!(out, "Error loading history: {e}")?,
            },
            name if calc.registry().contains(name) => {
                if !run_operation(calc, name, &mut input, &mut out)? {
                    writeln!(out, "\nInput terminated. Exiting...")?;
                    break;
                }
            }
            other => writeln!(
                out,
                "Unknown command: '{other}'. Type 'help' for available commands."
            )?,
        }
    }
    Ok(())
}

/// Prompt for both operands and perform `name`. Returns false on end of input.
fn run_operation<R: BufRead, W: Write>(
    calc: &mut Calculator,
    name: &str,
    input: &mut R,
    out: &mut W,
) -> io::Result<bool> {
    writeln!(out, "\nEnter numbers (or 'cancel' to abort):")?;
    let a = match prompt(input, out, "First number: ")? {
        Input::Line(line) => line,
        Input::Cancelled => {
            writeln!(out, "Operation cancelled")?;
            return Ok(true);
        }
        Input::Eof => return Ok(false),
    };
    let b = match prompt(input, out, "Second number: ")? {
        Input::Line(line) => line,
        Input::Cancelled => {
            writeln!(out, "Operation cancelled")?;
            return Ok(true);
        }
        Input::Eof => return Ok(false),
    };

    match calc.perform_operation(name, &a, &b) {
        Ok(result) => writeln!(out, "\nResult: {}", calc.config().format_result(result))?,
        Err(e) => writeln!(out, "Error: {e}")?,
    }
    Ok(true)
}

fn prompt<R: BufRead, W: Write>(input: &mut R, out: &mut W, label: &str) -> io::Result<Input> {
    write!(out, "{label}")?;
    out.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(Input::Eof);
    }
    let line = line.trim();
    if line.eq_ignore_ascii_case("cancel") {
        return Ok(Input::Cancelled);
    }
    Ok(Input::Line(line.to_string()))
}

fn print_help<W: Write>(calc: &Calculator, out: &mut W) -> io::Result<()> {
    let operations: Vec<&str> = calc.registry().names().collect();
    writeln!(out, "\nAvailable commands:")?;
    writeln!(out, "  {} - Perform calculations", operations.join(", "))?;
    writeln!(out, "  history - Show calculation history")?;
    writeln!(out, "  clear - Clear calculation history")?;
    writeln!(out, "  undo - Undo the last calculation")?;
    writeln!(out, "  redo - Redo the last undone calculation")?;
    writeln!(out, "  save - Save calculation history to file")?;
    writeln!(out, "  load - Load calculation history from file")?;
    writeln!(out, "  exit - Exit the calculator")?;
    Ok(())
}
