//! The read-eval-print loop.
//!
//! Each line is dispatched against the session and its output printed.
//! Command errors are printed and the loop continues. An interrupt while a
//! command runs drops that command and prints `^C`; an interrupt at the
//! prompt, `quit` or end of input ends the session.

use std::io::Write;

use tfs_core::Session;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::commands::{self, CommandOutput};
use crate::output::Printer;

/// Run the loop until the session ends, then close the session.
pub async fn run<R, W>(
    session: &mut Session,
    input: R,
    printer: &mut Printer<W>,
    interactive: bool,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    loop {
        if interactive {
            printer.print_prompt(&session.prompt())?;
        }
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            break;
        };

        let result = tokio::select! {
            result = commands::dispatch(session, &line) => result,
            _ = tokio::signal::ctrl_c() => {
                tracing::debug!(line = %line, "command interrupted");
                printer.print_message("^C")?;
                continue;
            }
        };
        match result {
            Ok(CommandOutput::Exit) => break,
            Ok(output) => printer.print_output(&output)?,
            Err(err) => {
                tracing::debug!(line = %line, error = %err, "command failed");
                printer.print_error(&err)?;
            }
        }
    }

    if interactive {
        printer.print_message("bye")?;
    }
    if let Err(err) = session.close() {
        tracing::error!(error = %err, "failed to close session");
        printer.print_error(&err)?;
    }
    Ok(())
}

/// Run a single line. Returns whether the command succeeded.
pub async fn run_once<W: Write>(session: &mut Session, line: &str, printer: &mut Printer<W>) -> anyhow::Result<bool> {
    let ok = match commands::dispatch(session, line).await {
        Ok(output) => {
            printer.print_output(&output)?;
            true
        }
        Err(err) => {
            printer.print_error(&err)?;
            false
        }
    };
    session.close()?;
    Ok(ok)
}
