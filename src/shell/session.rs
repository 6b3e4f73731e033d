use std::io::{BufRead, Write};

use colored::Colorize;
use snafu::{ResultExt, Snafu};
use tracing::{debug, info};

use crate::filesystem::{FileSystem, FilesystemError};
use crate::shell::Command;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Runs `command` against `filesystem` and returns the lines it prints.
/// `Quit` produces no output; stopping the loop is the caller's job.
pub fn dispatch(
    filesystem: &mut FileSystem,
    command: &Command,
) -> Result<Vec<String>, FilesystemError> {
    let output = match command {
        Command::List => filesystem.list().into_iter().map(str::to_string).collect(),
        Command::WorkingDirectory => vec![filesystem.working_directory()],
        Command::Tree => filesystem.tree(),
        Command::ChangeDirectory(name) => {
            filesystem.change_directory(name)?;
            Vec::new()
        }
        Command::MakeDirectory(name) => {
            filesystem.make_directory(name)?;
            Vec::new()
        }
        Command::MakeFile(name) => {
            filesystem.make_file(name)?;
            Vec::new()
        }
        Command::Remove(name) => {
            filesystem.remove(name)?;
            Vec::new()
        }
        Command::RemoveDirectory(name) => {
            filesystem.remove_directory(name)?;
            Vec::new()
        }
        Command::Quit => Vec::new(),
    };
    Ok(output)
}

/// The read loop: owns one [`FileSystem`] and writes every result or error to `output`.
pub struct Session<W: Write> {
    filesystem: FileSystem,
    output: W,
    color: bool,
}

impl<W: Write> Session<W> {
    pub fn new(filesystem: FileSystem, output: W, color: bool) -> Self {
        Self {
            filesystem,
            output,
            color,
        }
    }

    pub fn filesystem(&self) -> &FileSystem {
        &self.filesystem
    }

    /// Reads lines until `quit` or end of input. Bytes that are not UTF-8 are
    /// replaced rather than ending the session.
    pub fn run(&mut self, mut input: impl BufRead) -> Result<(), SessionError> {
        let mut buffer = Vec::new();
        loop {
            buffer.clear();
            let read = input.read_until(b'\n', &mut buffer).context(InputSnafu)?;
            if read == 0 {
                info!("Session ended at end of input");
                return Ok(());
            }

            let line = String::from_utf8_lossy(&buffer);
            if self.execute_line(&line)? == Flow::Quit {
                info!("Session ended by quit");
                return Ok(());
            }
        }
    }

    /// Parses and runs one line. Parse and operation errors are printed, never returned.
    pub fn execute_line(&mut self, line: &str) -> Result<Flow, SessionError> {
        let command = match Command::parse(line) {
            Ok(Some(command)) => command,
            Ok(None) => return Ok(Flow::Continue),
            Err(error) => {
                self.print_error(&error.to_string())?;
                return Ok(Flow::Continue);
            }
        };

        if command == Command::Quit {
            return Ok(Flow::Quit);
        }

        debug!("Executing {:?}", command);
        match dispatch(&mut self.filesystem, &command) {
            Ok(lines) => {
                for line in lines {
                    writeln!(self.output, "{line}").context(OutputSnafu)?;
                }
            }
            Err(error) => {
                debug!("'{}' failed: {:?}", command.verb(), error);
                self.print_error(&error.to_string())?;
            }
        }
        Ok(Flow::Continue)
    }

    /// Runs a fixed list of lines, ignoring any `quit` among them.
    pub fn run_script<'a>(
        &mut self,
        lines: impl IntoIterator<Item = &'a str>,
    ) -> Result<(), SessionError> {
        for line in lines {
            self.execute_line(line)?;
        }
        Ok(())
    }

    pub fn print_message(&mut self, message: &str) -> Result<(), SessionError> {
        writeln!(self.output, "{message}").context(OutputSnafu)
    }

    fn print_error(&mut self, message: &str) -> Result<(), SessionError> {
        if self.color {
            writeln!(self.output, "{}", message.red()).context(OutputSnafu)
        } else {
            writeln!(self.output, "{message}").context(OutputSnafu)
        }
    }
}

#[derive(Debug, Snafu)]
pub enum SessionError {
    #[snafu(display("Failed to read from input"))]
    InputError { source: std::io::Error },
    #[snafu(display("Failed to write to output"))]
    OutputError { source: std::io::Error },
}
