use snafu::{Snafu, ensure};

/// One parsed input line. Every variant maps to a single [`FileSystem`] operation,
/// except `Quit`, which ends the session.
///
/// [`FileSystem`]: crate::filesystem::FileSystem
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    WorkingDirectory,
    Tree,
    ChangeDirectory(String),
    MakeDirectory(String),
    MakeFile(String),
    Remove(String),
    RemoveDirectory(String),
    Quit,
}

impl Command {
    /// Splits a line on whitespace into a verb and at most one name.
    /// Blank lines yield `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Self>, CommandParseError> {
        let mut tokens = line.split_whitespace();
        let Some(verb) = tokens.next() else {
            return Ok(None);
        };
        let argument = tokens.next();
        ensure!(tokens.next().is_none(), UnexpectedArgumentSnafu { verb });

        let command = match (verb, argument) {
            ("ls", None) => Command::List,
            ("pwd", None) => Command::WorkingDirectory,
            ("tree", None) => Command::Tree,
            ("quit", None) => Command::Quit,
            ("ls" | "pwd" | "tree" | "quit", Some(_)) => {
                return UnexpectedArgumentSnafu { verb }.fail();
            }
            ("cd", Some(name)) => Command::ChangeDirectory(name.to_string()),
            ("mkdir", Some(name)) => Command::MakeDirectory(name.to_string()),
            ("touch", Some(name)) => Command::MakeFile(name.to_string()),
            ("rm", Some(name)) => Command::Remove(name.to_string()),
            ("rmdir", Some(name)) => Command::RemoveDirectory(name.to_string()),
            ("cd" | "mkdir" | "touch" | "rm" | "rmdir", None) => {
                return MissingArgumentSnafu { verb }.fail();
            }
            _ => return UnknownCommandSnafu { verb }.fail(),
        };

        Ok(Some(command))
    }

    pub fn verb(&self) -> &'static str {
        match self {
            Command::List => "ls",
            Command::WorkingDirectory => "pwd",
            Command::Tree => "tree",
            Command::ChangeDirectory(_) => "cd",
            Command::MakeDirectory(_) => "mkdir",
            Command::MakeFile(_) => "touch",
            Command::Remove(_) => "rm",
            Command::RemoveDirectory(_) => "rmdir",
            Command::Quit => "quit",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
pub enum CommandParseError {
    #[snafu(display("{verb}: command not found"))]
    UnknownCommand { verb: String },
    #[snafu(display("{verb}: missing name operand"))]
    MissingArgument { verb: String },
    #[snafu(display("{verb}: too many arguments"))]
    UnexpectedArgument { verb: String },
}
