//! Line-oriented shell commands.

use std::path::PathBuf;

use thiserror::Error;

/// Help text printed by the `help` command.
pub const HELP_TEXT: &str = "\
commands:
  user <name>               set the username field
  password <secret>         set the password field
  login [<user> <password>] submit the credential form
  upload <path>             upload a CSV file for analysis
  history                   refetch upload history
  export                    download the PDF report
  logout                    end the session
  show                      print the current screen
  help                      print this text
  quit                      exit";

/// One parsed shell command.
#[derive(Clone, PartialEq, Eq)]
pub enum Command {
    /// Set the username field.
    User(String),
    /// Set the password field.
    Password(String),
    /// Submit the form, optionally filling both fields first.
    Login(Option<(String, String)>),
    /// Upload a file.
    Upload(PathBuf),
    /// Refetch history.
    History,
    /// Download the report.
    Export,
    /// End the session.
    Logout,
    /// Print the current screen.
    Show,
    /// Print help.
    Help,
    /// Exit the shell.
    Quit,
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User(name) => f.debug_tuple("User").field(name).finish(),
            Self::Password(_) => f.debug_tuple("Password").field(&"<redacted>").finish(),
            Self::Login(None) => f.write_str("Login"),
            Self::Login(Some((user, _))) => f
                .debug_tuple("Login")
                .field(user)
                .field(&"<redacted>")
                .finish(),
            Self::Upload(path) => f.debug_tuple("Upload").field(path).finish(),
            Self::History => f.write_str("History"),
            Self::Export => f.write_str("Export"),
            Self::Logout => f.write_str("Logout"),
            Self::Show => f.write_str("Show"),
            Self::Help => f.write_str("Help"),
            Self::Quit => f.write_str("Quit"),
        }
    }
}

/// Parses one input line. Blank lines yield `Ok(None)`.
///
/// `user`, `password` and `upload` take the rest of the line verbatim
/// (trimmed), so names and paths may contain spaces.
///
/// # Errors
/// Returns [`CommandError`] for unknown commands and wrong arity.
pub fn parse_command(line: &str) -> Result<Option<Command>, CommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };
    let verb = verb.to_ascii_lowercase();

    let command = match verb.as_str() {
        "user" => Command::User(required(&verb, "name", rest)?),
        "password" => Command::Password(required(&verb, "secret", rest)?),
        "upload" => Command::Upload(PathBuf::from(required(&verb, "path", rest)?)),
        "login" => {
            let args: Vec<&str> = rest.split_whitespace().collect();
            match args.as_slice() {
                [] => Command::Login(None),
                [user, password] => {
                    Command::Login(Some(((*user).to_string(), (*password).to_string())))
                }
                [_] => {
                    return Err(CommandError::MissingArgument {
                        command: verb,
                        argument: "password",
                    });
                }
                _ => return Err(CommandError::UnexpectedArgument(verb)),
            }
        }
        "history" => no_args(&verb, rest, Command::History)?,
        "export" => no_args(&verb, rest, Command::Export)?,
        "logout" => no_args(&verb, rest, Command::Logout)?,
        "show" => no_args(&verb, rest, Command::Show)?,
        "help" | "?" => no_args(&verb, rest, Command::Help)?,
        "quit" | "exit" => no_args(&verb, rest, Command::Quit)?,
        _ => return Err(CommandError::Unknown(verb)),
    };

    Ok(Some(command))
}

fn required(verb: &str, argument: &'static str, rest: &str) -> Result<String, CommandError> {
    if rest.is_empty() {
        return Err(CommandError::MissingArgument {
            command: verb.to_string(),
            argument,
        });
    }
    Ok(rest.to_string())
}

fn no_args(verb: &str, rest: &str, command: Command) -> Result<Command, CommandError> {
    if rest.is_empty() {
        Ok(command)
    } else {
        Err(CommandError::UnexpectedArgument(verb.to_string()))
    }
}

/// Command parsing failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// The verb is not recognised.
    #[error("unknown command '{0}' (try 'help')")]
    Unknown(String),
    /// A required argument is missing.
    #[error("'{command}' needs <{argument}>")]
    MissingArgument {
        /// Command verb.
        command: String,
        /// Missing argument name.
        argument: &'static str,
    },
    /// The command takes fewer arguments than given.
    #[error("too many arguments for '{0}'")]
    UnexpectedArgument(String),
}
