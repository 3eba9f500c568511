//! Operator commands, parsed from one line of terminal input.

use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command {0:?} (type ? for help)")]
    Unknown(String),
    #[error("{command} needs {what}")]
    MissingArgument {
        command: &'static str,
        what: &'static str,
    },
    #[error("{0:?} is not a whole number")]
    NotANumber(String),
}

/// Input accepted while a session is running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Replay,
    SetInterval(u64),
    SetRepeat(u32),
    ChangeDeck(String),
    MainMenu,
    Quit,
    Help,
}

/// Input accepted on the selection screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionCommand {
    Choose(String),
    Quit,
}

pub const SESSION_HELP: &str = "\
commands:
  r, <enter>   replay the current card
  i <ms>       set display time (1000-10000 ms)
  n <count>    set repeat count (>= 1)
  d <deck|all> switch deck
  m            back to deck selection
  q            quit";

impl FromStr for SessionCommand {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let Some(head) = parts.next() else {
            return Ok(Self::Replay);
        };
        let arg = parts.collect::<Vec<_>>().join(" ");
        match head {
            "r" | "replay" => Ok(Self::Replay),
            "i" | "interval" => Ok(Self::SetInterval(number(&arg, "i", "milliseconds")?)),
            "n" | "repeat" => Ok(Self::SetRepeat(number(&arg, "n", "a count")?)),
            "d" | "deck" if arg.is_empty() => Err(CommandError::MissingArgument {
                command: "d",
                what: "a deck name, number or `all`",
            }),
            "d" | "deck" => Ok(Self::ChangeDeck(arg)),
            "m" | "menu" => Ok(Self::MainMenu),
            "q" | "quit" | "exit" => Ok(Self::Quit),
            "?" | "h" | "help" => Ok(Self::Help),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

impl FromStr for SelectionCommand {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" => Err(CommandError::MissingArgument {
                command: "selection",
                what: "a deck name, number or `all`",
            }),
            "q" | "quit" | "exit" => Ok(Self::Quit),
            choice => Ok(Self::Choose(choice.to_string())),
        }
    }
}

fn number<T: FromStr>(
    arg: &str,
    command: &'static str,
    what: &'static str,
) -> Result<T, CommandError> {
    if arg.is_empty() {
        return Err(CommandError::MissingArgument { command, what });
    }
    arg.parse()
        .map_err(|_| CommandError::NotANumber(arg.to_string()))
}
