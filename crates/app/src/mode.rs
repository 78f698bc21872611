use thiserror::Error;

use placement_util::{parse_record_count, ConfigError};

pub const USAGE: &str = "usage: placement-app [serve | generate [COUNT]]";

/// What the binary was asked to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Serve,
    /// `None` defers to the configured record count.
    Generate { record_count: Option<u32> },
}

#[derive(Debug, Error)]
pub enum UsageError {
    #[error("unknown command `{0}`\n{}", USAGE)]
    UnknownCommand(String),
    #[error("{0}\n{}", USAGE)]
    InvalidCount(ConfigError),
    #[error("unexpected argument `{0}`\n{}", USAGE)]
    UnexpectedArgument(String),
}

impl Mode {
    /// Parses the arguments following the program name.
    pub fn from_args<I, S>(args: I) -> Result<Self, UsageError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut args = args.into_iter();
        let mode = match args.next() {
            None => return Ok(Self::Serve),
            Some(command) => match command.as_ref() {
                "serve" => Self::Serve,
                "generate" => {
                    let record_count = args
                        .next()
                        .map(|raw| parse_record_count(raw.as_ref()))
                        .transpose()
                        .map_err(UsageError::InvalidCount)?;
                    Self::Generate { record_count }
                }
                other => return Err(UsageError::UnknownCommand(other.to_string())),
            },
        };

        match args.next() {
            Some(extra) => Err(UsageError::UnexpectedArgument(extra.as_ref().to_string())),
            None => Ok(mode),
        }
    }
}
