//! Command definitions
//!
//! Turns a request line into a typed command.

/// Command verbs, as spelled on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandType {
    GetFileListing,
    GetMetadata,
    GetSlice,
    Quit,
}

impl CommandType {
    /// Wire spelling of the verb
    pub fn verb(self) -> &'static str {
        match self {
            CommandType::GetFileListing => "get_file_listing",
            CommandType::GetMetadata => "get_metadata",
            CommandType::GetSlice => "get_slice",
            CommandType::Quit => "quit",
        }
    }

    /// Look up a verb
    pub fn from_verb(verb: &str) -> Option<Self> {
        match verb {
            "get_file_listing" => Some(CommandType::GetFileListing),
            "get_metadata" => Some(CommandType::GetMetadata),
            "get_slice" => Some(CommandType::GetSlice),
            "quit" => Some(CommandType::Quit),
            _ => None,
        }
    }

    /// Number of arguments the verb takes
    pub fn arity(self) -> usize {
        match self {
            CommandType::GetFileListing | CommandType::Quit => 0,
            CommandType::GetMetadata => 1,
            CommandType::GetSlice => 3,
        }
    }
}

/// Why a line did not produce a runnable command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unparsed {
    /// Verb is not one of the four known commands
    UnknownCommand(String),

    /// Known verb, wrong argument count or argument type
    InvalidArguments(CommandType),
}

/// A parsed command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List the served directory
    ListDirectory,

    /// Size of one file
    GetMetadata { filename: String },

    /// `size` bytes of a file starting at `offset`
    GetSlice {
        filename: String,
        offset: u64,
        size: u64,
    },

    /// End the session
    Quit,

    /// Anything that failed to parse
    Unparsed(Unparsed),
}

impl Command {
    /// Parse a trimmed, non-empty request line
    ///
    /// Never fails: bad input becomes `Command::Unparsed` so the handler
    /// can answer it.
    pub fn parse(line: &str) -> Command {
        let mut tokens = line.split_whitespace();
        let Some(verb) = tokens.next() else {
            return Command::Unparsed(Unparsed::UnknownCommand(String::new()));
        };
        let args: Vec<&str> = tokens.collect();

        let Some(command_type) = CommandType::from_verb(verb) else {
            return Command::Unparsed(Unparsed::UnknownCommand(verb.to_string()));
        };
        if args.len() != command_type.arity() {
            return Command::Unparsed(Unparsed::InvalidArguments(command_type));
        }

        match command_type {
            CommandType::GetFileListing => Command::ListDirectory,
            CommandType::Quit => Command::Quit,
            CommandType::GetMetadata => Command::GetMetadata {
                filename: args[0].to_string(),
            },
            CommandType::GetSlice => match (parse_number(args[1]), parse_number(args[2])) {
                (Some(offset), Some(size)) => Command::GetSlice {
                    filename: args[0].to_string(),
                    offset,
                    size,
                },
                _ => Command::Unparsed(Unparsed::InvalidArguments(command_type)),
            },
        }
    }

    /// The verb this command came from, if it had a known one
    pub fn command_type(&self) -> Option<CommandType> {
        match self {
            Command::ListDirectory => Some(CommandType::GetFileListing),
            Command::GetMetadata { .. } => Some(CommandType::GetMetadata),
            Command::GetSlice { .. } => Some(CommandType::GetSlice),
            Command::Quit => Some(CommandType::Quit),
            Command::Unparsed(Unparsed::InvalidArguments(command_type)) => Some(*command_type),
            Command::Unparsed(Unparsed::UnknownCommand(_)) => None,
        }
    }
}

/// Non-negative decimal integer, digits only (no sign)
fn parse_number(token: &str) -> Option<u64> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}
