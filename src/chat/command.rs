//! Protocol line parser.
//!
//! A line beginning with `/` is a command; anything else is a chat message.
//! Numeric arguments that are missing or malformed turn the line into an
//! unknown command, answered with `Unknown command` — a parse failure never
//! terminates the connection.

/// Result of parsing one input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    /// Regular chat message.
    Message(String),
    /// Parsed command.
    Command(Command),
}

/// A parsed protocol command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Register a display name.
    Register(String),
    /// Page one line backward from the given index.
    ScrollUp(usize),
    /// Page one line forward from the given index.
    ScrollDown(usize),
    /// Leave the chat.
    Exit,
    /// Anything unrecognized or malformed.
    Unknown(String),
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::Register(name) => write!(f, "/register {name}"),
            Command::ScrollUp(idx) => write!(f, "/scroll_up {idx}"),
            Command::ScrollDown(idx) => write!(f, "/scroll_down {idx}"),
            Command::Exit => write!(f, "/exit"),
            Command::Unknown(cmd) => write!(f, "/{cmd}"),
        }
    }
}

/// Parse one input line (trailing CR/LF already stripped by the caller).
///
/// Leading whitespace is significant: only a line whose first byte is `/`
/// is a command.
pub fn parse_line(input: &str) -> Line {
    if input.is_empty() {
        // The protocol has no meaning for an empty line; answer it like an
        // unknown command rather than crash or disconnect.
        return Line::Command(Command::Unknown(String::new()));
    }

    if !input.starts_with('/') {
        return Line::Message(input.to_string());
    }

    let mut parts = input[1..].split_whitespace();
    let cmd = parts.next().unwrap_or("");

    let command = match cmd {
        "register" => match parts.next() {
            Some(name) => Command::Register(name.to_string()),
            None => Command::Unknown(cmd.to_string()),
        },
        "scroll_up" => match parts.next().and_then(|arg| arg.parse().ok()) {
            Some(idx) => Command::ScrollUp(idx),
            None => Command::Unknown(cmd.to_string()),
        },
        "scroll_down" => match parts.next().and_then(|arg| arg.parse().ok()) {
            Some(idx) => Command::ScrollDown(idx),
            None => Command::Unknown(cmd.to_string()),
        },
        "exit" => Command::Exit,
        _ => Command::Unknown(cmd.to_string()),
    };

    Line::Command(command)
}
