//! Command recognition for inbound text

/// Commands the bot understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Add,
    View,
    Edit,
    Delete,
    Export,
    Stats,
    Cancel,
}

impl Command {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Help => "help",
            Self::Add => "add",
            Self::View => "view",
            Self::Edit => "edit",
            Self::Delete => "delete",
            Self::Export => "export",
            Self::Stats => "stats",
            Self::Cancel => "cancel",
        }
    }
}

impl std::str::FromStr for Command {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "start" => Ok(Self::Start),
            "help" => Ok(Self::Help),
            "add" => Ok(Self::Add),
            "view" => Ok(Self::View),
            "edit" => Ok(Self::Edit),
            "delete" => Ok(Self::Delete),
            "export" => Ok(Self::Export),
            "stats" => Ok(Self::Stats),
            "cancel" => Ok(Self::Cancel),
            _ => Err(format!("Unknown command: {}", s)),
        }
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "/{}", self.as_str())
    }
}

/// What an inbound message is
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input<'a> {
    /// A known command with optional inline arguments (`/stats 03-2024`)
    Command(Command, Option<&'a str>),
    /// Something that looks like a command but isn't one of ours
    UnknownCommand(&'a str),
    /// Plain text, possibly the answer to a prompt
    Text(&'a str),
}

/// Classify a message. Accepts a `@botname` suffix on the command.
pub fn classify(text: &str) -> Input<'_> {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix('/') else {
        return Input::Text(trimmed);
    };

    let (head, args) = match rest.split_once(char::is_whitespace) {
        Some((head, args)) => (head, Some(args.trim()).filter(|a| !a.is_empty())),
        None => (rest, None),
    };
    let name = head.split('@').next().unwrap_or(head);

    match name.parse::<Command>() {
        Ok(command) => Input::Command(command, args),
        Err(_) => Input::UnknownCommand(name),
    }
}
