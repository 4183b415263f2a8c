/// Short alias that toggles when used on its own.
pub const TOGGLE_ALIAS: &str = "/m";

/// Full command name.
pub const COMMAND_NAME: &str = "/model-toggle";

/// A parsed chat command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Toggle,
    Show,
    /// Raw 1-based slot argument; validated when the command runs.
    Set(Option<String>),
    Setup,
    Reset,
}

impl Command {
    /// Whether a message should be routed to the plugin at all.
    pub fn is_command(text: &str) -> bool {
        text.starts_with(COMMAND_NAME)
            || text == TOGGLE_ALIAS
            || text.starts_with(&format!("{TOGGLE_ALIAS} "))
    }

    /// Parses command text. Missing or unknown subcommands fall back to
    /// `Toggle`.
    pub fn parse(input: &str) -> Self {
        let mut parts = input.split_whitespace();
        let base = parts.next().unwrap_or_default();
        let subcommand = parts.next();

        if base == TOGGLE_ALIAS && subcommand.is_none() {
            return Self::Toggle;
        }

        match subcommand.unwrap_or("toggle") {
            "setup" => Self::Setup,
            "show" => Self::Show,
            "set" => Self::Set(parts.next().map(ToString::to_string)),
            "reset" => Self::Reset,
            _ => Self::Toggle,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Command::Toggle => "toggle",
            Command::Show => "show",
            Command::Set(_) => "set",
            Command::Setup => "setup",
            Command::Reset => "reset",
        }
    }
}
