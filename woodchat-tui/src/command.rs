#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Refresh, // /refresh | /clear
    Close,   // /close
    Help,    // /help
    Quit,    // /quit or /exit
    Unknown(String),
}

pub fn parse_command(input: &str) -> Command {
    let trimmed = input.trim();
    let verb = trimmed.split_whitespace().next().unwrap_or_default();
    match verb {
        "/refresh" | "/clear" => Command::Refresh,
        "/close" => Command::Close,
        "/help" => Command::Help,
        "/quit" | "/exit" => Command::Quit,
        _ => Command::Unknown(trimmed.to_string()),
    }
}
