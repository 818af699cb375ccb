//! Terminal command parsing

/// A line typed by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    WrapUp,
    HangUp,
    Reset,
    ToggleVoice,
    ToggleAutoPilot,
    SetCustomer(String),
    SetCompany(String),
    SetGoal(String),
    Status,
    Highlights,
    Export,
    Help,
    Quit,
    /// Anything that is not a command is a customer reply
    Reply(String),
    /// Blank line
    Empty,
    Unknown(String),
}

pub const HELP: &str = "\
Commands:
  /start             launch or restart the call
  /wrap              wrap up with a closing line
  /hangup            end the call immediately
  /reset             clear a finished call
  /voice             toggle spoken agent lines
  /auto              toggle auto-pilot customer
  /customer NAME     set customer name (next call)
  /company NAME      set company name (next call)
  /goal TEXT         set call goal (next call)
  /status            show state, stage and duration
  /highlights        show key moments
  /export            print transcript as JSON
  /help              show this help
  /quit              exit
Any other text is sent as the customer's reply in manual mode.
Start a reply with // to send text beginning with a slash.";

impl Command {
    /// Parse one input line; replies keep the line exactly as typed
    pub fn parse(raw: &str) -> Self {
        let line = raw.trim();
        if line.is_empty() {
            return Command::Empty;
        }
        let Some(rest) = line.strip_prefix('/') else {
            return Command::Reply(raw.to_string());
        };
        // "//text" sends "/text" as a reply
        if rest.starts_with('/') {
            return Command::Reply(raw.replacen('/', "", 1));
        }

        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (rest, ""),
        };

        match (name.to_ascii_lowercase().as_str(), arg) {
            ("start" | "launch" | "restart", _) => Command::Start,
            ("wrap" | "wrapup", _) => Command::WrapUp,
            ("hangup" | "hang", _) => Command::HangUp,
            ("reset", _) => Command::Reset,
            ("voice", _) => Command::ToggleVoice,
            ("auto" | "autopilot", _) => Command::ToggleAutoPilot,
            ("customer", arg) if !arg.is_empty() => Command::SetCustomer(arg.to_string()),
            ("company", arg) if !arg.is_empty() => Command::SetCompany(arg.to_string()),
            ("goal", arg) if !arg.is_empty() => Command::SetGoal(arg.to_string()),
            ("status", _) => Command::Status,
            ("highlights", _) => Command::Highlights,
            ("export", _) => Command::Export,
            ("help" | "?", _) => Command::Help,
            ("quit" | "exit", _) => Command::Quit,
            _ => Command::Unknown(line.to_string()),
        }
    }
}
