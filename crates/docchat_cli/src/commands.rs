#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlashCommand {
    Help,
    Sessions,
    Open(String),
    New,
    Docs,
    Upload(String),
    Delete(String),
    Login(String),
    Register { email: String, full_name: String },
    Logout,
    WhoAmI,
    Quit,
    /// A known command given without its required argument; carries usage.
    MissingArgument(&'static str),
    Unknown(String),
}

pub const HELP_TEXT: &str = "\
Commands:
  /sessions                      reload and list your chats
  /open <n|id>                   open a chat by list number or id
  /new                           start a new chat
  /docs                          list uploaded documents
  /upload <path>                 upload a .pdf or .docx file
  /delete <doc-id>               delete a document
  /login <email>                 sign in (password on the next line, not echoed)
  /register <email> <full name>  create an account and sign in
  /logout                        sign out
  /whoami                        show the signed-in user and counts
  /quit                          exit
Anything else is sent as a chat message.";

pub fn parse_slash_command(input: &str) -> Option<SlashCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let (command, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (trimmed, ""),
    };
    let argument = (!rest.is_empty()).then(|| rest.to_string());

    let parsed = match command {
        "/help" => SlashCommand::Help,
        "/sessions" => SlashCommand::Sessions,
        "/open" => argument
            .map(SlashCommand::Open)
            .unwrap_or(SlashCommand::MissingArgument("/open <n|id>")),
        "/new" => SlashCommand::New,
        "/docs" => SlashCommand::Docs,
        "/upload" => argument
            .map(SlashCommand::Upload)
            .unwrap_or(SlashCommand::MissingArgument("/upload <path>")),
        "/delete" => argument
            .map(SlashCommand::Delete)
            .unwrap_or(SlashCommand::MissingArgument("/delete <doc-id>")),
        "/login" => argument
            .map(SlashCommand::Login)
            .unwrap_or(SlashCommand::MissingArgument("/login <email>")),
        "/register" => match rest.split_once(char::is_whitespace) {
            Some((email, full_name)) if !full_name.trim().is_empty() => SlashCommand::Register {
                email: email.to_string(),
                full_name: full_name.trim().to_string(),
            },
            _ => SlashCommand::MissingArgument("/register <email> <full name>"),
        },
        "/logout" => SlashCommand::Logout,
        "/whoami" => SlashCommand::WhoAmI,
        "/quit" | "/exit" => SlashCommand::Quit,
        _ => SlashCommand::Unknown(command.to_string()),
    };

    Some(parsed)
}
