use std::path::Path;
use std::sync::Arc;

use chat_service::{DocumentUpload, ServiceError, User};
use docchat::render::{
    render_document_row, render_session_row, render_transcript, session_title, RenderOptions,
};
use docchat::{AuthContext, AuthError, ChatError, Completion, Conversation};

use crate::commands::{parse_slash_command, SlashCommand, HELP_TEXT};
use crate::services::Backend;

pub const COMMAND_PROMPT: &str = "> ";
pub const PASSWORD_PROMPT: &str = "password: ";

/// Credentials waiting for the password line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingAuth {
    Login { email: String },
    Register { email: String, full_name: String },
}

/// Line-oriented front end. Every call returns the lines to print.
#[derive(Debug)]
pub struct App {
    backend: Backend,
    conversation: Conversation,
    auth: AuthContext,
    options: RenderOptions,
    pending_auth: Option<PendingAuth>,
    should_exit: bool,
}

impl App {
    pub fn new(backend: Backend, auth: AuthContext, options: RenderOptions) -> Self {
        let conversation = Conversation::new(Arc::clone(&backend.chat));
        Self {
            backend,
            conversation,
            auth,
            options,
            pending_auth: None,
            should_exit: false,
        }
    }

    /// Restore the saved sign-in and load the session list.
    pub async fn start(&mut self) -> Vec<String> {
        let mut out = vec![format!(
            "docchat ({} backend). Type /help for commands.",
            self.backend.kind().as_str()
        )];

        match self.auth.init().await {
            Ok(Some(user)) => {
                out.push(format!("Signed in as {}.", describe_user(user)));
                let token = self.auth.token().map(str::to_owned);
                self.backend.set_access_token(token.as_deref());
                out.extend(self.list_sessions().await);
            }
            Ok(None) => out.push("Not signed in. Use /login <email> or /register.".to_string()),
            Err(error) => out.push(format!("Could not restore sign-in: {error}")),
        }
        out
    }

    pub fn prompt(&self) -> &'static str {
        if self.pending_auth.is_some() {
            PASSWORD_PROMPT
        } else {
            COMMAND_PROMPT
        }
    }

    pub fn should_exit(&self) -> bool {
        self.should_exit
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn auth(&self) -> &AuthContext {
        &self.auth
    }

    pub fn pending_auth(&self) -> Option<&PendingAuth> {
        self.pending_auth.as_ref()
    }

    pub async fn on_line(&mut self, line: &str) -> Vec<String> {
        if let Some(pending) = self.pending_auth.take() {
            return self.complete_auth(pending, line).await;
        }

        let input = line.trim();
        if input.is_empty() {
            return Vec::new();
        }

        let Some(command) = parse_slash_command(input) else {
            return self.send(input).await;
        };

        match command {
            SlashCommand::Help => HELP_TEXT.lines().map(str::to_owned).collect(),
            SlashCommand::Sessions => self.list_sessions().await,
            SlashCommand::Open(target) => self.open(&target).await,
            SlashCommand::New => {
                self.conversation.start_new_chat();
                vec!["New chat. Your first message will start a session.".to_string()]
            }
            SlashCommand::Docs => self.list_documents().await,
            SlashCommand::Upload(path) => self.upload(Path::new(&path)).await,
            SlashCommand::Delete(document_id) => self.delete(&document_id).await,
            SlashCommand::Login(email) => {
                self.pending_auth = Some(PendingAuth::Login { email });
                Vec::new()
            }
            SlashCommand::Register { email, full_name } => {
                self.pending_auth = Some(PendingAuth::Register { email, full_name });
                Vec::new()
            }
            SlashCommand::Logout => self.logout(),
            SlashCommand::WhoAmI => self.whoami().await,
            SlashCommand::Quit => {
                self.should_exit = true;
                Vec::new()
            }
            SlashCommand::MissingArgument(usage) => vec![format!("Usage: {usage}")],
            SlashCommand::Unknown(command) => {
                vec![format!("Unknown command: {command}. Type /help for commands.")]
            }
        }
    }

    /// The signed-in user followed by their document and chat counts.
    async fn whoami(&mut self) -> Vec<String> {
        let Some(user) = self.auth.user() else {
            return vec!["Not signed in.".to_string()];
        };
        let mut out = vec![format!("Signed in as {}.", describe_user(user))];

        let documents = match self.backend.documents.list_documents().await {
            Ok(documents) => documents.len(),
            Err(error) => {
                out.push(describe_service_error(&error));
                return out;
            }
        };
        if let Err(error) = self.conversation.refresh_sessions().await {
            out.push(describe_chat_error(&error));
            return out;
        }
        let chats = self.conversation.with_sessions(|list| list.total());

        out.push(format!(
            "{}, {}",
            count_label(documents, "document"),
            count_label(chats, "chat")
        ));
        out
    }

    async fn send(&mut self, content: &str) -> Vec<String> {
        let before = self.conversation.transcript().len();
        let result = self.conversation.send(content).await;
        let transcript = self.conversation.transcript();
        let added = transcript.get(before..).unwrap_or_default();

        let mut out = render_transcript(added, &self.options);
        match result {
            Ok(Completion::Applied) => {}
            Ok(Completion::Discarded) => {
                out.push("The reply arrived after you left that chat.".to_string())
            }
            Err(error) => out.push(describe_chat_error(&error)),
        }
        out
    }

    async fn list_sessions(&mut self) -> Vec<String> {
        if let Err(error) = self.conversation.refresh_sessions().await {
            return vec![describe_chat_error(&error)];
        }

        let active = self.conversation.active_session_id();
        let width = self.options.width;
        self.conversation.with_sessions(|list| {
            if list.is_empty() {
                return vec!["No chats yet. Type a message to start one.".to_string()];
            }
            list.sessions()
                .iter()
                .enumerate()
                .map(|(index, session)| {
                    let is_active = active.as_deref() == Some(session.id.as_str());
                    render_session_row(index, session, is_active, width)
                })
                .collect()
        })
    }

    /// `target` is a one-based list number or a session id.
    async fn open(&mut self, target: &str) -> Vec<String> {
        let session_id = match target.parse::<usize>() {
            Ok(number) => {
                let found = self.conversation.with_sessions(|list| {
                    number
                        .checked_sub(1)
                        .and_then(|index| list.nth(index))
                        .map(|session| session.id.clone())
                });
                match found {
                    Some(session_id) => session_id,
                    None => return vec![format!("No chat numbered {number}. Try /sessions.")],
                }
            }
            Err(_) => target.to_string(),
        };

        match self.conversation.select_session(&session_id).await {
            Ok(Completion::Applied) => {
                let title = self
                    .conversation
                    .active_session()
                    .map(|session| session_title(&session).to_string())
                    .unwrap_or_else(|| session_id.clone());
                let mut out = vec![format!("== {title} ==")];
                let transcript = self.conversation.transcript();
                if transcript.is_empty() {
                    out.push("(no messages yet)".to_string());
                }
                out.extend(render_transcript(&transcript, &self.options));
                out
            }
            Ok(Completion::Discarded) => Vec::new(),
            Err(error) => vec![describe_chat_error(&error)],
        }
    }

    async fn list_documents(&mut self) -> Vec<String> {
        match self.backend.documents.list_documents().await {
            Ok(documents) if documents.is_empty() => vec!["No documents uploaded.".to_string()],
            Ok(documents) => documents
                .iter()
                .map(|document| render_document_row(document, self.options.width))
                .collect(),
            Err(error) => vec![describe_service_error(&error)],
        }
    }

    async fn upload(&mut self, path: &Path) -> Vec<String> {
        let upload = match DocumentUpload::from_path(path) {
            Ok(upload) => upload,
            Err(error) => return vec![describe_service_error(&error)],
        };

        match self.backend.documents.upload_document(upload).await {
            Ok(document) => vec![
                format!("Uploaded {} as {}.", document.filename, document.id),
                render_document_row(&document, self.options.width),
            ],
            Err(error) => vec![describe_service_error(&error)],
        }
    }

    async fn delete(&mut self, document_id: &str) -> Vec<String> {
        match self.backend.documents.delete_document(document_id).await {
            Ok(()) => vec![format!("Deleted document {document_id}.")],
            Err(error) => vec![describe_service_error(&error)],
        }
    }

    async fn complete_auth(&mut self, pending: PendingAuth, password: &str) -> Vec<String> {
        let result = match &pending {
            PendingAuth::Login { email } => self.auth.login(email, password).await,
            PendingAuth::Register { email, full_name } => {
                self.auth.register(email, password, full_name).await
            }
        };

        match result {
            Ok(user) => {
                let mut out = vec![format!("Signed in as {}.", describe_user(user))];
                let token = self.auth.token().map(str::to_owned);
                self.backend.set_access_token(token.as_deref());
                self.conversation = Conversation::new(Arc::clone(&self.backend.chat));
                out.extend(self.list_sessions().await);
                out
            }
            Err(error) => vec![describe_auth_error(&pending, &error)],
        }
    }

    fn logout(&mut self) -> Vec<String> {
        let mut out = Vec::new();
        if let Err(error) = self.auth.logout() {
            out.push(format!("Could not remove the saved token: {error}"));
        }
        self.backend.set_access_token(None);
        self.conversation = Conversation::new(Arc::clone(&self.backend.chat));
        out.push("Signed out.".to_string());
        out
    }
}

fn describe_user(user: &User) -> String {
    match user.full_name.as_deref().filter(|name| !name.trim().is_empty()) {
        Some(name) => format!("{name} <{}>", user.email),
        None => user.email.clone(),
    }
}

fn count_label(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("1 {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

fn describe_service_error(error: &ServiceError) -> String {
    if error.is_unauthorized() {
        format!("{error}. Sign in with /login <email>.")
    } else {
        format!("Error: {error}")
    }
}

fn describe_chat_error(error: &ChatError) -> String {
    match error {
        ChatError::Service(error) => describe_service_error(error),
        ChatError::Validation => "Type a message to send.".to_string(),
        ChatError::ConcurrentSend | ChatError::HistoryLoading => format!("Please wait: {error}."),
    }
}

fn describe_auth_error(pending: &PendingAuth, error: &AuthError) -> String {
    let action = match pending {
        PendingAuth::Login { .. } => "Sign-in",
        PendingAuth::Register { .. } => "Registration",
    };
    format!("{action} failed: {error}")
}
