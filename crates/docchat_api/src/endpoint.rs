use reqwest::Method;

/// One REST operation: method, path segments, and whether it needs a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint<'a> {
    ListSessions,
    CreateSession,
    SessionHistory(&'a str),
    SendMessage(&'a str),
    ListDocuments,
    GetDocument(&'a str),
    UploadDocument,
    DeleteDocument(&'a str),
    Login,
    Register,
    CurrentUser,
}

impl<'a> Endpoint<'a> {
    pub fn method(&self) -> Method {
        match self {
            Self::ListSessions
            | Self::SessionHistory(_)
            | Self::ListDocuments
            | Self::GetDocument(_)
            | Self::CurrentUser => Method::GET,
            Self::CreateSession
            | Self::SendMessage(_)
            | Self::UploadDocument
            | Self::Login
            | Self::Register => Method::POST,
            Self::DeleteDocument(_) => Method::DELETE,
        }
    }

    pub fn segments(&self) -> Vec<&'a str> {
        match *self {
            Self::ListSessions | Self::CreateSession => vec!["chat", "sessions"],
            Self::SessionHistory(id) => vec!["chat", "sessions", id],
            Self::SendMessage(id) => vec!["chat", "sessions", id, "messages"],
            Self::ListDocuments => vec!["documents"],
            Self::GetDocument(id) | Self::DeleteDocument(id) => vec!["documents", id],
            Self::UploadDocument => vec!["documents", "upload"],
            Self::Login => vec!["auth", "login"],
            Self::Register => vec!["auth", "register"],
            Self::CurrentUser => vec!["auth", "me"],
        }
    }

    pub fn requires_auth(&self) -> bool {
        !matches!(self, Self::Login | Self::Register)
    }

    /// `METHOD /path` label used in logs and error messages.
    pub fn label(&self) -> String {
        format!("{} /{}", self.method(), self.segments().join("/"))
    }
}
