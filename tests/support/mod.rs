use std::sync::Arc;

use chat_service::{ChatMessage, ChatServices};
use chat_service_mock::MockChatService;
use docchat::{Conversation, TranscriptEntry};

pub fn conversation_over(service: &Arc<MockChatService>) -> Conversation {
    let services: Arc<dyn ChatServices> = Arc::clone(service) as Arc<dyn ChatServices>;
    Conversation::new(services)
}

#[allow(dead_code)]
pub fn messages_of(transcript: &[TranscriptEntry]) -> Vec<ChatMessage> {
    transcript
        .iter()
        .map(|entry| entry.message.clone())
        .collect()
}

#[allow(dead_code)]
pub fn contents_of(transcript: &[TranscriptEntry]) -> Vec<String> {
    transcript
        .iter()
        .map(|entry| entry.message.content.clone())
        .collect()
}
