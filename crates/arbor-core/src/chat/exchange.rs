//! Orchestrated exchanges: one user turn plus the model's reply.
//!
//! Every inbound "send a message" operation becomes two follow-up appends
//! through [`ChatService::follow_up`]: the user turn under the chosen parent,
//! then the assistant reply under the user turn. Starting a conversation
//! additionally creates the root and a generated title first.

use arbor_types::conversation::Conversation;
use arbor_types::error::{ExchangeError, LlmError};
use arbor_types::llm::{ChatTurn, MessageRole};
use arbor_types::message::Message;
use arbor_types::user::User;
use tracing::info;
use uuid::Uuid;

use crate::chat::repository::{ConversationRepository, MessageRepository};
use crate::chat::service::ChatService;
use crate::chat::title;
use crate::llm::provider::CompletionClient;

/// A completed user/assistant exchange.
#[derive(Debug, Clone)]
pub struct Exchange {
    pub user: Message,
    pub assistant: Message,
}

/// The result of starting a conversation: the titled conversation plus its
/// first exchange.
#[derive(Debug, Clone)]
pub struct ConversationOpening {
    pub conversation: Conversation,
    pub user: Message,
    pub assistant: Message,
}

/// Start a new conversation: validate the model, create the root, generate a
/// title from the first prompt, then run the first exchange.
pub async fn start_conversation<M, C, L>(
    chat: &ChatService<M, C>,
    llm: &L,
    user: &User,
    model_id: &str,
    content: &str,
) -> Result<ConversationOpening, ExchangeError>
where
    M: MessageRepository,
    C: ConversationRepository,
    L: CompletionClient,
{
    if !llm.models().iter().any(|known| known == model_id) {
        return Err(LlmError::ModelNotFound(model_id.to_string()).into());
    }

    let (mut conversation, root) = chat.create_conversation(user, model_id.to_string()).await?;

    let generated = title::generate_title(llm, content).await?;
    chat.update_title(&conversation.id, &generated).await?;
    conversation.title = generated;

    let exchange = send_prompt(chat, llm, &root.id, content).await?;

    Ok(ConversationOpening {
        conversation,
        user: exchange.user,
        assistant: exchange.assistant,
    })
}

/// Send a follow-up prompt: append the user turn under `parent_id`, send the
/// materialized context to the model, append the assistant reply.
pub async fn send_prompt<M, C, L>(
    chat: &ChatService<M, C>,
    llm: &L,
    parent_id: &Uuid,
    content: &str,
) -> Result<Exchange, ExchangeError>
where
    M: MessageRepository,
    C: ConversationRepository,
    L: CompletionClient,
{
    let user_message = chat
        .follow_up(parent_id, MessageRole::User, content.to_string(), None)
        .await?;
    let conversation = chat.get_conversation(&user_message.conversation_id).await?;

    let context = chat.context(&user_message.id).await?;
    let turns: Vec<ChatTurn> = context
        .iter()
        .map(|message| ChatTurn {
            role: message.role.clone(),
            content: message.content.clone(),
        })
        .collect();

    let reply = llm.complete(&conversation.model_id, &turns).await?;

    let assistant = chat
        .follow_up(
            &user_message.id,
            MessageRole::Assistant,
            reply.content,
            reply.reasoning,
        )
        .await?;

    info!(
        conversation_id = %conversation.id,
        user_message_id = %user_message.id,
        assistant_message_id = %assistant.id,
        "exchange completed"
    );

    Ok(Exchange {
        user: user_message,
        assistant,
    })
}
