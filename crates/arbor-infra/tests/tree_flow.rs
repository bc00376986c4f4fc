//! End-to-end conversation-tree behavior against real SQLite repositories.
//!
//! Exercises ChatService and the exchange orchestration over
//! `SqliteMessageRepository` / `SqliteConversationRepository`, covering path
//! invariants, context resolution, branch numbering, isolation between
//! subtrees, and cascade deletion.

use std::time::Duration;

use arbor_core::chat::exchange;
use arbor_core::chat::service::ChatService;
use arbor_core::llm::provider::CompletionClient;
use arbor_core::user::repository::UserRepository;
use arbor_infra::sqlite::conversation::SqliteConversationRepository;
use arbor_infra::sqlite::message::SqliteMessageRepository;
use arbor_infra::sqlite::pool::DatabasePool;
use arbor_infra::sqlite::user::SqliteUserRepository;
use arbor_types::conversation::Conversation;
use arbor_types::error::{ChatError, ExchangeError, LlmError};
use arbor_types::llm::{AssistantReply, ChatTurn};
use arbor_types::message::{BranchInfo, Message, MessageRole};
use arbor_types::user::User;
use tempfile::TempDir;
use uuid::Uuid;

struct Harness {
    // Keeps the database directory alive for the test's duration.
    _dir: TempDir,
    pool: DatabasePool,
    chat: ChatService<SqliteMessageRepository, SqliteConversationRepository>,
    user: User,
}

async fn harness() -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("test.db").display());
    let pool = DatabasePool::new(&url).await.unwrap();

    let users = SqliteUserRepository::new(pool.clone());
    let user = User::new("ada".to_string());
    users.create(&user, "$argon2id$stub").await.unwrap();

    let chat = ChatService::new(
        SqliteMessageRepository::new(pool.clone()),
        SqliteConversationRepository::new(pool.clone()),
    );

    Harness {
        _dir: dir,
        pool,
        chat,
        user,
    }
}

/// Sibling rank is created_at order; spread creations so stamps differ.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(2)).await;
}

async fn new_conversation(h: &Harness) -> (Conversation, Message) {
    h.chat
        .create_conversation(&h.user, "qwen/qwen3-32b".to_string())
        .await
        .unwrap()
}

async fn follow_up(h: &Harness, parent: &Message, role: MessageRole, content: &str) -> Message {
    settle().await;
    h.chat
        .follow_up(&parent.id, role, content.to_string(), None)
        .await
        .unwrap()
}

/// Root -> U1 -> {A1, A2}: the regeneration scenario from the contract.
async fn regenerated_tree(h: &Harness) -> (Message, Message, Message, Message) {
    let (_, root) = new_conversation(h).await;
    let u1 = follow_up(h, &root, MessageRole::User, "question").await;
    let a1 = follow_up(h, &u1, MessageRole::Assistant, "first answer").await;
    let a2 = follow_up(h, &u1, MessageRole::Assistant, "regenerated answer").await;
    (root, u1, a1, a2)
}

#[tokio::test]
async fn test_path_consistency_invariant() {
    let h = harness().await;
    let (root, u1, a1, a2) = regenerated_tree(&h).await;

    for message in [&root, &u1, &a1, &a2] {
        let stored = h.chat.get_message(&message.id).await.unwrap();
        assert_eq!(stored.path.last(), Some(&stored.id));
        if let Some(parent_id) = stored.parent_id {
            let parent = h.chat.get_message(&parent_id).await.unwrap();
            assert_eq!(&stored.path[..stored.path.len() - 1], parent.path.as_slice());
        } else {
            assert_eq!(stored.path.len(), 1);
        }
    }
}

#[tokio::test]
async fn test_context_is_root_to_leaf_in_creation_order() {
    let h = harness().await;
    let (root, u1, a1, _) = regenerated_tree(&h).await;

    let context = h.chat.context(&a1.id).await.unwrap();
    assert_eq!(context.len(), a1.path.len());
    let ids: Vec<Uuid> = context.iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![root.id, u1.id, a1.id]);
    for pair in context.windows(2) {
        assert!(pair[0].created_at <= pair[1].created_at);
    }
}

#[tokio::test]
async fn test_context_of_unknown_message_fails() {
    let h = harness().await;
    let err = h.chat.context(&Uuid::now_v7()).await.unwrap_err();
    assert!(matches!(err, ChatError::MessageNotFound));
}

#[tokio::test]
async fn test_branch_info_for_both_regenerated_leaves() {
    let h = harness().await;
    let (root, u1, a1, a2) = regenerated_tree(&h).await;

    let first = h.chat.branch_info(&a1.id).await.unwrap();
    let ids: Vec<Uuid> = first.iter().map(|entry| entry.message.id).collect();
    assert_eq!(ids, vec![root.id, u1.id, a1.id]);
    assert!(first[0].branch.is_none());
    assert!(first[1].branch.is_none());
    assert_eq!(
        first[2].branch,
        Some(BranchInfo {
            total: 2,
            current: 1
        })
    );

    let second = h.chat.branch_info(&a2.id).await.unwrap();
    assert_eq!(
        second[2].branch,
        Some(BranchInfo {
            total: 2,
            current: 2
        })
    );
}

#[tokio::test]
async fn test_single_child_parents_report_no_branch() {
    let h = harness().await;
    let (_, root) = new_conversation(&h).await;
    let u1 = follow_up(&h, &root, MessageRole::User, "hi").await;
    let a1 = follow_up(&h, &u1, MessageRole::Assistant, "hello").await;

    let annotated = h.chat.branch_info(&a1.id).await.unwrap();
    assert_eq!(annotated.len(), 3);
    assert!(annotated.iter().all(|entry| entry.branch.is_none()));
}

#[tokio::test]
async fn test_root_only_conversation_has_no_branches() {
    let h = harness().await;
    let (_, root) = new_conversation(&h).await;

    let annotated = h.chat.branch_info(&root.id).await.unwrap();
    assert_eq!(annotated.len(), 1);
    assert_eq!(annotated[0].message.id, root.id);
    assert!(annotated[0].branch.is_none());
}

#[tokio::test]
async fn test_three_children_rank_leaves_by_creation_order() {
    let h = harness().await;
    let (_, root) = new_conversation(&h).await;
    let u1 = follow_up(&h, &root, MessageRole::User, "question").await;

    let mut leaves = Vec::new();
    for n in 1..=3 {
        leaves.push(follow_up(&h, &u1, MessageRole::Assistant, &format!("answer {n}")).await);
    }

    for (index, leaf) in leaves.iter().enumerate() {
        let annotated = h.chat.branch_info(&leaf.id).await.unwrap();
        assert_eq!(
            annotated[1].branch, None,
            "only one user turn, no fork at root's child"
        );
        assert_eq!(
            annotated[2].branch,
            Some(BranchInfo {
                total: 3,
                current: index as u32 + 1
            })
        );
    }
}

#[tokio::test]
async fn test_reads_are_idempotent() {
    let h = harness().await;
    let (_, _, a1, _) = regenerated_tree(&h).await;

    let context_a = h.chat.context(&a1.id).await.unwrap();
    let context_b = h.chat.context(&a1.id).await.unwrap();
    let ids_a: Vec<Uuid> = context_a.iter().map(|m| m.id).collect();
    let ids_b: Vec<Uuid> = context_b.iter().map(|m| m.id).collect();
    assert_eq!(ids_a, ids_b);

    let branches_a = h.chat.branch_info(&a1.id).await.unwrap();
    let branches_b = h.chat.branch_info(&a1.id).await.unwrap();
    let summary = |entries: &[arbor_types::message::BranchedMessage]| {
        entries
            .iter()
            .map(|e| (e.message.id, e.branch.clone()))
            .collect::<Vec<_>>()
    };
    assert_eq!(summary(&branches_a), summary(&branches_b));
}

#[tokio::test]
async fn test_follow_up_elsewhere_leaves_subtree_untouched() {
    let h = harness().await;
    let (root, u1, a1, _) = regenerated_tree(&h).await;

    // Extend the conversation below A1, then fork under the root elsewhere.
    let u2 = follow_up(&h, &a1, MessageRole::User, "follow up").await;
    let before = h.chat.branch_info(&u2.id).await.unwrap();
    let before_paths: Vec<Vec<Uuid>> = before.iter().map(|e| e.message.path.clone()).collect();

    follow_up(&h, &root, MessageRole::User, "unrelated sibling turn").await;

    let after = h.chat.branch_info(&u2.id).await.unwrap();
    let after_paths: Vec<Vec<Uuid>> = after.iter().map(|e| e.message.path.clone()).collect();
    assert_eq!(before_paths, after_paths, "paths never change after creation");

    // The fork at U1 is unchanged; only the root gained a sibling group.
    assert_eq!(
        after[2].branch,
        Some(BranchInfo {
            total: 2,
            current: 1
        })
    );
    assert_eq!(
        after[1].branch,
        Some(BranchInfo {
            total: 2,
            current: 1
        }),
        "root fork is now visible on the old branch"
    );
    let _ = u1;
}

#[tokio::test]
async fn test_follow_up_under_unknown_parent_fails() {
    let h = harness().await;
    let err = h
        .chat
        .follow_up(
            &Uuid::now_v7(),
            MessageRole::User,
            "orphan".to_string(),
            None,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ChatError::MessageNotFound));
}

#[tokio::test]
async fn test_current_leaf_tracks_latest_message() {
    let h = harness().await;
    let (conversation, root) = new_conversation(&h).await;
    let u1 = follow_up(&h, &root, MessageRole::User, "hi").await;
    let a1 = follow_up(&h, &u1, MessageRole::Assistant, "hello").await;

    let leaf = h.chat.current_leaf(&conversation.id, None).await.unwrap();
    assert_eq!(leaf.id, a1.id);
}

#[tokio::test]
async fn test_current_leaf_respects_branch_filter() {
    let h = harness().await;
    let (_, root) = new_conversation(&h).await;
    let conversation_id = root.conversation_id;
    let u1 = follow_up(&h, &root, MessageRole::User, "question").await;
    let a1 = follow_up(&h, &u1, MessageRole::Assistant, "first").await;
    let u2 = follow_up(&h, &a1, MessageRole::User, "deeper on first").await;
    let a2 = follow_up(&h, &u1, MessageRole::Assistant, "regenerated").await;

    // Unfiltered: the newest message wins, regardless of branch.
    let newest = h.chat.current_leaf(&conversation_id, None).await.unwrap();
    assert_eq!(newest.id, a2.id);

    // Filtered to the branch through A1: its deepest descendant wins.
    let tip = h
        .chat
        .current_leaf(&conversation_id, Some(&a1.id))
        .await
        .unwrap();
    assert_eq!(tip.id, u2.id);

    // Filtering on an unknown message is a MessageNotFound, not an empty read.
    let err = h
        .chat
        .current_leaf(&conversation_id, Some(&Uuid::now_v7()))
        .await
        .unwrap_err();
    assert!(matches!(err, ChatError::MessageNotFound));
}

#[tokio::test]
async fn test_children_are_returned_in_creation_order() {
    let h = harness().await;
    let (_, root) = new_conversation(&h).await;
    let u1 = follow_up(&h, &root, MessageRole::User, "question").await;
    let a1 = follow_up(&h, &u1, MessageRole::Assistant, "one").await;
    let a2 = follow_up(&h, &u1, MessageRole::Assistant, "two").await;

    let children = h.chat.children(&u1.id).await.unwrap();
    let ids: Vec<Uuid> = children.iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![a1.id, a2.id]);
}

#[tokio::test]
async fn test_delete_conversation_cascades_to_messages() {
    let h = harness().await;
    let (root, u1, a1, a2) = regenerated_tree(&h).await;
    let conversation_id = root.conversation_id;

    h.chat.delete_conversation(&conversation_id).await.unwrap();

    for message in [&root, &u1, &a1, &a2] {
        let err = h.chat.get_message(&message.id).await.unwrap_err();
        assert!(matches!(err, ChatError::MessageNotFound));
    }

    let remaining: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM messages WHERE conversation_id = ?")
            .bind(conversation_id.to_string())
            .fetch_one(&h.pool.reader)
            .await
            .unwrap();
    assert_eq!(remaining.0, 0);

    let err = h.chat.get_conversation(&conversation_id).await.unwrap_err();
    assert!(matches!(err, ChatError::ConversationNotFound));
}

#[tokio::test]
async fn test_deleting_one_conversation_spares_others() {
    let h = harness().await;
    let (root_a, ..) = regenerated_tree(&h).await;
    let (root_b, u1_b, a1_b, _) = regenerated_tree(&h).await;

    h.chat
        .delete_conversation(&root_a.conversation_id)
        .await
        .unwrap();

    for message in [&root_b, &u1_b, &a1_b] {
        assert!(h.chat.get_message(&message.id).await.is_ok());
    }
}

// ---------------------------------------------------------------------------
// Exchange orchestration with a stub completion client
// ---------------------------------------------------------------------------

struct StubCompletionClient {
    models: Vec<String>,
}

impl StubCompletionClient {
    fn new() -> Self {
        Self {
            models: vec!["qwen/qwen3-32b".to_string(), "openai/gpt-oss-20b".to_string()],
        }
    }
}

impl CompletionClient for StubCompletionClient {
    fn models(&self) -> &[String] {
        &self.models
    }

    async fn complete(&self, _model: &str, turns: &[ChatTurn]) -> Result<AssistantReply, LlmError> {
        let last = turns.last().map(|turn| turn.content.clone()).unwrap_or_default();
        Ok(AssistantReply {
            content: format!("echo: {last}"),
            reasoning: None,
        })
    }
}

#[tokio::test]
async fn test_start_conversation_builds_titled_first_exchange() {
    let h = harness().await;
    let llm = StubCompletionClient::new();

    let opening = exchange::start_conversation(&h.chat, &llm, &h.user, "qwen/qwen3-32b", "hello")
        .await
        .unwrap();

    assert_eq!(opening.conversation.title, "echo: hello");
    assert_eq!(opening.user.role, MessageRole::User);
    assert_eq!(opening.assistant.role, MessageRole::Assistant);
    assert_eq!(opening.assistant.content, "echo: hello");

    // Tree shape: root -> user -> assistant.
    assert_eq!(opening.user.path.len(), 2);
    assert_eq!(opening.assistant.path.len(), 3);
    assert_eq!(opening.assistant.parent_id, Some(opening.user.id));

    let stored = h.chat.get_conversation(&opening.conversation.id).await.unwrap();
    assert_eq!(stored.title, "echo: hello");
}

#[tokio::test]
async fn test_start_conversation_rejects_unknown_model() {
    let h = harness().await;
    let llm = StubCompletionClient::new();

    let err = exchange::start_conversation(&h.chat, &llm, &h.user, "not/a-model", "hello")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ExchangeError::Llm(LlmError::ModelNotFound(_))
    ));
}

#[tokio::test]
async fn test_send_prompt_twice_forks_the_tree() {
    let h = harness().await;
    let llm = StubCompletionClient::new();

    let opening = exchange::start_conversation(&h.chat, &llm, &h.user, "qwen/qwen3-32b", "hello")
        .await
        .unwrap();

    settle().await;
    let first = exchange::send_prompt(&h.chat, &llm, &opening.assistant.id, "tell me more")
        .await
        .unwrap();
    settle().await;
    let second = exchange::send_prompt(&h.chat, &llm, &opening.assistant.id, "actually, simplify")
        .await
        .unwrap();

    // Both user turns are siblings under the first assistant reply.
    assert_eq!(first.user.parent_id, Some(opening.assistant.id));
    assert_eq!(second.user.parent_id, Some(opening.assistant.id));

    let annotated = h.chat.branch_info(&second.assistant.id).await.unwrap();
    // Path: root, user, assistant, user2, assistant2 -- the fork is under
    // the first assistant reply, and the second user turn carries its rank.
    assert_eq!(
        annotated[3].branch,
        Some(BranchInfo {
            total: 2,
            current: 2
        })
    );

    // The assistant saw the full linear context of its own branch only.
    let context = h.chat.context(&second.assistant.id).await.unwrap();
    assert_eq!(context.len(), 5);
    assert!(context.iter().all(|m| second
        .assistant
        .path
        .contains(&m.id)));
}
