//! Application state wiring all services together.
//!
//! AppState holds the concrete service instances used by the REST API.
//! Services are generic over repository/hasher traits, but AppState pins
//! them to the concrete infra implementations. Everything is constructed
//! once in `init` and dependency-injected from there; nothing is
//! process-global.

use std::sync::Arc;

use arbor_core::chat::service::ChatService;
use arbor_core::user::service::UserService;
use arbor_infra::crypto::password::Argon2CredentialHasher;
use arbor_infra::llm::completions::CompletionApiClient;
use arbor_infra::sqlite::conversation::SqliteConversationRepository;
use arbor_infra::sqlite::message::SqliteMessageRepository;
use arbor_infra::sqlite::pool::{default_database_url, DatabasePool};
use arbor_infra::sqlite::user::SqliteUserRepository;

/// Concrete type aliases for the service generics pinned to infra
/// implementations.
pub type ConcreteChatService = ChatService<SqliteMessageRepository, SqliteConversationRepository>;

pub type ConcreteUserService = UserService<SqliteUserRepository, Argon2CredentialHasher>;

/// Shared application state holding all services.
#[derive(Clone)]
pub struct AppState {
    pub chat_service: Arc<ConcreteChatService>,
    pub user_service: Arc<ConcreteUserService>,
    pub completions: Arc<CompletionApiClient>,
    pub db_pool: DatabasePool,
}

impl AppState {
    /// Initialize the application state: connect to the database, discover
    /// the model catalog, wire services.
    pub async fn init(database_url: Option<&str>, completions_url: &str) -> anyhow::Result<Self> {
        let db_url = match database_url {
            Some(url) => url.to_string(),
            None => {
                let url = default_database_url();
                // Make sure the data directory exists before SQLite opens it.
                if let Some(path) = url.strip_prefix("sqlite://") {
                    let path = path.split('?').next().unwrap_or(path);
                    if let Some(dir) = std::path::Path::new(path).parent() {
                        tokio::fs::create_dir_all(dir).await?;
                    }
                }
                url
            }
        };

        let db_pool = DatabasePool::new(&db_url).await?;

        let chat_service = ChatService::new(
            SqliteMessageRepository::new(db_pool.clone()),
            SqliteConversationRepository::new(db_pool.clone()),
        );

        let user_service = UserService::new(
            SqliteUserRepository::new(db_pool.clone()),
            Argon2CredentialHasher::new(),
        );

        let completions = CompletionApiClient::discover(completions_url).await;

        Ok(Self {
            chat_service: Arc::new(chat_service),
            user_service: Arc::new(user_service),
            completions: Arc::new(completions),
            db_pool,
        })
    }
}
