//! Application state wiring all services together.
//!
//! Services are generic over repository traits; AppState pins them to
//! the concrete SQLite implementations and shares the single model
//! adapter between the reply pipeline and the ability executor.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use roundtable_core::ability::{AbilityExecutor, AbilityRegistry};
use roundtable_core::intent::HeuristicIntentStrategy;
use roundtable_core::model::BoxModelAdapter;
use roundtable_core::room::{ReplyGenerator, RoomOrchestrator};
use roundtable_core::service::ability::AbilityService;
use roundtable_core::service::role::RoleService;
use roundtable_core::service::room::RoomService;
use roundtable_infra::config::{data_dir, load_global_config};
use roundtable_infra::model::OpenAiCompatAdapter;
use roundtable_infra::sqlite::{
    DatabasePool, SqliteMessageRepository, SqliteRoleRepository, SqliteRoomRepository,
    SqliteStoredAbilityRepository, default_database_url,
};
use roundtable_types::ability::Ability;
use roundtable_types::config::GlobalConfig;

/// Per-command timeout for command-kind abilities.
const COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// Concrete type aliases for the service generics pinned to the SQLite backend.
pub type ConcreteRoleService = RoleService<SqliteRoleRepository, SqliteStoredAbilityRepository>;

pub type ConcreteRoomService =
    RoomService<SqliteRoomRepository, SqliteMessageRepository, SqliteRoleRepository>;

pub type ConcreteAbilityService = AbilityService<SqliteStoredAbilityRepository>;

pub type ConcreteOrchestrator =
    RoomOrchestrator<SqliteRoleRepository, SqliteMessageRepository, SqliteStoredAbilityRepository>;

/// Shared application state holding all services.
///
/// Used by both CLI commands and REST API handlers.
#[derive(Clone)]
pub struct AppState {
    pub role_service: Arc<ConcreteRoleService>,
    pub room_service: Arc<ConcreteRoomService>,
    pub ability_service: Arc<ConcreteAbilityService>,
    pub orchestrator: ConcreteOrchestrator,
    /// Direct repository access for message listing and annotation.
    pub roles: Arc<SqliteRoleRepository>,
    pub messages: Arc<SqliteMessageRepository>,
    pub config: GlobalConfig,
    pub data_dir: PathBuf,
    pub db_pool: DatabasePool,
}

impl AppState {
    /// Initialize the application state: load config, connect to the
    /// database, wire services.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = data_dir();
        tokio::fs::create_dir_all(&data_dir).await?;

        let config = load_global_config(&data_dir).await;
        let db_pool = DatabasePool::new(&default_database_url()).await?;

        // The configured layer is fixed for the process lifetime; each
        // registry gets its own copy plus a handle on the stored layer.
        let configured: Vec<Ability> = config
            .abilities
            .iter()
            .cloned()
            .filter_map(|a| a.into_ability())
            .collect();

        let adapter = Arc::new(BoxModelAdapter::new(OpenAiCompatAdapter::from_config(
            &config.model,
        )));

        let registry = Arc::new(AbilityRegistry::new(
            configured.clone(),
            SqliteStoredAbilityRepository::new(db_pool.clone()),
        ));
        let executor = Arc::new(AbilityExecutor::new(
            Arc::clone(&adapter),
            config.model.default_model.clone(),
            COMMAND_TIMEOUT,
        ));
        let generator = Arc::new(ReplyGenerator::new(
            registry,
            executor,
            Arc::clone(&adapter),
            Arc::new(HeuristicIntentStrategy),
            config.model.default_model.clone(),
        ));

        let roles = Arc::new(SqliteRoleRepository::new(db_pool.clone()));
        let messages = Arc::new(SqliteMessageRepository::new(db_pool.clone()));
        let orchestrator =
            RoomOrchestrator::new(Arc::clone(&roles), Arc::clone(&messages), generator);

        let role_service = RoleService::new(
            SqliteRoleRepository::new(db_pool.clone()),
            AbilityRegistry::new(
                configured.clone(),
                SqliteStoredAbilityRepository::new(db_pool.clone()),
            ),
        );
        let room_service = RoomService::new(
            SqliteRoomRepository::new(db_pool.clone()),
            SqliteMessageRepository::new(db_pool.clone()),
            SqliteRoleRepository::new(db_pool.clone()),
        );
        let ability_service = AbilityService::new(
            configured,
            SqliteStoredAbilityRepository::new(db_pool.clone()),
        );

        Ok(Self {
            role_service: Arc::new(role_service),
            room_service: Arc::new(room_service),
            ability_service: Arc::new(ability_service),
            orchestrator,
            roles,
            messages,
            config,
            data_dir,
            db_pool,
        })
    }
}
