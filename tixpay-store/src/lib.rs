pub mod app_config;
pub mod clients;
pub mod database;
pub mod events;
pub mod order_repo;
pub mod redis_repo;

pub use clients::{HttpClients, MidtransGateway, RulesServiceClient, TicketServiceClient, UserServiceClient};
pub use database::DbClient;
pub use events::EventProducer;
pub use order_repo::PgOrderRepository;
pub use redis_repo::RedisProfileCache;
