pub mod chat;
pub mod db;

pub use chat::MockChatAdapter;
pub use db::PgDocumentStore;
