pub mod chat;
pub mod plan;
