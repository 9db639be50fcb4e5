pub mod analytics_service;
pub mod chat_service;
