pub mod chat_service;
pub mod session_service;
pub mod settings_service;
