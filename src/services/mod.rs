pub mod auth_service;
pub mod canva_api;
pub mod oauth_client;
