pub mod app_service;
pub mod rewrite;
