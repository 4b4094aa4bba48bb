pub mod editor;
pub mod error;
pub mod provider;
pub mod session;
pub mod settings;
pub mod style;
pub mod types;
pub mod writer;

#[cfg(test)]
mod serde_tests;
