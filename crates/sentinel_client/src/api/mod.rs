pub mod audit;
pub mod auth;
pub mod client;
pub mod models;
pub mod network;
pub mod security;

pub use client::{ApiClient, TokenSlot};
