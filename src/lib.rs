// src/lib.rs — Library root for Chátmosphere

pub mod api;
pub mod cli;
pub mod conversation;
pub mod infra;
pub mod provider;
pub mod session;
pub mod util;
