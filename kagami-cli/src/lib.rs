//! Terminal front-end for the kagami evaluation wizard: HTTP client,
//! credential handling, and the interactive wizard loop.

pub mod api_client;
pub mod config;
pub mod wizard;
