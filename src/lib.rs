//! Storefront client core.
//!
//! ARCHITECTURE
//! ============
//! Two pieces carry all of the client's state: the session store (who is
//! signed in, persisted across restarts) and the request pipeline (the one
//! HTTP client every call goes through, holding the current bearer token).
//! Neither reaches into the other. `app::Storefront` subscribes to session
//! transitions and forwards the access token to the pipeline.
//!
//! Domain services (products, cart, orders, ...) are thin typed wrappers over
//! the pipeline; all business logic lives on the remote API.

pub mod api;
pub mod app;
pub mod config;
pub mod services;
pub mod session;
pub mod storage;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
