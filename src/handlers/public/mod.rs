// handlers/public/mod.rs - Handlers that skip the API key gate
//
// Paths served here must be listed in `SecurityConfig::public_paths`.

pub mod health;

pub use health::health;
