// handlers/mod.rs - Two-tier handler layout
//
// Public (no credentials) → Protected (Application-Name + API-Key)
pub mod protected;
pub mod public;
