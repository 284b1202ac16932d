// handlers/protected/mod.rs - Handlers behind the API key gate
//
// Every route here requires a registered Application-Name and matching
// API-Key. DELETEs of roles and permissions additionally pass through the
// deletion guard before reaching `role::delete` / `permission::delete`.

pub mod api_storage;
pub mod emp_role;
pub mod permission;
pub mod role;
pub mod role_permission;
