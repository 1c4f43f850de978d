// handlers/mod.rs - HTTP handlers
//
// public:    reachable without a session (/, /health, /login)
// dashboard: everything under /dashboard, behind the access gate
pub mod dashboard;
pub mod public;
