// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Token acquisition only. Route prefix: /auth/*

pub mod auth;
