// handlers/protected/mod.rs - Protected handlers (bearer token required)
//
// Every handler here receives the resolved caller as `Extension<CurrentUser>`.

pub mod auth;
pub mod panels;
pub mod users;
