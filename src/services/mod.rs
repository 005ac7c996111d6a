pub mod error;
pub mod gate;
pub mod panel_service;
pub mod user_service;
pub mod validation;

pub use error::{ServiceError, ServiceResult};
pub use gate::{require_role, AuthGate};
pub use panel_service::PanelService;
pub use user_service::{AuthSession, Registration, UserService};
