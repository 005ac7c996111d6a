pub mod panel;
pub mod user;

pub use panel::{NewPanel, Panel, PanelPatch, PanelStatus, PanelView};
pub use user::{Role, User, UserRecord};
