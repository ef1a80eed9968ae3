//! Notifier core: pure state machine and view-model helpers.
mod effect;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use msg::Msg;
pub use state::{AppState, EmailJobKind, NotificationKey, PendingNotification};
pub use update::update;
pub use view_model::{
    AppViewModel, CardAction, NotificationCardView, POPUP_BLOCKED_ALERT, RETRY_DOWNLOAD_BODY,
};
