pub mod auth_screen;
pub mod checkin;
pub mod dialogs;
pub mod drawer;
pub mod form_field;
pub mod pages;
pub mod terminal_guard;
pub mod toast;

pub use auth_screen::{AuthAction, AuthMode, AuthScreen};
pub use checkin::{CheckInAction, CheckInScreen};
pub use dialogs::{ConfirmDialog, ConfirmPurpose, ConfirmResult};
pub use drawer::{Drawer, DrawerAction, Route};
pub use form_field::FormField;
pub use toast::{ToastKind, Toasts};
