//! Account forms and the signed-in session

pub mod forms;
pub mod session;

pub use forms::{Field, ForgotPasswordForm, FormError, SignInForm, SignUpForm};
pub use session::SessionStore;
