//! Client-side validation for the login, sign-up and recovery forms
//!
//! Each validator reports at most one error per field, in field order, so the
//! screens can show the message right under the offending input.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::api::providers::auth::{SignInData, SignUpData};

pub const NAME_MIN: usize = 3;
pub const NAME_MAX: usize = 100;
pub const PASSWORD_MIN: usize = 6;
pub const PASSWORD_MAX: usize = 100;

static EMAIL_RE: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_'+\-.]*[A-Za-z0-9_+\-]@([A-Za-z0-9][A-Za-z0-9\-]*\.)+[A-Za-z]{2,}$")
        .ok()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Email,
    Password,
    ConfirmPassword,
}

impl Field {
    pub fn label(&self) -> &'static str {
        match self {
            Field::Name => "Nome",
            Field::Email => "E-mail",
            Field::Password => "Senha",
            Field::ConfirmPassword => "Confirmar senha",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct FormError {
    pub field: Field,
    pub message: &'static str,
}

impl FormError {
    fn new(field: Field, message: &'static str) -> Self {
        Self { field, message }
    }
}

/// First error for `field`, if any
pub fn error_for(errors: &[FormError], field: Field) -> Option<&FormError> {
    errors.iter().find(|e| e.field == field)
}

pub fn is_valid_email(email: &str) -> bool {
    if email.starts_with('.') || email.contains("..") {
        return false;
    }
    EMAIL_RE
        .as_ref()
        .map(|re| re.is_match(email))
        .unwrap_or(false)
}

fn check_email(email: &str) -> Option<FormError> {
    if email.is_empty() {
        Some(FormError::new(Field::Email, "E-mail é obrigatório"))
    } else if !is_valid_email(email) {
        Some(FormError::new(Field::Email, "E-mail inválido"))
    } else {
        None
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignUpForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl SignUpForm {
    pub fn validate(&self) -> Result<SignUpData, Vec<FormError>> {
        let mut errors = Vec::new();

        let name_len = self.name.chars().count();
        if name_len < NAME_MIN {
            errors.push(FormError::new(
                Field::Name,
                "Nome deve ter pelo menos 3 caracteres",
            ));
        } else if name_len > NAME_MAX {
            errors.push(FormError::new(
                Field::Name,
                "Nome deve ter no máximo 100 caracteres",
            ));
        }

        errors.extend(check_email(&self.email));

        let password_len = self.password.chars().count();
        if password_len < PASSWORD_MIN {
            errors.push(FormError::new(
                Field::Password,
                "Senha deve ter pelo menos 6 caracteres",
            ));
        } else if password_len > PASSWORD_MAX {
            errors.push(FormError::new(
                Field::Password,
                "Senha deve ter no máximo 100 caracteres",
            ));
        }

        if self.confirm_password.is_empty() {
            errors.push(FormError::new(
                Field::ConfirmPassword,
                "Confirmação de senha é obrigatória",
            ));
        } else if self.confirm_password != self.password {
            errors.push(FormError::new(
                Field::ConfirmPassword,
                "As senhas não coincidem",
            ));
        }

        if errors.is_empty() {
            Ok(SignUpData {
                email: self.email.clone(),
                password: self.password.clone(),
                name: Some(self.name.clone()),
            })
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignInForm {
    pub email: String,
    pub password: String,
}

impl SignInForm {
    pub fn validate(&self) -> Result<SignInData, Vec<FormError>> {
        let mut errors: Vec<FormError> = check_email(&self.email).into_iter().collect();
        if self.password.is_empty() {
            errors.push(FormError::new(Field::Password, "Senha é obrigatória"));
        }

        if errors.is_empty() {
            Ok(SignInData {
                email: self.email.clone(),
                password: self.password.clone(),
            })
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForgotPasswordForm {
    pub email: String,
}

impl ForgotPasswordForm {
    /// The e-mail to send the recovery link to
    pub fn validate(&self) -> Result<String, Vec<FormError>> {
        match check_email(&self.email) {
            Some(err) => Err(vec![err]),
            None => Ok(self.email.clone()),
        }
    }
}
