//! Provider trait definitions for backend integrations
//!
//! - Auth providers (Supabase GoTrue)
//! - Vehicle lookup providers (Supabase PostgREST)

pub mod auth;
pub mod supabase;
pub mod vehicle;

pub use auth::{AuthProvider, AuthSession, AuthUser, SupabaseAuthProvider};
pub use supabase::SupabaseClient;
pub use vehicle::{SupabaseVehicleProvider, VehicleProvider};
