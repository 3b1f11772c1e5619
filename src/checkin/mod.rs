//! Check-in wizard core
//!
//! A linear, seven-step flow that accumulates a vehicle lookup, captured
//! media and per-step form records into a [`WizardSession`], then assembles a
//! [`CheckInRecord`] and hands it to a [`CheckInSink`].

pub mod capture;
pub mod error;
pub mod lookup;
pub mod media;
pub mod plate;
pub mod record;
pub mod steps;
pub mod submit;
pub mod vehicle;
pub mod wizard;

pub use capture::{import_file, CaptureError, CommandCapture, MediaCapture, MockCapture};
pub use error::CheckInError;
pub use lookup::{LookupOutcome, LookupTicket, VehicleLookup, NOT_FOUND_MESSAGE};
pub use media::{MediaItem, MediaKind, MediaList};
pub use plate::{normalize, Plate, PLATE_MAX_LENGTH};
pub use record::CheckInRecord;
pub use steps::{CheckInStep, FuelAndItemsData, FuelLevel, HandoverData, StepData, StepDataStore};
pub use submit::{finalize, CheckInSink, FinalizeError, JsonFileSink, SubmitReceipt};
pub use vehicle::{CustomerData, VehicleData};
pub use wizard::WizardSession;
