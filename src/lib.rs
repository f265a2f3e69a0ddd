// Regform - Personal Details Registration Form

pub mod controller;
pub mod lookup;
pub mod record;
pub mod render;
pub mod schema;
pub mod store;

pub use controller::{FormController, FormError, FormStep, LookupTicket};
pub use lookup::{CountryLookup, LookupConfig, LookupError, RestCountriesClient, StaticCountries};
pub use record::{Draft, Field, GovIdType, RegistrationRecord, Sex};
pub use schema::{validate, validate_fields, FieldError, ValidationErrors};
pub use store::{Submission, SubmissionStore};
