//! Registration record data model
//!
//! A `Draft` is what the user has typed so far; a `RegistrationRecord` is the
//! typed value the schema produces once every rule passes.

mod draft;

pub use draft::Draft;

use std::fmt;

use serde::{Deserialize, Serialize};

/// Every field of the registration form
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Field {
    Name,
    Dob,
    Sex,
    Mobile,
    GovIdType,
    GovId,
    Address,
    State,
    City,
    Country,
    PinCode,
}

impl Field {
    /// All fields in declaration order.
    pub const ALL: [Field; 11] = [
        Field::Name,
        Field::Dob,
        Field::Sex,
        Field::Mobile,
        Field::GovIdType,
        Field::GovId,
        Field::Address,
        Field::State,
        Field::City,
        Field::Country,
        Field::PinCode,
    ];

    /// Fields gating the move from personal to residential details.
    pub const STEP_ONE: [Field; 6] = [
        Field::Name,
        Field::Dob,
        Field::Sex,
        Field::Mobile,
        Field::GovId,
        Field::GovIdType,
    ];

    /// Column order of the submissions table.
    pub const TABLE_ORDER: [Field; 11] = [
        Field::Name,
        Field::Dob,
        Field::Sex,
        Field::Mobile,
        Field::GovIdType,
        Field::GovId,
        Field::Address,
        Field::City,
        Field::PinCode,
        Field::State,
        Field::Country,
    ];

    /// Name used on the wire and in error maps.
    pub fn name(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Dob => "dob",
            Field::Sex => "sex",
            Field::Mobile => "mobile",
            Field::GovIdType => "govIDType",
            Field::GovId => "govID",
            Field::Address => "address",
            Field::State => "state",
            Field::City => "city",
            Field::Country => "country",
            Field::PinCode => "pinCode",
        }
    }

    /// Human-readable column label.
    pub fn label(self) -> &'static str {
        match self {
            Field::Name => "Name",
            Field::Dob => "Age",
            Field::Sex => "Sex",
            Field::Mobile => "Mobile Number",
            Field::GovIdType => "Gov Id Type",
            Field::GovId => "Gov Id",
            Field::Address => "Address",
            Field::State => "State",
            Field::City => "City",
            Field::Country => "Country",
            Field::PinCode => "Pin Code",
        }
    }

    /// Parse a wire name. Matching ignores ASCII case so `govidtype` works from a terminal.
    pub fn from_name(name: &str) -> Option<Field> {
        Field::ALL
            .into_iter()
            .find(|field| field.name().eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            "male" => Some(Sex::Male),
            "female" => Some(Sex::Female),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Sex::Male => "male",
            Sex::Female => "female",
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of government-issued identity document
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GovIdType {
    /// 12-digit Aadhaar number
    Aadhar,
    /// 10-character PAN
    Pan,
}

impl GovIdType {
    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            "aadhar" => Some(GovIdType::Aadhar),
            "pan" => Some(GovIdType::Pan),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GovIdType::Aadhar => "aadhar",
            GovIdType::Pan => "pan",
        }
    }
}

impl fmt::Display for GovIdType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registration that passed every schema rule
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRecord {
    pub name: String,
    /// Age in whole years
    pub dob: u32,
    pub sex: Sex,
    pub mobile: Option<String>,
    #[serde(rename = "govIDType")]
    pub gov_id_type: Option<GovIdType>,
    #[serde(rename = "govID")]
    pub gov_id: Option<String>,
    pub address: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub pin_code: Option<String>,
}

impl RegistrationRecord {
    /// Display text for a single field; absent optional values yield `None`.
    pub fn value(&self, field: Field) -> Option<String> {
        match field {
            Field::Name => Some(self.name.clone()),
            Field::Dob => Some(self.dob.to_string()),
            Field::Sex => Some(self.sex.to_string()),
            Field::Mobile => self.mobile.clone(),
            Field::GovIdType => self.gov_id_type.map(|kind| kind.to_string()),
            Field::GovId => self.gov_id.clone(),
            Field::Address => self.address.clone(),
            Field::State => self.state.clone(),
            Field::City => self.city.clone(),
            Field::Country => self.country.clone(),
            Field::PinCode => self.pin_code.clone(),
        }
    }
}
