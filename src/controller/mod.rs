//! Two-step registration form controller
//!
//! Owns the draft the user is editing, gates the move from personal to
//! residential details on the Step-One rules, and hands accepted records to
//! the [`SubmissionStore`].
//!
//! Country suggestions are sequenced: every query change takes a new
//! [`LookupTicket`], and only the newest ticket may install its results, so a
//! slow lookup for an older query can never overwrite a fresher list.

use std::sync::Arc;

use thiserror::Error;

use crate::lookup::CountryLookup;
use crate::record::{Draft, Field};
use crate::schema::{self, ValidationErrors};
use crate::store::{Submission, SubmissionStore};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("Personal details must be completed before submitting")]
    StepIncomplete,

    #[error("Invalid input: {0}")]
    Invalid(#[from] ValidationErrors),
}

/// Wizard position
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FormStep {
    /// Personal details
    #[default]
    StepOne,
    /// Residential details
    StepTwo,
}

impl FormStep {
    /// The only transition is forward; StepTwo stays put.
    pub fn next(self) -> Self {
        FormStep::StepTwo
    }

    pub fn title(self) -> &'static str {
        match self {
            FormStep::StepOne => "Enter personal details",
            FormStep::StepTwo => "Enter residential details",
        }
    }

    /// Fields entered on this step.
    pub fn fields(self) -> &'static [Field] {
        match self {
            FormStep::StepOne => &Field::STEP_ONE,
            FormStep::StepTwo => &[
                Field::Address,
                Field::State,
                Field::City,
                Field::Country,
                Field::PinCode,
            ],
        }
    }
}

/// Handle for one country lookup
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LookupTicket {
    seq: u64,
    query: String,
}

impl LookupTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn query(&self) -> &str {
        &self.query
    }
}

pub struct FormController {
    step: FormStep,
    draft: Draft,
    errors: ValidationErrors,
    country_query: String,
    suggestions: Vec<String>,
    latest_lookup: u64,
    store: Arc<SubmissionStore>,
    lookup: Arc<dyn CountryLookup>,
}

impl FormController {
    pub fn new(store: Arc<SubmissionStore>, lookup: Arc<dyn CountryLookup>) -> Self {
        Self {
            step: FormStep::StepOne,
            draft: Draft::new(),
            errors: ValidationErrors::new(),
            country_query: String::new(),
            suggestions: Vec::new(),
            latest_lookup: 0,
            store,
            lookup,
        }
    }

    pub fn step(&self) -> FormStep {
        self.step
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    /// Errors surfaced by the last `advance` or `submit`, minus fields edited since.
    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn country_query(&self) -> &str {
        &self.country_query
    }

    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    pub fn store(&self) -> &Arc<SubmissionStore> {
        &self.store
    }

    /// Shared handle to the lookup, for drivers that run lookups off the event loop.
    pub fn lookup(&self) -> Arc<dyn CountryLookup> {
        self.lookup.clone()
    }

    /// Keystroke update for a single field.
    ///
    /// Changing the country makes every outstanding lookup stale.
    pub fn set_field(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        if field == Field::Country {
            self.country_query = value.clone();
            self.latest_lookup += 1;
        }
        self.draft.set(field, value);
        self.errors.remove(field);
        if field == Field::GovIdType {
            self.errors.remove(Field::GovId);
        }
    }

    /// Validate the personal details and move on to residential details.
    pub fn advance(&mut self) -> Result<(), FormError> {
        if self.step == FormStep::StepTwo {
            return Ok(());
        }

        for field in Field::STEP_ONE {
            self.errors.remove(field);
        }

        match schema::validate_fields(&self.draft, &Field::STEP_ONE) {
            Ok(()) => {
                self.step = self.step.next();
                log::debug!("Personal details accepted, moving to {:?}", self.step);
                Ok(())
            }
            Err(errors) => {
                log::debug!("Personal details rejected: {:?}", errors.fields().collect::<Vec<_>>());
                self.errors.extend(errors.clone());
                Err(FormError::Invalid(errors))
            }
        }
    }

    /// Validate the full draft and, if it passes, append it to the store and start over.
    pub fn submit(&mut self) -> Result<Submission, FormError> {
        if self.step == FormStep::StepOne {
            return Err(FormError::StepIncomplete);
        }

        match schema::validate(&self.draft) {
            Ok(record) => {
                let submission = self.store.append(record);
                self.reset();
                Ok(submission)
            }
            Err(errors) => {
                self.errors = errors.clone();
                Err(FormError::Invalid(errors))
            }
        }
    }

    /// Record a new country query and take a ticket for its lookup.
    ///
    /// The query also becomes the draft's country value.
    pub fn begin_country_query(&mut self, text: impl Into<String>) -> LookupTicket {
        let text = text.into();
        self.set_field(Field::Country, text.clone());
        LookupTicket {
            seq: self.latest_lookup,
            query: text,
        }
    }

    /// Install lookup results if `ticket` is still the newest. Returns whether they were applied.
    pub fn apply_suggestions(&mut self, ticket: &LookupTicket, names: Vec<String>) -> bool {
        if ticket.seq != self.latest_lookup {
            log::debug!(
                "Discarding stale suggestions for {:?} (lookup {} superseded by {})",
                ticket.query,
                ticket.seq,
                self.latest_lookup
            );
            return false;
        }
        self.suggestions = names;
        true
    }

    /// Update the query, run its lookup and install the results.
    pub async fn update_country_query(&mut self, text: impl Into<String>) -> bool {
        let ticket = self.begin_country_query(text);
        let names = self.lookup.suggest(ticket.query()).await;
        self.apply_suggestions(&ticket, names)
    }

    /// Use a suggestion as the country. Outstanding lookups become stale.
    pub fn select_suggestion(&mut self, index: usize) -> Option<String> {
        let name = self.suggestions.get(index)?.clone();
        self.set_field(Field::Country, name.clone());
        Some(name)
    }

    /// Clear all input and return to personal details.
    pub fn reset(&mut self) {
        self.step = FormStep::StepOne;
        self.draft.clear();
        self.errors.clear();
        self.country_query.clear();
        self.suggestions.clear();
        self.latest_lookup += 1;
    }
}
