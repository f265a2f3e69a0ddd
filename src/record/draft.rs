use std::collections::BTreeMap;

use super::Field;

/// In-progress form input, kept as the raw text the user typed
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Draft {
    values: BTreeMap<Field, String>,
}

impl Draft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter, mostly for tests and scripted input.
    pub fn with(mut self, field: Field, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    /// Replace a field's text. Blank text removes the field.
    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        if value.trim().is_empty() {
            self.values.remove(&field);
        } else {
            self.values.insert(field, value);
        }
    }

    /// Raw text of a field, or `None` when it was never filled in.
    pub fn get(&self, field: Field) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }

    /// Trimmed text of a field.
    pub fn trimmed(&self, field: Field) -> Option<&str> {
        self.get(field).map(str::trim)
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_value_counts_as_absent() {
        let mut draft = Draft::new().with(Field::City, "Pune");
        assert_eq!(draft.get(Field::City), Some("Pune"));

        draft.set(Field::City, "   ");
        assert_eq!(draft.get(Field::City), None);
        assert!(draft.is_empty());
    }

    #[test]
    fn test_trimmed_keeps_raw_value() {
        let draft = Draft::new().with(Field::Name, "  Ravi ");
        assert_eq!(draft.get(Field::Name), Some("  Ravi "));
        assert_eq!(draft.trimmed(Field::Name), Some("Ravi"));
    }
}
