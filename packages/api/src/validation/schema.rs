//! Form schemas: an ordered list of field rules evaluated over a typed form.
//!
//! Every rule sees the whole form so cross-field checks (confirm password)
//! need no special casing. All rules run; errors are collected rather than
//! short-circuited so a form can show every problem at once.

use std::fmt;

use super::{FieldError, Validator};

type Rule<T> = Box<dyn Fn(&Validator, &T) -> Result<(), FieldError> + Send + Sync>;

/// Named field rules for a form type `T`.
pub struct Schema<T> {
    rules: Vec<(&'static str, Rule<T>)>,
}

impl<T> Schema<T> {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Add a rule for `field`. Rules run in insertion order.
    pub fn field<F>(mut self, field: &'static str, rule: F) -> Self
    where
        F: Fn(&Validator, &T) -> Result<(), FieldError> + Send + Sync + 'static,
    {
        self.rules.push((field, Box::new(rule)));
        self
    }

    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.iter().map(|(field, _)| *field)
    }
}

impl<T> Default for Schema<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// A typed form with a canonical schema.
pub trait Form: Sized {
    fn schema() -> Schema<Self>;
}

/// Per-field messages from a form validation, in schema order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<(&'static str, String)>,
}

impl ValidationErrors {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// The message for `field`, if it failed.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, message)| message.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        self.errors
            .iter()
            .map(|(field, message)| (*field, message.as_str()))
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

impl std::error::Error for ValidationErrors {}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (_, message)) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            f.write_str(message)?;
        }
        Ok(())
    }
}

impl Validator {
    /// Run every rule of `schema` against `form`.
    pub fn validate_form<T>(&self, form: &T, schema: &Schema<T>) -> ValidationErrors {
        let errors = schema
            .rules
            .iter()
            .filter_map(|(field, rule)| {
                rule(self, form)
                    .err()
                    .map(|error| (*field, error.to_string()))
            })
            .collect();
        ValidationErrors { errors }
    }

    /// Validate `form` against its canonical schema.
    pub fn check<T: Form>(&self, form: &T) -> Result<(), ValidationErrors> {
        let errors = self.validate_form(form, &T::schema());
        if errors.is_valid() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Pair {
        a: String,
        b: String,
    }

    fn schema() -> Schema<Pair> {
        Schema::new()
            .field("a", |v, f: &Pair| v.validate_required(&f.a, "A"))
            .field("b", |v, f: &Pair| v.validate_confirm_password(&f.a, &f.b))
    }

    #[test]
    fn test_collects_every_error_in_order() {
        let v = Validator::default();
        let errors = v.validate_form(
            &Pair {
                a: String::new(),
                b: "x".to_string(),
            },
            &schema(),
        );
        assert!(!errors.is_valid());
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("a"), Some("A is required"));
        assert_eq!(errors.get("b"), Some("Passwords do not match"));
        let fields: Vec<_> = errors.iter().map(|(f, _)| f).collect();
        assert_eq!(fields, vec!["a", "b"]);
        assert_eq!(errors.to_string(), "A is required; Passwords do not match");
    }

    #[test]
    fn test_valid_form_has_no_errors() {
        let v = Validator::default();
        let errors = v.validate_form(
            &Pair {
                a: "same".to_string(),
                b: "same".to_string(),
            },
            &schema(),
        );
        assert!(errors.is_valid());
        assert_eq!(errors.get("a"), None);
        assert_eq!(schema().fields().collect::<Vec<_>>(), vec!["a", "b"]);
    }
}
