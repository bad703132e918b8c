//! Test Data Builders
//!
//! Builders for attribute maps with sensible defaults, so tests spell out
//! only the attributes they care about.

use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::Name;
use fake::Fake;
use repository_core::Fields;
use serde_json::Value;

/// Builder for `User` attribute maps
#[derive(Debug, Clone)]
pub struct UserAttributesBuilder {
    fields: Fields,
}

impl Default for UserAttributesBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl UserAttributesBuilder {
    /// Starts from a random name and no other attributes
    pub fn new() -> Self {
        let name: String = Name().fake();
        let mut fields = Fields::new();
        fields.insert("name".into(), Value::from(name));
        Self { fields }
    }

    pub fn id(mut self, id: i64) -> Self {
        self.fields.insert("id".into(), Value::from(id));
        self
    }

    pub fn name(mut self, name: &str) -> Self {
        self.fields.insert("name".into(), Value::from(name));
        self
    }

    pub fn email(mut self, email: &str) -> Self {
        self.fields.insert("email".into(), Value::from(email));
        self
    }

    /// Sets a random, well-formed email address
    pub fn fake_email(mut self) -> Self {
        let email: String = SafeEmail().fake();
        self.fields.insert("email".into(), Value::from(email));
        self
    }

    pub fn role(mut self, role: &str) -> Self {
        self.fields.insert("role".into(), Value::from(role));
        self
    }

    pub fn active(mut self, active: bool) -> Self {
        self.fields.insert("active".into(), Value::from(active));
        self
    }

    /// Removes an attribute, e.g. to provoke a required-attribute violation
    pub fn without(mut self, attribute: &str) -> Self {
        self.fields.remove(attribute);
        self
    }

    pub fn build(self) -> Fields {
        self.fields
    }
}
