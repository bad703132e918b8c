//! Property-Based Test Generators
//!
//! Proptest strategies for attribute maps of the fixture models.

use proptest::prelude::*;
use repository_core::{Fields, SearchParams};
use serde_json::Value;

/// Roles drawn by the generators; small on purpose so filters hit often
pub const ROLES: &[&str] = &["member", "admin", "guest"];

/// Strategy for generating a role
pub fn role_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(ROLES).prop_map(|role| role.to_string())
}

/// Strategy for generating a non-empty display name
pub fn name_strategy() -> impl Strategy<Value = String> {
    "[A-Z][a-z]{1,11}"
}

/// Strategy for generating valid `User` attributes (no key, no email)
pub fn user_fields_strategy() -> impl Strategy<Value = Fields> {
    (name_strategy(), role_strategy(), any::<bool>()).prop_map(|(name, role, active)| {
        let mut fields = Fields::new();
        fields.insert("name".into(), Value::from(name));
        fields.insert("role".into(), Value::from(role));
        fields.insert("active".into(), Value::from(active));
        fields
    })
}

/// Strategy for generating a batch of `User` attributes
pub fn user_batch_strategy(max: usize) -> impl Strategy<Value = Vec<Fields>> {
    prop::collection::vec(user_fields_strategy(), 0..=max)
}

/// Strategy for generating a partial update of `User` attributes
pub fn user_update_strategy() -> impl Strategy<Value = Fields> {
    (
        prop::option::of(name_strategy()),
        prop::option::of(role_strategy()),
        prop::option::of(any::<bool>()),
    )
        .prop_map(|(name, role, active)| {
            let mut fields = Fields::new();
            if let Some(name) = name {
                fields.insert("name".into(), Value::from(name));
            }
            if let Some(role) = role {
                fields.insert("role".into(), Value::from(role));
            }
            if let Some(active) = active {
                fields.insert("active".into(), Value::from(active));
            }
            fields
        })
}

/// Strategy for generating equality filters over `User` attributes
pub fn user_search_strategy() -> impl Strategy<Value = SearchParams> {
    (prop::option::of(role_strategy()), prop::option::of(any::<bool>())).prop_map(|(role, active)| {
        let mut params = SearchParams::new();
        if let Some(role) = role {
            params.insert("role".into(), Value::from(role));
        }
        if let Some(active) = active {
            params.insert("active".into(), Value::from(active));
        }
        params
    })
}

/// Strategy for generating page sizes
pub fn per_page_strategy() -> impl Strategy<Value = u32> {
    1u32..8u32
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn test_user_fields_always_carry_a_name(fields in user_fields_strategy()) {
            let name = fields.get("name").and_then(Value::as_str).unwrap_or_default();
            prop_assert!(!name.is_empty());
        }

        #[test]
        fn test_search_params_only_use_known_attributes(params in user_search_strategy()) {
            prop_assert!(params.keys().all(|k| k == "role" || k == "active"));
        }
    }
}
