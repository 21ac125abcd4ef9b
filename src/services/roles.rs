//! Class name to role mention lookup.

use std::collections::HashMap;

use crate::models::RoleMapping;

/// Resolves class names such as `8B` or `11.1` to role ids.
pub trait ClassRoleLookup {
    fn role_for(&self, class_name: &str) -> Option<&str>;

    /// Role mention for a class, or the class name itself when unmapped.
    fn mention(&self, class_name: &str) -> String {
        match self.role_for(class_name) {
            Some(id) => format!("<@&{id}>"),
            None => class_name.to_string(),
        }
    }
}

/// Role table built from the `[[roles]]` configuration entries.
#[derive(Debug, Clone, Default)]
pub struct RoleTable {
    /// Keyed by (year, class letter); year-wide roles have no letter
    roles: HashMap<(String, Option<String>), String>,
}

impl RoleTable {
    pub fn new(mappings: &[RoleMapping]) -> Self {
        let roles = mappings
            .iter()
            .map(|m| {
                let class = m
                    .class
                    .as_deref()
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .map(str::to_uppercase);
                ((m.year.trim().to_string(), class), m.role_id.trim().to_string())
            })
            .collect();
        Self { roles }
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}

/// Split `8B` into year `8` and class `B`; names ending in a digit are a
/// whole year or tutorial group.
fn split_class_name(name: &str) -> (String, Option<String>) {
    match name.char_indices().last() {
        Some((idx, last)) if !last.is_ascii_digit() => (
            name[..idx].to_string(),
            Some(last.to_uppercase().to_string()),
        ),
        _ => (name.to_string(), None),
    }
}

impl ClassRoleLookup for RoleTable {
    fn role_for(&self, class_name: &str) -> Option<&str> {
        let key = split_class_name(class_name.trim());
        self.roles.get(&key).map(String::as_str)
    }
}
