//! Bidirectional id <-> name tables.
//!
//! Every table in the registry maps a dense, zero-based id space onto unique
//! names. The forward direction is a vector indexed by id, the reverse a hash
//! map, and both are built together so they can never disagree.

use std::collections::HashMap;
use crate::error::{IdentifierKind, ProblemShapeError, Result};

/// A dense id space with a unique name per id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameTable {
    kind: IdentifierKind,
    names: Vec<String>,
    ids: HashMap<String, usize>,
}

impl NameTable {
    /// Builds a table where `names[i]` is the name of id `i`.
    ///
    /// # Errors
    ///
    /// Returns `MalformedShape` if a name is empty or appears twice.
    pub fn new<I, S>(kind: IdentifierKind, names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let mut ids = HashMap::with_capacity(names.len());

        for (id, name) in names.iter().enumerate() {
            if name.is_empty() {
                return Err(ProblemShapeError::malformed_shape(format!(
                    "{kind} {id} has an empty name"
                )));
            }
            if let Some(previous) = ids.insert(name.clone(), id) {
                return Err(ProblemShapeError::malformed_shape(format!(
                    "{kind} name '{name}' is used by ids {previous} and {id}"
                )));
            }
        }

        Ok(Self { kind, names, ids })
    }

    /// Returns the number of registered ids.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns `true` if the table holds no ids.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Returns the name registered for `id`.
    pub fn name(&self, id: usize) -> Result<&str> {
        self.names
            .get(id)
            .map(String::as_str)
            .ok_or_else(|| ProblemShapeError::unknown_identifier(self.kind, id))
    }

    /// Returns the id registered for `name`.
    pub fn id(&self, name: &str) -> Result<usize> {
        self.ids
            .get(name)
            .copied()
            .ok_or_else(|| ProblemShapeError::unknown_identifier(self.kind, name))
    }

    /// Returns `true` if `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.ids.contains_key(name)
    }

    /// Iterates over `(id, name)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.names.iter().map(String::as_str).enumerate()
    }
}
