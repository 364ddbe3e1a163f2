use anyhow::{anyhow, Result};
use std::collections::HashMap;

/// Handles a set of names, each one with a unique id.
///
/// Ids are given at registration time, from `0` to `n - 1`, in registration order.
/// Names cannot be removed, so that ids are stable handles for the lifetime of the table.
///
/// The `kind` given at construction is only used in error messages (`"constant"`, `"predicate"`, ...).
#[derive(Debug, Clone)]
pub struct NameTable {
    kind: &'static str,
    names: Vec<String>,
    name_to_id: HashMap<String, usize>,
}

impl NameTable {
    /// Builds a new, empty table.
    ///
    /// # Example
    ///
    /// ```
    /// # use liftsat::utils::NameTable;
    /// let table = NameTable::new("constant");
    /// assert!(table.is_empty());
    /// ```
    pub fn new(kind: &'static str) -> Self {
        NameTable {
            kind,
            names: Vec::new(),
            name_to_id: HashMap::new(),
        }
    }

    /// Registers a new name, and returns its id.
    ///
    /// An error is returned if the name is already registered.
    ///
    /// # Example
    ///
    /// ```
    /// # use liftsat::utils::NameTable;
    /// let mut table = NameTable::new("constant");
    /// assert_eq!(0, table.register("a").unwrap());
    /// assert_eq!(1, table.register("b").unwrap());
    /// assert!(table.register("a").is_err());
    /// ```
    pub fn register(&mut self, name: &str) -> Result<usize> {
        if self.name_to_id.contains_key(name) {
            return Err(anyhow!("{} {} is already defined", self.kind, name));
        }
        let id = self.names.len();
        self.names.push(name.to_string());
        self.name_to_id.insert(name.to_string(), id);
        Ok(id)
    }

    /// Returns the id associated with a name.
    ///
    /// In case no such name exists, an error is returned.
    pub fn get_id(&self, name: &str) -> Result<usize> {
        self.name_to_id
            .get(name)
            .copied()
            .ok_or_else(|| anyhow!("no such {}: {}", self.kind, name))
    }

    /// Returns the name with the corresponding id.
    ///
    /// # Panics
    ///
    /// Panics if no name has such id.
    pub fn name_of(&self, id: usize) -> &str {
        &self.names[id]
    }

    /// Returns the number of names in this table.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns `true` if and only if the table has no name.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterates over the names, in id order.
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.names.iter().map(|s| s.as_str())
    }
}
