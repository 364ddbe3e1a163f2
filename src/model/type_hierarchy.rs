use super::TypeId;
use crate::utils::NameTable;
use anyhow::{anyhow, Result};

/// The catalog of the types of a problem.
///
/// Each type has a name and a (possibly empty) set of direct supertypes.
/// Since supertypes must be defined before their subtypes, the hierarchy is acyclic.
#[derive(Debug, Clone)]
pub struct TypeHierarchy {
    names: NameTable,
    supertypes: Vec<Vec<TypeId>>,
}

impl Default for TypeHierarchy {
    fn default() -> Self {
        Self {
            names: NameTable::new("type"),
            supertypes: Vec::new(),
        }
    }
}

impl TypeHierarchy {
    /// Adds a new type given its direct supertypes.
    ///
    /// # Example
    ///
    /// ```
    /// # use liftsat::model::TypeHierarchy;
    /// let mut types = TypeHierarchy::default();
    /// let loc = types.new_type("loc", &[]).unwrap();
    /// let city = types.new_type("city", &[loc]).unwrap();
    /// assert!(types.is_supertype_of(loc, city));
    /// assert!(!types.is_supertype_of(city, loc));
    /// ```
    pub fn new_type(&mut self, name: &str, supertypes: &[TypeId]) -> Result<TypeId> {
        if let Some(t) = supertypes.iter().find(|t| t.index() >= self.len()) {
            return Err(anyhow!("cannot define type {}: undefined supertype {}", name, t));
        }
        let id = self.names.register(name)?;
        self.supertypes.push(supertypes.to_vec());
        Ok(TypeId::new(id))
    }

    /// Returns the type with the given name.
    pub fn get_type(&self, name: &str) -> Result<TypeId> {
        self.names.get_id(name).map(TypeId::new)
    }

    /// Returns the name of a type.
    pub fn name_of(&self, t: TypeId) -> &str {
        self.names.name_of(t.index())
    }

    /// Returns the direct supertypes of a type.
    pub fn supertypes_of(&self, t: TypeId) -> &[TypeId] {
        &self.supertypes[t.index()]
    }

    /// Returns `true` iff `sup` is `sub` or one of its (transitive) supertypes.
    pub fn is_supertype_of(&self, sup: TypeId, sub: TypeId) -> bool {
        let mut to_visit = vec![sub];
        let mut seen = vec![false; self.len()];
        while let Some(t) = to_visit.pop() {
            if t == sup {
                return true;
            }
            if seen[t.index()] {
                continue;
            }
            seen[t.index()] = true;
            to_visit.extend_from_slice(&self.supertypes[t.index()]);
        }
        false
    }

    /// Returns `true` iff one of the types is a supertype of the other.
    pub fn are_related(&self, t1: TypeId, t2: TypeId) -> bool {
        self.is_supertype_of(t1, t2) || self.is_supertype_of(t2, t1)
    }

    /// Returns the number of types.
    pub fn len(&self) -> usize {
        self.supertypes.len()
    }

    /// Returns `true` iff no type is defined.
    pub fn is_empty(&self) -> bool {
        self.supertypes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diamond() {
        let mut types = TypeHierarchy::default();
        let object = types.new_type("object", &[]).unwrap();
        let vehicle = types.new_type("vehicle", &[object]).unwrap();
        let container = types.new_type("container", &[object]).unwrap();
        let truck = types.new_type("truck", &[vehicle, container]).unwrap();
        assert!(types.is_supertype_of(object, truck));
        assert!(types.is_supertype_of(truck, truck));
        assert!(types.is_supertype_of(container, truck));
        assert!(!types.is_supertype_of(vehicle, container));
        assert!(!types.are_related(vehicle, container));
        assert!(types.are_related(truck, vehicle));
        assert_eq!("truck", types.name_of(truck));
    }

    #[test]
    fn test_undefined_supertype() {
        let mut types = TypeHierarchy::default();
        assert!(types.new_type("loc", &[TypeId::new(3)]).is_err());
        assert!(types.is_empty());
    }
}
