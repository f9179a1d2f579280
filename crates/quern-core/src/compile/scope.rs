use crate::types::SeqType;
use derive_more::Display;

///
/// VarId
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct VarId(u32);

///
/// Var
///
/// A declared variable. Identity is the id; the name is for display only.
///

#[derive(Clone, Debug)]
pub struct Var {
    pub id: VarId,
    pub name: String,
    pub seq_type: Option<SeqType>,
}

impl PartialEq for Var {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Var {}

///
/// StaticScope
///
/// Declares variables with unique ids and resolves names to the most
/// recent declaration.
///

#[derive(Clone, Debug, Default)]
pub struct StaticScope {
    vars: Vec<Var>,
}

impl StaticScope {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare(&mut self, name: &str, seq_type: Option<SeqType>) -> Var {
        let id = u32::try_from(self.vars.len()).map_or(VarId(u32::MAX), VarId);
        let var = Var {
            id,
            name: name.to_string(),
            seq_type,
        };
        self.vars.push(var.clone());

        var
    }

    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<&Var> {
        self.vars.iter().rev().find(|var| var.name == name)
    }

    #[must_use]
    pub fn get(&self, id: VarId) -> Option<&Var> {
        self.vars.iter().find(|var| var.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AtomType;

    #[test]
    fn later_declarations_shadow_earlier_ones() {
        let mut scope = StaticScope::new();
        let outer = scope.declare("x", None);
        let inner = scope.declare("x", Some(SeqType::one(AtomType::Integer)));

        assert_ne!(outer, inner);
        assert_eq!(scope.resolve("x"), Some(&inner));
        assert_eq!(scope.get(outer.id), Some(&outer));
        assert!(scope.resolve("y").is_none());
        assert_eq!(scope.len(), 2);
    }
}
