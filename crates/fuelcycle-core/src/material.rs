use crate::fixed::Mass;
use crate::id::ResourceId;
use serde::{Deserialize, Serialize};

/// An indivisible unit of fuel material: fixed mass, single composition.
///
/// Assemblies are never split or merged. Moving one between buffers moves
/// ownership. Clones only exist as previews handed to the exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assembly {
    pub id: ResourceId,
    pub mass: Mass,
    /// Name of the recipe (nuclide composition) this assembly currently has.
    pub recipe: String,
}

impl Assembly {
    pub fn new(id: ResourceId, mass: Mass, recipe: impl Into<String>) -> Self {
        Self {
            id,
            mass,
            recipe: recipe.into(),
        }
    }

    /// Replace the composition in place. Mass is unchanged.
    pub fn transmute(&mut self, recipe: &str) {
        if self.recipe != recipe {
            self.recipe = recipe.to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed::f64_to_fixed64;

    #[test]
    fn transmute_keeps_mass_and_identity() {
        let mut a = Assembly::new(ResourceId(3), f64_to_fixed64(446.0), "uox");
        a.transmute("spent_uox");
        assert_eq!(a.recipe, "spent_uox");
        assert_eq!(a.mass, f64_to_fixed64(446.0));
        assert_eq!(a.id, ResourceId(3));
    }
}
