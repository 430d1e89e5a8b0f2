//! Recipes and the recipe store.
//!
//! A recipe is immutable once loaded: each craft (batch) consumes its
//! ingredient quantities and produces `batch_yield` units of the output.
//! The store is keyed by lowercased name; the duplicate-name policy is
//! host-configurable because the source data's last-seen-wins behavior is a
//! known ambiguity.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One required component of a recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    pub quantity: u32,
}

impl Ingredient {
    pub fn new(name: &str, quantity: u32) -> Ingredient {
        Ingredient {
            name: name.to_lowercase(),
            quantity,
        }
    }
}

/// A crafting recipe: one batch consumes `ingredients` and yields
/// `batch_yield` units (always >= 1) of `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub name: String,
    pub batch_yield: u32,
    pub ingredients: Vec<Ingredient>,
}

impl Recipe {
    pub fn new(name: &str, batch_yield: u32, ingredients: Vec<Ingredient>) -> Recipe {
        Recipe {
            name: name.to_lowercase(),
            batch_yield,
            ingredients,
        }
    }
}

/// What to do when two recipes share a name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Replace the earlier recipe, matching the source data's behavior.
    #[default]
    LastWins,
    /// Reject the load so the ambiguity surfaces to the operator.
    Strict,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecipeError {
    #[error("duplicate recipe '{0}'")]
    Duplicate(String),
    #[error("recipe '{0}' has zero yield")]
    ZeroYield(String),
}

/// Case-insensitive mapping from item name to its recipe.
#[derive(Debug, Clone, Default)]
pub struct RecipeStore {
    recipes: HashMap<String, Recipe>,
    policy: DuplicatePolicy,
}

impl RecipeStore {
    pub fn new() -> RecipeStore {
        RecipeStore::default()
    }

    pub fn with_policy(policy: DuplicatePolicy) -> RecipeStore {
        RecipeStore {
            recipes: HashMap::new(),
            policy,
        }
    }

    /// Insert a recipe. Rejects zero yields always, and duplicates under
    /// [`DuplicatePolicy::Strict`].
    pub fn insert(&mut self, recipe: Recipe) -> Result<(), RecipeError> {
        if recipe.batch_yield == 0 {
            return Err(RecipeError::ZeroYield(recipe.name));
        }
        let key = recipe.name.to_lowercase();
        if self.policy == DuplicatePolicy::Strict && self.recipes.contains_key(&key) {
            return Err(RecipeError::Duplicate(recipe.name));
        }
        self.recipes.insert(key, recipe);
        Ok(())
    }

    /// Look up the recipe for an item. Absent means the item is either not
    /// craftable or its recipe is unknown; the caller distinguishes the two
    /// via the requirement entry's kind.
    pub fn lookup(&self, name: &str) -> Option<&Recipe> {
        self.recipes.get(&name.to_lowercase())
    }

    pub fn from_recipes<I>(recipes: I, policy: DuplicatePolicy) -> Result<RecipeStore, RecipeError>
    where
        I: IntoIterator<Item = Recipe>,
    {
        let mut store = RecipeStore::with_policy(policy);
        for recipe in recipes {
            store.insert(recipe)?;
        }
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }
}
