//! Recipe extraction from annotated merged-list lines.
//!
//! A merged line can carry its recipe inline:
//! `name (c/t) (kind: source) -- 1 herb, 2/3 water -- [tags]`. Plain
//! `qty name` pieces belong to yield-1 recipes; an `a/b` fraction means
//! one craft consumes `a` and the batch yields `b`, and the first fraction
//! found sets the whole recipe's yield.

use crate::record::parse_list_record;
use craftledger_core::recipe::{Ingredient, Recipe};

/// Extract the inline recipe from a merged-list line. Lines without an
/// annotation, or with a piece that does not parse, yield `None`.
pub fn extract_recipe(line: &str) -> Option<Recipe> {
    let record = parse_list_record(line).ok()?;
    let annotation = record.recipe?;

    let batch_yield = annotation
        .split(',')
        .filter_map(|piece| {
            let quantity = piece.trim().split(' ').next()?;
            let (numerator, denominator) = quantity.split_once('/')?;
            if numerator.bytes().all(|b| b.is_ascii_digit()) && !numerator.is_empty() {
                denominator.parse::<u32>().ok()
            } else {
                None
            }
        })
        .next()
        .unwrap_or(1);

    let mut ingredients = Vec::new();
    for piece in annotation.split(',') {
        let piece = piece.trim();
        let (quantity, name) = piece.split_once(' ')?;
        // With a batch yield the quantity may be the fraction's numerator.
        let quantity = quantity.split('/').next()?.parse().ok()?;
        ingredients.push(Ingredient::new(name, quantity));
    }

    Some(Recipe::new(&record.name, batch_yield, ingredients))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_yield_one_recipe() {
        let recipe =
            extract_recipe("Potion (0/10) (craft: Alchemist) -- 1 herb, 2 water -- [ARR1/10]")
                .unwrap();
        assert_eq!(recipe.name, "potion");
        assert_eq!(recipe.batch_yield, 1);
        assert_eq!(
            recipe.ingredients,
            [Ingredient::new("herb", 1), Ingredient::new("water", 2)]
        );
    }

    #[test]
    fn fraction_sets_batch_yield() {
        let recipe = extract_recipe(
            "Thread (0/9) (craft: Weaver) -- 2/3 fiber, 1/3 dye -- [ARR1/5][ARR2/4]",
        )
        .unwrap();
        assert_eq!(recipe.batch_yield, 3);
        assert_eq!(
            recipe.ingredients,
            [Ingredient::new("fiber", 2), Ingredient::new("dye", 1)]
        );
    }

    #[test]
    fn mixed_fraction_and_plain_quantities() {
        // Only some pieces carry the fraction; plain ones parse as-is.
        let recipe =
            extract_recipe("Glue (0/4) (craft: Alchemist) -- 1/2 sap, 3 bone -- [HW1/4]").unwrap();
        assert_eq!(recipe.batch_yield, 2);
        assert_eq!(
            recipe.ingredients,
            [Ingredient::new("sap", 1), Ingredient::new("bone", 3)]
        );
    }

    #[test]
    fn lines_without_annotation_are_skipped() {
        assert!(extract_recipe("Potion (0/10) (craft: Alchemist) [ARR1/10]").is_none());
        assert!(extract_recipe("not a record at all").is_none());
    }

    #[test]
    fn malformed_pieces_are_skipped() {
        assert!(extract_recipe("Potion (0/10) (craft: Alchemist) -- herb -- x").is_none());
    }
}
