//! Ingredient search over the recipe table.
//!
//! A search is three steps run over per-request copies of the matching rows:
//! filter by ingredient, refine `fish` proteins from the row tags, then split
//! the rows into a display projection and an ingredients projection that stay
//! row aligned.

use std::collections::BTreeSet;

use serde::Serialize;
use utoipa::ToSchema;

use crate::recipe::{Recipe, RecipeTable};

/// Fish species recognised in recipe tags, in tie-break order.
pub const FISH_SPECIES: [&str; 5] = ["cod", "tilapia", "salmon", "bass", "trout"];

const FISH: &str = "fish";
const PROTEIN: &str = "protein";

/// The card-facing columns of one matching recipe.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DisplayRow {
    pub name: String,
    pub servings: Option<f64>,
    pub time_min: Option<f64>,
    pub time_max: Option<f64>,
    pub link: String,
}

impl From<&Recipe> for DisplayRow {
    fn from(recipe: &Recipe) -> Self {
        Self {
            name: recipe.name.clone(),
            servings: recipe.servings,
            time_min: recipe.time_min,
            time_max: recipe.time_max,
            link: recipe.link.clone(),
        }
    }
}

/// Protein and ingredient cells of the matching recipes. Columns that are
/// empty in every row are left out.
#[derive(Debug, Clone, PartialEq, Default, Serialize, ToSchema)]
pub struct IngredientsProjection {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl IngredientsProjection {
    /// Non-empty cells of `row` in column order. When the recipe has a
    /// protein it comes first.
    pub fn labels(&self, row: usize) -> Vec<&str> {
        self.rows
            .get(row)
            .map(|cells| cells.iter().flatten().map(String::as_str).collect())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SearchResult {
    pub display: Vec<DisplayRow>,
    pub ingredients: IngredientsProjection,
}

impl SearchResult {
    pub fn len(&self) -> usize {
        self.display.len()
    }
}

/// What a search produced. `NoInput` and `Empty` are kept apart so the page
/// can ask for an ingredient instead of reporting no matches.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    NoInput,
    Empty,
    Found(SearchResult),
}

pub struct RecipeSearch<'a> {
    table: &'a RecipeTable,
}

impl<'a> RecipeSearch<'a> {
    pub fn new(table: &'a RecipeTable) -> Self {
        Self { table }
    }

    pub fn run(&self, ingredients: Option<&[String]>) -> SearchOutcome {
        let Some(ingredients) = ingredients else {
            return SearchOutcome::NoInput;
        };

        let mut recipes = self.filter(ingredients);
        if recipes.is_empty() {
            return SearchOutcome::Empty;
        }
        normalize_protein(&mut recipes);

        let (display, ingredients) = reshape(&recipes, self.table.ingredient_columns());
        SearchOutcome::Found(SearchResult {
            display,
            ingredients,
        })
    }

    /// Copies of every recipe having a text cell equal to any of the
    /// lower-cased `ingredients`, in table order. A recipe needs to match
    /// only one of the ingredients, not all of them.
    pub fn filter(&self, ingredients: &[String]) -> Vec<Recipe> {
        let recipes = self.table.recipes();
        let mut matched = BTreeSet::new();
        for ingredient in ingredients {
            let ingredient = ingredient.to_lowercase();
            matched.extend(
                recipes
                    .iter()
                    .enumerate()
                    .filter(|(_, recipe)| recipe.cells().any(|cell| cell == ingredient))
                    .map(|(i, _)| i),
            );
        }
        matched.into_iter().map(|i| recipes[i].clone()).collect()
    }
}

/// Replace the generic `fish` protein with the species named in the recipe
/// tags. Rows without a recognised species keep `fish`.
pub fn normalize_protein(recipes: &mut [Recipe]) {
    for recipe in recipes
        .iter_mut()
        .filter(|r| r.protein.as_deref() == Some(FISH))
    {
        if let Some(species) = fish_species(recipe.tags.as_deref()) {
            recipe.protein = Some(species.to_string());
        }
    }
}

fn fish_species(tags: Option<&str>) -> Option<&'static str> {
    let tags: Vec<&str> = tags?.split(',').map(str::trim).collect();
    FISH_SPECIES.into_iter().find(|species| tags.contains(species))
}

/// Split recipes into display rows and the ingredients projection.
/// `ingredient_columns` names the entries of each [`Recipe::ingredients`].
pub fn reshape(
    recipes: &[Recipe],
    ingredient_columns: &[String],
) -> (Vec<DisplayRow>, IngredientsProjection) {
    let display = recipes.iter().map(DisplayRow::from).collect();

    let names: Vec<&str> = std::iter::once(PROTEIN)
        .chain(ingredient_columns.iter().map(String::as_str))
        .collect();
    let cells: Vec<Vec<Option<String>>> = recipes
        .iter()
        .map(|r| {
            std::iter::once(r.protein.clone())
                .chain(r.ingredients.iter().cloned())
                .collect()
        })
        .collect();

    let keep: Vec<usize> = (0..names.len())
        .filter(|&j| cells.iter().any(|row| row.get(j).is_some_and(Option::is_some)))
        .collect();

    let ingredients = IngredientsProjection {
        columns: keep.iter().map(|&j| names[j].to_string()).collect(),
        rows: cells
            .into_iter()
            .map(|row| keep.iter().map(|&j| row.get(j).cloned().flatten()).collect())
            .collect(),
    };
    (display, ingredients)
}
