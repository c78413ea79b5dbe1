use crate::*;

use askama::Template;

pub const NO_INPUT_ALERT: &str = "Please enter at least one ingredient.";
pub const NO_RESULTS_ALERT: &str = "No recipes found with those ingredients.";

/// One search result as shown on the page.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeCard {
    pub title: String,
    pub link: String,
    /// Servings and cooking time, e.g. `4 servings, 20-30 minutes`.
    pub summary: String,
    pub protein: Option<String>,
    pub ingredients: Vec<String>,
}

impl RecipeCard {
    pub fn from_result(result: &SearchResult) -> Vec<Self> {
        result
            .display
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let labels = result.ingredients.labels(i);
                let (protein, ingredients) = match labels.split_first() {
                    Some((protein, rest)) => (
                        Some(capitalize(protein)),
                        rest.iter().map(|l| capitalize(l)).collect(),
                    ),
                    None => (None, Vec::new()),
                };
                RecipeCard {
                    title: title_case(&row.name),
                    link: row.link.clone(),
                    summary: summary(row),
                    protein,
                    ingredients,
                }
            })
            .collect()
    }
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate<'a> {
    stylesheet: &'static str,
    query: &'a str,
    suggestions: &'a [String],
    alert: Option<&'static str>,
    cards: Vec<RecipeCard>,
}

impl<'a> IndexTemplate<'a> {
    pub fn new(query: &'a str, suggestions: &'a [String]) -> Self {
        Self {
            stylesheet: "style.css",
            query,
            suggestions,
            alert: None,
            cards: Vec::new(),
        }
    }

    pub fn with_outcome(query: &'a str, suggestions: &'a [String], outcome: &SearchOutcome) -> Self {
        let mut page = Self::new(query, suggestions);
        match outcome {
            SearchOutcome::NoInput => page.alert = Some(NO_INPUT_ALERT),
            SearchOutcome::Empty => page.alert = Some(NO_RESULTS_ALERT),
            SearchOutcome::Found(result) => page.cards = RecipeCard::from_result(result),
        }
        page
    }
}

fn summary(row: &DisplayRow) -> String {
    let servings = row.servings.map(|s| format!("{s} servings"));
    let time = match (row.time_min, row.time_max) {
        (Some(min), Some(max)) if min != max => Some(format!("{min}-{max} minutes")),
        (Some(t), _) | (None, Some(t)) => Some(format!("{t} minutes")),
        (None, None) => None,
    };
    servings.into_iter().chain(time).collect::<Vec<_>>().join(", ")
}

/// Upper-case the first letter of every word and lower-case the rest.
fn title_case(s: &str) -> String {
    let mut title = String::with_capacity(s.len());
    let mut word_start = true;
    for c in s.chars() {
        if c.is_alphabetic() {
            if word_start {
                title.extend(c.to_uppercase());
            } else {
                title.extend(c.to_lowercase());
            }
            word_start = false;
        } else {
            title.push(c);
            word_start = true;
        }
    }
    title
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
