use crate::*;

use askama::Template;

#[derive(Deserialize)]
pub struct SearchParams {
    ingredients: Option<String>,
}

/// Split the form field on commas. Returns `None` when no ingredient was
/// actually entered.
pub fn parse_ingredients(raw: Option<&str>) -> Option<Vec<String>> {
    let ingredients: Vec<String> = raw?
        .split(',')
        .map(str::trim)
        .filter(|i| !i.is_empty())
        .map(str::to_string)
        .collect();
    if ingredients.is_empty() {
        None
    } else {
        Some(ingredients)
    }
}

fn render(page: IndexTemplate<'_>) -> Result<response::Response, http::StatusCode> {
    match page.render() {
        Ok(html) => Ok(response::Html(html).into_response()),
        Err(e) => {
            log::error!("{}", RecipeError::from(e));
            Err(http::StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

pub async fn get_index(
    State(app_state): State<SharedAppState>,
) -> Result<response::Response, http::StatusCode> {
    render(IndexTemplate::new("", &app_state.suggestions))
}

pub async fn get_search(
    State(app_state): State<SharedAppState>,
    Query(params): Query<SearchParams>,
) -> Result<response::Response, http::StatusCode> {
    log::info!("recipe ingredients: {:?}", params.ingredients);

    let query = params.ingredients.as_deref().unwrap_or_default();
    let ingredients = parse_ingredients(params.ingredients.as_deref());
    let outcome = RecipeSearch::new(&app_state.recipes).run(ingredients.as_deref());
    match &outcome {
        SearchOutcome::NoInput => log::info!("recipe search without ingredients"),
        SearchOutcome::Empty => log::info!("recipe search by ingredients was empty"),
        SearchOutcome::Found(result) => log::info!("recipe search found {} recipes", result.len()),
    }

    render(IndexTemplate::with_outcome(query, &app_state.suggestions, &outcome))
}
