use crate::*;

use utoipa_axum::{router::OpenApiRouter, routes};

#[derive(OpenApi)]
#[openapi(
    info(title = "Recipe Finder", description = "Find recipes by the ingredients you have"),
    tags((name = "recipes", description = "Recipe search API"))
)]
pub struct ApiDoc;

pub fn router() -> OpenApiRouter<SharedAppState> {
    OpenApiRouter::new()
        .routes(routes!(search_recipes))
        .routes(routes!(get_ingredients))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SearchRequest {
    /// Ingredients to look for. Leaving this out is a request without
    /// input; an empty list is a search with no matches.
    pub ingredients: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SearchStatus {
    NoInput,
    Empty,
    Found,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SearchResponse {
    pub status: SearchStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<SearchResult>,
}

impl From<SearchOutcome> for SearchResponse {
    fn from(outcome: SearchOutcome) -> Self {
        match outcome {
            SearchOutcome::NoInput => Self {
                status: SearchStatus::NoInput,
                result: None,
            },
            SearchOutcome::Empty => Self {
                status: SearchStatus::Empty,
                result: None,
            },
            SearchOutcome::Found(result) => Self {
                status: SearchStatus::Found,
                result: Some(result),
            },
        }
    }
}

#[utoipa::path(
    post,
    path = "/search",
    tag = "recipes",
    request_body = SearchRequest,
    responses(
        (status = 200, description = "Recipes using any of the ingredients", body = SearchResponse),
        (status = 400, description = "No ingredients given", body = SearchResponse)
    )
)]
pub async fn search_recipes(
    State(app_state): State<SharedAppState>,
    Json(request): Json<SearchRequest>,
) -> response::Response {
    log::info!("search recipes by ingredients: {:?}", request.ingredients);
    let outcome = RecipeSearch::new(&app_state.recipes).run(request.ingredients.as_deref());
    let status = match outcome {
        SearchOutcome::NoInput => {
            log::warn!("recipe search without ingredients");
            http::StatusCode::BAD_REQUEST
        }
        _ => http::StatusCode::OK,
    };
    (status, Json(SearchResponse::from(outcome))).into_response()
}

#[utoipa::path(
    get,
    path = "/ingredients",
    tag = "recipes",
    responses(
        (status = 200, description = "Every ingredient in the recipe table", body = Vec<String>)
    )
)]
pub async fn get_ingredients(State(app_state): State<SharedAppState>) -> Json<Vec<String>> {
    Json(app_state.suggestions.clone())
}
