use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecipeError {
    #[error("could not find recipe file: {0}")]
    RecipesNotFound(#[from] std::io::Error),
    #[error("could not read recipe file: {0}")]
    RecipeMisformat(#[from] csv::Error),
    #[error("recipe file has no {0} column")]
    MissingColumn(&'static str),
    #[error("recipe row {row}: invalid {column}: {value:?}")]
    InvalidNumber {
        row: usize,
        column: &'static str,
        value: String,
    },
    #[error("could not render page: {0}")]
    Render(#[from] askama::Error),
}
