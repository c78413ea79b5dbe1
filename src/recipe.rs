use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;

use crate::RecipeError;

/// One row of the recipe file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Recipe {
    pub name: String,
    pub servings: Option<f64>,
    pub time_min: Option<f64>,
    pub time_max: Option<f64>,
    pub tags: Option<String>,
    pub link: String,
    pub protein: Option<String>,
    /// Cells of the `ing_<n>` columns, aligned with
    /// [`RecipeTable::ingredient_columns`].
    pub ingredients: Vec<Option<String>>,
}

impl Recipe {
    /// The non-empty text cells of this row. Numeric columns are not text
    /// and never take part in matching.
    pub fn cells(&self) -> impl Iterator<Item = &str> {
        [
            Some(self.name.as_str()),
            self.tags.as_deref(),
            Some(self.link.as_str()),
            self.protein.as_deref(),
        ]
        .into_iter()
        .chain(self.ingredients.iter().map(Option::as_deref))
        .flatten()
        .filter(|cell| !cell.is_empty())
    }
}

/// The recipe database, read once at startup and never mutated.
#[derive(Debug, Clone, Default)]
pub struct RecipeTable {
    ingredient_columns: Vec<String>,
    recipes: Vec<Recipe>,
}

impl RecipeTable {
    pub fn new(ingredient_columns: Vec<String>, recipes: Vec<Recipe>) -> Self {
        Self {
            ingredient_columns,
            recipes,
        }
    }

    /// Parse a delimited recipe file whose first line names the columns.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, RecipeError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let (columns, ingredient_columns) = Columns::locate(&headers)?;

        let mut recipes = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            match columns.recipe(&record) {
                Ok(recipe) => recipes.push(recipe),
                Err(e @ RecipeError::InvalidNumber { .. }) => {
                    tracing::warn!("skipping {}", e);
                }
                Err(e) => return Err(e),
            }
        }
        tracing::debug!(
            "loaded {} recipes with {} ingredient columns",
            recipes.len(),
            ingredient_columns.len()
        );

        Ok(Self::new(ingredient_columns, recipes))
    }

    /// Names of the ingredient columns, ordered by their number.
    pub fn ingredient_columns(&self) -> &[String] {
        &self.ingredient_columns
    }

    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    /// Every distinct ingredient in the table, sorted.
    pub fn ingredient_vocabulary(&self) -> Vec<String> {
        let vocabulary: BTreeSet<&str> = self
            .recipes
            .iter()
            .flat_map(|r| r.ingredients.iter().flatten())
            .map(String::as_str)
            .collect();
        vocabulary.into_iter().map(str::to_string).collect()
    }
}

/// Positions of the known columns within a header row.
struct Columns {
    name: usize,
    servings: usize,
    time_min: usize,
    time_max: usize,
    link: usize,
    tags: Option<usize>,
    protein: Option<usize>,
    ingredients: Vec<usize>,
}

impl Columns {
    /// Columns other than the known metadata and `ing_<n>` are not kept, so
    /// they neither match a search nor show up among the ingredients.
    fn locate(headers: &csv::StringRecord) -> Result<(Self, Vec<String>), RecipeError> {
        let find = |column: &str| headers.iter().position(|h| h == column);
        let require = |column: &'static str| find(column).ok_or(RecipeError::MissingColumn(column));

        let mut numbered: Vec<(u32, usize, String)> = Vec::new();
        for (i, header) in headers.iter().enumerate() {
            if let Some(n) = header.strip_prefix("ing_").and_then(|n| n.parse().ok()) {
                numbered.push((n, i, header.to_string()));
            } else if !KNOWN_COLUMNS.contains(&header) {
                tracing::debug!("ignoring recipe column {:?}", header);
            }
        }
        numbered.sort_by_key(|(n, _, _)| *n);
        let (ingredients, names): (Vec<usize>, Vec<String>) = numbered.into_iter().map(|(_, i, name)| (i, name)).unzip();

        let columns = Columns {
            name: require("name")?,
            servings: require("servings")?,
            time_min: require("time_min")?,
            time_max: require("time_max")?,
            link: require("link")?,
            tags: find("tags"),
            protein: find("protein"),
            ingredients,
        };
        Ok((columns, names))
    }

    fn recipe(&self, record: &csv::StringRecord) -> Result<Recipe, RecipeError> {
        let line = record.position().map_or(0, |p| p.line());
        let text = |i: usize| record.get(i).filter(|s| !s.is_empty()).map(str::to_string);
        // A blank number is absent; anything else has to parse.
        let number = |i: usize, column: &'static str| -> Result<Option<f64>, RecipeError> {
            let Some(value) = record.get(i).filter(|s| !s.is_empty()) else {
                return Ok(None);
            };
            match value.parse::<f64>() {
                Ok(n) if n.is_finite() => Ok(Some(n)),
                _ => Err(RecipeError::InvalidNumber {
                    row: line as usize,
                    column,
                    value: value.to_string(),
                }),
            }
        };

        Ok(Recipe {
            name: text(self.name).unwrap_or_default(),
            servings: number(self.servings, "servings")?,
            time_min: number(self.time_min, "time_min")?,
            time_max: number(self.time_max, "time_max")?,
            tags: self.tags.and_then(text),
            link: text(self.link).unwrap_or_default(),
            protein: self.protein.and_then(text),
            ingredients: self.ingredients.iter().map(|&i| text(i)).collect(),
        })
    }
}

const KNOWN_COLUMNS: [&str; 7] = [
    "name", "servings", "time_min", "time_max", "tags", "link", "protein",
];

pub fn read_recipes<P: AsRef<Path>>(recipes_path: P) -> Result<RecipeTable, RecipeError> {
    let f = std::fs::File::open(recipes_path.as_ref())?;
    RecipeTable::from_reader(f)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
name,servings,time_min,time_max,tags,link,protein,ing_1,ing_2,ing_10
tomato soup,4,20,30,vegan,http://x,vegetable,tomato,onion,
baked cod,2,15,25,\"pescatarian, cod\",http://y,fish,lemon,,dill
";

    #[test]
    fn loads_rows_and_orders_ingredient_columns() {
        let table = RecipeTable::from_reader(CSV.as_bytes()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.ingredient_columns(), ["ing_1", "ing_2", "ing_10"]);

        let cod = &table.recipes()[1];
        assert_eq!(cod.name, "baked cod");
        assert_eq!(cod.servings, Some(2.0));
        assert_eq!(cod.time_max, Some(25.0));
        assert_eq!(cod.tags.as_deref(), Some("pescatarian, cod"));
        assert_eq!(
            cod.ingredients,
            vec![Some("lemon".to_string()), None, Some("dill".to_string())]
        );
    }

    #[test]
    fn ing_columns_sort_numerically() {
        let csv = "name,servings,time_min,time_max,link,ing_10,ing_2\nx,1,1,1,l,ten,two\n";
        let table = RecipeTable::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(table.ingredient_columns(), ["ing_2", "ing_10"]);
        assert_eq!(
            table.recipes()[0].ingredients,
            vec![Some("two".to_string()), Some("ten".to_string())]
        );
    }

    #[test]
    fn tags_and_protein_columns_are_optional() {
        let csv = "name,servings,time_min,time_max,link,ing_1\nrice,1,5,10,l,rice\n";
        let table = RecipeTable::from_reader(csv.as_bytes()).unwrap();
        let rice = &table.recipes()[0];
        assert_eq!(rice.tags, None);
        assert_eq!(rice.protein, None);
    }

    #[test]
    fn missing_column_is_an_error() {
        let csv = "name,servings,time_min,link\nx,1,1,l\n";
        let err = RecipeTable::from_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, RecipeError::MissingColumn("time_max")));
    }

    #[test]
    fn fractional_numbers_load() {
        let csv = "name,servings,time_min,time_max,link,ing_1\nx,2.5,1,1.5,l,rice\ny,4,5,10,l,egg\n";
        let table = RecipeTable::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.recipes()[0].servings, Some(2.5));
        assert_eq!(table.recipes()[0].time_max, Some(1.5));
        assert_eq!(table.recipes()[1].servings, Some(4.0));
    }

    #[test]
    fn blank_numbers_are_absent() {
        let csv = "name,servings,time_min,time_max,link,ing_1\nx,,1,,l,rice\ny,4,5,10,l,egg\n";
        let table = RecipeTable::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.recipes()[0].servings, None);
        assert_eq!(table.recipes()[0].time_min, Some(1.0));
        assert_eq!(table.recipes()[0].time_max, None);
        assert_eq!(table.recipes()[1].name, "y");
    }

    #[test]
    fn rows_with_bad_numbers_are_skipped() {
        let csv = "name,servings,time_min,time_max,link\nx,1,1,1,l\ny,lots,1,1,l\nz,2,3,4,l\n";
        let table = RecipeTable::from_reader(csv.as_bytes()).unwrap();
        let names: Vec<&str> = table.recipes().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["x", "z"]);
    }

    #[test]
    fn invalid_number_names_the_line() {
        let csv = "name,servings,time_min,time_max,link\nx,1,1,1,l\ny,lots,1,1,l\n";
        let mut reader = csv::Reader::from_reader(csv.as_bytes());
        let (columns, _) = Columns::locate(&reader.headers().unwrap().clone()).unwrap();
        let records: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
        assert!(columns.recipe(&records[0]).is_ok());
        match columns.recipe(&records[1]).unwrap_err() {
            RecipeError::InvalidNumber { row, column, value } => {
                assert_eq!(row, 3);
                assert_eq!(column, "servings");
                assert_eq!(value, "lots");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn blank_name_and_link_are_not_cells() {
        let csv = "name,servings,time_min,time_max,link,ing_1\n,1,1,1,,rice\n";
        let table = RecipeTable::from_reader(csv.as_bytes()).unwrap();
        let cells: Vec<&str> = table.recipes()[0].cells().collect();
        assert_eq!(cells, ["rice"]);
    }

    #[test]
    fn cells_skip_empty_fields() {
        let table = RecipeTable::from_reader(CSV.as_bytes()).unwrap();
        let cells: Vec<&str> = table.recipes()[0].cells().collect();
        assert_eq!(
            cells,
            ["tomato soup", "vegan", "http://x", "vegetable", "tomato", "onion"]
        );
    }

    #[test]
    fn vocabulary_is_sorted_and_distinct() {
        let table = RecipeTable::from_reader(CSV.as_bytes()).unwrap();
        assert_eq!(
            table.ingredient_vocabulary(),
            ["dill", "lemon", "onion", "tomato"]
        );
    }

    #[test]
    fn missing_file_is_reported() {
        let err = read_recipes("does/not/exist.csv").unwrap_err();
        assert!(matches!(err, RecipeError::RecipesNotFound(_)));
    }
}
