use crate::catalog::Catalog;
use crate::error::ContentError;

const BUILTIN_CATALOG: &str = include_str!("../data/catalog.json");

/// Exercises bundled with the binary.
///
/// # Errors
///
/// Returns `ContentError` if the bundled catalog does not parse or validate.
pub fn builtin_catalog() -> Result<Catalog, ContentError> {
    Catalog::from_json(BUILTIN_CATALOG)
}
