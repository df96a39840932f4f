use tracing::warn;

use crate::catalog::{Catalog, CatalogEntry};
use crate::error::ThingsError;

/// Entries chosen for one run, in input token order. Duplicates are kept
/// and processed independently.
pub type ResolvedSelection = Vec<CatalogEntry>;

pub struct SelectionResolver;

impl SelectionResolver {
    /// Maps raw `"<group>.<sub>"` tokens to catalog entries. Tokens that do
    /// not parse or point outside the catalog are warned about and dropped;
    /// they never abort the run.
    pub fn resolve(tokens: &[String], catalog: &Catalog) -> ResolvedSelection {
        let mut selected = Vec::new();
        for token in tokens {
            match Self::resolve_token(token, catalog) {
                Ok(entry) => selected.push(entry.clone()),
                Err(err) => warn!("skipping selection {token:?}: {err}"),
            }
        }
        selected
    }

    fn resolve_token<'a>(
        token: &str,
        catalog: &'a Catalog,
    ) -> Result<&'a CatalogEntry, ThingsError> {
        let (group_index, sub_index) = parse_token(token)?;
        catalog
            .entry(group_index, sub_index)
            .ok_or_else(|| ThingsError::InvalidSelection(token.trim().to_string()))
    }
}

/// Parses one selection token into 1-based `(group, sub)` indices.
pub fn parse_token(token: &str) -> Result<(usize, usize), ThingsError> {
    let trimmed = token.trim();
    let (group, sub) = trimmed
        .split_once('.')
        .ok_or_else(|| ThingsError::InvalidSelection(trimmed.to_string()))?;
    let group = group
        .parse::<usize>()
        .map_err(|_| ThingsError::InvalidSelection(trimmed.to_string()))?;
    let sub = sub
        .parse::<usize>()
        .map_err(|_| ThingsError::InvalidSelection(trimmed.to_string()))?;
    Ok((group, sub))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn parse_token_valid() {
        assert_eq!(parse_token("1.2").unwrap(), (1, 2));
        assert_eq!(parse_token(" 3.1 ").unwrap(), (3, 1));
    }

    #[test]
    fn parse_token_invalid() {
        assert_matches!(parse_token("abc").unwrap_err(), ThingsError::InvalidSelection(_));
        assert_matches!(parse_token("1").unwrap_err(), ThingsError::InvalidSelection(_));
        assert_matches!(parse_token("1.x").unwrap_err(), ThingsError::InvalidSelection(_));
        assert_matches!(parse_token("-1.2").unwrap_err(), ThingsError::InvalidSelection(_));
    }
}
