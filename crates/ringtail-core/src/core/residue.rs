use serde::{Serialize, Serializer};
use std::fmt;
use thiserror::Error;

const FIELD_SEPARATOR: char = ':';
const UNWANTED_MARKER: char = '~';
const EXPECTED_SEPARATORS: usize = 3;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ResidueSpecError {
    #[error(
        "Malformed residue specification '{spec}': use the format CHAIN:RES:NUM:ATOM_NAME. Any item can be omitted, as long as the number of colons is always 3 (found {found})"
    )]
    WrongSeparatorCount { spec: String, found: usize },
}

/// Pattern identifying a receptor interaction site.
///
/// Every dimension is optional; `None` leaves that dimension unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ResidueSelector {
    pub chain: Option<String>,
    pub residue_name: Option<String>,
    pub residue_number: Option<String>,
    pub atom_name: Option<String>,
}

impl fmt::Display for ResidueSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let field = |v: &Option<String>| v.clone().unwrap_or_default();
        write!(
            f,
            "{}:{}:{}:{}",
            field(&self.chain),
            field(&self.residue_name),
            field(&self.residue_number),
            field(&self.atom_name)
        )
    }
}

impl Serialize for ResidueSelector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A parsed residue token together with its polarity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResidueFilter {
    pub selector: ResidueSelector,
    pub wanted: bool,
}

impl ResidueFilter {
    /// Renders the token back into the `[~]CHAIN:RES:NUM:ATOM` form.
    pub fn to_token(&self) -> String {
        if self.wanted {
            self.selector.to_string()
        } else {
            format!("{}{}", UNWANTED_MARKER, self.selector)
        }
    }
}

/// Parses a single residue token such as `B:THR:276:` or `~:HIS::`.
pub fn parse(token: &str) -> Result<ResidueFilter, ResidueSpecError> {
    let token = token.trim();
    let found = token.matches(FIELD_SEPARATOR).count();
    if found != EXPECTED_SEPARATORS {
        return Err(ResidueSpecError::WrongSeparatorCount {
            spec: token.to_string(),
            found,
        });
    }

    let (body, wanted) = match token.strip_prefix(UNWANTED_MARKER) {
        Some(rest) => (rest, false),
        None => (token, true),
    };

    let mut fields = body.split(FIELD_SEPARATOR).map(|f| {
        let f = f.trim();
        (!f.is_empty()).then(|| f.to_string())
    });

    // The separator count was checked above, so exactly four fields remain.
    let selector = ResidueSelector {
        chain: fields.next().flatten(),
        residue_name: fields.next().flatten(),
        residue_number: fields.next().flatten(),
        atom_name: fields.next().flatten(),
    };

    Ok(ResidueFilter { selector, wanted })
}

/// Expands a raw option entry into its tokens. Commas separate independent
/// selectors and polarity is evaluated per token afterwards.
pub fn parse_list(entry: &str) -> Result<Vec<ResidueFilter>, ResidueSpecError> {
    entry
        .split(',')
        .filter(|t| !t.trim().is_empty())
        .map(parse)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_unwanted_token_strips_marker_and_leaves_atom_empty() {
        let filter = parse("~B:THR:276:").unwrap();
        assert!(!filter.wanted);
        assert_eq!(filter.selector.chain.as_deref(), Some("B"));
        assert_eq!(filter.selector.residue_name.as_deref(), Some("THR"));
        assert_eq!(filter.selector.residue_number.as_deref(), Some("276"));
        assert_eq!(filter.selector.atom_name, None);
    }

    #[test]
    fn parse_requires_exactly_three_separators() {
        assert!(matches!(
            parse("A:THR:276"),
            Err(ResidueSpecError::WrongSeparatorCount { found: 2, .. })
        ));
        assert!(matches!(
            parse("A:THR:276:CA:X"),
            Err(ResidueSpecError::WrongSeparatorCount { found: 4, .. })
        ));
        assert!(parse("A:THR:276:").is_ok());
    }

    #[test]
    fn parse_accepts_any_subset_of_fields() {
        let filter = parse(":::").unwrap();
        assert!(filter.wanted);
        assert_eq!(filter.selector, ResidueSelector::default());

        let filter = parse("::NUM:").unwrap();
        assert_eq!(filter.selector.residue_number.as_deref(), Some("NUM"));
        assert_eq!(filter.selector.chain, None);

        let filter = parse(":::OG1").unwrap();
        assert_eq!(filter.selector.atom_name.as_deref(), Some("OG1"));
    }

    #[test]
    fn parse_list_splits_on_commas_and_evaluates_polarity_per_token() {
        let filters = parse_list("A:HIS:226:,~B:THR:276:").unwrap();
        assert_eq!(filters.len(), 2);
        assert!(filters[0].wanted);
        assert!(!filters[1].wanted);
        assert_eq!(filters[1].selector.chain.as_deref(), Some("B"));
    }

    #[test]
    fn parse_list_fails_when_any_token_is_malformed() {
        assert!(parse_list("A:HIS:226:,B:THR").is_err());
    }

    #[test]
    fn to_token_round_trips_canonical_form() {
        let filter = parse("~B:THR:276:").unwrap();
        assert_eq!(filter.to_token(), "~B:THR:276:");
        assert_eq!(filter.selector.to_string(), "B:THR:276:");
    }
}
