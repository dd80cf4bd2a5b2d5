use super::residue::ResidueFilter;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    VanDerWaals,
    HydrogenBond,
    ReactiveResidue,
}

impl InteractionKind {
    pub const ALL: [InteractionKind; 3] = [
        InteractionKind::VanDerWaals,
        InteractionKind::HydrogenBond,
        InteractionKind::ReactiveResidue,
    ];

    /// Name of the option that carries residue filters of this kind.
    pub fn option_name(self) -> &'static str {
        match self {
            InteractionKind::VanDerWaals => "van_der_waals",
            InteractionKind::HydrogenBond => "hydrogen_bond",
            InteractionKind::ReactiveResidue => "reactive_res",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PropertyFilters {
    pub eworst: Option<f64>,
    pub ebest: Option<f64>,
    pub leworst: Option<f64>,
    pub lebest: Option<f64>,
    pub energy_percentile: Option<f64>,
    pub le_percentile: Option<f64>,
}

impl PropertyFilters {
    pub fn has_percentile(&self) -> bool {
        self.energy_percentile.is_some() || self.le_percentile.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.eworst.is_none()
            && self.ebest.is_none()
            && self.leworst.is_none()
            && self.lebest.is_none()
            && !self.has_percentile()
    }
}

/// Threshold on the number of interactions of one kind.
///
/// A negative threshold accepts at most `|threshold|` interactions, a
/// non-negative one at least `threshold`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InteractionCount {
    pub kind: InteractionKind,
    pub threshold: i64,
}

impl InteractionCount {
    pub fn is_upper_bound(&self) -> bool {
        self.threshold < 0
    }
}

impl fmt::Display for InteractionCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bound = if self.is_upper_bound() { "at most" } else { "at least" };
        write!(
            f,
            "{} {} {} interaction(s)",
            bound,
            self.threshold.unsigned_abs(),
            self.kind.option_name()
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SubstructureJoin {
    And,
    #[default]
    Or,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LigandFilters {
    /// Ligand names, combined with OR.
    pub names: Vec<String>,
    /// Reserved: carried through but not applied by any filter runner yet.
    pub substructures: Vec<String>,
    pub substructure_join: SubstructureJoin,
}

impl LigandFilters {
    pub fn is_empty(&self) -> bool {
        self.names.is_empty() && self.substructures.is_empty()
    }
}

/// Canonical, validated filtering intent for one read-mode run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterSpec {
    pub properties: PropertyFilters,
    pub interactions: BTreeMap<InteractionKind, Vec<ResidueFilter>>,
    pub interaction_counts: Vec<InteractionCount>,
    pub react_any: bool,
    pub ligand_filters: LigandFilters,
    pub max_miss: u32,
    pub bookmark_name: String,
    pub filter_bookmark: Option<String>,
}

impl FilterSpec {
    /// Whether any filter at all was requested.
    pub fn has_filters(&self) -> bool {
        !self.properties.is_empty()
            || self.interactions.values().any(|v| !v.is_empty())
            || !self.interaction_counts.is_empty()
            || self.react_any
            || !self.ligand_filters.is_empty()
    }

    pub fn residue_filters(&self, kind: InteractionKind) -> &[ResidueFilter] {
        self.interactions.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of residue-interaction terms that `max_miss` can drop.
    pub fn interaction_term_count(&self) -> usize {
        self.interactions.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::residue;

    #[test]
    fn interaction_count_sign_selects_bound_direction() {
        let at_least = InteractionCount {
            kind: InteractionKind::HydrogenBond,
            threshold: 2,
        };
        assert!(!at_least.is_upper_bound());
        assert_eq!(at_least.to_string(), "at least 2 hydrogen_bond interaction(s)");

        let at_most = InteractionCount {
            kind: InteractionKind::HydrogenBond,
            threshold: -2,
        };
        assert!(at_most.is_upper_bound());
        assert_eq!(at_most.to_string(), "at most 2 hydrogen_bond interaction(s)");
    }

    #[test]
    fn empty_spec_has_no_filters() {
        let spec = FilterSpec::default();
        assert!(!spec.has_filters());
        assert_eq!(spec.interaction_term_count(), 0);
        assert!(spec.residue_filters(InteractionKind::VanDerWaals).is_empty());
    }

    #[test]
    fn any_single_filter_marks_spec_as_filtering() {
        let mut spec = FilterSpec::default();
        spec.properties.lebest = Some(-0.4);
        assert!(spec.has_filters());

        let mut spec = FilterSpec::default();
        spec.interactions.insert(
            InteractionKind::HydrogenBond,
            vec![residue::parse("A:SER:130:").unwrap()],
        );
        assert!(spec.has_filters());
        assert_eq!(spec.interaction_term_count(), 1);

        let mut spec = FilterSpec::default();
        spec.ligand_filters.names.push("ZINC0001".to_string());
        assert!(spec.has_filters());
    }
}
