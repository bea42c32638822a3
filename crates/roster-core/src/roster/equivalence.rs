use super::domain::Code;
use std::collections::{BTreeSet, HashMap};
use std::sync::OnceLock;

/// Cross-coded specialties: assigned code -> filled codes accepted in its place.
///
/// Hand-curated from historical renamings. The reverse direction is derived in
/// [`SpecialtyEquivalenceMap::from_table`], never written out here.
const FORWARD_EQUIVALENCES: &[(&str, &[&str])] = &[
    ("TIC", &["PD"]),
    ("BCT", &["CTA"]),
    ("SAD", &["SEF", "ADM"]),
    ("MET", &["BMT"]),
    ("SEL", &["ELT"]),
];

static STANDARD_MAP: OnceLock<SpecialtyEquivalenceMap> = OnceLock::new();

#[derive(Debug, Clone, Default)]
pub struct SpecialtyEquivalenceMap {
    forward: HashMap<Code, BTreeSet<Code>>,
    reverse: HashMap<Code, BTreeSet<Code>>,
}

impl SpecialtyEquivalenceMap {
    /// Process-wide map built from the literal table on first use.
    pub fn standard() -> &'static Self {
        STANDARD_MAP.get_or_init(|| Self::from_table(FORWARD_EQUIVALENCES))
    }

    pub fn from_table(table: &[(&str, &[&str])]) -> Self {
        let mut map = Self::default();

        for (assigned, accepted) in table {
            let Some(assigned) = Code::parse(assigned) else {
                continue;
            };

            for filled in accepted.iter().filter_map(|raw| Code::parse(raw)) {
                map.reverse
                    .entry(filled.clone())
                    .or_default()
                    .insert(assigned.clone());
                map.forward
                    .entry(assigned.clone())
                    .or_default()
                    .insert(filled);
            }
        }

        map
    }

    /// True when the codes are identical or `filled` is a registered forward
    /// equivalent of `assigned`.
    pub fn are_equivalent(&self, assigned: &Code, filled: &Code) -> bool {
        assigned == filled
            || self
                .forward
                .get(assigned)
                .is_some_and(|accepted| accepted.contains(filled))
    }

    /// Adds every code one forward or reverse hop away from a selected code.
    ///
    /// This is a single hop, not a transitive closure: with `A -> B` and
    /// `C -> B`, expanding `{A}` yields `{A, B}` and not `C`.
    pub fn expand<'a, I>(&self, selected: I) -> BTreeSet<Code>
    where
        I: IntoIterator<Item = &'a Code>,
    {
        let mut expanded = BTreeSet::new();
        for code in selected {
            expanded.insert(code.clone());
            for table in [&self.forward, &self.reverse] {
                if let Some(neighbours) = table.get(code) {
                    expanded.extend(neighbours.iter().cloned());
                }
            }
        }
        expanded
    }

    pub fn forward_entries(&self) -> impl Iterator<Item = (&Code, &BTreeSet<Code>)> {
        self.forward.iter()
    }

    pub fn reverse_of(&self, filled: &Code) -> Option<&BTreeSet<Code>> {
        self.reverse.get(filled)
    }
}

pub fn are_equivalent(assigned: &Code, filled: &Code) -> bool {
    SpecialtyEquivalenceMap::standard().are_equivalent(assigned, filled)
}

pub fn expand(selected: &BTreeSet<Code>) -> BTreeSet<Code> {
    SpecialtyEquivalenceMap::standard().expand(selected)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHARED_TARGET: &[(&str, &[&str])] = &[("AAA", &["BBB"]), ("CCC", &["BBB"])];

    fn code(raw: &str) -> Code {
        Code::parse(raw).expect("valid code")
    }

    #[test]
    fn identical_codes_are_equivalent_even_when_unknown() {
        assert!(are_equivalent(&code("XYZ"), &code("XYZ")));
        assert!(are_equivalent(&code("TIC"), &code("TIC")));
    }

    #[test]
    fn every_forward_entry_is_equivalent_and_reachable() {
        let map = SpecialtyEquivalenceMap::standard();
        for (assigned, accepted) in map.forward_entries() {
            let expanded = map.expand([assigned]);
            for filled in accepted {
                assert!(map.are_equivalent(assigned, filled));
                assert!(expanded.contains(filled));
            }
        }
    }

    #[test]
    fn reverse_map_is_derived_from_forward_table() {
        let map = SpecialtyEquivalenceMap::from_table(SHARED_TARGET);
        let reverse = map.reverse_of(&code("BBB")).expect("reverse entry");
        assert_eq!(
            reverse.iter().map(Code::as_str).collect::<Vec<_>>(),
            vec!["AAA", "CCC"]
        );
    }

    #[test]
    fn expansion_is_a_single_hop() {
        let map = SpecialtyEquivalenceMap::from_table(SHARED_TARGET);
        let expanded = map.expand([&code("AAA")]);
        assert!(expanded.contains("AAA"));
        assert!(expanded.contains("BBB"));
        assert!(!expanded.contains("CCC"));

        let from_filled = map.expand([&code("BBB")]);
        assert!(from_filled.contains("AAA"));
        assert!(from_filled.contains("CCC"));
    }

    #[test]
    fn forward_equivalence_is_directional() {
        assert!(are_equivalent(&code("TIC"), &code("PD")));
        assert!(!are_equivalent(&code("PD"), &code("TIC")));
    }

    #[test]
    fn unknown_codes_expand_to_themselves() {
        let selected: BTreeSet<Code> = [code("ZZZ")].into_iter().collect();
        assert_eq!(expand(&selected), selected);
    }
}
