//! Light roster resolution and static colour grouping.
//!
//! Both are computed once at startup. The roster fixes the order of lights
//! (configured order, or a one-time shuffle of the discovered lights) and the
//! grouping splits that order into contiguous runs, one per palette colour.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::lifx::types::{Light, SelectorMode};

/// The ordered set of lights the service controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LightRoster {
    mode: SelectorMode,
    lights: Vec<String>,
}

impl LightRoster {
    /// Builds a roster from configured light names, preserving their order.
    ///
    /// Names are trimmed; blank entries are dropped.
    pub fn named<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let lights = names
            .into_iter()
            .map(|name| name.as_ref().trim().to_string())
            .filter(|name| !name.is_empty())
            .collect();
        Self {
            mode: SelectorMode::Label,
            lights,
        }
    }

    /// Builds a roster from discovered lights, shuffled once with `rng`.
    ///
    /// The shuffle avoids a fixed discovery-order bias; the result is frozen
    /// for the process lifetime by the caller.
    pub fn discovered<R: Rng + ?Sized>(lights: Vec<Light>, rng: &mut R) -> Self {
        let mut ids: Vec<String> = lights.into_iter().map(|light| light.id).collect();
        ids.shuffle(rng);
        Self {
            mode: SelectorMode::Id,
            lights: ids,
        }
    }

    #[must_use]
    pub fn mode(&self) -> SelectorMode {
        self.mode
    }

    #[must_use]
    pub fn lights(&self) -> &[String] {
        &self.lights
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lights.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }

    /// API selectors for every light, in roster order.
    #[must_use]
    pub fn selectors(&self) -> Vec<String> {
        self.lights
            .iter()
            .map(|light| self.mode.selector(light))
            .collect()
    }
}

/// A non-empty run of light selectors that share one palette colour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LightGroup {
    selectors: Vec<String>,
}

impl LightGroup {
    #[must_use]
    pub fn selectors(&self) -> &[String] {
        &self.selectors
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }
}

/// Partition of every light into colour groups.
///
/// Invariants: groups cover every input light exactly once, in input order,
/// and no two group sizes differ by more than one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LightGrouping {
    groups: Vec<LightGroup>,
}

impl LightGrouping {
    /// Splits `lights` into `group_count` contiguous runs.
    ///
    /// `group_count` is clamped to the number of lights. When the lights do
    /// not divide evenly, earlier groups receive the extra element. Zero
    /// lights or a zero group count yield an empty grouping.
    #[must_use]
    pub fn partition(lights: &[String], group_count: usize) -> Self {
        let group_count = group_count.min(lights.len());
        if group_count == 0 {
            return Self::default();
        }

        let base = lights.len() / group_count;
        let extra = lights.len() % group_count;

        let mut groups = Vec::with_capacity(group_count);
        let mut start = 0;
        for index in 0..group_count {
            let size = base + usize::from(index < extra);
            groups.push(LightGroup {
                selectors: lights[start..start + size].to_vec(),
            });
            start += size;
        }

        Self { groups }
    }

    #[must_use]
    pub fn groups(&self) -> &[LightGroup] {
        &self.groups
    }

    /// Number of groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of lights across all groups.
    #[must_use]
    pub fn light_count(&self) -> usize {
        self.groups.iter().map(LightGroup::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn lights(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("light-{i}")).collect()
    }

    fn sizes(grouping: &LightGrouping) -> Vec<usize> {
        grouping.groups().iter().map(LightGroup::len).collect()
    }

    #[test]
    fn four_lights_two_colors_split_evenly() {
        let grouping = LightGrouping::partition(&lights(4), 2);
        assert_eq!(sizes(&grouping), vec![2, 2]);
        assert_eq!(grouping.groups()[0].selectors(), &["light-0", "light-1"]);
        assert_eq!(grouping.groups()[1].selectors(), &["light-2", "light-3"]);
    }

    #[test]
    fn earlier_groups_take_the_remainder() {
        let grouping = LightGrouping::partition(&lights(7), 3);
        assert_eq!(sizes(&grouping), vec![3, 2, 2]);
    }

    #[test]
    fn group_count_is_clamped_to_light_count() {
        let grouping = LightGrouping::partition(&lights(2), 4);
        assert_eq!(sizes(&grouping), vec![1, 1]);
    }

    #[test]
    fn empty_inputs_yield_empty_grouping() {
        assert!(LightGrouping::partition(&[], 4).is_empty());
        assert!(LightGrouping::partition(&lights(3), 0).is_empty());
    }

    #[test]
    fn partition_invariant_holds_for_all_small_inputs() {
        for light_total in 1..=12 {
            let input = lights(light_total);
            for group_count in 1..=light_total {
                let grouping = LightGrouping::partition(&input, group_count);
                let group_sizes = sizes(&grouping);

                assert_eq!(grouping.len(), group_count);
                assert_eq!(grouping.light_count(), light_total);

                let min = *group_sizes.iter().min().unwrap();
                let max = *group_sizes.iter().max().unwrap();
                assert!(min >= 1);
                assert!(max - min <= 1, "sizes {group_sizes:?}");

                // Contiguous, ordered, disjoint: flattening restores the input.
                let flattened: Vec<String> = grouping
                    .groups()
                    .iter()
                    .flat_map(|g| g.selectors().iter().cloned())
                    .collect();
                assert_eq!(flattened, input);
            }
        }
    }

    #[test]
    fn named_roster_trims_and_keeps_order() {
        let roster = LightRoster::named(["  Desk ", "Couch", "", "TV"]);
        assert_eq!(roster.mode(), SelectorMode::Label);
        assert_eq!(roster.lights(), &["Desk", "Couch", "TV"]);
        assert_eq!(
            roster.selectors(),
            vec!["label:Desk", "label:Couch", "label:TV"]
        );
    }

    #[test]
    fn discovered_roster_is_a_permutation_using_id_selectors() {
        let discovered: Vec<Light> = (0..8)
            .map(|i| Light {
                id: format!("d073d500000{i}"),
                label: format!("Bulb {i}"),
            })
            .collect();
        let mut rng = StdRng::seed_from_u64(7);
        let roster = LightRoster::discovered(discovered.clone(), &mut rng);

        assert_eq!(roster.mode(), SelectorMode::Id);
        let mut ids = roster.lights().to_vec();
        ids.sort();
        let mut expected: Vec<String> = discovered.into_iter().map(|l| l.id).collect();
        expected.sort();
        assert_eq!(ids, expected);
        assert!(roster.selectors().iter().all(|s| s.starts_with("id:")));
    }

    #[test]
    fn discovered_roster_is_deterministic_for_a_seed() {
        let discovered: Vec<Light> = (0..6)
            .map(|i| Light {
                id: i.to_string(),
                label: String::new(),
            })
            .collect();
        let a = LightRoster::discovered(discovered.clone(), &mut StdRng::seed_from_u64(42));
        let b = LightRoster::discovered(discovered, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }
}
