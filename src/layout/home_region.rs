//! Home region calculation.
//!
//! Assigns every component instance a baseline (page, column) before any
//! overflow redistribution, together with the keys the pagination walk sorts
//! by. This is a pure function of its inputs: the pagination engine depends on
//! a stable walk order, so nothing here may read clocks, measurements or
//! hidden state.

use super::types::RegionLocation;
use crate::model::{ComponentId, ComponentInstance, LayoutIssue, TemplateConfig};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::warn;

/// Derived placement of one instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeRegionAssignment {
    /// Baseline (page, column) the instance starts flowing from.
    pub home_region: RegionLocation,
    /// Position of the instance's slot in `template.slots`.
    /// Instances without a template slot sort after every slot.
    pub slot_index: usize,
    /// Position of the instance in the input array.
    pub order_index: usize,
}

impl HomeRegionAssignment {
    /// Sort key of the pagination walk: page, column, slot, input order.
    pub fn walk_key(&self) -> (u32, u32, usize, usize) {
        (
            self.home_region.page,
            self.home_region.column,
            self.slot_index,
            self.order_index,
        )
    }
}

/// Result of [`compute_home_regions`]: assignments plus excluded instances.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HomeRegionMap {
    assignments: BTreeMap<ComponentId, HomeRegionAssignment>,
    issues: Vec<LayoutIssue>,
}

impl HomeRegionMap {
    /// Assignment of `id`, if it was placed.
    pub fn get(&self, id: &ComponentId) -> Option<&HomeRegionAssignment> {
        self.assignments.get(id)
    }

    /// Number of placed instances.
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    /// Whether no instance was placed.
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Assignments in component id order.
    pub fn iter(&self) -> impl Iterator<Item = (&ComponentId, &HomeRegionAssignment)> {
        self.assignments.iter()
    }

    /// Instances excluded from layout, with the reason.
    pub fn issues(&self) -> &[LayoutIssue] {
        &self.issues
    }

    /// The underlying id-to-assignment map.
    pub fn assignments(&self) -> &BTreeMap<ComponentId, HomeRegionAssignment> {
        &self.assignments
    }
}

/// Column (1-based) whose horizontal band contains `x`.
///
/// The page is cut into `column_count` equal bands. Bands are half-open, so an
/// `x` exactly on a boundary belongs to the column on its right.
pub fn column_for_x(x: f64, column_count: u32, page_width_px: f64) -> u32 {
    if column_count <= 1 || page_width_px <= 0.0 || x.is_nan() || x <= 0.0 {
        return 1;
    }
    let band = page_width_px / f64::from(column_count);
    let column = (x / band).floor() as u32 + 1;
    column.clamp(1, column_count)
}

/// Compute the home region of every instance.
///
/// # Rules
/// 1. An explicit `layout.location` is used verbatim.
/// 2. Otherwise the instance's slot is resolved; its `x` picks the column band
///    and the page is 1.
/// 3. Without a slot, an explicit `layout.position` picks the band.
/// 4. A dangling slot reference, or no placement information at all, excludes
///    the instance and records a [`LayoutIssue`].
pub fn compute_home_regions(
    instances: &[ComponentInstance],
    template: &TemplateConfig,
    column_count: u32,
    page_width_px: f64,
) -> HomeRegionMap {
    let mut map = HomeRegionMap::default();
    let unslotted_index = template.slots.len();

    for (order_index, instance) in instances.iter().enumerate() {
        let layout = &instance.layout;
        let slot_index = layout
            .slot_id
            .as_ref()
            .and_then(|slot_id| template.slot_index(slot_id));

        let home_region = if let Some(location) = layout.location {
            Some(RegionLocation::new(location.page, location.column))
        } else if let Some(slot_id) = &layout.slot_id {
            match slot_index {
                Some(index) => {
                    let x = template.slots[index].position.x;
                    Some(RegionLocation::new(
                        1,
                        column_for_x(x, column_count, page_width_px),
                    ))
                }
                None => {
                    warn!(
                        component = %instance.id,
                        slot = %slot_id,
                        template = %template.id,
                        "Instance references a slot missing from the template; excluding it"
                    );
                    map.issues.push(LayoutIssue::SlotNotFound {
                        component: instance.id.clone(),
                        slot: slot_id.clone(),
                    });
                    None
                }
            }
        } else if let Some(position) = layout.position {
            Some(RegionLocation::new(
                1,
                column_for_x(position.x, column_count, page_width_px),
            ))
        } else {
            warn!(component = %instance.id, "Instance has no placement information; excluding it");
            map.issues.push(LayoutIssue::Unplaceable(instance.id.clone()));
            None
        };

        if let Some(home_region) = home_region {
            map.assignments.insert(
                instance.id.clone(),
                HomeRegionAssignment {
                    home_region,
                    slot_index: slot_index.unwrap_or(unslotted_index),
                    order_index,
                },
            );
        }
    }

    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        ComponentLayout, ComponentType, DataRef, PageVariables, Rect, SlotDefinition, SlotId,
        TemplateId,
    };

    fn slot(id: &str, x: f64) -> SlotDefinition {
        SlotDefinition {
            id: SlotId::new(id).unwrap(),
            name: id.to_string(),
            position: Rect {
                x,
                y: 0.0,
                width: 290.0,
                height: 400.0,
            },
            allowed_components: vec![],
            is_required: false,
        }
    }

    fn template(slots: Vec<SlotDefinition>) -> TemplateConfig {
        TemplateConfig {
            id: TemplateId::new("test-template").unwrap(),
            name: "Test".into(),
            default_mode: Default::default(),
            default_page_variables: PageVariables::letter_two_column(),
            slots,
            default_components: vec![],
            allowed_components: vec![],
        }
    }

    fn instance(id: &str, slot: &str) -> ComponentInstance {
        ComponentInstance::new(
            ComponentId::new(id).unwrap(),
            ComponentType::TextBlock,
            DataRef::custom(id),
            ComponentLayout::in_slot(SlotId::new(slot).unwrap()),
        )
    }

    fn cid(raw: &str) -> ComponentId {
        ComponentId::new(raw).unwrap()
    }

    #[test]
    fn column_for_x_splits_page_into_bands() {
        assert_eq!(column_for_x(0.0, 2, 600.0), 1);
        assert_eq!(column_for_x(299.9, 2, 600.0), 1);
        assert_eq!(column_for_x(300.0, 2, 600.0), 2);
        assert_eq!(column_for_x(310.0, 2, 600.0), 2);
    }

    #[test]
    fn column_for_x_clamps_to_page() {
        assert_eq!(column_for_x(5000.0, 2, 600.0), 2);
        assert_eq!(column_for_x(-20.0, 2, 600.0), 1);
        assert_eq!(column_for_x(400.0, 1, 600.0), 1);
        assert_eq!(column_for_x(400.0, 3, 0.0), 1);
    }

    #[test]
    fn slot_x_selects_column() {
        let template = template(vec![slot("left", 0.0), slot("right", 310.0)]);
        let instances = vec![instance("a", "left"), instance("b", "right")];
        let map = compute_home_regions(&instances, &template, 2, 600.0);

        assert_eq!(map.get(&cid("a")).unwrap().home_region, RegionLocation::new(1, 1));
        assert_eq!(map.get(&cid("b")).unwrap().home_region, RegionLocation::new(1, 2));
        assert_eq!(map.get(&cid("b")).unwrap().slot_index, 1);
    }

    #[test]
    fn shared_slot_gets_increasing_order_index() {
        let template = template(vec![slot("slot-1", 0.0)]);
        let instances = vec![
            instance("a", "slot-1"),
            instance("b", "slot-1"),
            instance("c", "slot-1"),
        ];
        let map = compute_home_regions(&instances, &template, 2, 600.0);
        let orders: Vec<_> = ["a", "b", "c"]
            .iter()
            .map(|id| map.get(&cid(id)).unwrap().order_index)
            .collect();
        assert_eq!(orders, vec![0, 1, 2]);
    }

    #[test]
    fn explicit_location_wins_over_slot_geometry() {
        let template = template(vec![slot("right", 310.0)]);
        let mut pinned = instance("a", "right");
        pinned.layout = pinned.layout.with_location(RegionLocation::new(2, 1));
        let map = compute_home_regions(&[pinned], &template, 2, 600.0);

        let assignment = map.get(&cid("a")).unwrap();
        assert_eq!(assignment.home_region, RegionLocation::new(2, 1));
        assert_eq!(assignment.slot_index, 0);
    }

    #[test]
    fn missing_slot_excludes_instance() {
        let template = template(vec![slot("left", 0.0)]);
        let instances = vec![instance("a", "left"), instance("ghost", "nowhere")];
        let map = compute_home_regions(&instances, &template, 2, 600.0);

        assert_eq!(map.len(), 1);
        assert!(map.get(&cid("ghost")).is_none());
        assert_eq!(
            map.issues(),
            &[LayoutIssue::SlotNotFound {
                component: cid("ghost"),
                slot: SlotId::new("nowhere").unwrap(),
            }]
        );
    }

    #[test]
    fn position_without_slot_uses_position_band() {
        let template = template(vec![slot("left", 0.0)]);
        let mut free = instance("free", "left");
        free.layout.slot_id = None;
        free.layout.position = Some(Rect {
            x: 450.0,
            y: 10.0,
            width: 100.0,
            height: 100.0,
        });
        let map = compute_home_regions(&[free], &template, 2, 600.0);
        let assignment = map.get(&cid("free")).unwrap();
        assert_eq!(assignment.home_region, RegionLocation::new(1, 2));
        assert_eq!(assignment.slot_index, 1, "unslotted instances sort after slots");
    }

    #[test]
    fn no_placement_information_is_unplaceable() {
        let template = template(vec![]);
        let mut lost = instance("lost", "x");
        lost.layout.slot_id = None;
        let map = compute_home_regions(&[lost], &template, 2, 600.0);
        assert!(map.is_empty());
        assert_eq!(map.issues(), &[LayoutIssue::Unplaceable(cid("lost"))]);
    }

    #[test]
    fn identical_inputs_yield_identical_maps() {
        let template = template(vec![slot("left", 0.0), slot("right", 310.0)]);
        let instances = vec![
            instance("a", "right"),
            instance("b", "left"),
            instance("c", "right"),
        ];
        let first = compute_home_regions(&instances, &template, 2, 600.0);
        let second = compute_home_regions(&instances, &template, 2, 600.0);
        assert_eq!(first, second);
    }

    #[test]
    fn walk_key_orders_by_page_column_slot_then_input() {
        let a = HomeRegionAssignment {
            home_region: RegionLocation::new(1, 2),
            slot_index: 0,
            order_index: 0,
        };
        let b = HomeRegionAssignment {
            home_region: RegionLocation::new(1, 1),
            slot_index: 3,
            order_index: 5,
        };
        assert!(b.walk_key() < a.walk_key());
    }
}
