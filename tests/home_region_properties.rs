//! Property-based tests for home region assignment.
//!
//! Properties Under Test:
//! - Identical inputs always produce identical assignments
//! - Instances sharing a slot receive strictly increasing order indices
//! - Every assigned column lies within the page's columns
//! - An explicit location always wins over slot geometry

use canvas_layout::layout::home_region::{column_for_x, compute_home_regions};
use canvas_layout::layout::RegionLocation;
use canvas_layout::model::{
    ComponentId, ComponentInstance, ComponentLayout, ComponentType, DataRef, PageVariables, Rect,
    SlotDefinition, SlotId, TemplateConfig, TemplateId,
};
use proptest::prelude::*;

const PAGE_WIDTH: f64 = 600.0;

// ===== Arbitrary Strategies =====

fn template(slot_xs: &[f64]) -> TemplateConfig {
    TemplateConfig {
        id: TemplateId::new("prop-template").unwrap(),
        name: "Property".into(),
        default_mode: Default::default(),
        default_page_variables: PageVariables::letter_two_column(),
        slots: slot_xs
            .iter()
            .enumerate()
            .map(|(i, x)| SlotDefinition {
                id: SlotId::new(format!("slot-{i}")).unwrap(),
                name: format!("Slot {i}"),
                position: Rect {
                    x: *x,
                    y: 0.0,
                    width: 100.0,
                    height: 100.0,
                },
                allowed_components: vec![],
                is_required: false,
            })
            .collect(),
        default_components: vec![],
        allowed_components: vec![],
    }
}

/// (slot choice, optional explicit location) per instance.
fn arb_instances(slot_count: usize) -> impl Strategy<Value = Vec<ComponentInstance>> {
    prop::collection::vec(
        (0..slot_count, prop::option::weighted(0.2, (1u32..4, 1u32..4))),
        0..30,
    )
    .prop_map(|specs| {
        specs
            .into_iter()
            .enumerate()
            .map(|(i, (slot, location))| {
                let mut layout = ComponentLayout::in_slot(SlotId::new(format!("slot-{slot}")).unwrap());
                if let Some((page, column)) = location {
                    layout = layout.with_location(RegionLocation::new(page, column));
                }
                ComponentInstance::new(
                    ComponentId::new(format!("c-{i}")).unwrap(),
                    ComponentType::TextBlock,
                    DataRef::custom(format!("k{i}")),
                    layout,
                )
            })
            .collect()
    })
}

fn arb_case() -> impl Strategy<Value = (Vec<f64>, Vec<ComponentInstance>, u32)> {
    (prop::collection::vec(0.0f64..PAGE_WIDTH, 1..6), 1u32..=4).prop_flat_map(|(xs, columns)| {
        let slots = xs.len();
        (Just(xs), arb_instances(slots), Just(columns))
    })
}

proptest! {
    #[test]
    fn prop_assignment_is_deterministic((xs, instances, columns) in arb_case()) {
        let template = template(&xs);
        let first = compute_home_regions(&instances, &template, columns, PAGE_WIDTH);
        let second = compute_home_regions(&instances, &template, columns, PAGE_WIDTH);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_shared_slot_order_strictly_increases((xs, instances, columns) in arb_case()) {
        let template = template(&xs);
        let map = compute_home_regions(&instances, &template, columns, PAGE_WIDTH);

        for slot in &template.slots {
            let orders: Vec<usize> = instances
                .iter()
                .filter(|i| i.layout.slot_id.as_ref() == Some(&slot.id))
                .map(|i| map.get(&i.id).unwrap().order_index)
                .collect();
            prop_assert!(orders.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn prop_slot_columns_stay_on_page((xs, instances, columns) in arb_case()) {
        let template = template(&xs);
        let map = compute_home_regions(&instances, &template, columns, PAGE_WIDTH);

        for instance in instances.iter().filter(|i| i.layout.location.is_none()) {
            let assignment = map.get(&instance.id).unwrap();
            prop_assert_eq!(assignment.home_region.page, 1);
            prop_assert!((1..=columns).contains(&assignment.home_region.column));
        }
    }

    #[test]
    fn prop_explicit_location_wins((xs, instances, columns) in arb_case()) {
        let template = template(&xs);
        let map = compute_home_regions(&instances, &template, columns, PAGE_WIDTH);

        for instance in &instances {
            if let Some(location) = instance.layout.location {
                prop_assert_eq!(map.get(&instance.id).unwrap().home_region, location);
            }
        }
    }

    #[test]
    fn prop_column_bands_are_monotonic(a in 0.0f64..PAGE_WIDTH, b in 0.0f64..PAGE_WIDTH, columns in 1u32..=5) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(column_for_x(lo, columns, PAGE_WIDTH) <= column_for_x(hi, columns, PAGE_WIDTH));
    }
}

#[test]
fn two_column_boundary_examples() {
    assert_eq!(column_for_x(0.0, 2, PAGE_WIDTH), 1);
    assert_eq!(column_for_x(310.0, 2, PAGE_WIDTH), 2);
}
