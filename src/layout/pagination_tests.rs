//! Tests for the pagination walk.

use super::*;
use serde_json::json;

const GEOMETRY: PageGeometry = PageGeometry {
    columns_per_page: 2,
    column_height: Px::new(100),
};

fn cid(raw: &str) -> ComponentId {
    ComponentId::new(raw).unwrap()
}

fn home(page: u32, column: u32, slot_index: usize, order_index: usize) -> HomeRegionAssignment {
    HomeRegionAssignment {
        home_region: RegionLocation::new(page, column),
        slot_index,
        order_index,
    }
}

fn atomic(id: &str, home: HomeRegionAssignment, height: u32) -> FlowItem {
    FlowItem {
        instance_id: cid(id),
        home,
        body: FlowBody::Atomic {
            height: Px::new(height),
        },
    }
}

fn list(id: &str, home: HomeRegionAssignment, kind: ListKind, heights: &[u32]) -> FlowItem {
    FlowItem {
        instance_id: cid(id),
        home,
        body: FlowBody::List(FlowList {
            kind,
            heading: Px::new(10),
            continuation_heading: Px::new(10),
            preamble: Px::ZERO,
            item_heights: heights.iter().copied().map(Px::new).collect(),
            items: (1..=heights.len()).map(|n| json!(n)).collect(),
            metadata: None,
        }),
    }
}

fn segments(result: &PaginationResult, id: &str) -> Vec<RegionListContent> {
    let id = cid(id);
    result
        .placements_for(&id)
        .filter_map(|p| p.content.clone())
        .collect()
}

#[test]
fn legendary_actions_split_after_third_item() {
    // heading 10 + preamble 10 leaves 80; three 25px items fit, the fourth does not.
    let mut item = list(
        "legendary",
        home(1, 1, 0, 0),
        ListKind::LegendaryActions,
        &[25, 25, 25, 25, 25],
    );
    if let FlowBody::List(list) = &mut item.body {
        list.preamble = Px::new(10);
        list.metadata = Some(json!({"actionsPerRound": 3}));
    }
    let result = paginate(&[item], GEOMETRY);
    let segs = segments(&result, "legendary");

    assert_eq!(segs.len(), 2);
    assert_eq!(segs[0].items, vec![json!(1), json!(2), json!(3)]);
    assert_eq!(segs[0].start_index, 0);
    assert_eq!(segs[0].total_count, 5);
    assert!(!segs[0].is_continuation);
    assert_eq!(segs[0].heading(), "Legendary Actions");
    assert_eq!(segs[0].metadata, Some(json!({"actionsPerRound": 3})));

    assert_eq!(segs[1].items, vec![json!(4), json!(5)]);
    assert_eq!(segs[1].start_index, 3);
    assert_eq!(segs[1].total_count, 5);
    assert!(segs[1].is_continuation);
    assert_eq!(segs[1].heading(), "Legendary Actions (cont.)");
    assert_eq!(segs[1].metadata, None);

    let locations: Vec<_> = result.placements.iter().map(|p| p.location).collect();
    assert_eq!(
        locations,
        vec![RegionLocation::new(1, 1), RegionLocation::new(1, 2)]
    );
    assert_eq!(result.placements[0].height, Px::new(95));
    assert_eq!(result.placements[1].height, Px::new(60));
}

#[test]
fn atomic_component_moves_whole_to_next_column() {
    let items = vec![
        atomic("a", home(1, 1, 0, 0), 70),
        atomic("b", home(1, 1, 0, 1), 40),
    ];
    let result = paginate(&items, GEOMETRY);
    assert_eq!(result.placements[1].location, RegionLocation::new(1, 2));
    assert_eq!(result.placements[1].y_offset, Px::ZERO);
    assert!(result.issues.is_empty());
}

#[test]
fn atomic_component_wraps_to_next_page_after_last_column() {
    let items = vec![
        atomic("a", home(1, 2, 0, 0), 70),
        atomic("b", home(1, 2, 0, 1), 40),
    ];
    let result = paginate(&items, GEOMETRY);
    assert_eq!(result.placements[1].location, RegionLocation::new(2, 1));
    assert_eq!(result.page_count, 2);
}

#[test]
fn exact_fit_stays_in_column() {
    let items = vec![
        atomic("a", home(1, 1, 0, 0), 60),
        atomic("b", home(1, 1, 0, 1), 40),
    ];
    let result = paginate(&items, GEOMETRY);
    assert_eq!(result.placements[1].location, RegionLocation::new(1, 1));
    assert_eq!(result.placements[1].y_offset, Px::new(60));
}

#[test]
fn oversized_atomic_is_flagged_in_fresh_column() {
    let items = vec![
        atomic("small", home(1, 1, 0, 0), 10),
        atomic("huge", home(1, 1, 0, 1), 250),
    ];
    let result = paginate(&items, GEOMETRY);
    let huge = &result.placements[1];
    assert_eq!(huge.location, RegionLocation::new(1, 2));
    assert!(huge.region_overflow);
    assert_eq!(
        result.issues,
        vec![LayoutIssue::ColumnOverflow {
            component: cid("huge"),
            item_index: None,
            height: Px::new(250),
            capacity: Px::new(100),
        }]
    );
}

#[test]
fn oversized_list_item_is_placed_alone_with_overflow() {
    let item = list("acts", home(1, 1, 0, 0), ListKind::Actions, &[30, 150, 30]);
    let result = paginate(&[item], GEOMETRY);
    let segs = segments(&result, "acts");

    assert_eq!(segs.len(), 3);
    assert_eq!(segs[0].items, vec![json!(1)]);
    assert_eq!(segs[1].items, vec![json!(2)]);
    assert_eq!(segs[2].items, vec![json!(3)]);

    let overflow: Vec<_> = result.placements.iter().map(|p| p.region_overflow).collect();
    assert_eq!(overflow, vec![false, true, false]);
    assert!(matches!(
        result.issues.as_slice(),
        [LayoutIssue::ColumnOverflow {
            item_index: Some(1),
            ..
        }]
    ));
}

#[test]
fn heading_never_emitted_without_an_item() {
    // 85px used leaves 15px: the heading fits, the first item does not.
    let items = vec![
        atomic("header", home(1, 1, 0, 0), 85),
        list("traits", home(1, 1, 1, 1), ListKind::Traits, &[20, 20]),
    ];
    let result = paginate(&items, GEOMETRY);
    let traits: Vec<_> = result.placements_for(&cid("traits")).collect();
    assert_eq!(traits.len(), 1);
    assert_eq!(traits[0].location, RegionLocation::new(1, 2));
    assert_eq!(traits[0].content.as_ref().map(|c| c.items.len()), Some(2));
}

#[test]
fn empty_list_produces_no_placement() {
    let items = vec![
        list("none", home(1, 1, 0, 0), ListKind::Reactions, &[]),
        atomic("after", home(1, 1, 0, 1), 10),
    ];
    let result = paginate(&items, GEOMETRY);
    assert_eq!(result.placements.len(), 1);
    assert_eq!(result.placements[0].instance_id, cid("after"));
    assert_eq!(result.placements[0].y_offset, Px::ZERO);
}

#[test]
fn walk_follows_home_order_not_input_order() {
    let items = vec![
        atomic("right", home(1, 2, 1, 0), 10),
        atomic("left-second", home(1, 1, 0, 2), 10),
        atomic("left-first", home(1, 1, 0, 1), 10),
    ];
    let result = paginate(&items, GEOMETRY);
    let order: Vec<_> = result
        .placements
        .iter()
        .map(|p| p.instance_id.as_str().to_string())
        .collect();
    assert_eq!(order, vec!["left-first", "left-second", "right"]);
}

#[test]
fn home_column_ahead_of_cursor_pulls_it_forward() {
    let items = vec![
        atomic("a", home(1, 1, 0, 0), 10),
        atomic("b", home(1, 2, 1, 1), 10),
    ];
    let result = paginate(&items, GEOMETRY);
    assert_eq!(result.placements[1].location, RegionLocation::new(1, 2));
    assert_eq!(result.placements[1].y_offset, Px::ZERO);
}

#[test]
fn home_behind_cursor_is_placed_at_cursor() {
    // "long" spills into column 2; "right" lives in column 2 and stacks below it.
    let items = vec![
        list("long", home(1, 1, 0, 0), ListKind::Actions, &[40, 40, 40]),
        atomic("right", home(1, 2, 1, 1), 20),
    ];
    let result = paginate(&items, GEOMETRY);
    let right = result.placements_for(&cid("right")).next().unwrap();
    assert_eq!(right.location, RegionLocation::new(1, 2));
    assert_eq!(right.y_offset, Px::new(50));
}

#[test]
fn location_beyond_page_columns_is_clamped() {
    let items = vec![atomic("far", home(1, 5, 0, 0), 10)];
    let result = paginate(&items, GEOMETRY);
    assert_eq!(result.placements[0].location, RegionLocation::new(1, 2));
}

#[test]
fn explicit_later_page_is_honoured() {
    let items = vec![atomic("p3", home(3, 1, 0, 0), 10)];
    let result = paginate(&items, GEOMETRY);
    assert_eq!(result.placements[0].location, RegionLocation::new(3, 1));
    assert_eq!(result.page_count, 3);
}

#[test]
fn no_items_is_single_empty_page() {
    let result = paginate(&[], GEOMETRY);
    assert!(result.placements.is_empty());
    assert_eq!(result.page_count, 1);
}

#[test]
fn repeated_passes_are_identical() {
    let items = vec![
        atomic("a", home(1, 1, 0, 0), 35),
        list("b", home(1, 1, 1, 1), ListKind::Actions, &[20, 30, 25, 40, 10]),
        atomic("c", home(1, 2, 2, 2), 45),
    ];
    let first = paginate(&items, GEOMETRY);
    let second = paginate(&items, GEOMETRY);
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first.placements).unwrap(),
        serde_json::to_string(&second.placements).unwrap()
    );
}
