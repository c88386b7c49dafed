//! Flexbox placement over plain snapshots of a container and its items.
//!
//! The scene takes a snapshot of a container and its participating children,
//! calls [`compute`], and writes the outcome back through the property path.
//! Nothing here touches the node tree, so the algorithm can be tested and
//! property-checked on its own.

use crate::style::{AlignItems, Direction, Edges, FlexBoundary, FlexDirection, FlexWrap, JustifyContent};

#[derive(Clone, Debug, PartialEq)]
pub struct FlexContainer {
    pub direction: FlexDirection,
    pub wrap: FlexWrap,
    pub justify: JustifyContent,
    pub align_items: Option<AlignItems>,
    pub text_direction: Direction,
    pub width: f32,
    pub height: f32,
    pub min_width: Option<f32>,
    pub min_height: Option<f32>,
    pub padding: Edges,
    pub gap: f32,
    pub row_gap: Option<f32>,
    pub column_gap: Option<f32>,
    pub boundary: FlexBoundary,
    pub cross_boundary: FlexBoundary,
    /// Height was defaulted rather than set, so rows may fit it to content.
    pub calc_height: bool,
    /// Grow already ran for this container in the current pass.
    pub grow_latched: bool,
}

impl Default for FlexContainer {
    fn default() -> Self {
        Self {
            direction: FlexDirection::Row,
            wrap: FlexWrap::NoWrap,
            justify: JustifyContent::FlexStart,
            align_items: None,
            text_direction: Direction::Ltr,
            width: 0.0,
            height: 0.0,
            min_width: None,
            min_height: None,
            padding: Edges::ZERO,
            gap: 0.0,
            row_gap: None,
            column_gap: None,
            boundary: FlexBoundary::Contain,
            cross_boundary: FlexBoundary::Contain,
            calc_height: false,
            grow_latched: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Default)]
pub struct FlexItem {
    pub width: f32,
    pub height: f32,
    pub min_width: Option<f32>,
    pub min_height: Option<f32>,
    pub margin: Edges,
    pub flex_grow: f32,
    pub flex_order: Option<i32>,
    pub align_self: Option<AlignItems>,
    /// Main-axis size the item had before an earlier grow pass stretched it.
    pub pre_flex_main: Option<f32>,
}

impl FlexItem {
    pub fn sized(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }
}

/// Where one item ended up. `None` positions were left untouched.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ItemLayout {
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub width: f32,
    pub height: f32,
    /// Main-axis base size when this call grew the item.
    pub grown_from: Option<f32>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FlexOutcome {
    /// Same order as the items passed in.
    pub items: Vec<ItemLayout>,
    pub width: f32,
    pub height: f32,
    /// Main-axis size the container had before it was fitted to its items.
    pub resized_from: Option<f32>,
    /// The container's own size changed; its parent needs another pass.
    pub size_changed: bool,
    pub grew: bool,
    /// Grow was requested but the items already fill the container.
    pub grow_starved: bool,
}

#[derive(Clone, Copy, Debug)]
struct Slot {
    main: f32,
    cross: f32,
    main_lead: f32,
    main_trail: f32,
    cross_lead: f32,
    cross_trail: f32,
    align: Option<AlignItems>,
    main_pos: f32,
    cross_pos: Option<f32>,
    grown_from: Option<f32>,
}

impl Slot {
    fn outer_main(&self) -> f32 {
        self.main_lead + self.main + self.main_trail
    }

    fn outer_cross(&self) -> f32 {
        self.cross_lead + self.cross + self.cross_trail
    }
}

/// Lays out `items` inside `container`. Returns `None` when there is nothing
/// to place.
pub fn compute(container: &FlexContainer, items: &[FlexItem]) -> Option<FlexOutcome> {
    if items.is_empty() {
        return None;
    }

    let is_row = container.direction == FlexDirection::Row;
    let (mut container_main, mut container_cross) = if is_row {
        (container.width, container.height)
    } else {
        (container.height, container.width)
    };
    let (pad_start, pad_end) = container.padding.along(is_row);
    let (cross_pad_start, cross_pad_end) = container.padding.along(!is_row);
    let (main_gap, cross_gap) = if is_row {
        (
            container.column_gap.unwrap_or(container.gap),
            container.row_gap.unwrap_or(container.gap),
        )
    } else {
        (
            container.row_gap.unwrap_or(container.gap),
            container.column_gap.unwrap_or(container.gap),
        )
    };

    let mut slots: Vec<Slot> = items
        .iter()
        .map(|item| {
            let (main, cross, min_main, min_cross) = if is_row {
                (item.width, item.height, item.min_width, item.min_height)
            } else {
                (item.height, item.width, item.min_height, item.min_width)
            };
            let (main_lead, main_trail) = item.margin.along(is_row);
            let (cross_lead, cross_trail) = item.margin.along(!is_row);
            Slot {
                main: clamp_min(main, min_main),
                cross: clamp_min(cross, min_cross),
                main_lead,
                main_trail,
                cross_lead,
                cross_trail,
                align: item.align_self,
                main_pos: 0.0,
                cross_pos: None,
                grown_from: None,
            }
        })
        .collect();

    let mut order: Vec<usize> = (0..items.len()).collect();
    if items.iter().any(|item| item.flex_order.is_some()) {
        order.sort_by_key(|&idx| items[idx].flex_order.unwrap_or(0));
    } else if container.text_direction == Direction::Rtl {
        order.reverse();
    }

    let n = items.len();
    let gaps = main_gap * n.saturating_sub(1) as f32;
    let mut size_changed = false;
    let mut grew = false;
    let mut grow_starved = false;

    let total_grow: f32 = items.iter().map(|item| item.flex_grow.max(0.0)).sum();
    if total_grow > 0.0 && n > 1 && !container.grow_latched {
        let bases: Vec<f32> = items
            .iter()
            .zip(&slots)
            .map(|(item, slot)| {
                if item.flex_grow > 0.0 {
                    let min_main = if is_row { item.min_width } else { item.min_height };
                    clamp_min(item.pre_flex_main.unwrap_or(slot.main), min_main)
                } else {
                    slot.main
                }
            })
            .collect();
        let used: f32 = slots
            .iter()
            .zip(&bases)
            .map(|(slot, base)| base + slot.main_lead + slot.main_trail)
            .sum();
        let available = container_main - pad_start - pad_end - used - gaps;
        if available > 0.0 {
            for ((slot, item), base) in slots.iter_mut().zip(items).zip(&bases) {
                if item.flex_grow > 0.0 {
                    slot.main = base + available * item.flex_grow / total_grow;
                    slot.grown_from = Some(*base);
                }
            }
            grew = true;
        } else {
            grow_starved = true;
        }
    }

    if is_row && container.calc_height && container.cross_boundary != FlexBoundary::Fixed {
        let tallest = slots.iter().map(|slot| slot.cross).fold(0.0_f32, f32::max);
        let fitted = if tallest > 0.0 {
            tallest + cross_pad_start + cross_pad_end
        } else {
            container_cross
        };
        if fitted != container_cross {
            container_cross = fitted;
            size_changed = true;
        }
    }

    let total: f32 = slots.iter().map(Slot::outer_main).sum();
    let wrapping = container.wrap == FlexWrap::Wrap && container.justify == JustifyContent::FlexStart;

    if wrapping {
        let limit = container_main - pad_end;
        let mut cursor = pad_start;
        let mut cross_cursor = cross_pad_start;
        let mut line: Vec<usize> = Vec::new();
        let mut line_cross = 0.0_f32;
        for &idx in &order {
            let outer = slots[idx].outer_main();
            if !line.is_empty() && cursor + outer > limit {
                align_line(&mut slots, &line, cross_cursor, line_cross, container.align_items);
                cross_cursor += line_cross + cross_gap;
                cursor = pad_start;
                line_cross = 0.0;
                line.clear();
            }
            let slot = &mut slots[idx];
            slot.main_pos = cursor + slot.main_lead;
            cursor += outer + main_gap;
            line_cross = line_cross.max(slot.outer_cross());
            line.push(idx);
        }
        align_line(&mut slots, &line, cross_cursor, line_cross, container.align_items);
        let extent = cross_cursor + line_cross + cross_pad_end;
        if extent != container_cross {
            container_cross = extent;
            size_changed = true;
        }
    } else {
        let free = container_main - pad_start - pad_end - total - gaps;
        let (start, spacing) = main_start_and_spacing(container.justify, pad_start, free, n);
        let mut cursor = start;
        for &idx in &order {
            let slot = &mut slots[idx];
            slot.main_pos = cursor + slot.main_lead;
            cursor += slot.outer_main() + main_gap + spacing;
        }

        if container_cross > 0.0 {
            let inner_cross = container_cross - cross_pad_start - cross_pad_end;
            for slot in &mut slots {
                if let Some(align) = slot.align.or(container.align_items) {
                    let offset = cross_offset(align, inner_cross, slot.outer_cross());
                    slot.cross_pos = Some(cross_pad_start + offset + slot.cross_lead);
                }
            }
        }
    }

    let mut resized_from = None;
    if !wrapping
        && container.justify == JustifyContent::FlexStart
        && container.boundary != FlexBoundary::Fixed
    {
        let min_main = if is_row { container.min_width } else { container.min_height };
        let fitted = clamp_min(pad_start + total + gaps + pad_end, min_main);
        if fitted != container_main {
            resized_from = Some(container_main);
            container_main = fitted;
            size_changed = true;
        }
    }

    let items = slots
        .iter()
        .map(|slot| {
            let (x, y, width, height) = if is_row {
                (Some(slot.main_pos), slot.cross_pos, slot.main, slot.cross)
            } else {
                (slot.cross_pos, Some(slot.main_pos), slot.cross, slot.main)
            };
            ItemLayout {
                x,
                y,
                width,
                height,
                grown_from: slot.grown_from,
            }
        })
        .collect();
    let (width, height) = if is_row {
        (container_main, container_cross)
    } else {
        (container_cross, container_main)
    };

    Some(FlexOutcome {
        items,
        width,
        height,
        resized_from,
        size_changed,
        grew,
        grow_starved,
    })
}

fn clamp_min(value: f32, min: Option<f32>) -> f32 {
    match min {
        Some(min) if min > value => min,
        _ => value,
    }
}

/// Cursor start and extra per-item spacing for one line.
fn main_start_and_spacing(justify: JustifyContent, pad_start: f32, free: f32, n: usize) -> (f32, f32) {
    let spread = free.max(0.0);
    match justify {
        JustifyContent::FlexStart => (pad_start, 0.0),
        JustifyContent::FlexEnd => (pad_start + free, 0.0),
        JustifyContent::Center => (pad_start + free * 0.5, 0.0),
        JustifyContent::SpaceBetween => {
            if n > 1 {
                (pad_start, spread / (n - 1) as f32)
            } else {
                (pad_start, 0.0)
            }
        }
        JustifyContent::SpaceAround => {
            let space = spread / n as f32;
            (pad_start + space * 0.5, space)
        }
        JustifyContent::SpaceEvenly => {
            let space = spread / (n + 1) as f32;
            (pad_start + space, space)
        }
    }
}

fn cross_offset(align: AlignItems, line_cross: f32, item_outer: f32) -> f32 {
    match align {
        AlignItems::FlexStart => 0.0,
        AlignItems::Center => (line_cross - item_outer) * 0.5,
        AlignItems::FlexEnd => line_cross - item_outer,
    }
}

fn align_line(
    slots: &mut [Slot],
    line: &[usize],
    line_start: f32,
    line_cross: f32,
    align_items: Option<AlignItems>,
) {
    for &idx in line {
        let slot = &mut slots[idx];
        let align = slot.align.or(align_items).unwrap_or(AlignItems::FlexStart);
        let offset = cross_offset(align, line_cross, slot.outer_cross());
        slot.cross_pos = Some(line_start + offset + slot.cross_lead);
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn row(width: f32, height: f32) -> FlexContainer {
        FlexContainer {
            width,
            height,
            ..FlexContainer::default()
        }
    }

    fn xs(outcome: &FlexOutcome) -> Vec<f32> {
        outcome.items.iter().map(|item| item.x.unwrap_or(f32::NAN)).collect()
    }

    #[test]
    fn flex_start_places_items_back_to_back() {
        let outcome = compute(
            &FlexContainer {
                boundary: FlexBoundary::Fixed,
                ..row(200.0, 50.0)
            },
            &[FlexItem::sized(50.0, 10.0), FlexItem::sized(60.0, 10.0)],
        )
        .expect("outcome");
        assert_eq!(xs(&outcome), vec![0.0, 50.0]);
        assert!(!outcome.size_changed);
    }

    #[test]
    fn space_between_spreads_free_space() {
        let outcome = compute(
            &FlexContainer {
                justify: JustifyContent::SpaceBetween,
                ..row(300.0, 50.0)
            },
            &[
                FlexItem::sized(50.0, 10.0),
                FlexItem::sized(60.0, 10.0),
                FlexItem::sized(40.0, 10.0),
            ],
        )
        .expect("outcome");
        assert_eq!(xs(&outcome), vec![0.0, 125.0, 260.0]);
    }

    #[test]
    fn wrap_breaks_lines_and_grows_cross_size() {
        let outcome = compute(
            &FlexContainer {
                wrap: FlexWrap::Wrap,
                gap: 10.0,
                ..row(250.0, 0.0)
            },
            &[
                FlexItem::sized(100.0, 50.0),
                FlexItem::sized(100.0, 50.0),
                FlexItem::sized(100.0, 50.0),
            ],
        )
        .expect("outcome");
        let positions: Vec<_> = outcome.items.iter().map(|item| (item.x, item.y)).collect();
        assert_eq!(
            positions,
            vec![
                (Some(0.0), Some(0.0)),
                (Some(110.0), Some(0.0)),
                (Some(0.0), Some(60.0)),
            ]
        );
        assert!(outcome.size_changed);
        assert_eq!(outcome.height, 110.0);
    }

    #[test]
    fn grow_splits_the_remaining_space() {
        let mut grow = FlexItem::sized(50.0, 10.0);
        grow.flex_grow = 1.0;
        let outcome = compute(&row(300.0, 10.0), &[grow.clone(), grow]).expect("outcome");
        let widths: Vec<_> = outcome.items.iter().map(|item| item.width).collect();
        assert_eq!(widths, vec![150.0, 150.0]);
        assert_eq!(xs(&outcome), vec![0.0, 150.0]);
        assert!(outcome.grew);
        assert_eq!(outcome.items[0].grown_from, Some(50.0));
        assert!(!outcome.size_changed);
    }

    #[test]
    fn grow_is_skipped_when_latched() {
        let mut grow = FlexItem::sized(50.0, 10.0);
        grow.flex_grow = 1.0;
        let outcome = compute(
            &FlexContainer {
                grow_latched: true,
                boundary: FlexBoundary::Fixed,
                ..row(300.0, 10.0)
            },
            &[grow.clone(), grow],
        )
        .expect("outcome");
        assert!(!outcome.grew);
        assert_eq!(outcome.items[0].width, 50.0);
    }

    #[test]
    fn grow_without_room_is_a_starved_no_op() {
        let mut grow = FlexItem::sized(200.0, 10.0);
        grow.flex_grow = 1.0;
        let outcome = compute(
            &FlexContainer {
                boundary: FlexBoundary::Fixed,
                ..row(300.0, 10.0)
            },
            &[grow.clone(), grow],
        )
        .expect("outcome");
        assert!(outcome.grow_starved);
        assert!(!outcome.grew);
        assert_eq!(outcome.items[1].width, 200.0);
    }

    #[test]
    fn min_width_wins_over_smaller_width() {
        let item = FlexItem {
            min_width: Some(50.0),
            ..FlexItem::sized(10.0, 10.0)
        };
        let outcome = compute(&row(200.0, 10.0), &[item]).expect("outcome");
        assert_eq!(outcome.items[0].width, 50.0);
    }

    #[test]
    fn contain_boundary_fits_container_to_items() {
        let items = [FlexItem::sized(120.0, 10.0), FlexItem::sized(100.0, 10.0)];
        let outcome = compute(&row(200.0, 10.0), &items).expect("outcome");
        assert_eq!(outcome.width, 220.0);
        assert_eq!(outcome.resized_from, Some(200.0));
        assert!(outcome.size_changed);

        let fixed = FlexContainer {
            boundary: FlexBoundary::Fixed,
            ..row(200.0, 10.0)
        };
        let outcome = compute(&fixed, &items).expect("outcome");
        assert_eq!(outcome.width, 200.0);
        assert_eq!(outcome.resized_from, None);
        assert!(!outcome.size_changed);
    }

    #[test]
    fn self_resize_respects_min_width() {
        let container = FlexContainer {
            min_width: Some(300.0),
            ..row(200.0, 10.0)
        };
        let outcome = compute(&container, &[FlexItem::sized(40.0, 10.0)]).expect("outcome");
        assert_eq!(outcome.width, 300.0);
    }

    #[test]
    fn rtl_reverses_order_unless_explicit_order_is_set() {
        let container = FlexContainer {
            text_direction: Direction::Rtl,
            boundary: FlexBoundary::Fixed,
            ..row(200.0, 10.0)
        };
        let items = [FlexItem::sized(50.0, 10.0), FlexItem::sized(60.0, 10.0)];
        let outcome = compute(&container, &items).expect("outcome");
        assert_eq!(xs(&outcome), vec![60.0, 0.0]);

        let ordered = [
            FlexItem {
                flex_order: Some(2),
                ..FlexItem::sized(50.0, 10.0)
            },
            FlexItem {
                flex_order: Some(1),
                ..FlexItem::sized(60.0, 10.0)
            },
            FlexItem::sized(30.0, 10.0),
        ];
        let outcome = compute(&container, &ordered).expect("outcome");
        assert_eq!(xs(&outcome), vec![90.0, 30.0, 0.0]);
    }

    #[test]
    fn column_uses_row_gap_and_padding() {
        let container = FlexContainer {
            direction: FlexDirection::Column,
            gap: 2.0,
            row_gap: Some(8.0),
            padding: Edges::new(5.0, 0.0, 5.0, 0.0),
            boundary: FlexBoundary::Fixed,
            ..row(100.0, 200.0)
        };
        let outcome = compute(
            &container,
            &[FlexItem::sized(10.0, 20.0), FlexItem::sized(10.0, 30.0)],
        )
        .expect("outcome");
        let ys: Vec<_> = outcome.items.iter().map(|item| item.y).collect();
        assert_eq!(ys, vec![Some(5.0), Some(33.0)]);
        assert_eq!(outcome.items[0].x, None);
    }

    #[test]
    fn align_items_center_honours_cross_margins() {
        let container = FlexContainer {
            align_items: Some(AlignItems::Center),
            boundary: FlexBoundary::Fixed,
            ..row(200.0, 100.0)
        };
        let item = FlexItem {
            margin: Edges::new(10.0, 0.0, 0.0, 0.0),
            ..FlexItem::sized(20.0, 40.0)
        };
        let end = FlexItem {
            align_self: Some(AlignItems::FlexEnd),
            ..FlexItem::sized(20.0, 40.0)
        };
        let outcome = compute(&container, &[item, end]).expect("outcome");
        assert_eq!(outcome.items[0].y, Some(35.0));
        assert_eq!(outcome.items[1].y, Some(60.0));
    }

    #[test]
    fn calc_height_row_fits_tallest_item() {
        let container = FlexContainer {
            calc_height: true,
            padding: Edges::uniform(4.0),
            boundary: FlexBoundary::Fixed,
            ..row(200.0, 500.0)
        };
        let outcome = compute(
            &container,
            &[FlexItem::sized(10.0, 20.0), FlexItem::sized(10.0, 35.0)],
        )
        .expect("outcome");
        assert_eq!(outcome.height, 43.0);
        assert!(outcome.size_changed);
    }

    #[test]
    fn empty_item_list_is_nothing_to_do() {
        assert_eq!(compute(&row(10.0, 10.0), &[]), None);
    }

    fn justify_strategy() -> impl Strategy<Value = JustifyContent> {
        prop_oneof![
            Just(JustifyContent::FlexStart),
            Just(JustifyContent::FlexEnd),
            Just(JustifyContent::Center),
            Just(JustifyContent::SpaceBetween),
            Just(JustifyContent::SpaceAround),
            Just(JustifyContent::SpaceEvenly),
        ]
    }

    fn item_strategy() -> impl Strategy<Value = FlexItem> {
        (0.0_f32..200.0, 0.0_f32..200.0, 0.0_f32..20.0, 0.0_f32..20.0).prop_map(
            |(width, height, lead, trail)| FlexItem {
                margin: Edges::new(0.0, trail, 0.0, lead),
                ..FlexItem::sized(width, height)
            },
        )
    }

    proptest! {
        #[test]
        fn placement_accounts_for_every_item_without_overlap(
            justify in justify_strategy(),
            column in any::<bool>(),
            gap in 0.0_f32..30.0,
            extra in 0.0_f32..500.0,
            items in proptest::collection::vec(item_strategy(), 1..8),
        ) {
            let direction = if column { FlexDirection::Column } else { FlexDirection::Row };
            let items: Vec<FlexItem> = if column {
                items
                    .into_iter()
                    .map(|item| FlexItem {
                        width: item.height,
                        height: item.width,
                        margin: Edges::new(item.margin.left, 0.0, item.margin.right, 0.0),
                        ..item
                    })
                    .collect()
            } else {
                items
            };
            let main = |item: &FlexItem| if column { item.height } else { item.width };
            let total: f32 = items
                .iter()
                .map(|item| main(item) + item.margin.along(!column).0 + item.margin.along(!column).1)
                .sum();
            let gaps = gap * (items.len() - 1) as f32;
            let size = total + gaps + extra;
            let container = FlexContainer {
                direction,
                justify,
                gap,
                width: size,
                height: size,
                boundary: FlexBoundary::Fixed,
                ..FlexContainer::default()
            };

            let outcome = compute(&container, &items).expect("outcome");
            let pos = |layout: &ItemLayout| if column { layout.y } else { layout.x };
            let spans: Vec<(f32, f32)> = outcome
                .items
                .iter()
                .zip(&items)
                .map(|(layout, item)| {
                    let (lead, trail) = item.margin.along(!column);
                    let start = pos(layout).expect("main position") - lead;
                    (start, start + lead + main(item) + trail)
                })
                .collect();

            for pair in spans.windows(2) {
                prop_assert!(pair[1].0 + 1e-3 >= pair[0].1 + gap);
            }
            if matches!(
                justify,
                JustifyContent::FlexStart | JustifyContent::FlexEnd | JustifyContent::Center
            ) {
                let covered = spans[spans.len() - 1].1 - spans[0].0;
                prop_assert!((covered - (total + gaps)).abs() < 1e-2);
            }
        }

        #[test]
        fn grow_hands_out_exactly_the_available_space(
            bases in proptest::collection::vec((1.0_f32..100.0, 0.1_f32..5.0), 2..6),
            available in 1.0_f32..500.0,
        ) {
            let items: Vec<FlexItem> = bases
                .iter()
                .map(|&(base, grow)| FlexItem {
                    flex_grow: grow,
                    ..FlexItem::sized(base, 10.0)
                })
                .collect();
            let width = bases.iter().map(|(base, _)| base).sum::<f32>() + available;
            let outcome = compute(&row(width, 10.0), &items).expect("outcome");
            let total_grow: f32 = bases.iter().map(|(_, grow)| grow).sum();

            let granted: Vec<f32> = outcome
                .items
                .iter()
                .zip(&bases)
                .map(|(layout, (base, _))| layout.width - base)
                .collect();
            prop_assert!((granted.iter().sum::<f32>() - available).abs() < 1e-2);
            for (grant, (_, grow)) in granted.iter().zip(&bases) {
                prop_assert!((grant - available * grow / total_grow).abs() < 1e-2);
            }
        }

        #[test]
        fn second_pass_on_a_stable_container_is_identical(
            justify in justify_strategy(),
            width in 50.0_f32..600.0,
            items in proptest::collection::vec(
                (1.0_f32..80.0, 1.0_f32..80.0, 0.0_f32..3.0),
                1..6,
            ),
        ) {
            let items: Vec<FlexItem> = items
                .into_iter()
                .map(|(w, h, grow)| FlexItem {
                    flex_grow: if grow > 1.5 { grow } else { 0.0 },
                    ..FlexItem::sized(w, h)
                })
                .collect();
            let container = FlexContainer {
                justify,
                align_items: Some(AlignItems::Center),
                ..row(width, 100.0)
            };
            let first = compute(&container, &items).expect("first pass");

            let settled_items: Vec<FlexItem> = items
                .iter()
                .zip(&first.items)
                .map(|(item, layout)| FlexItem {
                    width: layout.width,
                    height: layout.height,
                    pre_flex_main: layout.grown_from.or(item.pre_flex_main),
                    ..item.clone()
                })
                .collect();
            let settled = FlexContainer {
                width: first.width,
                height: first.height,
                ..container
            };
            let second = compute(&settled, &settled_items).expect("second pass");

            let close = |a: Option<f32>, b: Option<f32>| match (a, b) {
                (Some(a), Some(b)) => (a - b).abs() < 1e-3,
                (None, None) => true,
                _ => false,
            };
            for (a, b) in first.items.iter().zip(&second.items) {
                prop_assert!(close(a.x, b.x) && close(a.y, b.y));
                prop_assert!((a.width - b.width).abs() < 1e-3);
                prop_assert!((a.height - b.height).abs() < 1e-3);
            }
            prop_assert!((second.width - first.width).abs() < 1e-3);
            prop_assert!((second.height - first.height).abs() < 1e-3);
        }
    }
}
