//! Viewport invariants of the uniform-height layout.

use diffsurface::ui::diff::LayoutManager;
use proptest::prelude::*;

proptest! {
    #[test]
    fn visible_range_stays_in_bounds_and_covers_intersecting_lines(
        line_count in 1usize..5_000,
        line_height in (1u16..64).prop_map(f32::from),
        top in 0.0f32..200_000.0,
        span in prop_oneof![Just(0.0f32), 1.0f32..4_000.0],
        buffer in 0usize..50,
    ) {
        let layout = LayoutManager::new(line_count, line_height);
        let bottom = top + span;

        let buffered = layout.visible_range(top, bottom, buffer);
        prop_assert!(buffered.start <= buffered.end);
        prop_assert!(buffered.end <= line_count);

        let exact = layout.visible_range(top, bottom, 0);
        prop_assert!(buffered.start <= exact.start && exact.end <= buffered.end);

        if span == 0.0 && top < layout.total_height() && (top / line_height).fract() != 0.0 {
            let under = (top / line_height).floor() as usize;
            prop_assert!(exact.contains(&under), "{:?} misses line {} at {}", exact, under, top);
        }

        for index in 0..line_count {
            let y = layout.line_y(index);
            let intersects = y < bottom && y + line_height > top;
            if intersects {
                prop_assert!(
                    exact.contains(&index),
                    "line {} at {} missing from {:?} for [{}, {})",
                    index, y, exact, top, bottom
                );
            }
        }
    }

    #[test]
    fn line_index_inverts_line_y(line_count in 1usize..2_000, line_height in (1u16..40).prop_map(f32::from), pick in 0usize..2_000) {
        let layout = LayoutManager::new(line_count, line_height);
        let index = pick % line_count;
        let y = layout.line_y(index);
        prop_assert_eq!(layout.line_index(y + line_height * 0.5), index);
    }
}

#[test]
fn out_of_range_queries_are_permissive() {
    let layout = LayoutManager::new(10, 20.0);
    assert_eq!(layout.line_y(10), 0.0);
    assert_eq!(layout.line_index(10_000.0), 9);
    assert_eq!(layout.line_index(-1.0), 0);
}
