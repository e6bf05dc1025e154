//! Wrap-aware mapping from ring slots to an on-screen polyline.
//!
//! The ring stores samples in wrapped order; on screen they must appear as
//! one continuous curve, oldest at the left and the newest sample pinned to
//! the right edge. The functions here unwrap slot indices relative to the
//! write cursor and plan the per-frame draw calls so the storage wrap never
//! shows up as a seam.

/// Amplitude divisor from the signed-16-bit sample domain into NDC y.
/// Half the 16-bit range, leaving headroom for loud input.
pub const AMPLITUDE_SCALE: f32 = 16384.0;

/// One draw over the slot array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawCommand {
    /// Line strip over the contiguous slot range `[start, start + len)`.
    Strip { start: usize, len: usize },
    /// Single segment joining two explicit slots across the storage wrap.
    Bridge { from: usize, to: usize },
}

/// Unwrapped position of a ring slot: its distance from the oldest sample,
/// in `[1, capacity]`. The slot at the cursor is the newest sample and maps
/// to `capacity` (the fixed right edge); the slot just past the cursor is
/// the oldest and maps to 1.
pub fn unwrapped_position(index: usize, cursor: usize, capacity: usize) -> usize {
    (index + capacity - cursor - 1) % capacity + 1
}

/// NDC vertex for one slot: x from the unwrapped position (oldest left,
/// newest anchored at x = +1), y from the amplitude.
pub fn vertex_ndc(index: usize, amplitude: f32, cursor: usize, capacity: usize) -> (f32, f32) {
    let x = unwrapped_position(index, cursor, capacity) as f32 / capacity as f32 * 2.0 - 1.0;
    let y = amplitude / AMPLITUDE_SCALE;
    (x, y)
}

/// Draw calls for one frame: the old span `[cursor + 1, capacity)`, the new
/// span `[0, cursor)`, and a bridge joining the end of the old span to the
/// start of the new one so the curve renders as a single polyline. Spans too
/// short to form a line are skipped rather than issued as degenerate draws,
/// and the newest sample is never connected back to slot 0.
pub fn plan_draws(cursor: usize, capacity: usize) -> Vec<DrawCommand> {
    let new_len = cursor;
    let old_len = capacity - cursor - 1;

    let mut commands = Vec::with_capacity(3);
    if old_len >= 2 {
        commands.push(DrawCommand::Strip {
            start: cursor + 1,
            len: old_len,
        });
    }
    if old_len >= 1 && new_len >= 1 {
        commands.push(DrawCommand::Bridge {
            from: capacity - 1,
            to: 0,
        });
    }
    if new_len >= 2 {
        commands.push(DrawCommand::Strip {
            start: 0,
            len: new_len,
        });
    }
    commands
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unwrapped_positions_follow_the_cursor() {
        // capacity 10, cursor 3: oldest sample sits at slot 4.
        assert_eq!(unwrapped_position(4, 3, 10), 1);
        assert_eq!(unwrapped_position(5, 3, 10), 2);
        assert_eq!(unwrapped_position(9, 3, 10), 6);
        assert_eq!(unwrapped_position(0, 3, 10), 7);
        assert_eq!(unwrapped_position(2, 3, 10), 9);
        // The cursor slot is the newest sample, pinned to the far edge.
        assert_eq!(unwrapped_position(3, 3, 10), 10);
    }

    #[test]
    fn newest_sample_is_anchored_at_the_right_edge() {
        let (x_newest, _) = vertex_ndc(3, 0.0, 3, 10);
        assert_eq!(x_newest, 1.0);
        let (x_oldest, _) = vertex_ndc(4, 0.0, 3, 10);
        assert!((x_oldest - (1.0 / 10.0 * 2.0 - 1.0)).abs() < f32::EPSILON);
        assert!(x_oldest < x_newest);
    }

    #[test]
    fn amplitude_maps_with_headroom() {
        let (_, y) = vertex_ndc(0, 16384.0, 5, 10);
        assert_eq!(y, 1.0);
        let (_, y) = vertex_ndc(0, -8192.0, 5, 10);
        assert_eq!(y, -0.5);
    }

    #[test]
    fn interior_cursor_yields_two_strips_and_a_bridge() {
        assert_eq!(
            plan_draws(3, 10),
            vec![
                DrawCommand::Strip { start: 4, len: 6 },
                DrawCommand::Bridge { from: 9, to: 0 },
                DrawCommand::Strip { start: 0, len: 3 },
            ]
        );
    }

    #[test]
    fn cursor_at_last_slot_yields_a_single_strip() {
        assert_eq!(
            plan_draws(9, 10),
            vec![DrawCommand::Strip { start: 0, len: 9 }]
        );
    }

    #[test]
    fn cursor_at_zero_yields_a_single_strip() {
        assert_eq!(
            plan_draws(0, 10),
            vec![DrawCommand::Strip { start: 1, len: 9 }]
        );
    }

    #[test]
    fn one_slot_spans_are_not_issued_as_strips() {
        // The new span holds a single vertex; the bridge still reaches it.
        assert_eq!(
            plan_draws(1, 10),
            vec![
                DrawCommand::Strip { start: 2, len: 8 },
                DrawCommand::Bridge { from: 9, to: 0 },
            ]
        );
    }
}
