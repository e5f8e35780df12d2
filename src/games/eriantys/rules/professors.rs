//! Professor (dining table) control.

use tracing::instrument;

/// Decides who holds a professor given per-seat table counts.
///
/// A challenger takes the professor only with strictly more students than
/// everyone else; the current holder keeps it otherwise, even when several
/// challengers tie above it. `favoured` wins ties at the top (FARMER).
#[instrument]
pub fn professor_holder(
    counts: &[u32],
    holder: Option<usize>,
    favoured: Option<usize>,
) -> Option<usize> {
    let max = counts.iter().copied().max().unwrap_or(0);
    if max == 0 {
        return holder;
    }
    if let Some(seat) = favoured
        && counts.get(seat) == Some(&max)
    {
        return Some(seat);
    }
    let leaders: Vec<usize> = (0..counts.len()).filter(|i| counts[*i] == max).collect();
    match (holder, leaders.as_slice()) {
        (Some(h), _) if leaders.contains(&h) => Some(h),
        (_, [single]) => Some(*single),
        (holder, _) => holder,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_leader_takes_free_professor() {
        assert_eq!(professor_holder(&[2, 1], None, None), Some(0));
        assert_eq!(professor_holder(&[0, 0, 0], None, None), None);
    }

    #[test]
    fn test_tie_keeps_holder() {
        assert_eq!(professor_holder(&[2, 2], Some(0), None), Some(0));
        assert_eq!(professor_holder(&[2, 2], None, None), None);
        assert_eq!(professor_holder(&[2, 3], Some(0), None), Some(1));
    }

    #[test]
    fn test_tied_challengers_leave_professor_with_holder() {
        assert_eq!(professor_holder(&[1, 2, 2], Some(0), None), Some(0));
        assert_eq!(professor_holder(&[1, 2, 3], Some(0), None), Some(2));
        assert_eq!(professor_holder(&[1, 2, 2], Some(0), Some(2)), Some(2));
    }

    #[test]
    fn test_favoured_player_wins_ties() {
        assert_eq!(professor_holder(&[2, 2], Some(0), Some(1)), Some(1));
        assert_eq!(professor_holder(&[3, 2], Some(0), Some(1)), Some(0));
    }
}
