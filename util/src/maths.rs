//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Map a value from one range into another.
pub fn lin_map<T>(source_range: (T, T), target_range: (T, T), value: T) -> T
where
    T: Float
{
    target_range.0
        + ((value - source_range.0)
        * (target_range.1 - target_range.0)
        / (source_range.1 - source_range.0))
}

pub fn clamp<T>(value: &T, min: &T, max: &T) -> T
where
    T: Float
{
    let mut ret = *value;

    if ret > *max {
        ret = *max
    }
    if ret < *min {
        ret = *min
    }

    ret
}

/// Move `current` towards `target` by at most `max_delta`.
///
/// The result never passes `target`, so repeated application converges on the
/// target and then holds it. `max_delta` must be non-negative.
pub fn step_toward<T>(current: T, target: T, max_delta: T) -> T
where
    T: Float
{
    if current > target {
        let stepped = current - max_delta;
        if stepped <= target { target } else { stepped }
    }
    else if current < target {
        let stepped = current + max_delta;
        if stepped >= target { target } else { stepped }
    }
    else {
        target
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_step_toward() {
        // Descending approach, 10 -> 0 in steps of 3, must stop exactly on 0
        let mut value = 10f64;
        let mut seen = vec![];
        for _ in 0..4 {
            value = step_toward(value, 0.0, 3.0);
            seen.push(value);
        }
        assert_eq!(seen, vec![7.0, 4.0, 1.0, 0.0]);

        // Ascending approach never overshoots
        assert_eq!(step_toward(1.0f64, 2.0, 5.0), 2.0);

        // Idempotent once on target
        assert_eq!(step_toward(2.0f64, 2.0, 5.0), 2.0);
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(&5f64, &0f64, &4f64), 4f64);
        assert_eq!(clamp(&-1f64, &0f64, &4f64), 0f64);
        assert_eq!(clamp(&2f64, &0f64, &4f64), 2f64);
    }
}
