pub mod binder;
pub mod browser;
pub mod prompt;
pub mod state;

pub fn increment(x: usize, len: usize, wrap: bool) -> usize {
    if x + 1 >= len {
        if wrap { 0 } else { len.saturating_sub(1) }
    } else {
        x + 1
    }
}

pub fn decrement(x: usize, len: usize, wrap: bool) -> usize {
    if x == 0 {
        if wrap { len.saturating_sub(1) } else { 0 }
    } else {
        x - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn increment_clamps_or_wraps() {
        assert_eq!(increment(0, 3, false), 1);
        assert_eq!(increment(2, 3, false), 2);
        assert_eq!(increment(2, 3, true), 0);
        assert_eq!(increment(0, 0, false), 0);
    }

    #[test]
    fn decrement_clamps_or_wraps() {
        assert_eq!(decrement(1, 3, false), 0);
        assert_eq!(decrement(0, 3, false), 0);
        assert_eq!(decrement(0, 3, true), 2);
    }
}
