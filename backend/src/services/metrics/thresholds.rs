/// Ordered `(lower bound, label)` tiers evaluated first-match.
///
/// Tiers must be listed from the highest bound down. A value is given the
/// label of the first tier whose bound it reaches (inclusive); values below
/// every bound, or NaN, get the fallback label.
#[derive(Debug, Clone, Copy)]
pub struct ThresholdTable<L: 'static> {
    tiers: &'static [(f64, L)],
    fallback: L,
}

impl<L: Copy> ThresholdTable<L> {
    pub const fn new(tiers: &'static [(f64, L)], fallback: L) -> Self {
        Self { tiers, fallback }
    }

    pub fn classify(&self, value: f64) -> L {
        self.classify_scaled(value, 1.0)
    }

    /// Classify against every bound multiplied by `scale`
    pub fn classify_scaled(&self, value: f64, scale: f64) -> L {
        self.tiers
            .iter()
            .find(|(bound, _)| value >= bound * scale)
            .map(|(_, label)| *label)
            .unwrap_or(self.fallback)
    }

    pub fn tiers(&self) -> &'static [(f64, L)] {
        self.tiers
    }

    pub fn fallback(&self) -> L {
        self.fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRADES: ThresholdTable<char> = ThresholdTable::new(&[(90.0, 'A'), (75.0, 'B'), (50.0, 'C')], 'F');

    #[test]
    fn first_matching_tier_wins() {
        assert_eq!(GRADES.classify(95.0), 'A');
        assert_eq!(GRADES.classify(90.0), 'A');
        assert_eq!(GRADES.classify(89.99), 'B');
        assert_eq!(GRADES.classify(50.0), 'C');
        assert_eq!(GRADES.classify(49.0), 'F');
    }

    #[test]
    fn nan_and_negative_values_fall_through() {
        assert_eq!(GRADES.classify(f64::NAN), 'F');
        assert_eq!(GRADES.classify(-1.0), 'F');
    }

    #[test]
    fn scales_every_bound() {
        assert_eq!(GRADES.classify_scaled(45.0, 0.5), 'A');
        assert_eq!(GRADES.classify_scaled(30.0, 0.5), 'C');
        assert_eq!(GRADES.classify_scaled(24.0, 0.5), 'F');
    }

    #[test]
    fn exposes_tiers() {
        assert_eq!(GRADES.tiers().len(), 3);
        assert_eq!(GRADES.fallback(), 'F');
    }
}
