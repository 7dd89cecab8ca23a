/// One row of a tiered reference table. Both bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tier<T> {
    pub min: f64,
    pub max: f64,
    pub value: T,
}

impl<T> Tier<T> {
    pub const fn new(min: f64, max: f64, value: T) -> Self {
        Self { min, max, value }
    }

    pub fn contains(&self, x: f64) -> bool {
        self.min <= x && x <= self.max
    }
}

/// First tier whose `[min, max]` range contains `x`. Tables are scanned in
/// order, so on a shared boundary the earlier tier wins.
pub fn lookup<T>(tiers: &[Tier<T>], x: f64) -> Option<&Tier<T>> {
    tiers.iter().find(|tier| tier.contains(x))
}

pub fn portions<T>(tiers: &[Tier<T>], x: f64) -> Vec<(&Tier<T>, f64)> {
    let x = x.max(0.0);
    let mut out = Vec::new();
    for (idx, tier) in tiers.iter().enumerate() {
        if x <= tier.min {
            break;
        }
        let upper = tiers
            .get(idx + 1)
            .map(|next| next.min)
            .unwrap_or(f64::INFINITY)
            .min(x);
        let amount = (upper - tier.min).max(0.0);
        if amount > 0.0 {
            out.push((tier, amount));
        }
    }
    out
}

pub fn progressive<T>(tiers: &[Tier<T>], x: f64, rate: impl Fn(&T) -> f64) -> f64 {
    portions(tiers, x)
        .into_iter()
        .fold(0.0, |total, (tier, amount)| total + amount * rate(&tier.value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, proptest};

    const TABLE: [Tier<f64>; 3] = [
        Tier::new(0.0, 100.0, 0.10),
        Tier::new(100.0, 500.0, 0.20),
        Tier::new(500.0, f64::MAX, 0.30),
    ];

    #[test]
    fn lookup_is_inclusive_and_first_match_wins() {
        assert_eq!(lookup(&TABLE, 0.0).map(|t| t.value), Some(0.10));
        assert_eq!(lookup(&TABLE, 100.0).map(|t| t.value), Some(0.10));
        assert_eq!(lookup(&TABLE, 100.5).map(|t| t.value), Some(0.20));
        assert_eq!(lookup(&TABLE, 1e12).map(|t| t.value), Some(0.30));
        assert!(lookup(&TABLE, -1.0).is_none());
    }

    #[test]
    fn portions_cover_the_amount() {
        let parts = portions(&TABLE, 250.0);
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].1, 100.0);
        assert_eq!(parts[1].1, 150.0);
    }

    #[test]
    fn progressive_sums_each_band() {
        let total = progressive(&TABLE, 600.0, |r| *r);
        assert!((total - (10.0 + 80.0 + 30.0)).abs() < 1e-9);
        assert_eq!(progressive(&TABLE, 0.0, |r| *r), 0.0);
        assert_eq!(progressive(&TABLE, -50.0, |r| *r), 0.0);
        assert!(progressive(&TABLE, 0.0, |r| *r).is_sign_positive());
    }

    proptest! {
        #[test]
        fn prop_progressive_is_monotone(a in 0.0f64..10_000.0, b in 0.0f64..10_000.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(progressive(&TABLE, lo, |r| *r) <= progressive(&TABLE, hi, |r| *r) + 1e-9);
        }
    }
}
