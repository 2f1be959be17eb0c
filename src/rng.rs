/// Small seeded generator (mulberry32) so a run is reproducible from its seed.
#[derive(Clone, Debug)]
pub struct Rng {
    state: u32,
}

const U32_SPAN: f64 = 4_294_967_296.0;

impl Rng {
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Seed for a session that did not ask for one.
    pub fn random_seed() -> u32 {
        rand::random()
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_add(0x6d2b_79f5);
        let mut mixed = self.state;
        mixed = (mixed ^ (mixed >> 15)).wrapping_mul(mixed | 1);
        mixed ^= mixed.wrapping_add((mixed ^ (mixed >> 7)).wrapping_mul(mixed | 61));
        mixed ^ (mixed >> 14)
    }

    /// Uniform in `[0, 1)`.
    pub fn unit(&mut self) -> f64 {
        f64::from(self.next_u32()) / U32_SPAN
    }

    /// Uniform integer in `min..=max`.
    pub fn range_u32(&mut self, min: u32, max: u32) -> u32 {
        if max <= min {
            return min;
        }
        let span = f64::from(max - min) + 1.0;
        let offset = (self.unit() * span).floor() as u32;
        min + offset.min(max - min)
    }

    pub fn chance(&mut self, probability: f32) -> bool {
        self.unit() < f64::from(probability)
    }

    /// A single candidate is returned without drawing.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        match items {
            [] => None,
            [only] => Some(only),
            _ => {
                let index = (self.unit() * items.len() as f64) as usize;
                items.get(index.min(items.len() - 1))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_yields_same_sequence() {
        let mut a = Rng::new(42);
        let mut b = Rng::new(42);
        for _ in 0..32 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
        assert_ne!(Rng::new(1).next_u32(), Rng::new(2).next_u32());
    }

    #[test]
    fn unit_stays_below_one() {
        let mut rng = Rng::new(3);
        for _ in 0..2_000 {
            let value = rng.unit();
            assert!((0.0..1.0).contains(&value));
        }
    }

    #[test]
    fn range_stays_inside_bounds() {
        let mut rng = Rng::new(7);
        for _ in 0..2_000 {
            let value = rng.range_u32(15_000, 30_000);
            assert!((15_000..=30_000).contains(&value));
        }
        assert_eq!(rng.range_u32(5, 5), 5);
        assert_eq!(rng.range_u32(9, 3), 9);
    }

    #[test]
    fn pick_handles_empty_and_single_slices() {
        let mut rng = Rng::new(99);
        let empty: [u8; 0] = [];
        assert_eq!(rng.pick(&empty), None);

        let before = rng.clone().next_u32();
        assert_eq!(rng.pick(&[7]), Some(&7));
        assert_eq!(rng.next_u32(), before);

        let items = [1, 2, 3, 4];
        for _ in 0..2_000 {
            assert!(rng.pick(&items).is_some());
        }
    }
}
