// Clamped hit points shared by players, enemies and puppets.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    current: i32,
    max: i32,
}

impl Health {
    pub fn full(max: i32) -> Self {
        let max = max.max(1);
        Self { current: max, max }
    }

    pub fn current(&self) -> i32 {
        self.current
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    pub fn is_depleted(&self) -> bool {
        self.current <= 0
    }

    pub fn fraction(&self) -> f32 {
        self.current as f32 / self.max as f32
    }

    /// Subtracts `amount` and clamps at zero. Returns true when this call depleted it.
    pub fn apply_damage(&mut self, amount: i32) -> bool {
        if self.is_depleted() {
            return false;
        }
        self.current = (self.current - amount.max(0)).clamp(0, self.max);
        self.is_depleted()
    }

    /// Overwrites the value, clamped to `[0, max]`. Used for remote-reported health.
    pub fn set(&mut self, value: i32) {
        self.current = value.clamp(0, self.max);
    }

    pub fn refill(&mut self) {
        self.current = self.max;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn damage_never_goes_negative() {
        let mut hp = Health::full(40);
        assert!(hp.apply_damage(50));
        assert_eq!(hp.current(), 0);
        assert!(!hp.apply_damage(10));
        assert_eq!(hp.current(), 0);
    }

    #[test]
    fn set_is_clamped_both_ways() {
        let mut hp = Health::full(100);
        hp.set(250);
        assert_eq!(hp.current(), 100);
        hp.set(-3);
        assert_eq!(hp.current(), 0);
    }

    #[test]
    fn negative_damage_does_not_heal() {
        let mut hp = Health::full(100);
        hp.apply_damage(30);
        hp.apply_damage(-20);
        assert_eq!(hp.current(), 70);
    }
}
