//! Firearm tables and per-player magazine/reload state.

use crate::hitbox::HitType;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WeaponKind {
    Rifle,
    Smg,
    Shotgun,
}

impl WeaponKind {
    /// Seconds between shots.
    pub fn delay(self) -> f32 {
        match self {
            WeaponKind::Rifle => 0.5,
            WeaponKind::Smg => 0.1,
            WeaponKind::Shotgun => 1.0,
        }
    }

    pub fn clip_size(self) -> u32 {
        match self {
            WeaponKind::Rifle => 10,
            WeaponKind::Smg => 30,
            WeaponKind::Shotgun => 6,
        }
    }

    pub fn max_stock(self) -> u32 {
        match self {
            WeaponKind::Rifle => 50,
            WeaponKind::Smg => 120,
            WeaponKind::Shotgun => 48,
        }
    }

    pub fn reload_time(self) -> f32 {
        match self {
            WeaponKind::Rifle => 2.5,
            WeaponKind::Smg => 2.5,
            WeaponKind::Shotgun => 0.5,
        }
    }

    /// Shotgun shells go in one at a time.
    pub fn reloads_per_round(self) -> bool {
        matches!(self, WeaponKind::Shotgun)
    }

    /// Spread while scoped; doubled from the hip.
    pub fn spread(self) -> f32 {
        match self {
            WeaponKind::Rifle => 0.012,
            WeaponKind::Smg => 0.025,
            WeaponKind::Shotgun => 0.024,
        }
    }

    pub fn pellets(self) -> u32 {
        match self {
            WeaponKind::Shotgun => 8,
            _ => 1,
        }
    }

    pub fn is_automatic(self) -> bool {
        matches!(self, WeaponKind::Smg)
    }

    pub fn damage(self, hit: HitType) -> i32 {
        let (head, torso, limb) = match self {
            WeaponKind::Rifle => (100, 49, 33),
            WeaponKind::Smg => (75, 29, 18),
            WeaponKind::Shotgun => (37, 27, 16),
        };
        match hit {
            HitType::Head => head,
            HitType::Torso => torso,
            HitType::Arms | HitType::Legs => limb,
            HitType::Melee => 0,
        }
    }

    pub fn block_damage(self) -> u8 {
        match self {
            WeaponKind::Rifle => 50,
            WeaponKind::Smg => 34,
            WeaponKind::Shotgun => 20,
        }
    }
}

/// Outcome of one weapon tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WeaponTick {
    pub fired: bool,
    pub dry_fired: bool,
    pub reloaded: bool,
}

#[derive(Clone, Debug)]
pub struct Weapon {
    kind: WeaponKind,
    ammo: u32,
    stock: u32,
    next_shot_time: f32,
    reloading: bool,
    reload_end_time: f32,
    fired_previously: bool,
}

impl Weapon {
    pub fn new(kind: WeaponKind) -> Self {
        Self {
            kind,
            ammo: kind.clip_size(),
            stock: kind.max_stock(),
            next_shot_time: 0.0,
            reloading: false,
            reload_end_time: 0.0,
            fired_previously: false,
        }
    }

    pub fn kind(&self) -> WeaponKind {
        self.kind
    }

    pub fn ammo(&self) -> u32 {
        self.ammo
    }

    pub fn stock(&self) -> u32 {
        self.stock
    }

    pub fn set_ammo(&mut self, ammo: u32, stock: u32) {
        self.ammo = ammo.min(self.kind.clip_size());
        self.stock = stock;
    }

    pub fn is_reloading(&self) -> bool {
        self.reloading
    }

    /// Starts a reload if one is useful. Returns whether it started.
    pub fn reload(&mut self, now: f32) -> bool {
        if self.reloading || self.ammo >= self.kind.clip_size() || self.stock == 0 {
            return false;
        }
        self.reloading = true;
        self.reload_end_time = now + self.kind.reload_time();
        true
    }

    /// Advances firing and reloading to `now` with the trigger in `shooting`.
    pub fn tick(&mut self, now: f32, shooting: bool) -> WeaponTick {
        let mut out = WeaponTick::default();
        let trigger = shooting && (self.kind.is_automatic() || !self.fired_previously);
        if trigger && self.reloading && self.kind.reloads_per_round() && self.ammo > 0 {
            // shells already loaded can be fired
            self.reloading = false;
        }
        if trigger && !self.reloading && now >= self.next_shot_time {
            if self.ammo > 0 {
                self.ammo -= 1;
                out.fired = true;
            } else {
                out.dry_fired = true;
            }
            self.next_shot_time = now + self.kind.delay();
        }
        self.fired_previously = shooting;

        if self.reloading && now >= self.reload_end_time {
            self.reloading = false;
            if self.kind.reloads_per_round() {
                if self.ammo < self.kind.clip_size() && self.stock > 0 {
                    self.ammo += 1;
                    self.stock -= 1;
                }
                if !self.reload(now) {
                    out.reloaded = true;
                }
            } else {
                let take = (self.kind.clip_size() - self.ammo).min(self.stock);
                self.ammo += take;
                self.stock -= take;
                out.reloaded = true;
            }
        }
        out
    }

    /// Restocks to the full clip and reserve.
    pub fn restock(&mut self) {
        self.ammo = self.kind.clip_size();
        self.stock = self.kind.max_stock();
        self.reloading = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn semi_auto_needs_a_fresh_press() {
        let mut w = Weapon::new(WeaponKind::Rifle);
        assert!(w.tick(0.0, true).fired);
        assert!(!w.tick(1.0, true).fired);
        w.tick(1.1, false);
        assert!(w.tick(1.2, true).fired);
        assert_eq!(w.ammo(), 8);
    }

    #[test]
    fn smg_fires_on_its_delay() {
        let mut w = Weapon::new(WeaponKind::Smg);
        let mut shots = 0;
        let mut t = 0.0;
        while t < 0.999 {
            if w.tick(t, true).fired {
                shots += 1;
            }
            t += 1.0 / 64.0;
        }
        assert!((9..=11).contains(&shots), "{shots}");
    }

    #[test]
    fn magazine_reload_moves_stock() {
        let mut w = Weapon::new(WeaponKind::Rifle);
        w.set_ammo(3, 50);
        assert!(w.reload(0.0));
        assert!(!w.tick(1.0, false).reloaded);
        assert!(w.tick(2.6, false).reloaded);
        assert_eq!((w.ammo(), w.stock()), (10, 43));
    }

    #[test]
    fn shotgun_loads_shell_by_shell() {
        let mut w = Weapon::new(WeaponKind::Shotgun);
        w.set_ammo(4, 10);
        assert!(w.reload(0.0));
        assert!(!w.tick(0.6, false).reloaded);
        assert_eq!(w.ammo(), 5);
        assert!(w.tick(1.2, false).reloaded);
        assert_eq!((w.ammo(), w.stock()), (6, 8));
    }

    #[test]
    fn empty_clip_dry_fires() {
        let mut w = Weapon::new(WeaponKind::Rifle);
        w.set_ammo(0, 0);
        let t = w.tick(0.0, true);
        assert!(t.dry_fired && !t.fired);
    }
}
