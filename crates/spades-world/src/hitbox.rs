//! Player hit boxes, rebuilt from position, facing and stance on every query.

use spades_geom::{Mat4, Obb, Vec3};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HitType {
    Head,
    Torso,
    Arms,
    Legs,
    Melee,
}

#[derive(Clone, Copy, Debug)]
pub struct HitBoxes {
    pub head: Obb,
    pub torso: Obb,
    pub legs: [Obb; 2],
    pub arms: Obb,
}

// Local frame: +y forward, +x right, z down; origin at the feet.
fn part(frame: Mat4, min: Vec3, max: Vec3) -> Obb {
    Obb::new(frame * Mat4::translate(min) * Mat4::scale(max - min))
}

impl HitBoxes {
    /// `eye` is the player's position; `front` need not be normalized.
    pub fn new(eye: Vec3, front: Vec3, crouch: bool) -> Self {
        let horizontal = (front.x * front.x + front.y * front.y).sqrt();
        let yaw = (-front.x).atan2(front.y);
        let pitch = front.z.atan2(horizontal);
        let feet = eye
            + Vec3::new(
                0.0,
                0.0,
                if crouch {
                    crate::constants::CROUCH_HEIGHT
                } else {
                    crate::constants::STAND_HEIGHT
                },
            );
        let lower = Mat4::translate(feet) * Mat4::rotate(Vec3::new(0.0, 0.0, 1.0), yaw);

        let (leg_top, torso_top, head_top) = if crouch {
            (-0.6, -1.4, -1.85)
        } else {
            (-1.1, -2.1, -2.6)
        };
        let legs = [
            part(lower, Vec3::new(-0.4, -0.2, leg_top), Vec3::new(-0.02, 0.2, 0.0)),
            part(lower, Vec3::new(0.02, -0.2, leg_top), Vec3::new(0.4, 0.2, 0.0)),
        ];
        let torso = part(
            lower,
            Vec3::new(-0.45, -0.25, torso_top),
            Vec3::new(0.45, 0.25, leg_top),
        );
        let head = part(
            lower,
            Vec3::new(-0.25, -0.25, head_top),
            Vec3::new(0.25, 0.25, torso_top),
        );
        let shoulder = lower
            * Mat4::translate(Vec3::new(0.0, 0.0, torso_top + 0.1))
            * Mat4::rotate(Vec3::new(1.0, 0.0, 0.0), pitch);
        let arms = part(
            shoulder,
            Vec3::new(-0.45, 0.0, -0.1),
            Vec3::new(0.45, 0.8, 0.1),
        );
        Self {
            head,
            torso,
            legs,
            arms,
        }
    }

    /// Nearest box hit by the ray, with the entry point.
    pub fn ray_cast(&self, start: Vec3, dir: Vec3) -> Option<(HitType, Vec3)> {
        let parts = [
            (HitType::Head, &self.head),
            (HitType::Torso, &self.torso),
            (HitType::Arms, &self.arms),
            (HitType::Legs, &self.legs[0]),
            (HitType::Legs, &self.legs[1]),
        ];
        let mut best: Option<(HitType, Vec3, f32)> = None;
        for (kind, obb) in parts {
            if let Some(p) = obb.ray_cast(start, dir) {
                let d = (p - start).length_squared();
                if best.is_none_or(|(_, _, bd)| d < bd) {
                    best = Some((kind, p, d));
                }
            }
        }
        best.map(|(kind, p, _)| (kind, p))
    }
}
