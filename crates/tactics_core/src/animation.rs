//! Glide (locomotion) system.
//!
//! Glides are purely visual: board state changes instantly when a move
//! resolves, and the glide carries the transform there over time. The
//! glide-gated phases wait until every glide has finished.

use crate::battle::Battle;
use crate::components::Locomotion;
use crate::math::{Fixed, Vec2Fixed};

/// What a glide did this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlideStatus {
    /// Still moving.
    Active,
    /// Reached its final target; remove the component.
    Arrived,
    /// Reached its final target; destroy the entity.
    Despawn,
}

const fn finished(locomotion: &Locomotion) -> GlideStatus {
    if locomotion.despawn_on_arrival {
        GlideStatus::Despawn
    } else {
        GlideStatus::Arrived
    }
}

/// Advance one glide by `delta` seconds.
///
/// Each frame closes `delta / remaining` of the gap to the current leg's
/// target and snaps to it when the leg runs out. Time left over from the
/// outbound leg is taken off the return leg.
pub fn advance_glide(locomotion: &mut Locomotion, position: &mut Vec2Fixed, delta: Fixed) -> GlideStatus {
    if locomotion.duration > Fixed::ZERO {
        if delta < locomotion.duration {
            *position = position.lerp(locomotion.target, delta / locomotion.duration);
            locomotion.duration -= delta;
            return GlideStatus::Active;
        }
        *position = locomotion.target;
        let overshoot = delta - locomotion.duration;
        locomotion.duration = Fixed::ZERO;
        return match locomotion.return_target {
            None => finished(locomotion),
            Some(home) => {
                locomotion.return_duration -= overshoot;
                if locomotion.return_duration > Fixed::ZERO {
                    GlideStatus::Active
                } else {
                    *position = home;
                    finished(locomotion)
                }
            }
        };
    }

    match locomotion.return_target {
        Some(home) if delta < locomotion.return_duration => {
            *position = position.lerp(home, delta / locomotion.return_duration);
            locomotion.return_duration -= delta;
            GlideStatus::Active
        }
        Some(home) => {
            *position = home;
            finished(locomotion)
        }
        None => {
            *position = locomotion.target;
            finished(locomotion)
        }
    }
}

impl Battle {
    /// Advance every glide and retire the ones that finished.
    pub(crate) fn run_locomotion_system(&mut self, delta: Fixed) {
        let ids = self.entities.ids_where(|e| e.locomotion.is_some());
        for id in ids {
            let Some(entity) = self.entities.get_mut(id) else {
                continue;
            };
            let Some(mut locomotion) = entity.locomotion.take() else {
                continue;
            };
            let transform = entity.transform.get_or_insert_with(Default::default);
            match advance_glide(&mut locomotion, &mut transform.position, delta) {
                GlideStatus::Active => entity.locomotion = Some(locomotion),
                GlideStatus::Arrived => {}
                GlideStatus::Despawn => self.destroy_queue.push(id),
            }
        }
    }
}
