//! Player components and the systems that drive both controllers.
//!
//! The player body carries [`Player`], the two controllers, a
//! [`CharacterBody`](crate::physics::CharacterBody) and a kinematic avian
//! body with a box collider. Its child
//! camera carries [`PlayerCamera`] and the [`HoldAnchor`] / [`Muzzle`]
//! children.
//!
//! # Example:
//!
//! ```ignore
//! app.add_plugins(PlayerControllerPlugin);
//! ```
pub mod camera;
pub mod interaction;
pub mod movement;

use bevy::prelude::*;

pub use camera::*;
pub use interaction::*;
pub use movement::*;

use crate::input::{gather_input, InputSnapshot};
use crate::interaction::InteractionController;
use crate::locomotion::LocomotionController;
use crate::settings::Settings;

#[derive(Component, Debug, Default)]
pub struct Player;

#[derive(Component, Debug, Default)]
pub struct PlayerCamera;

/// Where a held object is pulled to.
#[derive(Component, Debug, Default)]
pub struct HoldAnchor;

/// Projectile spawn point.
#[derive(Component, Debug, Default)]
pub struct Muzzle;

/// Hand reloaded tuning to the live controllers.
#[allow(clippy::needless_pass_by_value)]
pub fn apply_settings_changes(
    settings: Res<Settings>,
    mut players: Query<(Option<&mut InteractionController>, Option<&mut LocomotionController>), With<Player>>,
) {
    if !settings.is_changed() || settings.is_added() {
        return;
    }
    for (interaction, locomotion) in &mut players {
        if let Some(mut c) = interaction {
            c.reconfigure(settings.interaction.clone());
        }
        if let Some(mut c) = locomotion {
            c.reconfigure(settings.locomotion.clone());
        }
    }
    info!("player controllers reconfigured");
}

/// Input, look, both controllers and recoil, in that order.
pub struct PlayerControllerPlugin;

impl Plugin for PlayerControllerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<InputSnapshot>()
            .add_event::<SoundCue>()
            .add_systems(PostStartup, (lock_cursor_on_start, report_missing_collaborators))
            .add_systems(
                Update,
                (
                    apply_settings_changes,
                    gather_input,
                    camera_look,
                    player_locomotion,
                    player_interaction,
                    apply_recoil,
                    cursor_grab,
                )
                    .chain(),
            )
            .add_systems(Update, log_sound_cues.after(player_interaction));
    }
}
