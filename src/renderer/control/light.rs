//! Light and overlay keyboard control
//!
//! Arrow keys orbit the light around its target, PageUp/PageDown move it
//! closer or farther, `i`/`k` change intensity. `g`, `h` and `d` pick the
//! grid, hatch or dot overlay and `m` cycles through them. `o` toggles the
//! overlay, `s` toggles shadow casting.

use crate::renderer::light::DirectionalLight;
use crate::renderer::shading::{OverlayConfig, OverlayMode};
use crate::window::event::{Event, Key};
use glam::Vec3;
use std::f32::consts::PI;

/// Keyboard control of the scene light and overlay.
pub struct LightControl {
    /// Orbit step per key press, in radians.
    pub rotate_step: f32,
    /// Distance step per key press.
    pub zoom_step: f32,
    /// Intensity step per key press.
    pub intensity_step: f32,
    /// Minimum distance from the target.
    pub min_distance: f32,
    /// Maximum distance from the target.
    pub max_distance: f32,
}

impl LightControl {
    pub fn new(min_distance: f32, max_distance: f32) -> Self {
        Self {
            rotate_step: 5f32.to_radians(),
            zoom_step: 0.5,
            intensity_step: 0.1,
            min_distance,
            max_distance,
        }
    }

    /// Apply unhandled key presses. Returns whether anything changed.
    pub fn handle_events(
        &self,
        light: &mut DirectionalLight,
        overlay: &mut OverlayConfig,
        events: &mut [Event],
    ) -> bool {
        let mut changed = false;
        for event in events.iter_mut() {
            if event.is_handled() {
                continue;
            }
            let Event::KeyPress { key, .. } = *event else {
                continue;
            };

            let consumed = match key {
                Key::Left => self.orbit(light, -self.rotate_step, 0.0),
                Key::Right => self.orbit(light, self.rotate_step, 0.0),
                Key::Up => self.orbit(light, 0.0, -self.rotate_step),
                Key::Down => self.orbit(light, 0.0, self.rotate_step),
                Key::PageUp => self.zoom(light, -self.zoom_step),
                Key::PageDown => self.zoom(light, self.zoom_step),
                Key::Char('i') => {
                    light.set_intensity(light.intensity() + self.intensity_step);
                    true
                }
                Key::Char('k') => {
                    light.set_intensity(light.intensity() - self.intensity_step);
                    true
                }
                Key::Char('s') => {
                    light.set_casts_shadow(!light.casts_shadow());
                    tracing::info!("shadows {}", on_off(light.casts_shadow()));
                    true
                }
                Key::Char('g') => select(overlay, OverlayMode::Grid),
                Key::Char('h') => select(overlay, OverlayMode::Hatch),
                Key::Char('d') => select(overlay, OverlayMode::Dot),
                Key::Char('m') => {
                    let next = overlay.mode.next();
                    select(overlay, next)
                }
                Key::Char('o') => {
                    overlay.enabled = !overlay.enabled;
                    tracing::info!("overlay {}", on_off(overlay.enabled));
                    true
                }
                _ => false,
            };

            if consumed {
                event.set_handled();
                changed = true;
            }
        }
        changed
    }

    /// Move the light on the sphere around its target.
    fn orbit(&self, light: &mut DirectionalLight, d_theta: f32, d_phi: f32) -> bool {
        let target = light.target();
        let to_light = light.position() - target;
        let distance = to_light.length();
        if distance <= f32::EPSILON {
            return false;
        }

        let theta = to_light.x.atan2(to_light.z) + d_theta;
        let phi = ((to_light.y / distance).clamp(-1.0, 1.0).acos() + d_phi).clamp(0.01, PI - 0.01);

        let sin_phi = phi.sin();
        light.set_position(
            target
                + Vec3::new(
                    distance * sin_phi * theta.sin(),
                    distance * phi.cos(),
                    distance * sin_phi * theta.cos(),
                ),
        );
        true
    }

    fn zoom(&self, light: &mut DirectionalLight, delta: f32) -> bool {
        let target = light.target();
        let to_light = light.position() - target;
        let distance = to_light.length();
        if distance <= f32::EPSILON {
            return false;
        }
        let new_distance = (distance + delta).clamp(self.min_distance, self.max_distance);
        light.set_position(target + to_light / distance * new_distance);
        true
    }
}

impl Default for LightControl {
    fn default() -> Self {
        Self::new(1.0, 18.0)
    }
}

fn select(overlay: &mut OverlayConfig, mode: OverlayMode) -> bool {
    overlay.enabled = true;
    overlay.mode = mode;
    tracing::info!("overlay mode {:?}", mode);
    true
}

fn on_off(value: bool) -> &'static str {
    if value {
        "on"
    } else {
        "off"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(key: Key) -> Vec<Event> {
        vec![Event::key_press(key)]
    }

    #[test]
    fn test_orbit_keeps_distance() {
        let control = LightControl::default();
        let mut light = DirectionalLight::default();
        let mut overlay = OverlayConfig::default();
        let distance = light.position().length();

        let mut events = press(Key::Left);
        assert!(control.handle_events(&mut light, &mut overlay, &mut events));
        assert!(events[0].is_handled());
        assert!((light.position().length() - distance).abs() < 1e-4);
        assert!((light.position().y - 8.0).abs() < 1e-4);
        assert!((light.position() - Vec3::new(3.0, 8.0, 2.0)).length() > 0.1);
    }

    #[test]
    fn test_zoom_is_clamped() {
        let control = LightControl::new(1.0, 10.0);
        let mut light = DirectionalLight::default();
        let mut overlay = OverlayConfig::default();
        let mut events: Vec<Event> = (0..40).map(|_| Event::key_press(Key::PageDown)).collect();
        control.handle_events(&mut light, &mut overlay, &mut events);
        assert!((light.position().length() - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_overlay_and_shadow_keys() {
        let control = LightControl::default();
        let mut light = DirectionalLight::default();
        let mut overlay = OverlayConfig::default();

        control.handle_events(&mut light, &mut overlay, &mut press(Key::Char('h')));
        assert_eq!(overlay.mode, OverlayMode::Hatch);
        assert!(overlay.enabled);

        control.handle_events(&mut light, &mut overlay, &mut press(Key::Char('o')));
        assert!(!overlay.enabled);

        control.handle_events(&mut light, &mut overlay, &mut press(Key::Char('s')));
        assert!(!light.casts_shadow());
    }

    #[test]
    fn test_handled_and_unbound_keys_ignored() {
        let control = LightControl::default();
        let mut light = DirectionalLight::default();
        let mut overlay = OverlayConfig::default();
        let revision = light.revision();

        let mut events = vec![
            Event::KeyPress {
                key: Key::Left,
                handled: true,
            },
            Event::key_press(Key::Char('z')),
        ];
        assert!(!control.handle_events(&mut light, &mut overlay, &mut events));
        assert_eq!(light.revision(), revision);
        assert!(!events[1].is_handled());
    }
}
