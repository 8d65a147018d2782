use minifb::{Key, KeyRepeat, Window, WindowOptions};
use std::time::Duration;
use tracing::debug;

use super::{FrameDisplay, KeyInput};
use crate::keys::ESCAPE;
use crate::models::Frame;

struct Surface {
    name: String,
    window: Window,
    size: (u32, u32),
}

/// Native windows, one per surface name
#[derive(Default)]
pub struct WindowDisplay {
    surfaces: Vec<Surface>,
    buffer: Vec<u32>,
}

impl WindowDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    fn surface(&mut self, name: &str, size: (u32, u32)) -> anyhow::Result<&mut Surface> {
        let existing = self.surfaces.iter().position(|s| s.name == name);

        let index = match existing {
            Some(i) if self.surfaces[i].size == size => i,
            stale => {
                // Frame size changed (or first frame): open a window that fits
                if let Some(i) = stale {
                    self.surfaces.remove(i);
                }
                let mut window = Window::new(name, size.0 as usize, size.1 as usize, WindowOptions::default())
                    .map_err(|e| anyhow::anyhow!("Failed to open window '{}': {}", name, e))?;
                window.set_target_fps(0);
                debug!(window = name, width = size.0, height = size.1, "opened window");
                self.surfaces.push(Surface {
                    name: name.to_string(),
                    window,
                    size,
                });
                self.surfaces.len() - 1
            }
        };

        Ok(&mut self.surfaces[index])
    }

    fn pressed_key(&self) -> Option<KeyInput> {
        for surface in &self.surfaces {
            if !surface.window.is_open() {
                return Some(KeyInput::WindowClosed);
            }
            if let Some(c) = surface
                .window
                .get_keys_pressed(KeyRepeat::No)
                .into_iter()
                .find_map(key_to_char)
            {
                return Some(KeyInput::Key(c));
            }
        }
        None
    }
}

impl FrameDisplay for WindowDisplay {
    fn show(&mut self, name: &str, frame: &Frame) -> anyhow::Result<()> {
        let argb = rgb_to_argb(frame, std::mem::take(&mut self.buffer));
        let (width, height) = frame.dimensions();

        let surface = self.surface(name, (width, height))?;
        let result = surface
            .window
            .update_with_buffer(&argb, width as usize, height as usize)
            .map_err(|e| anyhow::anyhow!("Failed to draw window '{}': {}", name, e));

        self.buffer = argb;
        result
    }

    fn poll_key(&mut self, timeout: Duration) -> Option<KeyInput> {
        // Presses handled while the last frames were drawn
        if let Some(input) = self.pressed_key() {
            return Some(input);
        }

        std::thread::sleep(timeout);
        for surface in &mut self.surfaces {
            surface.window.update();
        }
        self.pressed_key()
    }

    fn destroy_all(&mut self) {
        self.surfaces.clear();
    }
}

/// Pack an RGB frame into 0RGB `u32` pixels, reusing `buf`
pub fn rgb_to_argb(frame: &Frame, mut buf: Vec<u32>) -> Vec<u32> {
    buf.clear();
    buf.extend(
        frame
            .pixels()
            .map(|p| ((p[0] as u32) << 16) | ((p[1] as u32) << 8) | p[2] as u32),
    );
    buf
}

fn key_to_char(key: Key) -> Option<char> {
    let c = match key {
        Key::Escape => ESCAPE,
        Key::Key0 | Key::NumPad0 => '0',
        Key::Key1 | Key::NumPad1 => '1',
        Key::Key2 | Key::NumPad2 => '2',
        Key::Key3 | Key::NumPad3 => '3',
        Key::Key4 | Key::NumPad4 => '4',
        Key::Key5 | Key::NumPad5 => '5',
        Key::Key6 | Key::NumPad6 => '6',
        Key::Key7 | Key::NumPad7 => '7',
        Key::Key8 | Key::NumPad8 => '8',
        Key::Key9 | Key::NumPad9 => '9',
        Key::Q => 'q',
        Key::S => 's',
        _ => return None,
    };
    Some(c)
}
