//! SDL2 window and keyboard.

use sdl2::event::Event;
use sdl2::gfx::primitives::DrawRenderer;
use sdl2::keyboard::Keycode;
use sdl2::pixels;
use sdl2::render::Canvas;
use sdl2::video::Window;
use sdl2::{EventPump, VideoSubsystem};

use crate::display::{Framebuffer, Renderer, HEIGHT, WIDTH};
use crate::error::{Error, Result};
use crate::keypad::{HostEvent, HostInput};

const BLACK: pixels::Color = pixels::Color {
    r: 0,
    g: 0,
    b: 0,
    a: 0xFF,
};
const WHITE: pixels::Color = pixels::Color {
    r: 0xFF,
    g: 0xFF,
    b: 0xFF,
    a: 0xFF,
};

/// Draws each CHIP-8 pixel as a scale x scale white square on black.
pub struct SdlRenderer {
    canvas: Canvas<Window>,
    scale: i16,
}

impl SdlRenderer {
    pub fn new(video: &VideoSubsystem, scale: u32) -> Result<Self> {
        let window = video
            .window("CHIP-8", WIDTH as u32 * scale, HEIGHT as u32 * scale)
            .position_centered()
            .build()
            .map_err(|e| Error::Render(e.to_string()))?;
        let mut canvas = window
            .into_canvas()
            .build()
            .map_err(|e| Error::Render(e.to_string()))?;

        canvas.set_draw_color(BLACK);
        canvas.clear();
        canvas.present();

        Ok(Self {
            canvas,
            scale: scale as i16,
        })
    }
}

impl Renderer for SdlRenderer {
    fn render(&mut self, frame: &Framebuffer) -> Result<()> {
        let gfx = frame.snapshot();
        self.canvas.set_draw_color(BLACK);
        self.canvas.clear();
        for (i, p) in gfx.iter().enumerate() {
            if *p == 0 {
                continue;
            }
            let x = (i % WIDTH) as i16 * self.scale;
            let y = (i / WIDTH) as i16 * self.scale;
            self.canvas
                .box_(x, y, x + self.scale - 1, y + self.scale - 1, WHITE)
                .map_err(Error::Render)?;
        }
        self.canvas.present();
        Ok(())
    }
}

/// Host input from the SDL event pump. Closing the window or pressing Escape
/// quits; other keys are reported by their lowercase character.
pub struct SdlInput {
    event_pump: EventPump,
}

impl SdlInput {
    pub fn new(event_pump: EventPump) -> Self {
        Self { event_pump }
    }

    fn translate(event: Event) -> Option<HostEvent> {
        match event {
            Event::Quit { .. }
            | Event::KeyDown {
                keycode: Some(Keycode::Escape),
                ..
            } => Some(HostEvent::Quit),
            Event::KeyDown {
                keycode: Some(key),
                repeat: false,
                ..
            } => key_char(key).map(HostEvent::KeyDown),
            Event::KeyUp {
                keycode: Some(key), ..
            } => key_char(key).map(HostEvent::KeyUp),
            _ => None,
        }
    }
}

fn key_char(key: Keycode) -> Option<char> {
    let name = key.name();
    let mut chars = name.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c.to_ascii_lowercase()),
        _ => None,
    }
}

impl HostInput for SdlInput {
    fn poll_event(&mut self) -> Option<HostEvent> {
        while let Some(event) = self.event_pump.poll_event() {
            if let Some(event) = Self::translate(event) {
                return Some(event);
            }
        }
        None
    }

    fn wait_event(&mut self) -> HostEvent {
        loop {
            if let Some(event) = Self::translate(self.event_pump.wait_event()) {
                return event;
            }
        }
    }
}
