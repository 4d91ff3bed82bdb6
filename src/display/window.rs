//! sdl2 preview window for generated canvases
//!
//! Shows what the boot console background would look like on a real
//! framebuffer. Only built with the `window` feature.

use crate::canvas::Canvas;
use crate::error::{Error, Result};
use sdl2::event::Event;
use sdl2::keyboard::Keycode;
use sdl2::pixels::PixelFormatEnum;
use sdl2::render::Canvas as SdlCanvas;
use sdl2::video::Window;
use sdl2::EventPump;

pub struct PreviewWindow {
    canvas: SdlCanvas<Window>,
    event_pump: EventPump,
    width: u32,
    height: u32,
}

impl PreviewWindow {
    /// Open a window matching the canvas size
    pub fn new(title: &str, width: u32, height: u32) -> Result<Self> {
        let sdl_context = sdl2::init().map_err(Error::Window)?;
        let video_subsystem = sdl_context.video().map_err(Error::Window)?;

        let window = video_subsystem
            .window(title, width, height)
            .position_centered()
            .build()
            .map_err(|e| Error::Window(e.to_string()))?;

        let canvas = window
            .into_canvas()
            .accelerated()
            .present_vsync()
            .build()
            .map_err(|e| Error::Window(e.to_string()))?;
        let event_pump = sdl_context.event_pump().map_err(Error::Window)?;

        Ok(Self {
            canvas,
            event_pump,
            width,
            height,
        })
    }

    /// Present `background` until the window is closed or Escape is pressed
    pub fn show(&mut self, background: &Canvas) -> Result<()> {
        let texture_creator = self.canvas.texture_creator();
        // xRGB8888 little-endian is ARGB8888 with the alpha byte ignored
        let mut texture = texture_creator
            .create_texture_streaming(PixelFormatEnum::ARGB8888, self.width, self.height)
            .map_err(|e| Error::Window(e.to_string()))?;
        let bytes = background.to_xrgb_bytes();
        texture
            .update(None, &bytes, background.width() * 4)
            .map_err(|e| Error::Window(e.to_string()))?;

        'main: loop {
            for event in self.event_pump.poll_iter() {
                match event {
                    Event::Quit { .. }
                    | Event::KeyDown {
                        keycode: Some(Keycode::Escape),
                        ..
                    } => break 'main,
                    _ => {},
                }
            }

            self.canvas.clear();
            self.canvas
                .copy(&texture, None, None)
                .map_err(Error::Window)?;
            self.canvas.present();
        }

        Ok(())
    }
}
