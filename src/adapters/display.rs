//! Monochrome OLED adapter (128x64, SSD1306-class panel).
//!
//! Implements [`DisplayPort`] as an off-screen frame of text runs and
//! icon placements; `show()` pushes the frame out. Keeping the frame
//! target-independent means the runtime's whole render path is asserted
//! on the host.

use crate::app::ports::DisplayPort;
use crate::weather::classify::Icon;

pub struct Oled {
    texts: Vec<(String, i32, i32)>,
    icons: Vec<(Icon, i32, i32)>,
    frames_shown: u32,
}

impl Default for Oled {
    fn default() -> Self {
        Self::new()
    }
}

impl Oled {
    pub fn new() -> Self {
        Self {
            texts: Vec::new(),
            icons: Vec::new(),
            frames_shown: 0,
        }
    }

    /// Text runs in the current frame, in draw order.
    pub fn texts(&self) -> &[(String, i32, i32)] {
        &self.texts
    }

    pub fn icons(&self) -> &[(Icon, i32, i32)] {
        &self.icons
    }

    pub fn frames_shown(&self) -> u32 {
        self.frames_shown
    }

    #[cfg(target_os = "espidf")]
    fn flush_panel(&self) {
        // SSD1306 flush over I2C:
        // 1. I2cDriver init (esp_idf_hal::i2c) against the panel address
        // 2. page-addressed blit of the glyph and icon bitmaps
        // Threaded in from main.rs once the panel revision is final;
        // until then frames are mirrored to the console at debug level.
        for (s, x, y) in &self.texts {
            log::debug!("oled: '{s}' @ ({x},{y})");
        }
        for (icon, x, y) in &self.icons {
            log::debug!("oled: icon {icon:?} @ ({x},{y})");
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn flush_panel(&self) {}
}

impl DisplayPort for Oled {
    fn clear(&mut self) {
        self.texts.clear();
        self.icons.clear();
    }

    fn text(&mut self, s: &str, x: i32, y: i32) {
        self.texts.push((s.to_string(), x, y));
    }

    fn icon(&mut self, icon: Icon, x: i32, y: i32) {
        self.icons.push((icon, x, y));
    }

    fn show(&mut self) {
        self.flush_panel();
        self.frames_shown += 1;
    }
}
