/// The two actions the select button can trigger.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ButtonEvent {
    Toggle,
    Reset,
}

/// Classifies a press/release pair as a short or long click.
pub struct ClickRecognizer {
    long_press_ms: u64,
    pressed_at: Option<u64>,
}

impl ClickRecognizer {
    pub fn new(long_press_ms: u64) -> Self {
        Self {
            long_press_ms,
            pressed_at: None,
        }
    }

    pub fn press(&mut self, now_ms: u64) {
        // Key repeat while held must not move the press time
        if self.pressed_at.is_none() {
            self.pressed_at = Some(now_ms);
        }
    }

    pub fn release(&mut self, now_ms: u64) -> Option<ButtonEvent> {
        let pressed_at = self.pressed_at.take()?;
        if now_ms.saturating_sub(pressed_at) >= self.long_press_ms {
            Some(ButtonEvent::Reset)
        } else {
            Some(ButtonEvent::Toggle)
        }
    }
}
