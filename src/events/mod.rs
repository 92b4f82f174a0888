pub mod keyboard;
pub mod window;

pub use keyboard::{KeyEvent, KeyGrab, Keysym, Modifiers};
pub use window::{ClassHint, ScreenSize, WindowAttributes, WindowGeometry, WindowId, WindowType, WmEvent};
