pub mod date_window;
pub mod decode;
pub mod display;
pub mod duration;
pub mod error;
pub mod image_discovery;
pub mod input;
pub mod label;
pub mod launch;
pub mod layout;
pub mod scanner;
pub mod session;
pub mod settings;

pub use decode::{DecodedImage, FileDecoder, ImageDecoder, Rotation};
pub use display::{Display, DisplaySource, Rect, StaticDisplays, SwwwDisplays};
pub use duration::{parse_delay, DEFAULT_DELAY};
pub use error::{ErrorReporting, PhotossError, Result};
pub use image_discovery::{DiscoveryMode, DiscoveryOptions, ImageDiscovery};
pub use input::{InputEvent, InputMonitor};
pub use label::{label_for_path, label_from_path};
pub use launch::{parse_launch, LaunchAction};
pub use layout::{Placement, Viewport};
pub use scanner::{DirectoryScanner, FileFilter};
pub use session::{Frame, SessionOptions, SessionState, SlideshowSession, TickOutcome};
pub use settings::{MemoryStore, Settings, SettingsStore};
