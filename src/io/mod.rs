//! # Input and Output
//!
//! Decoders for still and animated inputs, the PNG and GIF encoders, and the
//! ports through which the clipboard, environment, fonts and notifications
//! are reached.

pub mod loader;
pub mod ports;
pub mod writer;

pub use loader::{decode_animation, is_animated_path, load_animation, load_bitmap};
pub use ports::{
    parse_file_list, BitmapSink, BitmapSource, EnvTextSource, FixedFontLoader, FontLoader, FsReferenceLoader,
    LogNotifier, MemoryClipboard, Notifier, OsascriptNotifier, RecordingNotifier, ReferenceLoader, StaticText,
    SystemClipboard, SystemFontLoader, TextSource,
};
pub use writer::{encode_gif, encode_png, write_gif, write_png};
