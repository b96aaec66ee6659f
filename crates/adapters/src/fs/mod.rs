mod clock;
mod images;
mod settings;

pub use clock::SystemClock;
pub use images::FsImageSource;
pub use settings::JsonSettingsStore;
