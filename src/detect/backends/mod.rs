pub mod color;
pub mod stub;
pub mod synthetic;

pub use color::ColorMaskSource;
pub use stub::StubSource;
pub use synthetic::SyntheticSource;
