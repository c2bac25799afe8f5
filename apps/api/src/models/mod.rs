pub mod analysis;
pub mod editor;
pub mod resume;
pub mod session;
