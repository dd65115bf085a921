pub mod scene;

pub use scene::setup;
