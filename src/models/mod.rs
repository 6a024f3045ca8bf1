pub mod media;

pub use media::MediaRef;
