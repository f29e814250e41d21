mod animation;
mod skeleton;
mod skin;

pub use animation::*;
pub use skeleton::*;
pub use skin::*;
