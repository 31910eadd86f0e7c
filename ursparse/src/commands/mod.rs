pub mod decode;
pub mod encode;
pub mod map;

pub use decode::run as decode;
pub use encode::run as encode;
pub use map::run as map;
