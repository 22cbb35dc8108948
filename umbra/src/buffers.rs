mod bind_group;
mod bindable;
mod storage_buffer;
mod texture;

pub use self::bind_group::*;
pub use self::bindable::*;
pub use self::storage_buffer::*;
pub use self::texture::*;
