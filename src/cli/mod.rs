pub mod cipher;
pub mod info;
pub mod keygen;
pub mod verify;

pub use cipher::*;
pub use info::*;
pub use keygen::*;
pub use verify::*;
