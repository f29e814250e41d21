//! Reader and writer for the binary `{owner}.sprite.{ident}.skel` skeleton
//! format.
//!
//! The codec is a faithful round trip: decoding a file and encoding the
//! resulting [`Skeleton`] reproduces the original bytes. Format quirks (half
//! hull lengths, bone counts stored as floats, zig-zag event ints kept raw)
//! are carried through the model unchanged.
//!
//! ```no_run
//! let mut skeleton = skel_tools::read("crusader.sprite.combat.skel")?;
//! skeleton.rename_animation("attack_sword", "attack_blade");
//! skel_tools::write("crusader.sprite.combat.skel", &skeleton)?;
//! # Ok::<(), skel_tools::SkelError>(())
//! ```

pub mod error;
pub mod model;
pub mod parser;
pub mod writer;

pub use error::{Result, SkelError, SkelErrorKind};
pub use model::Skeleton;
pub use parser::{SkelReader, decode, from_bytes, parse_file_name, read};
pub use writer::{SkelWriter, encode, to_bytes, write};
