pub mod prefixed_hex_bitlist;
pub mod string_or_native;

mod shared;
