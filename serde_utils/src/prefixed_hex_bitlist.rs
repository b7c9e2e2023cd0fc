//! SSZ `Bitlist`s encoded as `0x`-prefixed hexadecimal strings.
//!
//! The encoding is little-endian at the bit level and carries its own length:
//! the highest set bit of the last byte is a delimiter and is not part of the list.
//! An empty list is encoded as `0x01`.

use bitvec::{order::Lsb0, vec::BitVec};
use serde::{de::Error, Deserialize, Deserializer};

use crate::shared;

pub fn deserialize<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<BitVec<u8, Lsb0>, D::Error> {
    let string = String::deserialize(deserializer)?;
    let digits = shared::strip_hex_prefix(&string)?;
    let bytes = const_hex::decode(digits).map_err(D::Error::custom)?;

    from_ssz_bytes(bytes).map_err(D::Error::custom)
}

fn from_ssz_bytes(bytes: Vec<u8>) -> Result<BitVec<u8, Lsb0>, &'static str> {
    let Some(last_byte) = bytes.last().copied() else {
        return Err("bitlist is empty and has no delimiter bit");
    };

    if last_byte == 0 {
        return Err("last byte of bitlist does not contain a delimiter bit");
    }

    let delimiter_position = last_byte.ilog2() as usize;
    let length = (bytes.len() - 1) * 8 + delimiter_position;

    let mut bits = BitVec::from_vec(bytes);
    bits.truncate(length);

    Ok(bits)
}
