use bitvec::{order::Lsb0, vec::BitVec};
use types::{
    nonstandard::BlockWithRoot,
    phase0::{
        containers::{Attestation, AttestationData},
        primitives::{CommitteeIndex, Slot, H256},
    },
};

pub fn root(byte: u8) -> H256 {
    H256::repeat_byte(byte)
}

pub fn block(
    slot: Slot,
    root_byte: u8,
    parent_byte: u8,
    attestations: Vec<Attestation>,
) -> BlockWithRoot {
    BlockWithRoot {
        root: root(root_byte),
        slot,
        parent_root: root(parent_byte),
        attestations,
    }
}

pub fn attestation(slot: Slot, index: CommitteeIndex, bits: &[bool]) -> Attestation {
    Attestation {
        aggregation_bits: bits.iter().copied().collect::<BitVec<u8, Lsb0>>(),
        data: AttestationData {
            slot,
            index,
            ..AttestationData::default()
        },
    }
}
