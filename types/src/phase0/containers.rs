use bitvec::{order::Lsb0, vec::BitVec};
use serde::Deserialize;

use crate::phase0::primitives::{CommitteeIndex, Epoch, Slot, H256};

// Signatures are not needed to count votes and are left out of deserialization.
#[derive(Clone, PartialEq, Eq, Debug, Deserialize)]
pub struct Attestation {
    #[serde(with = "serde_utils::prefixed_hex_bitlist")]
    pub aggregation_bits: BitVec<u8, Lsb0>,
    pub data: AttestationData,
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Debug, Deserialize)]
pub struct AttestationData {
    #[serde(with = "serde_utils::string_or_native")]
    pub slot: Slot,
    #[serde(with = "serde_utils::string_or_native")]
    pub index: CommitteeIndex,
    pub beacon_block_root: H256,
    pub source: Checkpoint,
    pub target: Checkpoint,
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Debug, Deserialize)]
pub struct BeaconBlockHeader {
    #[serde(with = "serde_utils::string_or_native")]
    pub slot: Slot,
    #[serde(with = "serde_utils::string_or_native")]
    pub proposer_index: u64,
    pub parent_root: H256,
    pub state_root: H256,
    pub body_root: H256,
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Debug, Deserialize)]
pub struct Checkpoint {
    #[serde(with = "serde_utils::string_or_native")]
    pub epoch: Epoch,
    pub root: H256,
}

#[cfg(test)]
mod tests {
    use bitvec::bitvec;
    use hex_literal::hex;
    use serde_json::json;

    use super::*;

    #[test]
    fn attestation_deserializes_from_beacon_api_json() -> Result<(), serde_json::Error> {
        let json = json!({
            "aggregation_bits": "0x15",
            "signature": "0x1b66ac1fb663c9bc59509846d6ec05345bd908eda73e670af888da41af171505cc411d61252fb6cb3fa0017b679f8bb2305b26a285fa2737f175668d0dff91cc1b66ac1fb663c9bc59509846d6ec05345bd908eda73e670af888da41af171505",
            "data": {
                "slot": "1",
                "index": "3",
                "beacon_block_root": "0xcf8e0d4e9587369b2301d0790347320302cc0943d5a1884560367e8208d920f2",
                "source": {
                    "epoch": "1",
                    "root": "0xcf8e0d4e9587369b2301d0790347320302cc0943d5a1884560367e8208d920f2",
                },
                "target": {
                    "epoch": 1,
                    "root": "0xcf8e0d4e9587369b2301d0790347320302cc0943d5a1884560367e8208d920f2",
                },
            },
        });

        let attestation = serde_json::from_value::<Attestation>(json)?;
        let root = H256(hex!(
            "cf8e0d4e9587369b2301d0790347320302cc0943d5a1884560367e8208d920f2"
        ));

        assert_eq!(attestation.aggregation_bits, bitvec![u8, Lsb0; 1, 0, 1, 0]);
        assert_eq!(attestation.data.slot, 1);
        assert_eq!(attestation.data.index, 3);
        assert_eq!(attestation.data.beacon_block_root, root);
        assert_eq!(attestation.data.target, Checkpoint { epoch: 1, root });

        Ok(())
    }
}
