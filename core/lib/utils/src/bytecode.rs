use sha2::{Digest, Sha256};
use zksync_basic_types::H256;

const MAX_BYTECODE_LENGTH_IN_WORDS: usize = (1 << 16) - 1;
const MAX_BYTECODE_LENGTH_BYTES: usize = MAX_BYTECODE_LENGTH_IN_WORDS * 32;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum InvalidBytecodeError {
    #[error("Bytecode is empty")]
    BytecodeIsEmpty,
    #[error("Bytecode too long: {0} bytes, while max {1} allowed")]
    BytecodeTooLong(usize, usize),
    #[error("Bytecode has even number of 32-byte words")]
    BytecodeLengthInWordsIsEven,
    #[error("Bytecode length is not divisible by 32")]
    BytecodeLengthIsNotDivisibleBy32,
}

pub fn validate_bytecode(code: &[u8]) -> Result<(), InvalidBytecodeError> {
    let bytecode_len = code.len();

    if bytecode_len == 0 {
        return Err(InvalidBytecodeError::BytecodeIsEmpty);
    }

    if bytecode_len > MAX_BYTECODE_LENGTH_BYTES {
        return Err(InvalidBytecodeError::BytecodeTooLong(
            bytecode_len,
            MAX_BYTECODE_LENGTH_BYTES,
        ));
    }

    if bytecode_len % 32 != 0 {
        return Err(InvalidBytecodeError::BytecodeLengthIsNotDivisibleBy32);
    }

    let bytecode_len_words = bytecode_len / 32;

    if bytecode_len_words % 2 == 0 {
        return Err(InvalidBytecodeError::BytecodeLengthInWordsIsEven);
    }

    Ok(())
}

/// Bytecode marker encoded in the first byte of the bytecode hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BytecodeMarker {
    /// EraVM bytecode marker (1).
    EraVm = 1,
    /// EVM bytecode marker (2).
    Evm = 2,
}

impl BytecodeMarker {
    /// Parses a marker from the bytecode hash.
    pub fn new(bytecode_hash: H256) -> Option<Self> {
        Some(match bytecode_hash.as_bytes()[0] {
            val if val == Self::EraVm as u8 => Self::EraVm,
            val if val == Self::Evm as u8 => Self::Evm,
            _ => return None,
        })
    }
}

/// Hashes the provided EraVM bytecode.
///
/// The hash is `sha256(code)` with the first 4 bytes replaced by the version marker,
/// a zero byte and the big-endian length of the bytecode in 32-byte words.
pub fn hash_bytecode(code: &[u8]) -> Result<H256, InvalidBytecodeError> {
    validate_bytecode(code)?;

    let digest = Sha256::digest(code);
    let len_in_words = (code.len() / 32) as u16;

    let mut output = [0u8; 32];
    output.copy_from_slice(&digest);
    output[0] = BytecodeMarker::EraVm as u8;
    output[1] = 0;
    output[2..4].copy_from_slice(&len_in_words.to_be_bytes());
    Ok(H256(output))
}

pub fn bytecode_len_in_words(bytecode_hash: &H256) -> u16 {
    u16::from_be_bytes([bytecode_hash[2], bytecode_hash[3]])
}

pub fn bytecode_len_in_bytes(bytecode_hash: H256) -> usize {
    bytecode_len_in_words(&bytecode_hash) as usize * 32
}

#[cfg(test)]
mod tests {
    use test_casing::test_casing;

    use super::*;

    #[test]
    fn hashing_single_word_bytecode() {
        let mut code = vec![0x60, 0x01, 0x60, 0x01, 0x55];
        code.resize(32, 0);
        let hash = hash_bytecode(&code).unwrap();
        let expected: H256 = "0x01000001e25da0a691a014cf019f594528058021098f689426170ad929d2fa4e"
            .parse()
            .unwrap();
        assert_eq!(hash, expected);
        assert_eq!(BytecodeMarker::new(hash), Some(BytecodeMarker::EraVm));
        assert_eq!(bytecode_len_in_words(&hash), 1);
        assert_eq!(bytecode_len_in_bytes(hash), 32);
    }

    #[test]
    fn length_is_encoded_in_hash() {
        let hash = hash_bytecode(&[0xfe; 32 * 301]).unwrap();
        assert_eq!(bytecode_len_in_words(&hash), 301);
    }

    #[test_casing(4, [0, 31, 64, 33])]
    #[test]
    fn malformed_bytecode_is_rejected(len: usize) {
        let code = vec![1; len];
        let err = hash_bytecode(&code).unwrap_err();
        let expected = match len {
            0 => InvalidBytecodeError::BytecodeIsEmpty,
            64 => InvalidBytecodeError::BytecodeLengthInWordsIsEven,
            _ => InvalidBytecodeError::BytecodeLengthIsNotDivisibleBy32,
        };
        assert_eq!(err, expected);
    }

    #[test]
    fn too_long_bytecode_is_rejected() {
        let code = vec![0; MAX_BYTECODE_LENGTH_BYTES + 64];
        assert_matches_too_long(validate_bytecode(&code));
    }

    fn assert_matches_too_long(result: Result<(), InvalidBytecodeError>) {
        match result {
            Err(InvalidBytecodeError::BytecodeTooLong(len, max)) => {
                assert!(len > max);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
