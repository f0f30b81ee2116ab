//! Plaintext token layout.
//!
//! A decrypted token block is laid out as:
//!
//! | offset | size | field            | encoding       |
//! |--------|------|------------------|----------------|
//! | 0      | 6    | internal id      | raw            |
//! | 6      | 2    | session counter  | little-endian  |
//! | 8      | 3    | timestamp        | little-endian  |
//! | 11     | 1    | usage counter    |                |
//! | 12     | 2    | random           | little-endian  |
//! | 14     | 2    | checksum         | little-endian  |
//!
//! The checksum is CRC-16/ISO-13239 over bytes `0..14`, final xor
//! included, which is what hardware tokens emit.

use crate::cipher;
use crate::device::Counters;
use crate::error::CipherError;
use crate::modhex;
use crc::{CRC_16_IBM_SDLC, Crc};

/// Size of the encrypted payload in bytes.
pub const BLOCK_SIZE: usize = 16;

/// Size of the private identifier inside the payload.
pub const INTERNAL_ID_SIZE: usize = 6;

/// Length of the public id prefix in modhex characters.
pub const PUBLIC_ID_LEN: usize = 12;

/// Length of a complete token in characters.
pub const TOKEN_LEN: usize = PUBLIC_ID_LEN + modhex::ENCODED_BLOCK_LEN;

const CHECKSUM_OFFSET: usize = 14;

/// Largest value the 24-bit timestamp field can hold.
pub const TIMESTAMP_MAX: u32 = 0x00ff_ffff;

/// Fields of one decrypted token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedToken {
    pub internal_id: [u8; INTERNAL_ID_SIZE],
    pub session_counter: u16,
    pub timestamp: u32,
    pub usage_counter: u8,
    pub random: u16,
    pub checksum: u16,
}

impl DecodedToken {
    /// Builds a token and fills in its checksum.
    pub fn new(
        internal_id: [u8; INTERNAL_ID_SIZE],
        counters: Counters,
        timestamp: u32,
        random: u16,
    ) -> Self {
        let mut token = Self {
            internal_id,
            session_counter: counters.session,
            timestamp: timestamp & TIMESTAMP_MAX,
            usage_counter: counters.usage,
            random,
            checksum: 0,
        };
        token.checksum = token.computed_checksum();
        token
    }

    /// Splits a plaintext block into its fields.
    pub fn parse(block: &[u8; BLOCK_SIZE]) -> Self {
        let mut internal_id = [0u8; INTERNAL_ID_SIZE];
        internal_id.copy_from_slice(&block[..INTERNAL_ID_SIZE]);
        Self {
            internal_id,
            session_counter: u16::from_le_bytes([block[6], block[7]]),
            timestamp: u32::from_le_bytes([block[8], block[9], block[10], 0]),
            usage_counter: block[11],
            random: u16::from_le_bytes([block[12], block[13]]),
            checksum: u16::from_le_bytes([block[14], block[15]]),
        }
    }

    /// Serializes the fields back into a plaintext block.
    pub fn to_bytes(&self) -> [u8; BLOCK_SIZE] {
        let mut block = [0u8; BLOCK_SIZE];
        block[..INTERNAL_ID_SIZE].copy_from_slice(&self.internal_id);
        block[6..8].copy_from_slice(&self.session_counter.to_le_bytes());
        block[8..11].copy_from_slice(&self.timestamp.to_le_bytes()[..3]);
        block[11] = self.usage_counter;
        block[12..14].copy_from_slice(&self.random.to_le_bytes());
        block[14..16].copy_from_slice(&self.checksum.to_le_bytes());
        block
    }

    /// The checksum the payload fields call for.
    pub fn computed_checksum(&self) -> u16 {
        crc16(&self.to_bytes()[..CHECKSUM_OFFSET])
    }

    /// Returns true if the embedded checksum matches the payload.
    pub fn has_valid_checksum(&self) -> bool {
        self.checksum == self.computed_checksum()
    }

    /// The composite replay counter carried by this token.
    pub fn counters(&self) -> Counters {
        Counters::new(self.session_counter, self.usage_counter)
    }

    /// Encrypts this token under `key` and renders it behind `public_id`.
    ///
    /// This is what a hardware token does on every button press.
    pub fn seal(&self, public_id: &str, key: &[u8]) -> Result<String, CipherError> {
        let block = cipher::encrypt_block(key, &self.to_bytes())?;
        Ok(format!("{public_id}{}", modhex::encode(&block)))
    }
}

/// CRC-16/ISO-13239, also catalogued as CRC-16/IBM-SDLC (reflected
/// polynomial `0x1021`, initial value `0xffff`, final xor `0xffff`).
pub const CRC16: Crc<u16> = Crc::<u16>::new(&CRC_16_IBM_SDLC);

/// Checksum of `data` as a hardware token computes it.
pub fn crc16(data: &[u8]) -> u16 {
    CRC16.checksum(data)
}
