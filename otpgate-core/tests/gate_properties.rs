//! Property-based tests for the validation pipeline.
//!
//! These verify the properties the service depends on:
//! - Modhex decoding inverts encoding
//! - Counters only ever move forward through the gate
//! - Any single-bit change to the ciphertext is rejected

use otpgate_core::{
    Counters, DecodedToken, DeviceRecord, SecretKey, ValidationOutcome, modhex, validate,
};
use proptest::prelude::*;

// =============================================================================
// HELPER STRATEGIES
// =============================================================================

const PUBLIC_ID: &str = "ccbbddeeffgg";

fn key_strategy() -> impl Strategy<Value = [u8; 16]> {
    prop::array::uniform16(any::<u8>())
}

fn internal_id_strategy() -> impl Strategy<Value = [u8; 6]> {
    prop::array::uniform6(any::<u8>())
}

fn counters_strategy() -> impl Strategy<Value = Counters> {
    (any::<u16>(), any::<u8>()).prop_map(|(s, u)| Counters::new(s, u))
}

/// Two distinct counters, smaller first.
fn ordered_pair_strategy() -> impl Strategy<Value = (Counters, Counters)> {
    (counters_strategy(), counters_strategy())
        .prop_filter("counters must differ", |(a, b)| a != b)
        .prop_map(|(a, b)| if a < b { (a, b) } else { (b, a) })
}

fn record_for(key: [u8; 16], internal_id: [u8; 6], counters: Counters) -> DeviceRecord {
    let mut record = DeviceRecord::new(PUBLIC_ID, SecretKey::from_bytes(key), internal_id);
    record.counters = counters;
    record
}

/// Validates and, on acceptance, applies the advance the way a registry would.
fn present(raw: &str, record: &mut DeviceRecord) -> ValidationOutcome {
    let outcome = validate(raw, record).unwrap();
    if let ValidationOutcome::Accepted(advance) = outcome {
        record.apply(&advance);
    }
    outcome
}

// =============================================================================
// CODEC PROPERTIES
// =============================================================================

mod codec_properties {
    use super::*;

    proptest! {
        #[test]
        fn block_roundtrip(block in prop::array::uniform16(any::<u8>())) {
            let encoded = modhex::encode(&block);
            prop_assert_eq!(encoded.len(), 32);
            prop_assert_eq!(modhex::decode_block(&encoded).unwrap(), block);
        }

        #[test]
        fn arbitrary_roundtrip(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
            prop_assert_eq!(modhex::decode(&modhex::encode(&bytes)).unwrap(), bytes);
        }

        #[test]
        fn encoding_is_always_modhex(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
            prop_assert!(modhex::is_modhex(&modhex::encode(&bytes)));
        }
    }
}

// =============================================================================
// ORDERING PROPERTIES
// =============================================================================

mod ordering_properties {
    use super::*;

    proptest! {
        /// Presenting c1 then c2 (c1 < c2) accepts c2; c1 is accepted only if
        /// it was above the stored counters.
        #[test]
        fn ascending_order(
            key in key_strategy(),
            iid in internal_id_strategy(),
            stored in counters_strategy(),
            (c1, c2) in ordered_pair_strategy(),
        ) {
            let stored = if stored < c2 { stored } else { Counters::default() };
            let mut record = record_for(key, iid, stored);

            let t1 = DecodedToken::new(iid, c1, 0, 0).seal(PUBLIC_ID, &key).unwrap();
            let t2 = DecodedToken::new(iid, c2, 0, 0).seal(PUBLIC_ID, &key).unwrap();

            let first = present(&t1, &mut record);
            prop_assert_eq!(first.is_accepted(), c1 > stored);
            prop_assert!(present(&t2, &mut record).is_accepted());
            prop_assert_eq!(record.counters, c2);
        }

        /// Presenting c2 then c1 (c1 < c2) never accepts c1.
        #[test]
        fn descending_order(
            key in key_strategy(),
            iid in internal_id_strategy(),
            (c1, c2) in ordered_pair_strategy(),
        ) {
            let mut record = record_for(key, iid, Counters::default());

            let t1 = DecodedToken::new(iid, c1, 0, 0).seal(PUBLIC_ID, &key).unwrap();
            let t2 = DecodedToken::new(iid, c2, 0, 0).seal(PUBLIC_ID, &key).unwrap();

            prop_assert!(present(&t2, &mut record).is_accepted());
            prop_assert_eq!(
                present(&t1, &mut record),
                ValidationOutcome::Rejected(otpgate_core::Rejection::ReplayedToken)
            );
            prop_assert_eq!(record.counters, c2);
        }

        /// The same token presented twice is accepted at most once.
        #[test]
        fn exact_replay_rejected(
            key in key_strategy(),
            iid in internal_id_strategy(),
            c in counters_strategy(),
        ) {
            prop_assume!(c > Counters::default());
            let mut record = record_for(key, iid, Counters::default());
            let raw = DecodedToken::new(iid, c, 7, 7).seal(PUBLIC_ID, &key).unwrap();

            prop_assert!(present(&raw, &mut record).is_accepted());
            prop_assert_eq!(
                present(&raw, &mut record),
                ValidationOutcome::Rejected(otpgate_core::Rejection::ReplayedToken)
            );
        }
    }
}

// =============================================================================
// TAMPER PROPERTIES
// =============================================================================

mod tamper_properties {
    use super::*;

    proptest! {
        #[test]
        fn single_bit_flip_is_rejected(
            key in key_strategy(),
            iid in internal_id_strategy(),
            bit in 0usize..128,
        ) {
            let record = record_for(key, iid, Counters::default());
            let raw = DecodedToken::new(iid, Counters::new(1, 0), 0, 0)
                .seal(PUBLIC_ID, &key)
                .unwrap();

            let (prefix, encoded) = raw.split_at(PUBLIC_ID.len());
            let mut block = modhex::decode_block(encoded).unwrap();
            block[bit / 8] ^= 1 << (bit % 8);
            let tampered = format!("{prefix}{}", modhex::encode(&block));

            let outcome = validate(&tampered, &record).unwrap();
            prop_assert!(!outcome.is_accepted());
        }
    }
}
