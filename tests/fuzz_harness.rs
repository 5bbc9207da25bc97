//! Property-based harness over every message kind.
//!
//! Arbitrary payloads are prefixed with a kind's type code and pushed through
//! read -> write -> read. Decoding may fail, but must never panic, and any
//! message that decodes must survive a round trip unchanged. A stream read
//! stops at the end of the message, so trailing input is left unread.

use std::io::Cursor;

use proptest::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use wtwire::wire::{
    read_message, write_message, BlobType, BreachHint, ChainHash, CreateSession,
    CreateSessionReply, DeleteSession, DeleteSessionReply, ErrorCode, ErrorMsg, FeatureVector,
    Init, Message, MessageType, StateUpdate, StateUpdateReply,
};

const PVER: u32 = 0;

/// Prefix `data` with `kind`'s type code and check the round-trip property.
///
/// Returns whether the payload decoded.
fn harness(kind: MessageType, data: &[u8]) -> bool {
    if data.len() > kind.max_payload_length(PVER) as usize {
        return false;
    }

    let mut frame = kind.to_bytes().to_vec();
    frame.extend_from_slice(data);

    let mut stream = Cursor::new(&frame[..]);
    let Ok(msg) = read_message(&mut stream, PVER) else {
        return false;
    };
    assert_eq!(msg.msg_type(), kind);
    let consumed = &frame[..stream.position() as usize];

    let mut buf = Vec::new();
    let written = write_message(&mut buf, &msg, PVER).expect("decoded message must re-encode");
    assert_eq!(written, buf.len());

    let again = read_message(&mut buf.as_slice(), PVER).expect("re-encoded message must decode");
    assert_eq!(again, msg);

    // Feature vectors drop leading zero bytes; every other kind is canonical.
    if kind != MessageType::Init {
        assert_eq!(buf, consumed);
    }
    true
}

fn arb_code() -> impl Strategy<Value = ErrorCode> {
    prop_oneof![
        Just(ErrorCode::OK),
        Just(ErrorCode::TEMPORARY_FAILURE),
        Just(ErrorCode::STATE_UPDATE_CLIENT_BEHIND),
        any::<u16>().prop_map(ErrorCode),
    ]
}

fn arb_message() -> impl Strategy<Value = Message> {
    prop_oneof![
        (
            prop::collection::btree_set(0u16..1024, 0..8),
            prop::array::uniform32(any::<u8>()),
        )
            .prop_map(|(bits, hash)| Message::Init(Init::new(
                FeatureVector::from_bits(bits),
                ChainHash(hash)
            ))),
        (arb_code(), prop::collection::vec(any::<u8>(), 0..512))
            .prop_map(|(code, data)| Message::Error(ErrorMsg { code, data })),
        (any::<u16>(), any::<u16>(), any::<u32>(), any::<u32>(), any::<u64>()).prop_map(
            |(blob_type, max_updates, reward_base, reward_rate, sweep_fee_rate)| {
                Message::CreateSession(CreateSession {
                    blob_type: BlobType(blob_type),
                    max_updates,
                    reward_base,
                    reward_rate,
                    sweep_fee_rate,
                })
            }
        ),
        (arb_code(), any::<u16>(), prop::collection::vec(any::<u8>(), 0..64)).prop_map(
            |(code, last_applied, data)| Message::CreateSessionReply(CreateSessionReply {
                code,
                last_applied,
                data,
            })
        ),
        (
            any::<u16>(),
            any::<u16>(),
            any::<bool>(),
            prop::array::uniform16(any::<u8>()),
            prop::collection::vec(any::<u8>(), 0..1024),
        )
            .prop_map(|(seq_num, last_applied, is_complete, hint, encrypted_blob)| {
                Message::StateUpdate(StateUpdate {
                    seq_num,
                    last_applied,
                    is_complete,
                    hint: BreachHint(hint),
                    encrypted_blob,
                })
            }),
        (arb_code(), any::<u16>()).prop_map(|(code, last_applied)| {
            Message::StateUpdateReply(StateUpdateReply { code, last_applied })
        }),
        Just(Message::DeleteSession(DeleteSession {})),
        arb_code().prop_map(|code| Message::DeleteSessionReply(DeleteSessionReply { code })),
    ]
}

fn arb_kind() -> impl Strategy<Value = MessageType> {
    prop::sample::select(MessageType::ALL.to_vec())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    #[test]
    fn test_arbitrary_payload_never_panics(
        kind in arb_kind(),
        data in prop::collection::vec(any::<u8>(), 0..1200),
    ) {
        harness(kind, &data);
    }

    #[test]
    fn test_valid_message_roundtrip(msg in arb_message()) {
        let mut buf = Vec::new();
        write_message(&mut buf, &msg, PVER).unwrap();
        let decoded = read_message(&mut buf.as_slice(), PVER).unwrap();
        prop_assert_eq!(&decoded, &msg);

        let payload = &buf[2..];
        prop_assert!(harness(msg.msg_type(), payload));
    }

    #[test]
    fn test_concatenated_messages_read_in_order(first in arb_message(), second in arb_message()) {
        let mut stream = Vec::new();
        write_message(&mut stream, &first, PVER).unwrap();
        let boundary = stream.len();
        write_message(&mut stream, &second, PVER).unwrap();

        let mut cursor = Cursor::new(&stream[..]);
        prop_assert_eq!(read_message(&mut cursor, PVER).unwrap(), first);
        prop_assert_eq!(cursor.position() as usize, boundary);
        prop_assert_eq!(read_message(&mut cursor, PVER).unwrap(), second);
        prop_assert_eq!(cursor.position() as usize, stream.len());
    }

    #[test]
    fn test_truncated_valid_message_rejected(msg in arb_message(), cut in 1usize..64) {
        let mut buf = Vec::new();
        write_message(&mut buf, &msg, PVER).unwrap();
        prop_assume!(buf.len() > 2);

        let keep = buf.len().saturating_sub(cut).max(2);
        prop_assume!(keep < buf.len());
        prop_assert!(read_message(&mut &buf[..keep], PVER).is_err());
    }

    #[test]
    fn test_unknown_type_code_rejected(
        code in any::<u16>().prop_filter("registered", |c| MessageType::from_code(*c).is_err()),
        data in prop::collection::vec(any::<u8>(), 0..32),
    ) {
        let mut frame = code.to_be_bytes().to_vec();
        frame.extend_from_slice(&data);
        prop_assert!(read_message(&mut frame.as_slice(), PVER).is_err());
    }
}

fn seed_corpus() -> Vec<Message> {
    vec![
        Message::Init(Init::new(
            FeatureVector::from_bits([0, 3, 5]),
            ChainHash([0x6F; 32]),
        )),
        Message::Error(ErrorMsg::new(ErrorCode::PERMANENT_FAILURE, "session gone")),
        Message::CreateSession(CreateSession {
            blob_type: BlobType::ALTRUIST_ANCHOR_COMMIT,
            max_updates: 1024,
            reward_base: 0,
            reward_rate: 0,
            sweep_fee_rate: 12_500,
        }),
        Message::CreateSessionReply(CreateSessionReply {
            code: ErrorCode::OK,
            last_applied: 0,
            data: vec![0x00, 0x14, 0xAA, 0xBB],
        }),
        Message::StateUpdate(StateUpdate {
            seq_num: 7,
            last_applied: 6,
            is_complete: true,
            hint: BreachHint([0x42; 16]),
            encrypted_blob: vec![0x99; 300],
        }),
        Message::StateUpdateReply(StateUpdateReply {
            code: ErrorCode::STATE_UPDATE_MAX_UPDATES_EXCEEDED,
            last_applied: 6,
        }),
        Message::DeleteSession(DeleteSession {}),
        Message::DeleteSessionReply(DeleteSessionReply {
            code: ErrorCode::DELETE_SESSION_NOT_FOUND,
        }),
    ]
}

/// Mutate seed payloads with a fixed-seed RNG so failures reproduce.
#[test]
fn test_mutation_sweep() {
    let mut rng = ChaCha8Rng::seed_from_u64(0x7774_7769_7265);
    let seeds: Vec<(MessageType, Vec<u8>)> = seed_corpus()
        .iter()
        .map(|msg| {
            let mut buf = Vec::new();
            write_message(&mut buf, msg, PVER).unwrap();
            (msg.msg_type(), buf[2..].to_vec())
        })
        .collect();

    let mut decoded = 0usize;
    for _ in 0..20_000 {
        let (kind, seed) = &seeds[rng.gen_range(0..seeds.len())];
        let mut data = seed.clone();

        match rng.gen_range(0..4) {
            0 if !data.is_empty() => {
                let i = rng.gen_range(0..data.len());
                data[i] ^= 1 << rng.gen_range(0..8);
            },
            1 if !data.is_empty() => {
                let len = rng.gen_range(0..data.len());
                data.truncate(len);
            },
            2 => {
                let extra = rng.gen_range(1..8);
                data.extend((0..extra).map(|_| rng.gen::<u8>()));
            },
            _ => {
                if !data.is_empty() {
                    let i = rng.gen_range(0..data.len());
                    data[i] = rng.gen();
                }
            },
        }

        if harness(*kind, &data) {
            decoded += 1;
        }
    }

    // Bit flips in fixed-width fields keep most mutants decodable.
    assert!(decoded > 0);
}

#[test]
fn test_seed_corpus_decodes() {
    for msg in seed_corpus() {
        let mut buf = Vec::new();
        write_message(&mut buf, &msg, PVER).unwrap();
        assert!(harness(msg.msg_type(), &buf[2..]), "{}", msg.msg_type());
    }
}

#[test]
fn test_oversized_payload_skipped_by_harness() {
    let data = vec![0u8; MessageType::StateUpdateReply.max_payload_length(PVER) as usize + 1];
    assert!(!harness(MessageType::StateUpdateReply, &data));
}
