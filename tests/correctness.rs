//! Integration tests: encrypt → decrypt = identity across every parameter set,
//! key export/import, and rejection of malformed ciphertexts.

use ntru_encrypt::encrypt::encrypt_poly;
use ntru_encrypt::params::*;
use ntru_encrypt::sampling::{gen_private_poly, gen_tern, IndexGenerator};
use ntru_encrypt::stream::SeedStream;
use ntru_encrypt::{
    decrypt, decrypt_poly, encrypt, encrypt_det, generate_key_pair, generate_key_pair_det,
    generate_public_key, KeyPair, NtruError, PrivateKey, PublicKey,
};
use proptest::prelude::*;
use rand::rngs::{OsRng, StdRng};
use rand::{CryptoRng, RngCore, SeedableRng};

/// Entropy source stuck at zero.
struct ZeroRng;

impl RngCore for ZeroRng {
    fn next_u32(&mut self) -> u32 {
        0
    }

    fn next_u64(&mut self) -> u64 {
        0
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        dest.fill(0);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl CryptoRng for ZeroRng {}

fn setup(params: &EncParams) -> (KeyPair, StdRng) {
    let mut rng = StdRng::seed_from_u64(42);
    let kp = generate_key_pair(params, &mut rng).unwrap();
    (kp, rng)
}

#[test]
fn test_roundtrip_all_param_sets() {
    for params in ALL_PARAM_SETS.iter() {
        let (kp, mut rng) = setup(params);
        let msg: Vec<u8> = (0..params.max_msg_len()).map(|i| i as u8).collect();
        let ct = encrypt(&msg, kp.public(), &mut rng).unwrap();
        assert_eq!(ct.len(), params.enc_len(), "{}", params.name);
        assert_eq!(decrypt(&ct, &kp).unwrap(), msg, "{}", params.name);
    }
}

#[test]
fn test_roundtrip_os_rng() {
    for params in [DEFAULT_PARAMS_112_BITS, DEFAULT_PARAMS_128_BITS, EES401EP1] {
        let kp = generate_key_pair(&params, &mut OsRng).unwrap();
        let ct = encrypt(b"os entropy", kp.public(), &mut OsRng).unwrap();
        assert_eq!(decrypt(&ct, &kp).unwrap(), b"os entropy");
    }
}

#[test]
fn test_password_scenario() {
    let kp = generate_key_pair_det(&EES401EP1, b"my test password").unwrap();
    let ct = encrypt_det(b"test message 12345", kp.public(), b"seed value").unwrap();
    assert_eq!(ct.len(), 552);
    assert_eq!(decrypt(&ct, &kp).unwrap(), b"test message 12345");

    let other = generate_key_pair_det(&EES401EP1, b"another password").unwrap();
    assert_eq!(decrypt(&ct, &other), Err(NtruError::DecodeIntegrityFailure));
}

#[test]
fn test_deterministic_generation() {
    let a = generate_key_pair_det(&EES401EP2, b"my test password").unwrap();
    let b = generate_key_pair_det(&EES401EP2, b"my test password").unwrap();
    assert!(a == b);
    assert_eq!(a.private().to_bytes(), b.private().to_bytes());

    let ct_a = encrypt_det(b"same", a.public(), b"seed value").unwrap();
    let ct_b = encrypt_det(b"same", b.public(), b"seed value").unwrap();
    assert_eq!(ct_a, ct_b);
}

#[test]
fn test_exported_keys_still_work() {
    for params in [EES401EP1, EES401EP2, EES1087EP2] {
        let kp = generate_key_pair_det(&params, b"export").unwrap();
        let pk = PublicKey::from_bytes(&kp.public().to_bytes()).unwrap();
        let sk = PrivateKey::from_bytes(&kp.private().to_bytes()).unwrap();
        assert_eq!(&pk, kp.public());

        // Import does not change what encryption produces.
        let ct = encrypt_det(b"imported", &pk, b"seed").unwrap();
        assert_eq!(ct, encrypt_det(b"imported", kp.public(), b"seed").unwrap());

        let imported = KeyPair::new(pk, sk).unwrap();
        assert_eq!(decrypt(&ct, &imported).unwrap(), b"imported");
    }
}

#[test]
fn test_additional_public_key_decrypts() {
    let (kp, mut rng) = setup(&EES439EP1);
    let pk2 = generate_public_key(kp.private(), &mut rng).unwrap();
    assert_ne!(&pk2, kp.public());
    let kp2 = KeyPair::new(pk2, kp.private().clone()).unwrap();
    let ct = encrypt(b"second key", kp2.public(), &mut rng).unwrap();
    assert_eq!(decrypt(&ct, &kp2).unwrap(), b"second key");
}

#[test]
fn test_message_length_boundary() {
    let (kp, mut rng) = setup(&EES401EP1);
    let max = EES401EP1.max_msg_len();
    assert_eq!(max, 60);

    let msg = vec![0xFFu8; max];
    let ct = encrypt(&msg, kp.public(), &mut rng).unwrap();
    assert_eq!(decrypt(&ct, &kp).unwrap(), msg);

    assert!(matches!(
        encrypt(&vec![0u8; max + 1], kp.public(), &mut rng),
        Err(NtruError::InvalidParameter(_))
    ));
}

#[test]
fn test_ciphertext_length_independent_of_message() {
    let (kp, mut rng) = setup(&EES593EP1);
    for len in [0, 1, 32, EES593EP1.max_msg_len()] {
        let ct = encrypt(&vec![1u8; len], kp.public(), &mut rng).unwrap();
        assert_eq!(ct.len(), EES593EP1.enc_len());
    }
}

#[test]
fn test_tampered_ciphertexts_rejected() {
    let (kp, mut rng) = setup(&EES401EP1);
    let ct = encrypt(b"do not touch", kp.public(), &mut rng).unwrap();
    for pos in [0, 100, 200, 300] {
        let mut bad = ct.clone();
        bad[pos] ^= 0x01;
        assert_eq!(
            decrypt(&bad, &kp),
            Err(NtruError::DecodeIntegrityFailure),
            "byte {pos}"
        );
    }
}

#[test]
fn test_stuck_rng_fails_instead_of_hanging() {
    for params in [EES401EP1, EES401EP2, EES1499EP1] {
        assert!(matches!(
            generate_key_pair(&params, &mut ZeroRng),
            Err(NtruError::GenerationExhausted {
                what: "distinct ternary indices",
                ..
            })
        ));
    }
}

#[test]
fn test_raw_primitive_all_param_sets() {
    for params in ALL_PARAM_SETS.iter() {
        let kp = generate_key_pair_det(params, b"raw").unwrap();
        let mut stream = SeedStream::new(b"raw message");
        let mut igf = IndexGenerator::new(&mut stream, params);
        let m = gen_tern(&mut igf, params.n / 3, params.n / 3)
            .unwrap()
            .to_dense();
        let r = gen_private_poly(params, &mut igf).unwrap();
        let e = encrypt_poly(&m, &r, kp.public().h(), params.q);
        assert_eq!(decrypt_poly(&e, kp.private()), m, "{}", params.name);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prop_roundtrip(
        msg in proptest::collection::vec(any::<u8>(), 0..=60),
        seed in any::<[u8; 16]>(),
    ) {
        let kp = generate_key_pair_det(&EES401EP1, b"proptest key").unwrap();
        let ct = encrypt_det(&msg, kp.public(), &seed).unwrap();
        prop_assert_eq!(decrypt(&ct, &kp).unwrap(), msg);
    }
}
