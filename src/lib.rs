//! NTRUEncrypt over Z[x]/(x^N - 1) with q = 2048 and p = 3.
//!
//! Key generation, padded public-key encryption and decryption for the
//! EES parameter sets, with ternary or product-form private keys.
//!
//! ```no_run
//! use ntru_encrypt::{decrypt, encrypt, generate_key_pair, params::EES401EP1};
//! use rand::rngs::OsRng;
//!
//! let kp = generate_key_pair(&EES401EP1, &mut OsRng)?;
//! let ct = encrypt(b"hello", kp.public(), &mut OsRng)?;
//! assert_eq!(decrypt(&ct, &kp)?, b"hello");
//! # Ok::<(), ntru_encrypt::NtruError>(())
//! ```
//!
//! # ⚠️ WARNING ⚠️
//!
//! NOT audited and NOT constant-time. Convolutions and rejection sampling
//! branch on secret data.

pub mod convolution;
pub mod decrypt;
pub mod encoding;
pub mod encrypt;
pub mod error;
pub mod inverse;
pub mod keygen;
pub mod params;
pub mod poly;
pub mod sampling;
pub mod serialize;
pub mod stream;

pub use decrypt::{decrypt, decrypt_poly};
pub use encrypt::{encrypt, encrypt_det, encrypt_poly};
pub use error::{NtruError, Result};
pub use keygen::{
    generate_key_pair, generate_key_pair_det, generate_public_key, KeyPair, PrivateKey, PublicKey,
};
pub use params::EncParams;
