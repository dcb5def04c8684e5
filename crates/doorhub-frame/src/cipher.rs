//! Stateless keystream transform.
//!
//! Every call derives a fresh ChaCha20 state from the key, so there is no
//! keystream continuation between frames and the transform is its own
//! inverse. There is no authentication tag: a wrong key or a corrupted frame
//! decrypts to garbage without any error.

use chacha20::cipher::{KeyIvInit, StreamCipher};
use chacha20::{ChaCha20, Key, Nonce};
use doorhub_radio::RawFrame;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::error::{FrameError, Result};

/// Nonce shared by every frame. Each call restarts the keystream from here.
const FRAME_NONCE: [u8; 12] = [0u8; 12];

/// Pre-shared key known to the sensors and the hub.
///
/// Any non-empty byte string is accepted; the cipher key is its SHA-256
/// digest. Derived material is wiped on drop.
#[derive(Clone)]
pub struct PresharedKey {
    derived: Zeroizing<[u8; 32]>,
}

impl PresharedKey {
    /// Derive a cipher key from a shared secret.
    pub fn new(secret: impl AsRef<[u8]>) -> Result<Self> {
        let secret = secret.as_ref();
        if secret.is_empty() {
            return Err(FrameError::EmptyKey);
        }

        let mut derived = Zeroizing::new([0u8; 32]);
        derived.copy_from_slice(&Sha256::digest(secret));
        Ok(Self { derived })
    }

    fn keystream(&self) -> ChaCha20 {
        ChaCha20::new(
            Key::from_slice(&self.derived[..]),
            Nonce::from_slice(&FRAME_NONCE),
        )
    }
}

impl std::fmt::Debug for PresharedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PresharedKey")
            .field("derived", &"<redacted>")
            .finish()
    }
}

/// XOR the keystream for `key` over `buf` in place.
///
/// Length-preserving for any buffer size.
pub fn transform_in_place(buf: &mut [u8], key: &PresharedKey) {
    key.keystream().apply_keystream(buf);
}

/// Apply the keystream to a frame, returning a new frame.
pub fn transform(input: &RawFrame, key: &PresharedKey) -> RawFrame {
    let mut output = *input;
    transform_in_place(output.as_mut_bytes(), key);
    output
}

/// Recover plaintext from a received frame.
pub fn open(frame: &RawFrame, key: &PresharedKey) -> RawFrame {
    transform(frame, key)
}

/// Encrypt a plaintext frame for transmission.
pub fn seal(plaintext: &RawFrame, key: &PresharedKey) -> RawFrame {
    transform(plaintext, key)
}
