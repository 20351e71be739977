pub use self::ecdsa_signature::{K256PrivateKey, SignatureError};

mod ecdsa_signature;
