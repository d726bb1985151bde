//! Client-side session encoding for tunegate.
//!
//! All session state lives in the browser's cookies. This crate provides:
//! - The cookie codec (`encode_credential`, `decode_credential`, `escape`,
//!   `unescape`)
//! - Single-use anti-forgery state tokens (`StateToken`)
//!
//! # Example
//!
//! ```
//! use tunegate_core::Credential;
//! use tunegate_session::{decode_credential, encode_credential, escape, unescape};
//!
//! let credential = Credential::bearer("BQDa", None);
//! let cookie_value = encode_credential(&credential).expect("encode");
//! assert_eq!(decode_credential(&cookie_value).expect("decode"), credential);
//!
//! let goto = escape("/dashboard?tab=top tracks");
//! assert_eq!(unescape(&goto).expect("unescape"), "/dashboard?tab=top tracks");
//! ```

pub mod codec;
pub mod error;
pub mod state;

pub use codec::{decode_credential, encode_credential, escape, unescape};
pub use error::CodecError;
pub use state::StateToken;
