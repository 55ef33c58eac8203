//! ecpack - LZ77 + Huffman file compressor with an XOR obfuscation layer
//!
//! Files are turned into one of three single-file containers and restored
//! exactly. The container kind is identified purely by its extension.
//!
//! ## Transform Pipeline
//!
//! ```text
//! Input → LZ77 → Token Codec → Huffman → [XOR Keystream] → Output
//! ```
//!
//! - **LZ77**: greedy longest match over a 4096-byte window, 32-byte lookahead
//! - **Token Codec**: fixed 5-byte tokens behind a 32-bit count, big-endian
//! - **Huffman**: frequency table header + MSB-first bit-packed payload
//! - **XOR Keystream**: SHA-256 password key with a position tweak.
//!   This is obfuscation, NOT encryption.
//!
//! | Operation | Chain                          | Extension |
//! |-----------|--------------------------------|-----------|
//! | compress  | LZ77 → tokens → Huffman        | `.cmp`    |
//! | encrypt   | XOR keystream                  | `.enc`    |
//! | both      | LZ77 → tokens → Huffman → XOR  | `.ec`     |
//!
//! Everything runs synchronously on the caller's thread with whole files in
//! memory. Progress and per-file results are delivered through callbacks.
//!
//! ## Example
//!
//! ```no_run
//! use ecpack::cli::{process_path, recover_path, ProcessOptions, RecoverOptions};
//! use ecpack::header::Operation;
//! use std::path::Path;
//!
//! let options = ProcessOptions {
//!     operation: Operation::Both,
//!     password: Some("my_secret".into()),
//!     ..Default::default()
//! };
//! process_path(
//!     Path::new("input.txt"),
//!     &options,
//!     &mut |pct, msg| println!("[{:>3}%] {}", pct, msg),
//!     &mut |entry| println!("{}", entry),
//! ).unwrap();
//!
//! let options = RecoverOptions {
//!     password: Some("my_secret".into()),
//! };
//! recover_path(
//!     Path::new("input.ec"),
//!     Path::new("restored"),
//!     &options,
//!     &mut |_, _| {},
//!     &mut |entry| println!("{}", entry),
//! ).unwrap();
//! ```

pub mod cli;
pub mod container;
pub mod error;
pub mod files;
pub mod header;
pub mod pipeline;
pub mod report;

pub use error::{EcpackError, Result};
pub use header::{ContainerKind, Operation};
pub use report::{LogEntry, LogTag};
