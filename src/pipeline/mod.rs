pub mod cipher;
pub mod huffman;
pub mod lz77;
pub mod tokens;

pub use cipher::CipherKey;
pub use huffman::HuffmanTree;
pub use lz77::{Lz77, Token, LOOKAHEAD_SIZE, MIN_MATCH, WINDOW_SIZE};
