use crate::error::{EcpackError, Result};
use crate::header::{ContainerKind, Operation};
use crate::pipeline::{cipher, huffman, tokens, Lz77};

/// Wrap a progress callback so a codec's 0..=100 lands in `base..=base+span`
fn scaled<'a>(
    progress: &'a mut dyn FnMut(u8, &str),
    base: u8,
    span: u8,
) -> impl FnMut(u8, &str) + 'a {
    move |pct, message| {
        let mapped = base as u16 + pct.min(100) as u16 * span as u16 / 100;
        progress(mapped as u8, message)
    }
}

/// Password as a non-empty string, or an input validation error
pub fn require_password(password: Option<&str>) -> Result<&str> {
    match password {
        Some(password) if !password.is_empty() => Ok(password),
        _ => Err(EcpackError::PasswordRequired),
    }
}

/// LZ77 -> token codec -> Huffman, reporting 10/40/60
fn compress_chain(
    data: &[u8],
    lz77: &Lz77,
    progress: &mut dyn FnMut(u8, &str),
) -> Result<Vec<u8>> {
    progress(10, "Applying LZ77...");
    let token_list = lz77.compress_with_progress(data, &mut scaled(progress, 10, 30));
    log::debug!("lz77: {} bytes -> {} tokens", data.len(), token_list.len());

    progress(40, "Encoding tokens...");
    let token_bytes = tokens::serialize(&token_list)?;

    progress(60, "Applying Huffman...");
    huffman::compress(&token_bytes)
}

/// Huffman -> token codec -> LZ77
fn decompress_chain(
    data: &[u8],
    lz77: &Lz77,
    progress: &mut dyn FnMut(u8, &str),
    decode_pct: u8,
    replay_pct: u8,
) -> Result<Vec<u8>> {
    progress(decode_pct, "Decoding Huffman...");
    let token_bytes = huffman::decompress(data)?;

    progress(replay_pct, "Applying LZ77 (decompression)...");
    let token_list = tokens::deserialize(&token_bytes)?;
    lz77.decompress(&token_list)
}

/// Run the codec chain for `operation` over `data`
pub fn pack(
    data: &[u8],
    operation: Operation,
    password: Option<&str>,
    lz77: &Lz77,
    progress: &mut dyn FnMut(u8, &str),
) -> Result<Vec<u8>> {
    match operation {
        Operation::Compress => compress_chain(data, lz77, progress),
        Operation::Encrypt => {
            let password = require_password(password)?;
            progress(20, "Encrypting file...");
            Ok(cipher::encrypt_with_progress(
                data,
                Some(password),
                &mut scaled(progress, 20, 50),
            ))
        }
        Operation::Both => {
            let password = require_password(password)?;
            let compressed = compress_chain(data, lz77, progress)?;
            progress(80, "Encrypting result...");
            Ok(cipher::encrypt_with_progress(
                &compressed,
                Some(password),
                &mut scaled(progress, 80, 20),
            ))
        }
    }
}

/// Reverse the codec chain that produced a container of `kind`
pub fn unpack(
    data: &[u8],
    kind: ContainerKind,
    password: Option<&str>,
    progress: &mut dyn FnMut(u8, &str),
) -> Result<Vec<u8>> {
    // Decoding is independent of the window the container was written with
    let lz77 = Lz77::default();

    match kind {
        ContainerKind::Compressed => decompress_chain(data, &lz77, progress, 20, 60),
        ContainerKind::Encrypted => {
            let password = require_password(password)?;
            progress(20, "Decrypting file...");
            Ok(cipher::decrypt_with_progress(
                data,
                Some(password),
                &mut scaled(progress, 20, 50),
            ))
        }
        ContainerKind::CompressedEncrypted => {
            let password = require_password(password)?;
            progress(20, "Decrypting...");
            let compressed = cipher::decrypt_with_progress(
                data,
                Some(password),
                &mut scaled(progress, 20, 33),
            );
            decompress_chain(&compressed, &lz77, progress, 50, 80)
        }
    }
}
