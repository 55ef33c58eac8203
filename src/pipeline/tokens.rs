use crate::error::{EcpackError, Result};
use crate::header::read_u32_be;
use crate::pipeline::lz77::Token;

/// Serialized size of the token count prefix
pub const COUNT_SIZE: usize = 4;

/// Serialized size of one token: offset (2) + length (2) + next (1)
pub const TOKEN_SIZE: usize = 5;

/// Serialize tokens
/// Layout (big-endian): [count: 4]([offset: 2][length: 2][next: 1] * count)
pub fn serialize(tokens: &[Token]) -> Result<Vec<u8>> {
    let count = u32::try_from(tokens.len()).map_err(|_| {
        EcpackError::InvalidFormat(format!("{} tokens exceed the u32 count field", tokens.len()))
    })?;

    let mut buf = Vec::with_capacity(COUNT_SIZE + tokens.len() * TOKEN_SIZE);
    buf.extend_from_slice(&count.to_be_bytes());
    for token in tokens {
        buf.extend_from_slice(&token.offset.to_be_bytes());
        buf.extend_from_slice(&token.length.to_be_bytes());
        buf.push(token.next);
    }
    Ok(buf)
}

/// Deserialize tokens written by [`serialize`]
pub fn deserialize(data: &[u8]) -> Result<Vec<Token>> {
    if data.len() < COUNT_SIZE {
        return Err(EcpackError::Truncated("token count missing".into()));
    }
    let count = read_u32_be(&data[0..COUNT_SIZE]) as usize;

    let body = &data[COUNT_SIZE..];
    let expected = count
        .checked_mul(TOKEN_SIZE)
        .ok_or_else(|| EcpackError::InvalidFormat(format!("token count {} overflows", count)))?;
    if body.len() < expected {
        return Err(EcpackError::Truncated(format!(
            "{} tokens need {} bytes, have {}",
            count,
            expected,
            body.len()
        )));
    }
    if body.len() > expected {
        return Err(EcpackError::InvalidFormat(format!(
            "{} trailing bytes after {} tokens",
            body.len() - expected,
            count
        )));
    }

    Ok(body
        .chunks_exact(TOKEN_SIZE)
        .map(|chunk| Token {
            offset: u16::from_be_bytes([chunk[0], chunk[1]]),
            length: u16::from_be_bytes([chunk[2], chunk[3]]),
            next: chunk[4],
        })
        .collect())
}
