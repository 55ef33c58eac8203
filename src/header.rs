use crate::error::{EcpackError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Pipeline operation requested by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    #[default]
    Compress,
    Encrypt,
    Both,
}

impl Operation {
    /// Container kind written by this operation
    pub fn container(self) -> ContainerKind {
        match self {
            Self::Compress => ContainerKind::Compressed,
            Self::Encrypt => ContainerKind::Encrypted,
            Self::Both => ContainerKind::CompressedEncrypted,
        }
    }

    pub fn requires_password(self) -> bool {
        self.container().requires_password()
    }
}

impl std::str::FromStr for Operation {
    type Err = EcpackError;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "compress" => Ok(Self::Compress),
            "encrypt" => Ok(Self::Encrypt),
            "both" | "compress+encrypt" => Ok(Self::Both),
            _ => Err(EcpackError::UnsupportedAlgorithm(format!("operation: {}", s))),
        }
    }
}

/// On-disk container kinds, identified purely by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerKind {
    /// `.cmp`: LZ77 tokens, Huffman coded
    Compressed,
    /// `.enc`: raw bytes under the XOR keystream
    Encrypted,
    /// `.ec`: a `.cmp` payload under the XOR keystream
    CompressedEncrypted,
}

impl ContainerKind {
    pub const ALL: [ContainerKind; 3] = [
        ContainerKind::Compressed,
        ContainerKind::Encrypted,
        ContainerKind::CompressedEncrypted,
    ];

    /// File extension without the leading dot
    pub fn extension(self) -> &'static str {
        match self {
            Self::Compressed => "cmp",
            Self::Encrypted => "enc",
            Self::CompressedEncrypted => "ec",
        }
    }

    pub fn requires_password(self) -> bool {
        !matches!(self, Self::Compressed)
    }

    pub fn is_compressed(self) -> bool {
        !matches!(self, Self::Encrypted)
    }

    /// Classify a path by its extension. Matching is case sensitive.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        Self::ALL.into_iter().find(|kind| kind.extension() == ext)
    }
}

/// Entropy coder container header
/// Layout (big-endian): [original_len: 4][symbol_count: 4]([value: 1][freq: 4] * symbol_count)
/// Only symbols with a non-zero count are stored, in ascending byte order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanHeader {
    /// Number of bytes the payload decodes to
    pub original_len: u32,
    /// Occurrence count per byte value
    pub frequencies: [u32; 256],
}

impl HuffmanHeader {
    /// Size of the fixed part (original length + symbol count)
    pub const FIXED_SIZE: usize = 8;
    /// Size of one (value, frequency) table entry
    pub const ENTRY_SIZE: usize = 5;

    /// Count byte frequencies of `data`
    pub fn from_data(data: &[u8]) -> Result<Self> {
        let original_len = u32::try_from(data.len()).map_err(|_| {
            EcpackError::InvalidFormat(format!("input of {} bytes exceeds 4 GiB", data.len()))
        })?;
        let mut frequencies = [0u32; 256];
        for &byte in data {
            frequencies[byte as usize] += 1;
        }
        Ok(Self {
            original_len,
            frequencies,
        })
    }

    /// Number of distinct symbols with a non-zero count
    pub fn symbol_count(&self) -> usize {
        self.frequencies.iter().filter(|&&f| f > 0).count()
    }

    /// Serialized size of this header
    pub fn encoded_len(&self) -> usize {
        Self::FIXED_SIZE + Self::ENTRY_SIZE * self.symbol_count()
    }

    /// Serialize header to bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.encoded_len());
        buf.extend_from_slice(&self.original_len.to_be_bytes());
        buf.extend_from_slice(&(self.symbol_count() as u32).to_be_bytes());
        for (value, &freq) in self.frequencies.iter().enumerate() {
            if freq > 0 {
                buf.push(value as u8);
                buf.extend_from_slice(&freq.to_be_bytes());
            }
        }
        buf
    }

    /// Deserialize header from bytes
    /// Returns the header and the number of bytes consumed
    pub fn from_bytes(data: &[u8]) -> Result<(Self, usize)> {
        if data.len() < Self::FIXED_SIZE {
            return Err(EcpackError::Truncated("Huffman header too short".into()));
        }
        let original_len = read_u32_be(&data[0..4]);
        let symbol_count = read_u32_be(&data[4..8]) as usize;
        if symbol_count > 256 {
            return Err(EcpackError::InvalidFormat(format!(
                "symbol count {} exceeds 256",
                symbol_count
            )));
        }

        let table_end = Self::FIXED_SIZE + symbol_count * Self::ENTRY_SIZE;
        if data.len() < table_end {
            return Err(EcpackError::Truncated(format!(
                "frequency table needs {} bytes, have {}",
                table_end,
                data.len()
            )));
        }

        let mut frequencies = [0u32; 256];
        for entry in data[Self::FIXED_SIZE..table_end].chunks_exact(Self::ENTRY_SIZE) {
            frequencies[entry[0] as usize] = read_u32_be(&entry[1..5]);
        }

        let total: u64 = frequencies.iter().map(|&f| f as u64).sum();
        if total != original_len as u64 {
            return Err(EcpackError::InvalidFormat(format!(
                "frequency sum {} does not match original length {}",
                total, original_len
            )));
        }

        Ok((
            Self {
                original_len,
                frequencies,
            },
            table_end,
        ))
    }
}

pub(crate) fn read_u32_be(bytes: &[u8]) -> u32 {
    u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}
