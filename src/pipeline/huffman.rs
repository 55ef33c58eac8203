use crate::error::{EcpackError, Result};
use crate::header::HuffmanHeader;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

const DUMMY_ORDER: u32 = 256;
const FIRST_INTERNAL_ORDER: u32 = 257;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeKind {
    Leaf(u8),
    Internal { left: usize, right: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Node {
    freq: u64,
    kind: NodeKind,
}

/// Huffman tree stored as an arena of nodes
///
/// The container stores the frequency table, not the tree, so the decoder has
/// to rebuild the exact same tree. Equal frequencies are therefore broken by a
/// fixed merge key:
///
/// - leaves sort by byte value (0..=255)
/// - the single-symbol dummy leaf sorts after every real leaf (256)
/// - internal nodes sort by creation order, after all leaves (257, 258, ...)
///
/// The two lowest nodes are popped per merge; the first becomes the left
/// child (bit 0) and the second the right child (bit 1).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanTree {
    nodes: Vec<Node>,
    root: usize,
}

impl HuffmanTree {
    /// Build the tree for a frequency table
    /// Returns None when no symbol has a non-zero count
    pub fn from_frequencies(frequencies: &[u32; 256]) -> Option<Self> {
        let mut nodes = Vec::new();
        let mut heap = BinaryHeap::new();

        for (value, &freq) in frequencies.iter().enumerate() {
            if freq > 0 {
                heap.push(Reverse((freq as u64, value as u32, nodes.len())));
                nodes.push(Node {
                    freq: freq as u64,
                    kind: NodeKind::Leaf(value as u8),
                });
            }
        }

        match nodes.len() {
            0 => return None,
            1 => {
                // Zero-frequency dummy keeps the code length at least 1
                heap.push(Reverse((0, DUMMY_ORDER, nodes.len())));
                nodes.push(Node {
                    freq: 0,
                    kind: NodeKind::Leaf(0),
                });
            }
            _ => {}
        }

        let mut order = FIRST_INTERNAL_ORDER;
        while heap.len() > 1 {
            let (Some(Reverse((freq_a, _, left))), Some(Reverse((freq_b, _, right)))) =
                (heap.pop(), heap.pop())
            else {
                break;
            };
            let freq = freq_a + freq_b;
            heap.push(Reverse((freq, order, nodes.len())));
            nodes.push(Node {
                freq,
                kind: NodeKind::Internal { left, right },
            });
            order += 1;
        }

        let Reverse((_, _, root)) = heap.pop()?;
        Some(Self { nodes, root })
    }

    /// Code per byte value, as a bit sequence (true = 1)
    /// Zero-frequency leaves get no code.
    pub fn codes(&self) -> Vec<Vec<bool>> {
        let mut codes = vec![Vec::new(); 256];
        let mut stack = vec![(self.root, Vec::new())];

        while let Some((index, prefix)) = stack.pop() {
            let node = self.nodes[index];
            match node.kind {
                NodeKind::Leaf(value) => {
                    if node.freq > 0 {
                        codes[value as usize] = if prefix.is_empty() {
                            vec![false]
                        } else {
                            prefix
                        };
                    }
                }
                NodeKind::Internal { left, right } => {
                    let mut right_prefix = prefix.clone();
                    right_prefix.push(true);
                    stack.push((right, right_prefix));

                    let mut left_prefix = prefix;
                    left_prefix.push(false);
                    stack.push((left, left_prefix));
                }
            }
        }

        codes
    }

    /// Depth of the deepest leaf
    pub fn depth(&self) -> usize {
        self.codes().iter().map(Vec::len).max().unwrap_or(0)
    }
}

/// MSB-first bit packer; the final partial byte is padded with zero bits
struct BitWriter {
    out: Vec<u8>,
    current: u8,
    filled: u8,
}

impl BitWriter {
    fn new(out: Vec<u8>) -> Self {
        Self {
            out,
            current: 0,
            filled: 0,
        }
    }

    fn push(&mut self, bit: bool) {
        self.current = (self.current << 1) | bit as u8;
        self.filled += 1;
        if self.filled == 8 {
            self.out.push(self.current);
            self.current = 0;
            self.filled = 0;
        }
    }

    fn finish(mut self) -> Vec<u8> {
        if self.filled > 0 {
            self.out.push(self.current << (8 - self.filled));
        }
        self.out
    }
}

/// Huffman-compress `data` into a self-describing container
/// Empty input maps to empty output.
pub fn compress(data: &[u8]) -> Result<Vec<u8>> {
    if data.is_empty() {
        return Ok(Vec::new());
    }

    let header = HuffmanHeader::from_data(data)?;
    let tree = HuffmanTree::from_frequencies(&header.frequencies)
        .ok_or_else(|| EcpackError::InvalidFormat("no symbols to encode".into()))?;
    let codes = tree.codes();

    let payload_bits: usize = data.iter().map(|&b| codes[b as usize].len()).sum();
    let mut out = Vec::with_capacity(header.encoded_len() + payload_bits.div_ceil(8));
    out.extend_from_slice(&header.to_bytes());

    let mut writer = BitWriter::new(out);
    for &byte in data {
        for &bit in &codes[byte as usize] {
            writer.push(bit);
        }
    }

    if log::log_enabled!(log::Level::Debug) {
        log::debug!(
            "huffman: {} bytes, {} symbols, max depth {}, {} payload bits",
            data.len(),
            header.symbol_count(),
            tree.depth(),
            payload_bits
        );
    }

    Ok(writer.finish())
}

/// Decode a container produced by [`compress`]
/// Empty input maps to empty output.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    if data.is_empty() {
        return Ok(Vec::new());
    }

    let (header, consumed) = HuffmanHeader::from_bytes(data)?;
    let original_len = header.original_len as usize;
    if original_len == 0 {
        return Ok(Vec::new());
    }

    let tree = HuffmanTree::from_frequencies(&header.frequencies)
        .ok_or_else(|| EcpackError::InvalidFormat("empty frequency table".into()))?;
    let payload = &data[consumed..];

    // Every symbol costs at least one bit
    let mut out = Vec::with_capacity(original_len.min(payload.len().saturating_mul(8)));
    let mut current = tree.root;

    for &byte in payload {
        for shift in (0..8).rev() {
            let bit = (byte >> shift) & 1 == 1;

            if let NodeKind::Internal { left, right } = tree.nodes[current].kind {
                current = if bit { right } else { left };
            }
            // A leaf root consumes one bit per symbol

            if let NodeKind::Leaf(value) = tree.nodes[current].kind {
                out.push(value);
                if out.len() == original_len {
                    return Ok(out);
                }
                current = tree.root;
            }
        }
    }

    Err(EcpackError::Truncated(format!(
        "bit stream ended after {} of {} symbols",
        out.len(),
        original_len
    )))
}
