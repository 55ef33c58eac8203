use crate::error::{EcpackError, Result};
use crate::header::{ContainerKind, HuffmanHeader};
use crate::pipeline::{cipher, huffman, tokens, Lz77};
use crate::report::compression_rate;
use std::path::Path;

/// Display information about a container file
/// `.ec` containers are only inspected past the cipher when a password is given.
pub fn show_info(path: &Path, password: Option<&str>) -> Result<String> {
    let kind = ContainerKind::from_path(path).ok_or_else(|| {
        EcpackError::InvalidFormat(format!("{} is not a .cmp, .enc or .ec file", path.display()))
    })?;
    let data = std::fs::read(path)?;

    let mut output = String::new();

    output.push_str("ecpack Container Information\n");
    output.push_str("============================\n\n");

    output.push_str(&format!("File: {}\n", path.display()));
    output.push_str(&format!("Kind: {:?} (.{})\n", kind, kind.extension()));
    output.push_str(&format!("Container size: {}\n", format_size(data.len() as u64)));
    output.push('\n');

    let compressed = match (kind, password) {
        (ContainerKind::Compressed, _) => Some(data.clone()),
        (ContainerKind::CompressedEncrypted, Some(pw)) if !pw.is_empty() => {
            Some(cipher::decrypt(&data, Some(pw)))
        }
        _ => None,
    };

    match compressed {
        Some(compressed) if !compressed.is_empty() => {
            describe_compressed(&compressed, &mut output)?;
        }
        Some(_) => output.push_str("Entropy Header:\n  (empty)\n\n"),
        None if kind.is_compressed() => {
            output.push_str("Entropy Header:\n  Obfuscated; pass --password to inspect\n\n");
        }
        None => {
            output.push_str(&format!("Payload: {} bytes (length preserved)\n\n", data.len()));
        }
    }

    if kind.requires_password() {
        output.push_str("Security Note:\n");
        output.push_str("  The XOR layer is a reversible obfuscation, not encryption.\n");
        output.push_str("  It offers no real confidentiality.\n");
    }

    Ok(output)
}

fn describe_compressed(data: &[u8], output: &mut String) -> Result<()> {
    let (header, header_len) = HuffmanHeader::from_bytes(data)?;
    let token_bytes = huffman::decompress(data)?;
    let token_list = tokens::deserialize(&token_bytes)?;
    let recovered = Lz77::default().decompress(&token_list)?;

    let literals = token_list.iter().filter(|t| t.is_literal()).count();
    let longest = token_list.iter().map(|t| t.length).max().unwrap_or(0);
    let farthest = token_list.iter().map(|t| t.offset).max().unwrap_or(0);

    output.push_str("Entropy Header:\n");
    output.push_str(&format!("  Token stream: {} bytes\n", header.original_len));
    output.push_str(&format!("  Distinct symbols: {}\n", header.symbol_count()));
    output.push_str(&format!("  Header size: {} bytes\n", header_len));
    output.push_str(&format!("  Payload: {} bytes\n", data.len() - header_len));
    output.push('\n');

    output.push_str("Tokens:\n");
    output.push_str(&format!("  Total: {}\n", token_list.len()));
    output.push_str(&format!("  Literals: {}\n", literals));
    output.push_str(&format!("  Matches: {}\n", token_list.len() - literals));
    output.push_str(&format!("  Longest match: {}\n", longest));
    output.push_str(&format!("  Farthest offset: {}\n", farthest));
    output.push('\n');

    output.push_str(&format!("Recovered size: {}\n", format_size(recovered.len() as u64)));
    output.push_str(&format!(
        "Compression rate: {}\n\n",
        compression_rate(recovered.len() as u64, data.len() as u64)
    ));
    Ok(())
}

fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.1} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}
