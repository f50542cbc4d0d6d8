//! Magic-byte signature table for binary detection.

/// A known binary file signature.
#[derive(Debug, Clone, Copy)]
pub struct MagicSignature {
    /// Leading bytes the content must start with.
    pub bytes: &'static [u8],
    /// Coarse file-type label reported for a match.
    pub label: &'static str,
}

/// Signatures checked in order; first prefix match wins.
///
/// Longer signatures sharing a prefix with shorter ones come first
/// (e.g. xz before any 0xFD-prefixed additions).
pub static MAGIC_SIGNATURES: &[MagicSignature] = &[
    MagicSignature {
        bytes: &[0x89, 0x50, 0x4E, 0x47],
        label: "png",
    },
    MagicSignature {
        bytes: &[0xFF, 0xD8, 0xFF],
        label: "jpeg",
    },
    MagicSignature {
        bytes: b"GIF8",
        label: "gif",
    },
    MagicSignature {
        bytes: &[0x7F, 0x45, 0x4C, 0x46],
        label: "elf",
    },
    MagicSignature {
        bytes: &[0xFD, 0x37, 0x7A, 0x58, 0x5A, 0x00],
        label: "xz",
    },
    MagicSignature {
        bytes: &[0x1F, 0x8B],
        label: "gzip",
    },
    MagicSignature {
        bytes: b"BZh",
        label: "bzip2",
    },
    MagicSignature {
        bytes: &[0x50, 0x4B, 0x03, 0x04],
        label: "zip",
    },
    MagicSignature {
        bytes: b"%PDF",
        label: "pdf",
    },
    MagicSignature {
        bytes: b"SQLite format 3",
        label: "sqlite",
    },
    MagicSignature {
        bytes: &[0xCA, 0xFE, 0xBA, 0xBE],
        label: "java-class",
    },
    MagicSignature {
        bytes: &[0x00, 0x61, 0x73, 0x6D],
        label: "wasm",
    },
    MagicSignature {
        bytes: &[0x37, 0x7A, 0xBC, 0xAF, 0x27, 0x1C],
        label: "7z",
    },
];

/// Find the first signature matching the content prefix.
pub fn match_signature(content: &[u8]) -> Option<&'static MagicSignature> {
    MAGIC_SIGNATURES
        .iter()
        .find(|sig| content.starts_with(sig.bytes))
}

/// Hex rendering of a signature, stored on the file record for audit.
pub fn signature_hex(sig: &MagicSignature) -> String {
    sig.bytes
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}
