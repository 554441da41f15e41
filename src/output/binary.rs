// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;

const ELF_MAGIC: &[u8; 4] = b"\x7fELF";
const EI_CLASS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElfClass {
    Elf32,
    Elf64,
    /// Class byte missing or not 1/2.
    Unspecified,
}

/// What the payload's header says it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryKind {
    Elf(ElfClass),
    Unknown,
}

impl BinaryKind {
    pub fn detect(payload: &[u8]) -> Self {
        if !payload.starts_with(ELF_MAGIC) {
            return BinaryKind::Unknown;
        }
        let class = match payload.get(EI_CLASS) {
            Some(1) => ElfClass::Elf32,
            Some(2) => ElfClass::Elf64,
            _ => ElfClass::Unspecified,
        };
        BinaryKind::Elf(class)
    }

    pub fn is_elf(&self) -> bool {
        matches!(self, BinaryKind::Elf(_))
    }
}

impl fmt::Display for BinaryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BinaryKind::Elf(ElfClass::Elf32) => write!(f, "ELF32"),
            BinaryKind::Elf(ElfClass::Elf64) => write!(f, "ELF64"),
            BinaryKind::Elf(ElfClass::Unspecified) => write!(f, "ELF"),
            BinaryKind::Unknown => write!(f, "unknown"),
        }
    }
}
