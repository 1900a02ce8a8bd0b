//! TOML dumps of a suspended machine.
//!
//! A snapshot carries everything a monitor session needs: memory words,
//! symbol ranges, the kernel image layout, the frame pointer register and
//! optionally the trap context that suspended the program. The `kmon`
//! binary and the tests both feed sessions from these.

use crate::error::Error;
use crate::monitor::context::TrapContext;
use crate::monitor::unwind::{StackView, SymbolInfo, SymbolResolver};
use crate::monitor::{KernelLayout, Session};
use anyhow::Context;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct MemoryWord {
    pub addr: u32,
    pub value: u32,
}

/// Debug info for one contiguous run of code addresses.
#[derive(Debug, Clone, Deserialize)]
pub struct SymbolRange {
    pub start: u32,
    pub end: u32,
    pub file: String,
    pub function: String,
    pub line: u32,
}

#[derive(Debug, Deserialize)]
pub struct Snapshot {
    /// Frame pointer register at suspension.
    pub frame_pointer: u32,
    pub layout: KernelLayout,
    pub trap: Option<TrapContext>,
    #[serde(default)]
    pub memory: Vec<MemoryWord>,
    #[serde(default)]
    pub symbols: Vec<SymbolRange>,
}

/// A loaded snapshot with its memory indexed for word lookups.
pub struct MachineImage {
    words: HashMap<u32, u32>,
    symbols: Vec<SymbolRange>,
    layout: KernelLayout,
    frame_pointer: u32,
    trap: Option<TrapContext>,
}

impl MachineImage {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read snapshot {}", path.display()))?;
        let snapshot: Snapshot = toml::from_str(&raw)
            .with_context(|| format!("parse snapshot {}", path.display()))?;
        Ok(Self::from_snapshot(snapshot))
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self {
            words: snapshot
                .memory
                .iter()
                .map(|word| (word.addr, word.value))
                .collect(),
            symbols: snapshot.symbols,
            layout: snapshot.layout,
            frame_pointer: snapshot.frame_pointer,
            trap: snapshot.trap,
        }
    }

    pub fn session(&self) -> Session<'_> {
        Session::new(self, self, self.layout, self.frame_pointer, self.trap)
    }
}

impl StackView for MachineImage {
    fn read_word(&self, addr: u32) -> Result<u32, Error> {
        self.words
            .get(&addr)
            .copied()
            .ok_or(Error::UnreadableWord(addr))
    }
}

impl SymbolResolver for MachineImage {
    fn resolve(&self, addr: u32) -> Result<SymbolInfo, Error> {
        self.symbols
            .iter()
            .find(|sym| sym.start <= addr && addr < sym.end)
            .map(|sym| SymbolInfo {
                file: sym.file.clone(),
                line: sym.line,
                function: sym.function.clone(),
                function_start: sym.start,
            })
            .ok_or(Error::SymbolNotFound(addr))
    }
}
