//! Ownership sidecar: binary per-slot ownership blobs plus the save/load
//! lifecycle that decides when to write and apply them.
//!
//! The sidecar records only runtime ownership deltas; geometry always comes
//! from the definition file. Two wire versions exist: the legacy v1 flat
//! entry array (decode-only) and the current v2 chunked layout, which wraps
//! the same entry array in a tagged chunk so future chunks can ride along
//! without breaking old decoders. Unknown chunks are skipped by length;
//! anything structurally off rejects the whole blob and the caller falls
//! back to definition-file defaults.

use std::fs;
use std::path::PathBuf;

use turfwar_core::constants::{LIFECYCLE_HANDLE_CAP, LOAD_DEDUP_MS};
use turfwar_core::types::{owner_from_code, owner_to_code, OwnershipEntry, TerritoryId};

/// Sidecar magic, "GTW1" little-endian.
const SIDECAR_MAGIC: u32 = 0x3157_5447;

/// Legacy flat layout.
const VERSION_V1: u32 = 1;

/// Current chunked layout.
const VERSION_V2: u32 = 2;

/// Chunk tag carrying the ownership entry array, "OWNS" little-endian.
const CHUNK_OWNS: u32 = 0x534E_574F;

/// Largest blob the decoder will touch.
const MAX_BLOB_BYTES: usize = 1 << 20;

/// Largest entry count the decoder will touch.
const MAX_ENTRIES: usize = 4096;

/// Longest id digit string the decoder accepts (u32::MAX is 10 digits).
const MAX_ID_DIGITS: usize = 10;

// --- Codec ---

struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn bytes(&mut self, n: usize) -> Result<&'a [u8], String> {
        if self.remaining() < n {
            return Err(format!(
                "Truncated sidecar: wanted {n} bytes at offset {}, {} left",
                self.pos,
                self.remaining()
            ));
        }
        let out = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    fn u16(&mut self) -> Result<u16, String> {
        let b = self.bytes(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    fn u32(&mut self) -> Result<u32, String> {
        let b = self.bytes(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }
}

fn encode_entries(entries: &[OwnershipEntry], buf: &mut Vec<u8>) {
    buf.extend_from_slice(&(entries.len() as u32).to_le_bytes());
    for entry in entries {
        let id = entry.id.0.to_string();
        buf.extend_from_slice(&(id.len() as u16).to_le_bytes());
        buf.extend_from_slice(id.as_bytes());
        buf.extend_from_slice(&owner_to_code(entry.owner).to_le_bytes());
    }
}

fn decode_entries(reader: &mut Reader) -> Result<Vec<OwnershipEntry>, String> {
    let count = reader.u32()? as usize;
    if count > MAX_ENTRIES {
        return Err(format!("Sidecar entry count {count} exceeds {MAX_ENTRIES}"));
    }
    let mut entries = Vec::with_capacity(count);
    for _ in 0..count {
        let id_len = reader.u16()? as usize;
        if id_len == 0 || id_len > MAX_ID_DIGITS {
            return Err(format!("Bad sidecar id length {id_len}"));
        }
        let id_bytes = reader.bytes(id_len)?;
        if !id_bytes.iter().all(u8::is_ascii_digit) {
            return Err("Sidecar id is not decimal digits".to_string());
        }
        let id: u32 = std::str::from_utf8(id_bytes)
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| "Sidecar id does not fit a territory id".to_string())?;
        let code = reader.u32()? as i32;
        let owner = owner_from_code(code)
            .ok_or_else(|| format!("Bad sidecar owner code {code}"))?;
        entries.push(OwnershipEntry {
            id: TerritoryId(id),
            owner,
        });
    }
    Ok(entries)
}

/// Encode ownership as a current-version (v2) sidecar blob.
pub fn encode_ownership(entries: &[OwnershipEntry]) -> Vec<u8> {
    let mut payload = Vec::new();
    encode_entries(entries, &mut payload);

    let mut buf = Vec::with_capacity(payload.len() + 20);
    buf.extend_from_slice(&SIDECAR_MAGIC.to_le_bytes());
    buf.extend_from_slice(&VERSION_V2.to_le_bytes());
    buf.extend_from_slice(&1u32.to_le_bytes()); // chunk count
    buf.extend_from_slice(&CHUNK_OWNS.to_le_bytes());
    buf.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    buf.extend_from_slice(&payload);
    buf
}

/// Decode a sidecar blob of either wire version.
pub fn decode_ownership(data: &[u8]) -> Result<Vec<OwnershipEntry>, String> {
    if data.len() > MAX_BLOB_BYTES {
        return Err(format!("Sidecar blob of {} bytes is too large", data.len()));
    }
    let mut reader = Reader::new(data);
    let magic = reader.u32()?;
    if magic != SIDECAR_MAGIC {
        return Err(format!("Bad sidecar magic 0x{magic:08X}"));
    }
    let version = reader.u32()?;
    let entries = match version {
        VERSION_V1 => decode_entries(&mut reader)?,
        VERSION_V2 => decode_v2_chunks(&mut reader)?,
        other => return Err(format!("Unsupported sidecar version {other}")),
    };
    if reader.remaining() != 0 {
        return Err(format!(
            "Sidecar has {} trailing bytes after the declared structure",
            reader.remaining()
        ));
    }
    Ok(entries)
}

fn decode_v2_chunks(reader: &mut Reader) -> Result<Vec<OwnershipEntry>, String> {
    let chunk_count = reader.u32()?;
    let mut entries = Vec::new();
    for _ in 0..chunk_count {
        let tag = reader.u32()?;
        let len = reader.u32()? as usize;
        let payload = reader.bytes(len)?;
        if tag == CHUNK_OWNS {
            let mut inner = Reader::new(payload);
            entries = decode_entries(&mut inner)?;
            if inner.remaining() != 0 {
                return Err("OWNS chunk has trailing bytes".to_string());
            }
        } else {
            tracing::debug!(tag = format!("0x{tag:08X}"), len, "skipping unknown sidecar chunk");
        }
    }
    Ok(entries)
}

// --- Per-slot files ---

/// Sidecar files on disk, one per save slot.
#[derive(Debug, Clone)]
pub struct SidecarStore {
    dir: PathBuf,
}

impl SidecarStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn slot_path(&self, slot: u32) -> PathBuf {
        self.dir.join(format!("ownership_{slot}.bin"))
    }

    /// Encode and atomically write one slot's ownership.
    pub fn save_slot(&self, slot: u32, entries: &[OwnershipEntry]) -> Result<(), String> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| format!("Failed to create persistence dir {}: {e}", self.dir.display()))?;

        let path = self.slot_path(slot);
        let tmp = path.with_extension("bin.tmp");
        let blob = encode_ownership(entries);

        fs::write(&tmp, &blob)
            .map_err(|e| format!("Failed to write {}: {e}", tmp.display()))?;
        if let Err(e) = fs::rename(&tmp, &path) {
            let _ = fs::remove_file(&tmp);
            return Err(format!("Failed to move sidecar into place: {e}"));
        }
        tracing::info!(slot, entries = entries.len(), path = %path.display(), "ownership saved");
        Ok(())
    }

    /// Read and decode one slot. `Ok(None)` when the slot has no sidecar.
    pub fn load_slot(&self, slot: u32) -> Result<Option<Vec<OwnershipEntry>>, String> {
        let path = self.slot_path(slot);
        let blob = match fs::read(&path) {
            Ok(blob) => blob,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(format!("Failed to read {}: {e}", path.display())),
        };
        decode_ownership(&blob).map(Some)
    }
}

// --- Save/load lifecycle ---

/// Direction of a host-reported save-file open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileMode {
    Read,
    Write,
}

/// What a closed handle means for the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleOutcome {
    /// A write finished; encode and persist the slot now.
    SaveCompleted(u32),
    /// A read finished; the slot is applied later, outside menus.
    LoadArmed(u32),
}

#[derive(Debug, Clone, Copy)]
struct OpenHandle {
    handle: u64,
    slot: u32,
    mode: FileMode,
}

/// Pairs host save-file opens with closes, and defers load application
/// until the host has left its menu/loading context.
#[derive(Debug, Default)]
pub struct SaveLifecycle {
    open: Vec<OpenHandle>,
    pending_load: Option<u32>,
    /// Last armed load per (slot, at_ms), for dedup.
    last_load: Option<(u32, u64)>,
}

impl SaveLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Host opened a save file for a slot.
    pub fn file_opened(&mut self, handle: u64, slot: u32, mode: FileMode) {
        assert!(
            self.open.len() < LIFECYCLE_HANDLE_CAP,
            "save-file handle table overflow"
        );
        if self.open.iter().any(|h| h.handle == handle) {
            tracing::warn!(handle, "duplicate save-file open, ignoring");
            return;
        }
        self.open.push(OpenHandle { handle, slot, mode });
    }

    /// Host closed a file handle. Unknown handles are not ours.
    pub fn file_closed(&mut self, handle: u64, now_ms: u64) -> Option<LifecycleOutcome> {
        let idx = self.open.iter().position(|h| h.handle == handle)?;
        let closed = self.open.swap_remove(idx);
        match closed.mode {
            FileMode::Write => Some(LifecycleOutcome::SaveCompleted(closed.slot)),
            FileMode::Read => self
                .notify_load_complete(closed.slot, now_ms)
                .then_some(LifecycleOutcome::LoadArmed(closed.slot)),
        }
    }

    /// Arm a deferred load for a slot, subject to the dedup window.
    /// Returns whether the load was actually armed.
    pub fn notify_load_complete(&mut self, slot: u32, now_ms: u64) -> bool {
        if let Some((last_slot, at)) = self.last_load {
            if last_slot == slot && now_ms.saturating_sub(at) <= LOAD_DEDUP_MS {
                tracing::debug!(slot, "duplicate load completion suppressed");
                return false;
            }
        }
        self.last_load = Some((slot, now_ms));
        self.pending_load = Some(slot);
        true
    }

    /// Surrender the pending load once the host is out of menus.
    pub fn take_pending_load(&mut self, in_menu: bool) -> Option<u32> {
        if in_menu {
            return None;
        }
        self.pending_load.take()
    }

    pub fn open_handles(&self) -> usize {
        self.open.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use turfwar_core::types::FactionId;

    fn sample_entries() -> Vec<OwnershipEntry> {
        vec![
            OwnershipEntry {
                id: TerritoryId(1001),
                owner: Some(FactionId(2)),
            },
            OwnershipEntry {
                id: TerritoryId(1002),
                owner: None,
            },
            OwnershipEntry {
                id: TerritoryId(7),
                owner: Some(FactionId(0)),
            },
        ]
    }

    /// Hand-build a legacy v1 blob.
    fn v1_blob(entries: &[OwnershipEntry]) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&SIDECAR_MAGIC.to_le_bytes());
        buf.extend_from_slice(&VERSION_V1.to_le_bytes());
        encode_entries(entries, &mut buf);
        buf
    }

    #[test]
    fn v2_roundtrip() {
        let entries = sample_entries();
        let blob = encode_ownership(&entries);
        assert_eq!(decode_ownership(&blob).unwrap(), entries);
    }

    #[test]
    fn v1_blobs_still_decode() {
        let entries = sample_entries();
        let blob = v1_blob(&entries);
        assert_eq!(decode_ownership(&blob).unwrap(), entries);
    }

    #[test]
    fn unknown_chunks_are_skipped() {
        let entries = sample_entries();
        let mut payload = Vec::new();
        encode_entries(&entries, &mut payload);

        let mut blob = Vec::new();
        blob.extend_from_slice(&SIDECAR_MAGIC.to_le_bytes());
        blob.extend_from_slice(&VERSION_V2.to_le_bytes());
        blob.extend_from_slice(&2u32.to_le_bytes());
        // A chunk this decoder has never heard of, before OWNS.
        blob.extend_from_slice(&0x5A5A_5A5Au32.to_le_bytes());
        blob.extend_from_slice(&3u32.to_le_bytes());
        blob.extend_from_slice(&[9, 9, 9]);
        blob.extend_from_slice(&CHUNK_OWNS.to_le_bytes());
        blob.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        blob.extend_from_slice(&payload);

        assert_eq!(decode_ownership(&blob).unwrap(), entries);
    }

    #[test]
    fn structural_rejects() {
        let entries = sample_entries();
        let good = encode_ownership(&entries);

        // Trailing garbage.
        let mut trailing = good.clone();
        trailing.push(0xFF);
        assert!(decode_ownership(&trailing).is_err());

        // Truncation anywhere in the body.
        assert!(decode_ownership(&good[..good.len() - 3]).is_err());
        assert!(decode_ownership(&good[..6]).is_err());

        // Bad magic.
        let mut magic = good.clone();
        magic[0] = 0;
        assert!(decode_ownership(&magic).is_err());

        // Unknown version.
        let mut version = good.clone();
        version[4] = 9;
        assert!(decode_ownership(&version).is_err());

        // Chunk payload overruns the buffer.
        let mut overrun = good.clone();
        let len_at = 4 + 4 + 4 + 4;
        overrun[len_at..len_at + 4].copy_from_slice(&u32::MAX.to_le_bytes());
        assert!(decode_ownership(&overrun).is_err());
    }

    #[test]
    fn content_rejects() {
        // Entry count beyond the cap.
        let mut blob = Vec::new();
        blob.extend_from_slice(&SIDECAR_MAGIC.to_le_bytes());
        blob.extend_from_slice(&VERSION_V1.to_le_bytes());
        blob.extend_from_slice(&(MAX_ENTRIES as u32 + 1).to_le_bytes());
        assert!(decode_ownership(&blob).is_err());

        // Non-digit id bytes.
        let mut bad_id = Vec::new();
        bad_id.extend_from_slice(&SIDECAR_MAGIC.to_le_bytes());
        bad_id.extend_from_slice(&VERSION_V1.to_le_bytes());
        bad_id.extend_from_slice(&1u32.to_le_bytes());
        bad_id.extend_from_slice(&2u16.to_le_bytes());
        bad_id.extend_from_slice(b"1x");
        bad_id.extend_from_slice(&0i32.to_le_bytes());
        assert!(decode_ownership(&bad_id).is_err());

        // Owner code below -1.
        let mut bad_owner = Vec::new();
        bad_owner.extend_from_slice(&SIDECAR_MAGIC.to_le_bytes());
        bad_owner.extend_from_slice(&VERSION_V1.to_le_bytes());
        bad_owner.extend_from_slice(&1u32.to_le_bytes());
        bad_owner.extend_from_slice(&1u16.to_le_bytes());
        bad_owner.extend_from_slice(b"5");
        bad_owner.extend_from_slice(&(-2i32).to_le_bytes());
        assert!(decode_ownership(&bad_owner).is_err());
    }

    #[test]
    fn oversized_blobs_are_rejected() {
        let blob = vec![0u8; MAX_BLOB_BYTES + 1];
        assert!(decode_ownership(&blob).is_err());
    }

    #[test]
    fn empty_entry_set_roundtrips() {
        let blob = encode_ownership(&[]);
        assert_eq!(decode_ownership(&blob).unwrap(), Vec::new());
    }

    #[test]
    fn slot_files_roundtrip() {
        let dir = std::env::temp_dir().join("turfwar_sidecar_roundtrip");
        let _ = fs::remove_dir_all(&dir);
        let store = SidecarStore::new(&dir);

        assert_eq!(store.load_slot(3).unwrap(), None, "missing slot is empty");

        let entries = sample_entries();
        store.save_slot(3, &entries).unwrap();
        assert_eq!(store.load_slot(3).unwrap(), Some(entries));

        // Slots do not bleed into each other.
        assert_eq!(store.load_slot(4).unwrap(), None);
        assert!(!store.slot_path(3).with_extension("bin.tmp").exists());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn corrupt_slot_file_fails_decode() {
        let dir = std::env::temp_dir().join("turfwar_sidecar_corrupt");
        let _ = fs::remove_dir_all(&dir);
        let store = SidecarStore::new(&dir);

        fs::create_dir_all(&dir).unwrap();
        fs::write(store.slot_path(1), b"not a sidecar").unwrap();
        assert!(store.load_slot(1).is_err());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn write_close_completes_a_save() {
        let mut lifecycle = SaveLifecycle::new();
        lifecycle.file_opened(42, 3, FileMode::Write);
        assert_eq!(
            lifecycle.file_closed(42, 1000),
            Some(LifecycleOutcome::SaveCompleted(3))
        );
        assert_eq!(lifecycle.open_handles(), 0);
    }

    #[test]
    fn read_close_arms_a_deferred_load() {
        let mut lifecycle = SaveLifecycle::new();
        lifecycle.file_opened(7, 2, FileMode::Read);
        assert_eq!(
            lifecycle.file_closed(7, 1000),
            Some(LifecycleOutcome::LoadArmed(2))
        );

        // Still in a menu: nothing surrendered.
        assert_eq!(lifecycle.take_pending_load(true), None);
        assert_eq!(lifecycle.take_pending_load(false), Some(2));
        assert_eq!(lifecycle.take_pending_load(false), None, "applied once");
    }

    #[test]
    fn duplicate_load_completions_are_suppressed() {
        let mut lifecycle = SaveLifecycle::new();
        lifecycle.file_opened(1, 5, FileMode::Read);
        lifecycle.file_closed(1, 1000);

        lifecycle.file_opened(2, 5, FileMode::Read);
        assert_eq!(lifecycle.file_closed(2, 1000 + LOAD_DEDUP_MS), None);

        // Past the window the same slot arms again.
        lifecycle.file_opened(3, 5, FileMode::Read);
        assert_eq!(
            lifecycle.file_closed(3, 1000 + LOAD_DEDUP_MS * 2 + 1),
            Some(LifecycleOutcome::LoadArmed(5))
        );
    }

    #[test]
    fn unknown_handles_are_ignored() {
        let mut lifecycle = SaveLifecycle::new();
        assert_eq!(lifecycle.file_closed(99, 0), None);
    }

    #[test]
    fn interleaved_handles_pair_correctly() {
        let mut lifecycle = SaveLifecycle::new();
        lifecycle.file_opened(1, 0, FileMode::Write);
        lifecycle.file_opened(2, 1, FileMode::Read);
        assert_eq!(
            lifecycle.file_closed(2, 100),
            Some(LifecycleOutcome::LoadArmed(1))
        );
        assert_eq!(
            lifecycle.file_closed(1, 200),
            Some(LifecycleOutcome::SaveCompleted(0))
        );
    }
}
