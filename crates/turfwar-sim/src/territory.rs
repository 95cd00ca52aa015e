//! Territory store: the definition file and the live territory set.
//!
//! The definition file is the single source of truth for geometry and
//! default ownership. One record per line:
//!
//! ```text
//! id,minX,minY,maxX,maxY[,owner[,underAttack[,defense]]]
//! ```
//!
//! `id` is all digits and unique. `owner` is -1 for neutral, else a
//! faction id. `underAttack` is accepted for grammar compatibility but
//! always cleared after a load; it is runtime-only state. `defense` is
//! 0/1/2. `#`-prefixed and blank lines are skipped. Any malformed line
//! aborts the whole load and the previous in-memory set is kept.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use glam::Vec2;

use turfwar_core::constants::{EDITOR_ID_FLOOR, HOT_RELOAD_POLL_MS};
use turfwar_core::enums::DefenseLevel;
use turfwar_core::types::{
    owner_from_code, owner_to_code, FactionId, OwnershipEntry, Rect, Territory, TerritoryId,
};

/// Failed-reload log lines are rate limited to one per this interval.
const RELOAD_FAIL_LOG_MS: u64 = 2000;

/// Owns the live territory list and its definition file.
pub struct TerritoryStore {
    path: PathBuf,
    territories: Vec<Territory>,
    next_poll_ms: u64,
    last_stamp: Option<SystemTime>,
    last_fail_log_ms: u64,
}

impl TerritoryStore {
    /// Create an empty store bound to a definition file path.
    /// Call [`TerritoryStore::reload_preserving_ownership`] to load it.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            territories: Vec::new(),
            next_poll_ms: 0,
            last_stamp: None,
            last_fail_log_ms: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn territories(&self) -> &[Territory] {
        &self.territories
    }

    pub fn is_empty(&self) -> bool {
        self.territories.is_empty()
    }

    pub fn get(&self, id: TerritoryId) -> Option<&Territory> {
        self.territories.iter().find(|t| t.id == id)
    }

    /// Linear scan; the first rectangle containing the point wins.
    /// Territories are non-overlapping by convention, not enforcement.
    pub fn territory_at(&self, p: Vec2) -> Option<&Territory> {
        self.territories.iter().find(|t| t.rect.contains(p))
    }

    // --- Loading ---

    /// Re-read the definition file, keeping runtime ownership for every
    /// territory id that survives the reload. A live capture is never
    /// reverted by a geometry edit. Fails closed: on any error the
    /// previous set is kept untouched.
    pub fn reload_preserving_ownership(&mut self) -> Result<usize, String> {
        let text = fs::read_to_string(&self.path)
            .map_err(|e| format!("Failed to read {}: {e}", self.path.display()))?;
        let mut next = parse_definitions(&text)?;

        for t in &mut next {
            if let Some(live) = self.get(t.id) {
                t.owner = live.owner;
            }
        }

        self.territories = next;
        self.clear_transient_state();
        self.last_stamp = file_stamp(&self.path);
        Ok(self.territories.len())
    }

    /// Poll the file's modification stamp at most once per second and
    /// reload on change. Returns true when a new definition set was
    /// applied this tick.
    pub fn hot_reload_tick(&mut self, now_ms: u64) -> bool {
        if now_ms < self.next_poll_ms {
            return false;
        }
        self.next_poll_ms = now_ms + HOT_RELOAD_POLL_MS;

        let stamp = match file_stamp(&self.path) {
            Some(s) => s,
            None => return false,
        };
        if self.last_stamp.is_none() {
            self.last_stamp = Some(stamp);
            return false;
        }
        if self.last_stamp == Some(stamp) {
            return false;
        }

        match self.reload_preserving_ownership() {
            Ok(count) => {
                tracing::info!(count, "territory definitions reloaded");
                true
            }
            Err(err) => {
                if now_ms.saturating_sub(self.last_fail_log_ms) > RELOAD_FAIL_LOG_MS {
                    self.last_fail_log_ms = now_ms;
                    tracing::warn!(%err, "territory reload failed, keeping previous set");
                }
                false
            }
        }
    }

    // --- Saving ---

    /// Write every territory back to the definition file, sorted by id.
    /// Runtime owner is persisted as the new default; `under_attack`
    /// never is. Atomic: temp write, rotate the old file to `.bak`,
    /// rename into place, with a copy fallback if the rename fails.
    pub fn save(&mut self) -> Result<(), String> {
        let mut sorted: Vec<&Territory> = self.territories.iter().collect();
        sorted.sort_by_key(|t| t.id);

        let mut out = String::from("# id,minX,minY,maxX,maxY,owner,underAttack,defense\n");
        for t in sorted {
            out.push_str(&format!(
                "{},{:.3},{:.3},{:.3},{:.3},{},0,{}\n",
                t.id,
                t.rect.min.x,
                t.rect.min.y,
                t.rect.max.x,
                t.rect.max.y,
                owner_to_code(t.owner),
                t.defense.code(),
            ));
        }

        let tmp = path_with_suffix(&self.path, ".tmp");
        let bak = path_with_suffix(&self.path, ".bak");

        fs::write(&tmp, out).map_err(|e| format!("Failed to write temp file: {e}"))?;

        // Rotate the previous file out of the way. Both steps are best
        // effort; the file may not exist yet.
        let _ = fs::remove_file(&bak);
        let _ = fs::rename(&self.path, &bak);

        if let Err(rename_err) = fs::rename(&tmp, &self.path) {
            tracing::warn!(%rename_err, "rename into place failed, trying copy fallback");
            fs::copy(&tmp, &self.path)
                .map_err(|e| format!("Failed to move or copy temp file into place: {e}"))?;
            let _ = fs::remove_file(&tmp);
        }

        // Refresh the stamp so the hot-reload poll does not fight our own write.
        self.last_stamp = file_stamp(&self.path);
        Ok(())
    }

    // --- Runtime mutation ---

    /// Change a territory's runtime owner. Clears its under-attack flag;
    /// a capture always ends the fight over it.
    pub fn set_owner(&mut self, id: TerritoryId, owner: Option<FactionId>) -> bool {
        match self.territories.iter_mut().find(|t| t.id == id) {
            Some(t) => {
                t.owner = owner;
                t.under_attack = false;
                true
            }
            None => false,
        }
    }

    pub fn set_under_attack(&mut self, id: TerritoryId, under_attack: bool) -> bool {
        match self.territories.iter_mut().find(|t| t.id == id) {
            Some(t) => {
                t.under_attack = under_attack;
                true
            }
            None => false,
        }
    }

    /// Restore every territory to its definition-file owner.
    pub fn reset_ownership_to_defaults(&mut self) {
        for t in &mut self.territories {
            t.owner = t.default_owner;
            t.under_attack = false;
        }
    }

    /// Apply a persisted ownership snapshot. Entries for unknown ids are
    /// ignored; territories absent from the snapshot keep their current
    /// owner.
    pub fn apply_ownership(&mut self, entries: &[OwnershipEntry]) {
        for entry in entries {
            self.set_owner(entry.id, entry.owner);
        }
    }

    /// Snapshot of every territory's runtime owner.
    pub fn ownership_state(&self) -> Vec<OwnershipEntry> {
        self.territories
            .iter()
            .map(|t| OwnershipEntry {
                id: t.id,
                owner: t.owner,
            })
            .collect()
    }

    /// Force `under_attack` false everywhere. Called after every load and
    /// war teardown so no territory is left stuck mid-war.
    pub fn clear_transient_state(&mut self) {
        for t in &mut self.territories {
            t.under_attack = false;
        }
    }

    // --- Editor support ---

    /// Next id for an editor-created territory: one past the highest id,
    /// with a floor that keeps hand-authored low ids untouched.
    pub fn next_editor_id(&self) -> TerritoryId {
        let best = self
            .territories
            .iter()
            .map(|t| t.id.0)
            .max()
            .unwrap_or(0)
            .max(EDITOR_ID_FLOOR);
        TerritoryId(best + 1)
    }

    pub fn insert(&mut self, territory: Territory) {
        self.territories.push(territory);
    }

    pub fn remove(&mut self, id: TerritoryId) -> Option<Territory> {
        let idx = self.territories.iter().position(|t| t.id == id)?;
        Some(self.territories.remove(idx))
    }
}

fn file_stamp(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}

fn path_with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut s = path.as_os_str().to_os_string();
    s.push(suffix);
    PathBuf::from(s)
}

/// Parse a whole definition file. Any bad line fails the whole parse.
pub fn parse_definitions(text: &str) -> Result<Vec<Territory>, String> {
    let mut out: Vec<Territory> = Vec::new();

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let t = parse_line(line).map_err(|e| format!("Parse error line {line_no}: {e}"))?;
        if out.iter().any(|existing| existing.id == t.id) {
            return Err(format!("Duplicate id '{}' at line {line_no}", t.id));
        }
        out.push(t);
    }

    if out.is_empty() {
        return Err("No territories loaded".to_string());
    }
    Ok(out)
}

fn parse_line(line: &str) -> Result<Territory, String> {
    let tokens: Vec<&str> = line.split(',').map(str::trim).collect();
    if tokens.len() < 5 {
        return Err("Expected at least 5 comma-separated fields".to_string());
    }
    if tokens.len() > 8 {
        return Err("Too many fields".to_string());
    }

    let id_str = tokens[0];
    if id_str.is_empty() || !id_str.bytes().all(|b| b.is_ascii_digit()) {
        return Err("Id must be numeric (e.g. 1001)".to_string());
    }
    let id = id_str
        .parse::<u32>()
        .map_err(|_| "Id out of range".to_string())?;

    let min_x = parse_float(tokens[1], "minX")?;
    let min_y = parse_float(tokens[2], "minY")?;
    let max_x = parse_float(tokens[3], "maxX")?;
    let max_y = parse_float(tokens[4], "maxY")?;

    let mut owner = None;
    if let Some(tok) = tokens.get(5).filter(|t| !t.is_empty()) {
        let code = tok
            .parse::<i32>()
            .map_err(|_| "Bad owner code".to_string())?;
        owner = owner_from_code(code).ok_or_else(|| "Bad owner code".to_string())?;
    }

    // Accepted for grammar compatibility; the flag is transient and the
    // caller clears it after the load anyway.
    let mut under_attack = false;
    if let Some(tok) = tokens.get(6).filter(|t| !t.is_empty()) {
        let ua = tok
            .parse::<i32>()
            .map_err(|_| "Bad underAttack flag".to_string())?;
        under_attack = ua != 0;
    }

    let mut defense = DefenseLevel::Moderate;
    if let Some(tok) = tokens.get(7).filter(|t| !t.is_empty()) {
        let code = tok
            .parse::<u32>()
            .map_err(|_| "Bad defense level".to_string())?;
        defense = DefenseLevel::from_code(code);
    }

    let mut territory = Territory::new(
        TerritoryId(id),
        Rect::from_bounds(min_x, min_y, max_x, max_y),
        owner,
        defense,
    );
    territory.under_attack = under_attack;
    Ok(territory)
}

fn parse_float(token: &str, field: &str) -> Result<f32, String> {
    token.parse::<f32>().map_err(|_| format!("Bad {field}"))
}
