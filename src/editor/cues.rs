//! The cue point table.
//!
//! Rows carry a `RowId` handed out when the table is built. The snapshot maps
//! each row id to the `CueId` it was built from, so saving works no matter
//! how the rows were sorted or deleted in between.

use std::collections::{BTreeMap, BTreeSet};

use crate::library::{Cue, CueId, CueType, NO_HOTCUE, Track, UNSET_POSITION};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowId(pub usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CueRow {
    pub row_id: RowId,
    /// Read-only position, `M:SS.FF`.
    pub duration: String,
    /// 1-based hotcue as typed by the user; blank for none.
    pub hotcue: String,
    pub label: String,
}

/// Columns the table can be sorted by.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum SortColumn {
    /// Build order.
    #[default]
    Row,
    Hotcue,
    Label,
}

impl SortColumn {
    pub fn next(self) -> Self {
        match self {
            SortColumn::Row => SortColumn::Hotcue,
            SortColumn::Hotcue => SortColumn::Label,
            SortColumn::Label => SortColumn::Row,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortColumn::Row => "position",
            SortColumn::Hotcue => "hotcue",
            SortColumn::Label => "label",
        }
    }
}

/// Format a cue position for display.
///
/// Positions count samples of interleaved stereo, hence the halving.
pub fn format_cue_position(position: i64, sample_rate: u32) -> String {
    if sample_rate == 0 {
        return "-:--.--".to_string();
    }

    let total_seconds = position as f64 / f64::from(sample_rate) / 2.0;
    let fraction = (100.0 * (total_seconds - total_seconds.floor())) as i64;
    let whole = total_seconds as i64;
    format!("{}:{:02}.{:02}", whole / 60, whole % 60, fraction)
}

/// Stored (0-based) hotcue to its 1-based display text.
pub fn hotcue_display(hotcue: i32) -> String {
    if hotcue < 0 {
        String::new()
    } else {
        (hotcue + 1).to_string()
    }
}

/// Displayed (1-based) hotcue text back to the stored value.
pub fn parse_hotcue(text: &str) -> i32 {
    match text.trim().parse::<i32>() {
        Ok(n) if n >= 1 => n - 1,
        _ => NO_HOTCUE,
    }
}

fn listed(cue: &Cue) -> bool {
    matches!(cue.kind, CueType::Regular | CueType::Load) && cue.position != UNSET_POSITION
}

/// Build the table rows for `cues` and the row-id to cue-id snapshot.
pub fn build_cue_rows(cues: &[Cue], sample_rate: u32) -> (Vec<CueRow>, BTreeMap<RowId, CueId>) {
    let mut rows = Vec::new();
    let mut snapshot = BTreeMap::new();

    for (i, cue) in cues.iter().filter(|c| listed(c)).enumerate() {
        let row_id = RowId(i);
        snapshot.insert(row_id, cue.id);
        rows.push(CueRow {
            row_id,
            duration: format_cue_position(cue.position, sample_rate),
            hotcue: hotcue_display(cue.hotcue),
            label: cue.label.clone(),
        });
    }

    (rows, snapshot)
}

/// Apply `edited` rows to `track`.
///
/// Rows update the hotcue and label of the cue they were built from; rows
/// whose id is not in `snapshot` any more, or whose cue is gone, are skipped.
/// Every snapshot entry without a row is a deleted cue: it is removed from
/// the track and from the snapshot. Returns the number of removed cues.
pub fn reconcile(
    snapshot: &mut BTreeMap<RowId, CueId>,
    edited: &[CueRow],
    track: &mut Track,
) -> usize {
    let mut updated: BTreeSet<RowId> = BTreeSet::new();

    for row in edited {
        let Some(&cue_id) = snapshot.get(&row.row_id) else {
            continue;
        };
        let Some(cue) = track.cue_mut(cue_id) else {
            continue;
        };

        updated.insert(row.row_id);
        cue.hotcue = parse_hotcue(&row.hotcue);
        cue.label = row.label.clone();
    }

    let deleted: Vec<RowId> = snapshot
        .keys()
        .filter(|row_id| !updated.contains(row_id))
        .copied()
        .collect();

    let mut removed = 0;
    for row_id in deleted {
        if let Some(cue_id) = snapshot.remove(&row_id) {
            if let Some(cue) = track.remove_cue(cue_id) {
                log::debug!("deleting cue {:?} (hotcue {})", cue.id, cue.hotcue);
                removed += 1;
            }
        }
    }
    removed
}

/// The rows shown in the editor together with their snapshot.
#[derive(Debug, Clone, Default)]
pub struct CueTable {
    rows: Vec<CueRow>,
    snapshot: BTreeMap<RowId, CueId>,
    sort: SortColumn,
}

impl CueTable {
    pub fn build(cues: &[Cue], sample_rate: u32) -> Self {
        let (rows, snapshot) = build_cue_rows(cues, sample_rate);
        Self {
            rows,
            snapshot,
            sort: SortColumn::Row,
        }
    }

    pub fn rows(&self) -> &[CueRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn sort_column(&self) -> SortColumn {
        self.sort
    }

    /// Cue a row was built from.
    pub fn cue_for(&self, row_id: RowId) -> Option<CueId> {
        self.snapshot.get(&row_id).copied()
    }

    pub fn set_hotcue(&mut self, index: usize, text: &str) -> bool {
        match self.rows.get_mut(index) {
            Some(row) => {
                row.hotcue = text.trim().to_string();
                true
            }
            None => false,
        }
    }

    pub fn set_label(&mut self, index: usize, text: &str) -> bool {
        match self.rows.get_mut(index) {
            Some(row) => {
                row.label = text.to_string();
                true
            }
            None => false,
        }
    }

    /// Remove the row at `index` from the table. The cue itself goes away on
    /// the next save.
    pub fn delete_row(&mut self, index: usize) -> Option<CueRow> {
        (index < self.rows.len()).then(|| self.rows.remove(index))
    }

    pub fn sort_by(&mut self, column: SortColumn) {
        self.sort = column;
        match column {
            SortColumn::Row => self.rows.sort_by_key(|r| r.row_id),
            SortColumn::Hotcue => self.rows.sort_by_key(|r| {
                let slot = parse_hotcue(&r.hotcue);
                (slot == NO_HOTCUE, slot, r.row_id)
            }),
            SortColumn::Label => self
                .rows
                .sort_by(|a, b| a.label.to_lowercase().cmp(&b.label.to_lowercase())),
        }
    }

    /// Write the table back to `track`. See [`reconcile`].
    pub fn reconcile(&mut self, track: &mut Track) -> usize {
        reconcile(&mut self.snapshot, &self.rows, track)
    }

    pub fn clear(&mut self) {
        self.rows.clear();
        self.snapshot.clear();
        self.sort = SortColumn::Row;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::TrackId;

    fn track_with_cues() -> Track {
        let mut t = Track::new(TrackId(0), "/music/a.mp3");
        t.sample_rate = 44100;
        t.add_cue(88200, CueType::Regular, 0, "one");
        t.add_cue(UNSET_POSITION, CueType::Regular, 1, "unset");
        t.add_cue(441000, CueType::Other, NO_HOTCUE, "loop");
        t.add_cue(0, CueType::Load, NO_HOTCUE, "load");
        t.add_cue(10_584_000, CueType::Regular, 7, "late");
        t
    }

    #[test]
    fn position_formatting_matches_worked_example() {
        assert_eq!(format_cue_position(88200, 44100), "1:00.00");
        assert_eq!(format_cue_position(0, 44100), "0:00.00");
        assert_eq!(format_cue_position(132300, 44100), "0:01.50");
        assert_eq!(format_cue_position(10_584_000, 44100), "2:00.00");
        assert_eq!(format_cue_position(88200, 0), "-:--.--");
    }

    #[test]
    fn hotcue_display_and_parse_are_offset_by_one() {
        assert_eq!(hotcue_display(0), "1");
        assert_eq!(hotcue_display(7), "8");
        assert_eq!(hotcue_display(NO_HOTCUE), "");

        assert_eq!(parse_hotcue("1"), 0);
        assert_eq!(parse_hotcue(" 8 "), 7);
        assert_eq!(parse_hotcue(""), NO_HOTCUE);
        assert_eq!(parse_hotcue("x"), NO_HOTCUE);
        assert_eq!(parse_hotcue("0"), NO_HOTCUE);
        assert_eq!(parse_hotcue("-3"), NO_HOTCUE);
    }

    #[test]
    fn build_keeps_listed_cues_in_order_with_sequential_row_ids() {
        let t = track_with_cues();
        let (rows, snapshot) = build_cue_rows(t.cue_points(), t.sample_rate);

        let ids: Vec<RowId> = rows.iter().map(|r| r.row_id).collect();
        assert_eq!(ids, vec![RowId(0), RowId(1), RowId(2)]);
        let labels: Vec<&str> = rows.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["one", "load", "late"]);
        assert_eq!(rows[0].duration, "1:00.00");
        assert_eq!(rows[0].hotcue, "1");
        assert_eq!(rows[1].hotcue, "");
        assert_eq!(rows[2].hotcue, "8");

        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot[&RowId(1)], t.cue_points()[3].id);
    }

    #[test]
    fn reconcile_updates_edits_and_removes_exactly_the_missing_rows() {
        let mut t = track_with_cues();
        let mut table = CueTable::build(t.cue_points(), t.sample_rate);
        let load_id = table.cue_for(RowId(1)).unwrap();

        assert!(table.set_hotcue(0, "3"));
        assert!(table.set_label(0, "drop"));
        assert!(table.set_hotcue(2, "nope"));
        assert!(table.delete_row(1).is_some());

        let removed = table.reconcile(&mut t);
        assert_eq!(removed, 1);
        assert!(t.cue(load_id).is_none());
        assert_eq!(t.cue_points().len(), 4);

        let first = &t.cue_points()[0];
        assert_eq!(first.hotcue, 2);
        assert_eq!(first.label, "drop");
        let late = t.cue_points().iter().find(|c| c.label == "late").unwrap();
        assert_eq!(late.hotcue, NO_HOTCUE);

        // Cues the table never listed are untouched.
        assert!(t.cue_points().iter().any(|c| c.label == "unset"));
        assert!(t.cue_points().iter().any(|c| c.label == "loop"));
    }

    #[test]
    fn reconcile_is_idempotent() {
        let mut t = track_with_cues();
        let mut table = CueTable::build(t.cue_points(), t.sample_rate);
        table.set_label(2, "outro");
        table.delete_row(0);

        table.reconcile(&mut t);
        let once = t.cue_points().to_vec();
        assert_eq!(table.reconcile(&mut t), 0);
        assert_eq!(t.cue_points(), once.as_slice());
    }

    #[test]
    fn sorting_does_not_change_which_cue_a_row_edits() {
        let mut t = track_with_cues();
        let mut table = CueTable::build(t.cue_points(), t.sample_rate);

        table.sort_by(SortColumn::Label);
        let labels: Vec<&str> = table.rows().iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["late", "load", "one"]);

        // Row 0 is now "late"; editing it must edit the "late" cue.
        table.set_label(0, "very late");
        table.sort_by(SortColumn::Hotcue);
        assert_eq!(table.rows().last().unwrap().label, "load");

        table.reconcile(&mut t);
        assert!(t.cue_points().iter().any(|c| c.label == "very late" && c.hotcue == 7));
        assert!(t.cue_points().iter().any(|c| c.label == "one" && c.hotcue == 0));
        assert_eq!(t.cue_points().len(), 5);
    }

    #[test]
    fn rows_whose_cue_disappeared_are_skipped() {
        let mut t = track_with_cues();
        let mut table = CueTable::build(t.cue_points(), t.sample_rate);
        let gone = table.cue_for(RowId(0)).unwrap();
        t.remove_cue(gone);

        table.set_label(0, "ignored");
        assert_eq!(table.reconcile(&mut t), 0);
        assert!(!t.cue_points().iter().any(|c| c.label == "ignored"));
    }

    #[test]
    fn out_of_range_edits_are_rejected() {
        let mut table = CueTable::default();
        assert!(!table.set_label(0, "x"));
        assert!(!table.set_hotcue(3, "1"));
        assert!(table.delete_row(0).is_none());
    }
}
