//! Access-code derivation and bulk-import numbering.
//!
//! An access code is the concatenation of grade, course, and the
//! two-digit zero-padded list number, e.g. grade 6 course 1 list 3 gives
//! "6103". Import assigns list numbers per (grade, course) group,
//! sequentially from 1, continuing after the group's current maximum when
//! appending to an existing group.

use std::collections::HashMap;

/// Rows are inserted in batches of this size; a failed batch falls back
/// to per-row insertion so one bad row does not block the rest.
pub const IMPORT_BATCH_SIZE: usize = 100;

/// Upper bound on placeholder students created by generate-codes.
pub const MAX_GENERATED_CODES: i32 = 200;

/// Derive the access code for a student position.
pub fn access_code(grade: i32, course: i32, list_number: i32) -> String {
    format!("{}{}{:02}", grade, course, list_number)
}

/// A validated row accepted for import.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportRow {
    pub full_name: String,
    pub grade: i32,
    pub course: i32,
}

/// An import row with its assigned position and derived code.
#[derive(Debug, Clone, PartialEq)]
pub struct NumberedRow {
    pub full_name: String,
    pub grade: i32,
    pub course: i32,
    pub list_number: i32,
    pub access_code: String,
}

/// Assign list numbers to import rows.
///
/// `existing_max` holds the current maximum list number per
/// (grade, course) group; groups absent from the map start at 1. Input
/// order is preserved, so rows within a group are numbered in the order
/// they were supplied.
pub fn assign_list_numbers(
    rows: Vec<ImportRow>,
    existing_max: &HashMap<(i32, i32), i32>,
) -> Vec<NumberedRow> {
    let mut counters: HashMap<(i32, i32), i32> = existing_max.clone();

    rows.into_iter()
        .map(|row| {
            let counter = counters.entry((row.grade, row.course)).or_insert(0);
            *counter += 1;
            let list_number = *counter;
            NumberedRow {
                access_code: access_code(row.grade, row.course, list_number),
                full_name: row.full_name,
                grade: row.grade,
                course: row.course,
                list_number,
            }
        })
        .collect()
}
