// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! CSV rendering of the rota.
//!
//! One row per assignment, in rota order. Times are site-local.

use rotaplan_domain::{RotaDay, RotaEntry, SiteTimezone};
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, Time};

use crate::error::ApiError;

/// Column headers of the export.
pub const ROTA_CSV_HEADERS: [&str; 7] = ["date", "start", "end", "session", "staff", "role", "status"];

const CLOCK_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[hour]:[minute]");

/// Renders rota days as CSV.
///
/// # Arguments
///
/// * `days` - The rota, as built for the requested range
/// * `timezone` - The site timezone start and end times are shown in
///
/// # Errors
///
/// Returns `ApiError::Internal` if a time cannot be converted or the writer
/// fails.
pub fn render_rota_csv(days: &[RotaDay], timezone: &SiteTimezone) -> Result<String, ApiError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(ROTA_CSV_HEADERS).map_err(csv_error)?;

    for day in days {
        let date: String = day.date.to_string();
        for entry in &day.entries {
            let record: [String; 7] = render_entry(&date, entry, timezone)?;
            writer.write_record(&record).map_err(csv_error)?;
        }
    }

    let bytes: Vec<u8> = writer.into_inner().map_err(|e| ApiError::Internal {
        message: format!("Failed to finish rota CSV: {e}"),
    })?;
    String::from_utf8(bytes).map_err(|e| ApiError::Internal {
        message: format!("Rota CSV is not UTF-8: {e}"),
    })
}

fn render_entry(
    date: &str,
    entry: &RotaEntry,
    timezone: &SiteTimezone,
) -> Result<[String; 7], ApiError> {
    let (_, start): (Date, Time) = timezone
        .local_date_time(entry.session_start)
        .map_err(crate::error::translate_domain_error)?;
    let (_, end): (Date, Time) = timezone
        .local_date_time(entry.session_end)
        .map_err(crate::error::translate_domain_error)?;

    Ok([
        date.to_string(),
        format_clock(start)?,
        format_clock(end)?,
        entry.session_title.clone(),
        entry.staff_display_name.clone(),
        entry.assignment.role.clone(),
        entry.assignment.status.as_str().to_string(),
    ])
}

fn format_clock(time: Time) -> Result<String, ApiError> {
    time.format(CLOCK_FORMAT).map_err(|e| ApiError::Internal {
        message: format!("Failed to format time {time}: {e}"),
    })
}

fn csv_error(err: csv::Error) -> ApiError {
    ApiError::Internal {
        message: format!("Failed to write rota CSV: {err}"),
    }
}
