// ⚙️ Settings: backup download & restore upload

use super::render::{self, Nav};
use super::session::{self, redirect_with, Flash, IncomingFlash};
use super::{AppState, WebError, WebResult};
use crate::backup::{export_zip, restore_file};
use crate::db::{count_rows, TABLES};
use axum::extract::{Multipart, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use tracing::{info, warn};

const UPLOAD_FIELD: &str = "backup_file";

/// Request body cap for backup uploads (axum's default of 2 MB is too small)
pub const MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;
const SETTINGS: &str = "/settings";

/// GET /settings
pub async fn index(State(state): State<AppState>, flash: IncomingFlash) -> WebResult<Response> {
    let counts = {
        let conn = state.conn()?;
        let mut counts = Vec::with_capacity(TABLES.len());
        for table in TABLES.iter().rev() {
            counts.push((*table, count_rows(&conn, table)?));
        }
        counts
    };

    let rows: String = counts
        .iter()
        .map(|(table, n)| format!("<tr><td>{}</td><td>{}</td></tr>", table, n))
        .collect();

    let content = format!(
        r#"<h1>Settings</h1>
<section class="card"><h2>Download Backup</h2>
<p>A ZIP with every record as JSON plus a read-me page you can open in any browser.</p>
<p><a class="button" href="/settings/download">Download Backup</a></p></section>
<section class="card"><h2>Restore</h2>
<p class="warning">Restoring replaces <strong>all</strong> current data.</p>
<form method="post" action="/settings/upload" enctype="multipart/form-data" onsubmit="return confirm('Replace all data with this backup?')">
<input type="file" name="{field}" accept=".zip,.json"> <button type="submit">Restore</button></form></section>
<section class="card"><h2>Database</h2><table><tbody>{rows}</tbody></table></section>"#,
        field = UPLOAD_FIELD,
        rows = rows
    );

    Ok(session::page(&flash, render::layout("Settings", Nav::Settings, flash.get(), &content)))
}

/// GET /settings/download
pub async fn download(State(state): State<AppState>) -> WebResult<Response> {
    let now = chrono::Local::now().naive_local();
    let bytes = export_zip(&*state.conn()?, now)?;
    let disposition = format!(r#"attachment; filename="estate_backup_{}.zip""#, now.format("%Y%m%d"));

    info!(bytes = bytes.len(), "backup downloaded");
    Ok((
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

/// POST /settings/upload (multipart, field `backup_file`)
pub async fn upload(State(state): State<AppState>, mut multipart: Multipart) -> WebResult<Response> {
    let mut upload: Option<(String, Vec<u8>)> = None;

    // Read the body before touching the database lock
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| WebError::BadRequest(e.to_string()))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or("").to_string();
        let bytes = field.bytes().await.map_err(|e| WebError::BadRequest(e.to_string()))?;
        upload = Some((file_name, bytes.to_vec()));
        break;
    }

    let (file_name, bytes) = match upload {
        Some(found) => found,
        None => return Ok(redirect_with(SETTINGS, Flash::error("No file part"))),
    };
    if file_name.is_empty() {
        return Ok(redirect_with(SETTINGS, Flash::error("No selected file")));
    }

    let outcome = restore_file(&*state.conn()?, &file_name, &bytes);
    match outcome {
        Ok(stats) => {
            info!(file_name = %file_name, "{}", stats.summary());
            Ok(redirect_with("/", Flash::success("Database restored successfully.")))
        }
        Err(err) => {
            warn!(file_name = %file_name, "restore rejected: {}", err);
            Ok(redirect_with(SETTINGS, Flash::error(err.to_string())))
        }
    }
}
