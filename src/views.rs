//! Server-rendered HTML pages for the dashboard and stats routes

use std::collections::HashMap;
use std::fmt::Write;

use crate::models::{format_bytes, FileStats, StoredFile};

const STYLE: &str = r#"
    body { font-family: Arial, sans-serif; margin: 40px; background-color: #f8f9fa; }
    h1 { color: #007bff; }
    h2 { margin-top: 30px; }
    form { margin-bottom: 20px; }
    table { width: 70%; border-collapse: collapse; margin-top: 10px; }
    th, td { border: 1px solid #ccc; padding: 8px; text-align: left; }
    th { background-color: #007bff; color: white; }
    a { text-decoration: none; color: #007bff; }
"#;

/// Escape text for use in HTML content and attribute values
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n{body}</body>\n</html>\n",
        title = escape_html(title),
    )
}

/// Upload form plus the uploaded and processed file tables
///
/// `ids` maps on-disk paths to index rows; files without a row get no
/// delete link.
pub fn render_dashboard(
    uploads: &[StoredFile],
    ids: &HashMap<String, i64>,
    processed: &[StoredFile],
) -> String {
    let mut body = String::new();

    body.push_str("<h1>File Dashboard</h1>\n");
    body.push_str(
        "<form action=\"/upload\" method=\"post\" enctype=\"multipart/form-data\">\n\
         <input type=\"file\" name=\"file\">\n\
         <button type=\"submit\">Upload</button>\n\
         </form>\n",
    );
    body.push_str("<p><a href=\"/stats\">Storage statistics</a></p>\n");

    body.push_str("<h2>Uploaded Files</h2>\n");
    if uploads.is_empty() {
        body.push_str("<p>No files uploaded yet</p>\n");
    } else {
        body.push_str(
            "<table>\n<tr><th>Name</th><th>Category</th><th>Size (KB)</th><th>Modified</th><th>Actions</th></tr>\n",
        );
        for file in uploads {
            let encoded = urlencoding::encode(&file.name);
            let delete = ids
                .get(&*file.path.to_string_lossy())
                .map(|id| format!(" | <a href=\"/delete/{}\">Delete</a>", id))
                .unwrap_or_default();
            let _ = writeln!(
                body,
                "<tr><td>{name}</td><td>{category}</td><td>{size:.2}</td><td>{modified}</td>\
                 <td><a href=\"/uploads/{encoded}\" target=\"_blank\">View</a> | \
                 <a href=\"/download/{encoded}\">Download</a>{delete}</td></tr>",
                name = escape_html(&file.name),
                category = escape_html(&file.category),
                size = file.size_kb(),
                modified = escape_html(&file.modified),
            );
        }
        body.push_str("</table>\n");
    }

    body.push_str("<h2>Processed Files</h2>\n");
    if processed.is_empty() {
        body.push_str("<p>No processed files</p>\n");
    } else {
        body.push_str("<table>\n<tr><th>Name</th><th>Link</th></tr>\n");
        for file in processed {
            let _ = writeln!(
                body,
                "<tr><td>{}</td><td><a href=\"/processed/{}\" target=\"_blank\">View</a></td></tr>",
                escape_html(&file.name),
                urlencoding::encode(&file.name),
            );
        }
        body.push_str("</table>\n");
    }

    page("File Dashboard", &body)
}

/// Totals and per-category counts from the metadata index
pub fn render_stats(stats: &FileStats) -> String {
    let mut body = String::new();

    body.push_str("<h1>Storage Statistics</h1>\n");
    let _ = writeln!(
        body,
        "<p>Total files: <strong id=\"total-files\">{}</strong></p>",
        stats.total_files
    );
    let _ = writeln!(
        body,
        "<p>Total size: <strong id=\"total-size\">{:.2}</strong> KB \
         (<span id=\"total-size-human\">{}</span>)</p>",
        stats.total_size_kb,
        format_bytes(stats.total_size_bytes.max(0) as u64)
    );

    body.push_str("<h2>Files by Category</h2>\n");
    body.push_str("<table>\n<tr><th>Category</th><th>Files</th></tr>\n");
    for entry in &stats.categories {
        let _ = writeln!(
            body,
            "<tr><td>{}</td><td>{}</td></tr>",
            escape_html(&entry.category),
            entry.count
        );
    }
    body.push_str("</table>\n");
    body.push_str("<p><a href=\"/dashboard\">Back to dashboard</a></p>\n");

    page("Storage Statistics", &body)
}
