//! HTML rendering for the file library pages. Pure functions of their input.

use crate::utils::html::{escape_html, format_size};
use chrono::{DateTime, Utc};

/// One table row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub filename: String,
    pub href: String,
    pub size: i64,
    pub last_modified: Option<DateTime<Utc>>,
}

/// Text that differs between the dynamic (presigned) and static (relative link) pages
pub struct PageVariant {
    pub title_suffix: &'static str,
    pub subtitle: &'static str,
    pub info_title: &'static str,
    pub info_text: &'static str,
    pub footer: &'static str,
}

pub const DYNAMIC_PAGE: PageVariant = PageVariant {
    title_suffix: "",
    subtitle: "Your personal book library in the cloud",
    info_title: "💡 How to add files:",
    info_text: "Send EPUB or PDF files to the Telegram bot, or send direct download URLs. \
                Files will appear here automatically.",
    footer: "Powered by AWS Lambda • Files are stored securely in S3",
};

pub const STATIC_PAGE: PageVariant = PageVariant {
    title_suffix: " (Static)",
    subtitle: "Static S3 Website - Direct file access",
    info_title: "🌐 Static Website:",
    info_text: "This page is hosted directly on S3 with relative file links. \
                Files are accessible without expiring URLs. Add files via the Telegram bot \
                and they'll appear here automatically.",
    footer: "Static S3 Website • Files accessible via direct links",
};

const PAGE_CSS: &str = r#"
        body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; margin: 0; padding: 20px; background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); min-height: 100vh; }
        .container { max-width: 900px; margin: 0 auto; background: white; border-radius: 12px; box-shadow: 0 8px 32px rgba(0,0,0,0.1); overflow: hidden; }
        .header { background: linear-gradient(135deg, #2196F3, #21CBF3); color: white; padding: 30px; text-align: center; }
        .header h1 { margin: 0; font-size: 2em; font-weight: 300; }
        .content { padding: 30px; }
        .info-box { background: #f8f9fa; border-left: 4px solid #2196F3; padding: 20px; margin-bottom: 30px; border-radius: 0 8px 8px 0; }
        .stats { display: flex; gap: 20px; margin-bottom: 30px; flex-wrap: wrap; }
        .stat { background: #f1f3f4; padding: 15px 20px; border-radius: 8px; flex: 1; min-width: 120px; text-align: center; }
        .stat-number { font-size: 1.5em; font-weight: bold; color: #2196F3; }
        .stat-label { color: #666; font-size: 0.9em; margin-top: 5px; }
        table { width: 100%; border-collapse: collapse; background: white; border-radius: 8px; overflow: hidden; box-shadow: 0 2px 8px rgba(0,0,0,0.1); }
        th, td { padding: 15px; text-align: left; border-bottom: 1px solid #eee; }
        th { background: #f8f9fa; font-weight: 600; color: #333; }
        tr:hover { background: #f8f9fa; }
        a { color: #2196F3; text-decoration: none; font-weight: 500; }
        a:hover { text-decoration: underline; }
        .refresh-btn { display: inline-block; background: #2196F3; color: white; padding: 12px 24px; border-radius: 6px; text-decoration: none; margin-top: 20px; }
        .refresh-btn:hover { background: #1976D2; color: white; text-decoration: none; }
        .footer { text-align: center; padding: 20px; color: #666; border-top: 1px solid #eee; margin-top: 30px; }
"#;

pub const ERROR_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>📚 File Not Found</title>
    <style>
        body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; margin: 0; padding: 20px; background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); min-height: 100vh; display: flex; align-items: center; justify-content: center; }
        .container { max-width: 500px; background: white; border-radius: 12px; box-shadow: 0 8px 32px rgba(0,0,0,0.1); padding: 40px; text-align: center; }
        h1 { color: #2196F3; font-size: 3em; margin: 0 0 20px 0; }
        p { color: #666; font-size: 1.2em; margin-bottom: 30px; }
        .btn { display: inline-block; background: #2196F3; color: white; padding: 12px 24px; border-radius: 6px; text-decoration: none; }
    </style>
</head>
<body>
    <div class="container">
        <h1>📚</h1>
        <h2>File Not Found</h2>
        <p>The file you're looking for doesn't exist or has been moved.</p>
        <a href="/" class="btn">← Back to File Library</a>
    </div>
</body>
</html>
"#;

pub fn render_page(entries: &[ListingEntry], variant: &PageVariant) -> String {
    let total_bytes: i64 = entries.iter().map(|e| e.size).sum();
    let total_mb = total_bytes as f64 / (1024.0 * 1024.0);

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>📚 Bookshelf{title_suffix}</title>
    <style>{css}</style>
</head>
<body>
    <div class="container">
        <div class="header">
            <h1>📚 Bookshelf</h1>
            <p>{subtitle}</p>
        </div>
        <div class="content">
            <div class="info-box">
                <strong>{info_title}</strong><br>
                {info_text}
            </div>
            <div class="stats">
                <div class="stat">
                    <div class="stat-number">{count}</div>
                    <div class="stat-label">Total Files</div>
                </div>
                <div class="stat">
                    <div class="stat-number">{total_mb:.1}</div>
                    <div class="stat-label">Total MB</div>
                </div>
            </div>
            <table>
                <thead>
                    <tr>
                        <th>📖 Filename</th>
                        <th>📊 Size</th>
                        <th>📅 Uploaded</th>
                    </tr>
                </thead>
                <tbody>
{rows}
                </tbody>
            </table>
            <a href="javascript:location.reload()" class="refresh-btn">🔄 Refresh</a>
            <div class="footer">
                <p>{footer}</p>
            </div>
        </div>
    </div>
</body>
</html>
"#,
        title_suffix = variant.title_suffix,
        css = PAGE_CSS,
        subtitle = variant.subtitle,
        info_title = variant.info_title,
        info_text = variant.info_text,
        count = entries.len(),
        total_mb = total_mb,
        rows = render_rows(entries),
        footer = variant.footer,
    )
}

pub fn render_rows(entries: &[ListingEntry]) -> String {
    if entries.is_empty() {
        return r#"                    <tr><td colspan="3" style="text-align: center; color: #666;">No files uploaded yet</td></tr>"#
            .to_string();
    }

    entries
        .iter()
        .map(|entry| {
            let filename = escape_html(&entry.filename);
            let uploaded = entry
                .last_modified
                .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "-".to_string());
            format!(
                r#"                    <tr>
                        <td><a href="{href}" download="{filename}">{filename}</a></td>
                        <td>{size}</td>
                        <td>{uploaded}</td>
                    </tr>"#,
                href = escape_html(&entry.href),
                filename = filename,
                size = format_size(entry.size),
                uploaded = uploaded,
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Small page returned with a 500 when the listing cannot be built
pub fn render_error(message: &str) -> String {
    format!(
        "<html><body><h1>Error</h1><p>{}</p></body></html>",
        escape_html(message)
    )
}
