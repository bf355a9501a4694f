use importer_core::pipeline::ImportReport;

pub const BANNER: &str = "media-import: a command line tool for importing photos, video and music.

Sample usage:

\tmedia-import --from /media/usb/DCIM --to ~/Photos --dry-run
";

pub fn render(report: &ImportReport, json: bool) -> anyhow::Result<String> {
    if json {
        return Ok(serde_json::to_string_pretty(report)?);
    }
    let mut out = report.summary.to_string();
    if report.walk.unreadable > 0 {
        out.push_str(&format!("\nUnreadable entries: {}", report.walk.unreadable));
    }
    if report.cancelled {
        out.push_str(&format!(
            "\nInterrupted after {} file(s); run again to import the rest.",
            report.submitted
        ));
    }
    Ok(out)
}
