//! Apply command presentation.

use crate::provision::RunReport;

pub fn format_report_text(report: &RunReport) -> String {
    let mut output = if report.dry_run {
        String::from("Dry run (no changes made):\n")
    } else {
        String::from("Provisioning complete:\n")
    };

    let verb = if report.dry_run { "would be" } else { "was" };
    output.push_str(&format!(
        "  config:    {} ({} {})\n",
        report.config_path.display(),
        verb,
        report.write.as_str()
    ));

    if let Some(ref data_dir) = report.derived.data_dir {
        let state = if report.data_dir_created {
            if report.dry_run {
                " (would be created)"
            } else {
                " (created)"
            }
        } else {
            ""
        };
        output.push_str(&format!("  data_dir:  {}{}\n", data_dir, state));
    }

    output.push_str(&format!(
        "  rpc:       {}:{}\n",
        report.derived.rpc_addr, report.derived.rpc_port
    ));

    match report.notified {
        Some(action) if report.dry_run => {
            output.push_str(&format!("  service:   would {}\n", action));
        }
        Some(action) => output.push_str(&format!("  service:   {}ed\n", action)),
        None => output.push_str("  service:   not notified\n"),
    }

    let stages: Vec<&str> = report.stages.iter().map(|s| s.as_str()).collect();
    output.push_str(&format!("  stages:    {}", stages.join(" -> ")));
    output
}

pub fn format_report_json(report: &RunReport) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}
