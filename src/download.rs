//! Release archive identifier for the managed agent. Informational only; nothing here
//! downloads anything.

use crate::facts::HostFacts;

/// `{base}{version}/{package}_{version}_{kernel}_{arch}.{extension}`
pub fn download_url(
    base: &str,
    package: &str,
    version: &str,
    facts: &HostFacts,
    extension: &str,
) -> String {
    let base = if base.ends_with('/') {
        base.to_string()
    } else {
        format!("{}/", base)
    };
    format!(
        "{base}{version}/{package}_{version}_{kernel}_{arch}.{extension}",
        base = base,
        version = version,
        package = package,
        kernel = facts.kernel,
        arch = facts.arch,
        extension = extension.trim_start_matches('.'),
    )
}
