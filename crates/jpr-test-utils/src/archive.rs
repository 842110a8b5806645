//! In-memory plugin and base distribution archives.

use std::io::{Cursor, Write};

use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use jpr_core::manifest::MANIFEST_PATH;
use jpr_core::war::DETACHED_PLUGINS_DIR;

/// Manifest text for a plugin, CRLF terminated like real manifests.
///
/// `dependencies` is the raw `Plugin-Dependencies` value; pass `""` for a
/// plugin without dependencies. Values longer than a manifest line are
/// folded onto continuation lines.
pub fn plugin_manifest(name: &str, version: &str, dependencies: &str) -> String {
    let mut manifest = String::from("Manifest-Version: 1.0\r\n");
    manifest.push_str(&format!("Long-Name: {name} plugin\r\n"));
    manifest.push_str(&format!("Short-Name: {name}\r\n"));
    manifest.push_str(&format!("Plugin-Version: {version}\r\n"));
    if !dependencies.is_empty() {
        manifest.push_str(&fold(&format!("Plugin-Dependencies: {dependencies}")));
    }
    manifest.push_str("\r\n");
    manifest
}

/// Split a header line into 72-byte manifest lines.
fn fold(line: &str) -> String {
    let mut out = String::new();
    let mut rest = line;
    let mut width = 72;
    while rest.len() > width {
        let (head, tail) = rest.split_at(width);
        out.push_str(head);
        out.push_str("\r\n ");
        rest = tail;
        width = 71;
    }
    out.push_str(rest);
    out.push_str("\r\n");
    out
}

/// Zip archive holding the given entries.
pub fn zip_archive(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in entries {
        writer
            .start_file(*name, SimpleFileOptions::default())
            .expect("start zip entry");
        writer.write_all(content).expect("write zip entry");
    }
    writer.finish().expect("finish zip").into_inner()
}

/// A plugin archive (`.hpi`) with a manifest for `name:version`.
pub fn plugin_archive(name: &str, version: &str, dependencies: &str) -> Vec<u8> {
    let manifest = plugin_manifest(name, version, dependencies);
    zip_archive(&[
        (MANIFEST_PATH, manifest.as_bytes()),
        ("index.jelly", &b"<div/>"[..]),
    ])
}

/// A Jenkins WAR bundling the given plugins as detached plugins.
///
/// Each plugin is `(name, version, dependencies)`. When `list_in_manifest`
/// is set, the WAR manifest names every detached plugin entry the way
/// signed WARs do.
pub fn distribution_archive(
    version: &str,
    plugins: &[(&str, &str, &str)],
    list_in_manifest: bool,
) -> Vec<u8> {
    let nested: Vec<(String, Vec<u8>)> = plugins
        .iter()
        .map(|(name, plugin_version, dependencies)| {
            (
                format!("{DETACHED_PLUGINS_DIR}{name}.hpi"),
                plugin_archive(name, plugin_version, dependencies),
            )
        })
        .collect();

    let mut manifest = format!("Manifest-Version: 1.0\r\nJenkins-Version: {version}\r\n\r\n");
    if list_in_manifest {
        for (entry, _) in &nested {
            manifest.push_str(&format!("Name: {entry}\r\nSHA-256-Digest: AAAA\r\n\r\n"));
        }
    }

    let mut entries: Vec<(&str, &[u8])> = vec![(MANIFEST_PATH, manifest.as_bytes())];
    entries.extend(nested.iter().map(|(entry, bytes)| (entry.as_str(), bytes.as_slice())));
    zip_archive(&entries)
}
