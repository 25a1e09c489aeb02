#![allow(dead_code)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use serde_json::Value;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

pub struct TestEnv {
    _tmp: TempDir,
    pub root: PathBuf,
}

impl TestEnv {
    /// A project root with the attribute table in place and no servers yet.
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let root = tmp.path().join("project");
        fs::create_dir_all(root.join("servers")).expect("create servers dir");
        write_license_table(&root);
        Self { _tmp: tmp, root }
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("modlic");
        cmd.env_remove("RUST_LOG")
            .arg("--root")
            .arg(&self.root)
            .arg("--log-level")
            .arg("warn");
        cmd
    }

    pub fn run_json(&self, args: &[&str]) -> Value {
        let out = self
            .cmd()
            .arg("--json")
            .args(args)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        serde_json::from_slice(&out).expect("valid json output")
    }

    pub fn run_json_failure(&self, args: &[&str]) -> Value {
        let out = self
            .cmd()
            .arg("--json")
            .args(args)
            .assert()
            .failure()
            .get_output()
            .stdout
            .clone();
        serde_json::from_slice(&out).expect("valid json error envelope")
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.root.join(rel)
    }

    pub fn read_json(&self, rel: &str) -> Value {
        let raw = fs::read_to_string(self.path(rel)).expect("read json file");
        serde_json::from_str(&raw).expect("parse json file")
    }

    pub fn mods_dir(&self, server: &str, bucket: Option<&str>) -> PathBuf {
        let mut dir = self.root.join("servers").join(server).join("forgemods");
        if let Some(b) = bucket {
            dir = dir.join(b);
        }
        fs::create_dir_all(&dir).expect("create mods dir");
        dir
    }

    /// Writes an archive whose `META-INF/mods.toml` holds `manifest`.
    pub fn add_jar(&self, server: &str, bucket: Option<&str>, file: &str, manifest: &str) -> PathBuf {
        let path = self.mods_dir(server, bucket).join(file);
        write_jar(&path, &[("META-INF/mods.toml", manifest.as_bytes())]);
        path
    }

    pub fn add_link(&self, server: &str, file: &str, descriptor: Value) -> PathBuf {
        let path = self.mods_dir(server, None).join(file);
        fs::write(
            &path,
            serde_json::to_string_pretty(&descriptor).expect("serialize descriptor"),
        )
        .expect("write descriptor");
        path
    }

    pub fn write_canonical(&self, rows: Value) {
        fs::write(
            self.path("modlicense.json"),
            serde_json::to_string_pretty(&rows).expect("serialize canonical table"),
        )
        .expect("write canonical table");
    }
}

pub fn mod_manifest(id: &str, license: Option<&str>) -> String {
    let mut text = String::from("modLoader=\"javafml\"\nloaderVersion=\"[47,)\"\n");
    if let Some(l) = license {
        text.push_str(&format!("license=\"{l}\"\n"));
    }
    text.push_str(&format!(
        "[[mods]]\nmodId=\"{id}\"\nversion=\"1.0.0\"\ndisplayName=\"{id} display\"\nauthors=\"{id} team\"\n"
    ));
    text
}

pub fn write_jar(path: &Path, entries: &[(&str, &[u8])]) {
    let file = fs::File::create(path).expect("create jar");
    let mut zip = zip::ZipWriter::new(file);
    for (name, body) in entries {
        zip.start_file(*name, SimpleFileOptions::default())
            .expect("start zip entry");
        zip.write_all(body).expect("write zip entry");
    }
    zip.finish().expect("finish jar");
}

fn write_license_table(root: &Path) {
    let table = serde_json::json!([
        {"name": "MIT", "shouldRightsNotation": true, "canSecondaryDistribution": true, "url": "https://opensource.org/license/mit"},
        {"name": "All Rights Reserved", "shouldRightsNotation": false, "canSecondaryDistribution": false, "url": ""},
        {"name": "CC0-1.0", "shouldRightsNotation": false, "canSecondaryDistribution": true, "url": ""}
    ]);
    fs::write(
        root.join("license.json"),
        serde_json::to_string_pretty(&table).expect("serialize license table"),
    )
    .expect("write license table");
}
