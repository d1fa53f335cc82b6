use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const INVOICE: &str = "\
Wallenstam AB
Hyresavi
Lägenhet 1001

Hyra
Kallvatten 4,2 m3
Varmvatten 1,8 m3
El enligt mätare 120 kWh

2 500
75
125
100

Moms: 700

Förfallodatum: 2023-11-01

Totalt att betala:

3 500

OCR 1297534008 #
";

/// Command with config lookups pointed at an empty directory.
fn hyresavi(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("hyresavi").unwrap();
    cmd.env("HOME", home).env("XDG_CONFIG_HOME", home.join(".config"));
    cmd
}

fn write_invoice(dir: &TempDir, name: &str, text: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, text).unwrap();
    path
}

#[test]
fn process_prints_json_record() {
    let dir = TempDir::new().unwrap();
    let path = write_invoice(&dir, "Hyresavi_1297534008.txt", INVOICE);

    let output = hyresavi(dir.path())
        .args(["process", "--quiet", "--user", "user_1"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["UserID"], "user_1");
    assert_eq!(json["InvoiceID"], "Invoice_1297534008");
    assert_eq!(json["Due Date"], "01-11-2023");
    assert_eq!(json["due_date_month"], 11);
    assert_eq!(json["due_date_year"], 2023);
    assert_eq!(json["Total Amount"], "3,500");
    assert_eq!(json["Moms"], "700");
    assert_eq!(json["Hyra"], "2,500");
    assert_eq!(json["El"], "100");
    assert_eq!(json["Filename"], "Hyresavi_1297534008");
}

#[test]
fn process_reports_structural_mismatch() {
    let dir = TempDir::new().unwrap();
    let path = write_invoice(&dir, "Hyresavi_1.txt", &INVOICE.replace("125\n", ""));

    hyresavi(dir.path())
        .args(["process", "--quiet"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("structural mismatch"));
}

#[test]
fn process_rejects_unsupported_format() {
    let dir = TempDir::new().unwrap();
    let path = write_invoice(&dir, "scan.png", "not an image");

    hyresavi(dir.path())
        .args(["process", "--quiet"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported file format"));
}

#[test]
fn process_skips_month_already_in_store() {
    let dir = TempDir::new().unwrap();
    let store = dir.path().join("invoices.json");
    let first = write_invoice(&dir, "Hyresavi_1.txt", INVOICE);
    let second = write_invoice(&dir, "Hyresavi_2.txt", INVOICE);

    hyresavi(dir.path())
        .args(["process", "--quiet", "--user", "user_1", "--store"])
        .arg(&store)
        .arg(&first)
        .assert()
        .success()
        .stderr(predicate::str::contains("Stored Invoice_1"));

    hyresavi(dir.path())
        .args(["process", "--quiet", "--user", "user_1", "--store"])
        .arg(&store)
        .arg(&second)
        .assert()
        .success()
        .stderr(predicate::str::contains("11/2023 has already been processed"));

    let stored: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&store).unwrap()).unwrap();
    assert_eq!(stored.as_array().unwrap().len(), 1);
    assert_eq!(stored[0]["InvoiceID"], "Invoice_1");
}

#[test]
fn batch_writes_outputs_and_summary() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in");
    fs::create_dir(&input).unwrap();
    fs::write(input.join("Hyresavi_1.txt"), INVOICE).unwrap();
    fs::write(
        input.join("Hyresavi_2.txt"),
        INVOICE.replace("2023-11-01", "2023-12-01"),
    )
    .unwrap();
    fs::write(input.join("Hyresavi_3.txt"), INVOICE.replace("75\n", "")).unwrap();
    fs::write(input.join("Hyresavi_4.txt"), INVOICE).unwrap();
    let out = dir.path().join("out");

    hyresavi(dir.path())
        .args(["batch", "--summary", "--continue-on-error", "-j", "2"])
        .arg(format!("{}/*.txt", input.display()))
        .arg("--output-dir")
        .arg(&out)
        .assert()
        .success();

    assert!(out.join("Hyresavi_1.json").exists());
    assert!(out.join("Hyresavi_2.json").exists());
    assert!(!out.join("Hyresavi_3.json").exists());
    assert!(!out.join("Hyresavi_4.json").exists());

    let summary = fs::read_to_string(out.join("summary.csv")).unwrap();
    let statuses: Vec<&str> = summary
        .lines()
        .skip(1)
        .map(|line| line.split(',').nth(1).unwrap())
        .collect();
    assert_eq!(statuses, vec!["success", "success", "error", "skipped"]);
}

#[test]
fn batch_stops_on_first_error_by_default() {
    let dir = TempDir::new().unwrap();
    write_invoice(&dir, "Hyresavi_1.txt", &INVOICE.replace("75\n", ""));

    hyresavi(dir.path())
        .arg("batch")
        .arg(format!("{}/*.txt", dir.path().display()))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Processing failed"));
}

#[test]
fn config_init_refuses_to_overwrite() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");

    hyresavi(dir.path())
        .args(["config", "init", "--output"])
        .arg(&path)
        .assert()
        .success();
    assert!(path.exists());

    hyresavi(dir.path())
        .args(["config", "init", "--output"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
}

#[test]
fn config_set_then_get() {
    let dir = TempDir::new().unwrap();

    hyresavi(dir.path())
        .args(["config", "set", "extraction.strict_pairing", "true"])
        .assert()
        .success();

    hyresavi(dir.path())
        .args(["config", "get", "extraction.strict_pairing"])
        .assert()
        .success()
        .stdout(predicate::str::contains("true"));
}

#[test]
fn config_commands_follow_global_config_flag() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("custom.json");

    hyresavi(dir.path())
        .arg("-c")
        .arg(&path)
        .args(["config", "set", "pipeline.invoice_id_prefix", "Avi_"])
        .assert()
        .success();
    assert!(path.exists());
    assert!(!dir.path().join(".config/hyresavi/config.json").exists());

    hyresavi(dir.path())
        .arg("-c")
        .arg(&path)
        .args(["config", "get", "pipeline.invoice_id_prefix"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Avi_"));

    // Without the flag the default location still holds defaults.
    hyresavi(dir.path())
        .args(["config", "get", "pipeline.invoice_id_prefix"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Invoice_"));
}
