use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

const EXPORT: &str = "<payment_data><invoice_list>\
    <invoice><invoice_number>77</invoice_number>\
    <unique_identifier>U77</unique_identifier>\
    <invoice_date>12/31/2015</invoice_date>\
    <vendor_FinancialSys_Code>300500</vendor_FinancialSys_Code>\
    <invoice_amount><sum>42.5</sum></invoice_amount>\
    <invoice_line_list><invoice_line><total_price>42.5</total_price>\
    <reporting_code>510000</reporting_code><external_id>K9-510000</external_id>\
    </invoice_line></invoice_line_list></invoice>\
    <invoice><invoice_number>78</invoice_number>\
    <unique_identifier>U78</unique_identifier>\
    <vendor_FinancialSys_Code>CreditCard</vendor_FinancialSys_Code>\
    <invoice_amount><sum>1.00</sum></invoice_amount></invoice>\
    </invoice_list></payment_data>";

fn apfeed(config_home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("apfeed").unwrap();
    cmd.env("XDG_CONFIG_HOME", config_home);
    cmd
}

fn workflow(base: &Path) {
    for dir in ["inbox", "todo", "outbox", "success", "failure"] {
        fs::create_dir_all(base.join("feed").join(dir)).unwrap();
    }
    fs::create_dir_all(base.join("erp").join("inbox")).unwrap();
}

#[test]
fn test_convert_prints_records() {
    let temp = tempfile::tempdir().unwrap();
    let input = temp.path().join("export.xml");
    fs::write(&input, EXPORT).unwrap();

    apfeed(temp.path())
        .arg("convert")
        .arg(&input)
        .args(["--policy", "separate"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("HU77"))
        .stdout(predicate::str::contains("20151231"))
        .stdout(predicate::str::contains("KRED"))
        .stderr(predicate::str::contains("credit card vendor"));
}

#[test]
fn test_convert_writes_output_file() {
    let temp = tempfile::tempdir().unwrap();
    let input = temp.path().join("export.xml");
    let output = temp.path().join("out.txt");
    fs::write(&input, EXPORT).unwrap();

    apfeed(temp.path())
        .arg("convert")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .assert()
        .success();

    let content = fs::read_to_string(&output).unwrap();
    assert_eq!(content.matches("\r\n").count(), 2);
}

#[test]
fn test_convert_rejects_malformed_xml() {
    let temp = tempfile::tempdir().unwrap();
    let input = temp.path().join("broken.xml");
    fs::write(&input, "<payment_data><invoice>").unwrap();

    apfeed(temp.path())
        .arg("convert")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("broken.xml"));
}

#[test]
fn test_run_requires_root() {
    let temp = tempfile::tempdir().unwrap();

    apfeed(temp.path())
        .args(["run", "--destination", "/tmp", "--log", "/tmp/apfeed.log"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing required path: root"));
}

#[test]
fn test_run_delivers_batch_and_writes_summary() {
    let temp = tempfile::tempdir().unwrap();
    let base = temp.path();
    workflow(base);
    fs::write(base.join("feed/inbox/export.xml"), EXPORT).unwrap();
    let log = base.join("apfeed.log");
    let report = base.join("report.txt");
    let summary = base.join("summary.csv");

    apfeed(base)
        .arg("run")
        .arg("--root")
        .arg(base.join("feed"))
        .arg("--destination")
        .arg(base.join("erp"))
        .arg("--log")
        .arg(&log)
        .arg("--report")
        .arg(&report)
        .arg("--summary")
        .arg(&summary)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 successful"));

    assert!(base.join("feed/success/export.xml").exists());
    let delivered: Vec<_> = fs::read_dir(base.join("erp/inbox")).unwrap().collect();
    assert_eq!(delivered.len(), 1);

    assert!(fs::read_to_string(&log).unwrap().contains("Claimed 1 files"));
    assert!(
        fs::read_to_string(&report)
            .unwrap()
            .starts_with("Invoice validation errors (1)")
    );
    assert_eq!(
        fs::read_to_string(&summary).unwrap(),
        "file,status,invoices,errors\nexport.xml,success,1,1\n"
    );
}

#[test]
fn test_run_uses_config_file() {
    let temp = tempfile::tempdir().unwrap();
    let base = temp.path();
    workflow(base);
    let config = base.join("apfeed.json");
    fs::write(
        &config,
        format!(
            r#"{{"paths": {{"root": {:?}, "destination": {:?}, "log": {:?}}},
                "batch": {{"prefix": "SAPFEED", "timestamp_format": "%Y%m%d"}}}}"#,
            base.join("feed"),
            base.join("erp"),
            base.join("apfeed.log")
        ),
    )
    .unwrap();
    fs::write(base.join("feed/inbox/export.xml"), EXPORT).unwrap();

    apfeed(base)
        .arg("-c")
        .arg(&config)
        .arg("run")
        .assert()
        .success();

    let names: Vec<String> = fs::read_dir(base.join("erp/inbox"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names.len(), 1);
    assert!(names[0].starts_with("SAPFEED_"));
    assert_eq!(names[0].len(), "SAPFEED_".len() + 8);
}

#[test]
fn test_config_init_refuses_overwrite() {
    let temp = tempfile::tempdir().unwrap();
    let output = temp.path().join("config.json");

    apfeed(temp.path())
        .args(["config", "init", "-o"])
        .arg(&output)
        .assert()
        .success();
    assert!(fs::read_to_string(&output).unwrap().contains("ALMA_SAP"));

    apfeed(temp.path())
        .args(["config", "init", "-o"])
        .arg(&output)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    apfeed(temp.path())
        .args(["config", "init", "--force", "-o"])
        .arg(&output)
        .assert()
        .success();
}

#[test]
fn test_config_path() {
    let temp = tempfile::tempdir().unwrap();

    apfeed(temp.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration file:"))
        .stdout(predicate::str::contains("not created"));
}

#[test]
fn test_run_counts_files_left_in_todo() {
    let temp = tempfile::tempdir().unwrap();
    let base = temp.path();
    workflow(base);
    fs::write(base.join("feed/inbox/new.xml"), EXPORT).unwrap();
    fs::write(base.join("feed/todo/leftover.xml"), EXPORT).unwrap();

    apfeed(base)
        .arg("run")
        .arg("--root")
        .arg(base.join("feed"))
        .arg("--destination")
        .arg(base.join("erp"))
        .arg("--log")
        .arg(base.join("apfeed.log"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Processed 2 files"))
        .stdout(predicate::str::contains("2 successful"));

    assert!(base.join("feed/success/leftover.xml").exists());
    assert!(base.join("feed/success/new.xml").exists());
}
